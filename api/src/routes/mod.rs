pub mod food_trucks;
