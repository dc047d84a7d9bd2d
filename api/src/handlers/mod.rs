pub mod closest;
