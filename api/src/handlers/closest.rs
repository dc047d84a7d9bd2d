use food_trucks::{DEFAULT_CLOSEST, FoodTrucks, find_closest};

use crate::AppState;
use crate::error::AppError;
use crate::models::food_trucks::FoodTruckLocation;

/// Geocodes `address` and returns the food trucks nearest to it.
///
/// An empty store is reported before the geocoder is asked anything.
#[tracing::instrument(skip(state))]
pub async fn find_closest_food_trucks(
    state: &AppState,
    address: &str,
) -> Result<Vec<FoodTruckLocation>, AppError> {
    let food_trucks = {
        let mut conn = state.db.acquire().await?;
        FoodTrucks::find_all(conn.as_mut()).await?
    };

    if food_trucks.is_empty() {
        return Err(AppError::NotFound);
    }

    let target = state
        .geocoder
        .geocode(address)
        .await?
        .ok_or(AppError::AddressNotFound)?;
    tracing::debug!(?target, candidates = food_trucks.len(), "ranking food trucks");

    let closest = find_closest(target, food_trucks, DEFAULT_CLOSEST);
    Ok(closest.into_iter().map(FoodTruckLocation::from).collect())
}
