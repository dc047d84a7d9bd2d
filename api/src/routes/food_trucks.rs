use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use food_trucks::{FoodTruck, FoodTrucks};
use validator::Validate;

use crate::error::AppError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::models::food_trucks::{
    ClosestParams, FoodTruckLocation, FoodTruckPayload, FoodTruckSummary, NameParams,
};
use crate::{AppState, handlers};

pub fn food_truck_routes() -> Router<AppState> {
    Router::new()
        .route("/food_trucks/", get(list_food_trucks).post(create_food_truck))
        .route("/food_trucks/by_name/", get(food_trucks_by_name))
        .route("/food_trucks/closest/", get(closest_food_trucks))
        .route(
            "/food_trucks/{location_id}",
            get(get_food_truck)
                .put(update_food_truck)
                .delete(delete_food_truck),
        )
        .route(
            "/food_trucks/{location_id}/applicant_fooditems",
            get(food_truck_items),
        )
}

#[tracing::instrument(skip_all)]
async fn list_food_trucks(
    State(state): State<AppState>,
) -> Result<Json<Vec<FoodTruckSummary>>, AppError> {
    let mut conn = state.db.acquire().await?;
    let food_trucks = FoodTrucks::find_all(conn.as_mut()).await?;

    Ok(Json(food_trucks.into_iter().map(Into::into).collect()))
}

#[tracing::instrument(skip(state))]
async fn get_food_truck(
    State(state): State<AppState>,
    ApiPath(location_id): ApiPath<i64>,
) -> Result<Json<FoodTruckPayload>, AppError> {
    let mut conn = state.db.acquire().await?;
    let food_truck = FoodTrucks::find_by_id(conn.as_mut(), location_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(food_truck.into()))
}

#[tracing::instrument(skip(state))]
async fn food_trucks_by_name(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<NameParams>,
) -> Result<Json<Vec<FoodTruckPayload>>, AppError> {
    let mut conn = state.db.acquire().await?;
    let food_trucks = FoodTrucks::find_by_name(conn.as_mut(), &params.name).await?;

    if food_trucks.is_empty() {
        return Err(AppError::NotFound);
    }

    Ok(Json(food_trucks.into_iter().map(Into::into).collect()))
}

#[tracing::instrument(skip_all, fields(location_id = ?payload.location_id))]
async fn create_food_truck(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<FoodTruckPayload>,
) -> Result<Json<FoodTruckPayload>, AppError> {
    let mut conn = state.db.acquire().await?;
    let food_truck = FoodTrucks::insert(conn.as_mut(), &payload.into()).await?;
    tracing::info!(location_id = ?food_truck.location_id, "food truck created");

    Ok(Json(food_truck.into()))
}

#[tracing::instrument(skip(state, payload))]
async fn update_food_truck(
    State(state): State<AppState>,
    ApiPath(location_id): ApiPath<i64>,
    ApiJson(payload): ApiJson<FoodTruckPayload>,
) -> Result<Json<FoodTruckPayload>, AppError> {
    let food_truck = FoodTruck::from(payload);

    // The key is never rewritten through an update.
    if let Some(payload_id) = food_truck.location_id.filter(|&id| id != location_id) {
        return Err(AppError::IdMismatch {
            path: location_id,
            payload: payload_id,
        });
    }

    let mut conn = state.db.acquire().await?;
    let updated = FoodTrucks::update(conn.as_mut(), location_id, &food_truck)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(updated.into()))
}

#[tracing::instrument(skip(state))]
async fn delete_food_truck(
    State(state): State<AppState>,
    ApiPath(location_id): ApiPath<i64>,
) -> Result<Json<u16>, AppError> {
    let mut conn = state.db.acquire().await?;
    if !FoodTrucks::delete(conn.as_mut(), location_id).await? {
        return Err(AppError::NotFound);
    }

    tracing::info!("food truck deleted");
    Ok(Json(StatusCode::OK.as_u16()))
}

#[tracing::instrument(skip(state))]
async fn food_truck_items(
    State(state): State<AppState>,
    ApiPath(location_id): ApiPath<i64>,
) -> Result<Json<FoodTruckLocation>, AppError> {
    let mut conn = state.db.acquire().await?;
    let food_truck = FoodTrucks::find_by_id(conn.as_mut(), location_id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(food_truck.into()))
}

#[tracing::instrument(skip(state))]
async fn closest_food_trucks(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ClosestParams>,
) -> Result<Json<Vec<FoodTruckLocation>>, AppError> {
    params.validate()?;

    let food_trucks = handlers::closest::find_closest_food_trucks(&state, &params.address).await?;
    Ok(Json(food_trucks))
}
