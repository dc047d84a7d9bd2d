pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use food_trucks::Geocoder;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub geocoder: Arc<dyn Geocoder>,
}

pub fn app(state: AppState) -> Router {
    Router::<AppState>::new()
        .merge(routes::food_trucks::food_truck_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
