mod nominatim_client;
mod nominatim_types;

use std::time::Duration;

pub use nominatim_client::NominatimClient;
use thiserror::Error;

use crate::BoxFuture;
use crate::nearest::Coordinate;

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Geocoding timed out after {0:?}")]
    Timeout(Duration),

    #[error("Geocoding request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Geocoding service answered with status {0}")]
    Status(reqwest::StatusCode),

    #[error("Geocoding service returned an unreadable response: {0}")]
    Decode(String),
}

/// Resolves free-text postal addresses to coordinates.
///
/// `Ok(None)` means the service answered but knows no such address; `Err` means the lookup
/// itself failed.
pub trait Geocoder: Send + Sync {
    fn geocode<'a>(
        &'a self,
        address: &'a str,
    ) -> BoxFuture<'a, Result<Option<Coordinate>, GeocodeError>>;
}
