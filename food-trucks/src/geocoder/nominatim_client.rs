use std::num::NonZeroU32;
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};

use super::nominatim_types::NominatimPlace;
use super::{GeocodeError, Geocoder};
use crate::BoxFuture;
use crate::nearest::Coordinate;

/// Geocoder backed by a Nominatim (OpenStreetMap) search endpoint.
pub struct NominatimClient {
    client: reqwest::Client,
    search_url: String,
    timeout: Duration,
    limiter: DefaultDirectRateLimiter,
}

impl NominatimClient {
    pub fn new(api_url: &str, user_agent: &str, timeout: Duration) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        let search_url = format!("{}/search", api_url.trim_end_matches('/'));

        // Nominatim's usage policy allows a single request per second.
        let quota = Quota::per_second(NonZeroU32::MIN);

        Ok(Self {
            client,
            search_url,
            timeout,
            limiter: RateLimiter::direct(quota),
        })
    }

    #[tracing::instrument(skip(self))]
    async fn search(&self, address: &str) -> Result<Option<Coordinate>, GeocodeError> {
        self.limiter.until_ready().await;

        let response = self
            .client
            .get(&self.search_url)
            .query(&[("q", address), ("format", "jsonv2"), ("limit", "1")])
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "geocoding service refused the lookup");
            return Err(GeocodeError::Status(response.status()));
        }

        let places = response
            .json::<Vec<NominatimPlace>>()
            .await
            .map_err(|e| GeocodeError::Decode(e.to_string()))?;
        let Some(place) = places.into_iter().next() else {
            tracing::debug!("address not found");
            return Ok(None);
        };

        tracing::debug!(display_name = ?place.display_name, "address resolved");
        Coordinate::try_from(place).map(Some)
    }
}

impl Geocoder for NominatimClient {
    fn geocode<'a>(
        &'a self,
        address: &'a str,
    ) -> BoxFuture<'a, Result<Option<Coordinate>, GeocodeError>> {
        Box::pin(async move {
            match tokio::time::timeout(self.timeout, self.search(address)).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::error!(timeout = ?self.timeout, %address, "geocoding timed out");
                    Err(GeocodeError::Timeout(self.timeout))
                }
            }
        })
    }
}
