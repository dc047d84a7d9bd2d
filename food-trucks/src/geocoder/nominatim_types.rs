use serde::Deserialize;

use super::GeocodeError;
use crate::nearest::Coordinate;

/// One entry of a `/search?format=jsonv2` response. Nominatim sends coordinates as strings.
#[derive(Debug, Deserialize)]
pub struct NominatimPlace {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl TryFrom<NominatimPlace> for Coordinate {
    type Error = GeocodeError;

    fn try_from(place: NominatimPlace) -> Result<Self, Self::Error> {
        let parse = |value: &str| {
            value
                .trim()
                .parse::<f64>()
                .map_err(|_| GeocodeError::Decode(format!("{}, {}", place.lat, place.lon)))
        };

        Ok(Coordinate::new(parse(&place.lat)?, parse(&place.lon)?))
    }
}
