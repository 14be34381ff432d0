use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use crate::models::sala::Coordenadas;

const SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

// Nominatim requires an identifying User-Agent.
const USER_AGENT: &str = "CineWeb/1.0 (Educational Project)";

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoding request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("address could not be resolved")]
    NoMatch,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

/// Address-to-coordinates adapter over the Nominatim (OpenStreetMap)
/// HTTP API. No retries; a single failure is surfaced to the caller.
#[derive(Clone)]
pub struct Geocoder {
    http: reqwest::Client,
}

impl Geocoder {
    pub fn new(http: reqwest::Client) -> Self {
        Geocoder { http }
    }

    pub async fn geocode(&self, direccion: &str) -> Result<Coordenadas, GeocodeError> {
        let results: Vec<NominatimPlace> = self
            .http
            .get(SEARCH_URL)
            .query(&[
                ("q", direccion),
                ("format", "json"),
                ("limit", "1"),
                ("addressdetails", "1"),
            ])
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(Duration::from_secs(5))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        results
            .into_iter()
            .next()
            .and_then(|place| parse_place(&place))
            .ok_or(GeocodeError::NoMatch)
    }
}

/// Nominatim returns coordinates as strings.
fn parse_place(place: &NominatimPlace) -> Option<Coordenadas> {
    Some(Coordenadas {
        latitud: place.lat.parse().ok()?,
        longitud: place.lon.parse().ok()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_string_coordinates() {
        let results: Vec<NominatimPlace> = serde_json::from_str(
            r#"[{"lat":"40.4167047","lon":"-3.7035825","display_name":"Madrid, España"}]"#,
        )
        .unwrap();
        let coords = parse_place(&results[0]).unwrap();
        assert_eq!(coords.latitud, 40.4167047);
        assert_eq!(coords.longitud, -3.7035825);
    }

    #[test]
    fn unparsable_coordinates_yield_none() {
        let place = NominatimPlace {
            lat: "not-a-number".into(),
            lon: "-3.70".into(),
        };
        assert!(parse_place(&place).is_none());
    }
}
