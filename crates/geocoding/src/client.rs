use reqwest::Client;
use serde::Deserialize;

/// Client for the Google Geocoding API
#[derive(Debug, Clone)]
pub struct GeocoderClient {
    client: Client,
    base_url: String,
    api_key: String,
}

/// A geocoded address: coordinates plus the formatted address string
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedLocation {
    /// Latitude of the best match
    pub latitude: f64,
    /// Longitude of the best match
    pub longitude: f64,
    /// Formatted address of the best match
    pub formatted_address: String,
}

/// Custom error type for geocoding operations
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    /// HTTP transport error
    #[error("Geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with an error status
    #[error("Geocoding service error: {0}")]
    Service(String),
}

/// Response structure from the geocoding API
#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    /// Service status, e.g. "OK" or "ZERO_RESULTS"
    pub status: String,
    /// Candidate matches, best first
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    /// Optional error detail accompanying a non-OK status
    pub error_message: Option<String>,
}

/// A single geocoding candidate
#[derive(Debug, Deserialize)]
pub struct GeocodeResult {
    /// Formatted address of the candidate
    pub formatted_address: String,
    /// Geometry holding the coordinates
    pub geometry: GeocodeGeometry,
}

/// Geometry section of a geocoding candidate
#[derive(Debug, Deserialize)]
pub struct GeocodeGeometry {
    /// Coordinates of the candidate
    pub location: GeocodePoint,
}

/// A latitude/longitude pair
#[derive(Debug, Deserialize)]
pub struct GeocodePoint {
    /// Latitude
    pub lat: f64,
    /// Longitude
    pub lng: f64,
}

impl GeocoderClient {
    /// Creates a new geocoder client. The API key comes from the
    /// `GEOCODER_API_KEY` environment variable.
    pub fn new() -> Result<Self, GeocodeError> {
        let api_key = std::env::var("GEOCODER_API_KEY").unwrap_or_default();

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: "https://maps.googleapis.com/maps/api/geocode/json".to_string(),
            api_key,
        })
    }

    /// Resolves a free-text address.
    ///
    /// Returns `Ok(None)` when the service finds no match, which callers
    /// treat as an invalid address.
    pub async fn geocode(&self, address: &str) -> Result<Option<GeocodedLocation>, GeocodeError> {
        let url = format!(
            "{}?address={}&key={}",
            self.base_url,
            urlencoding::encode(address),
            self.api_key
        );

        log::debug!("Geocoding address: {}", address);

        let response = self.client.get(&url).send().await?;
        let body: GeocodeResponse = response.json().await?;

        best_match(body)
    }
}

/// Picks the best candidate out of a geocoding response, or `None` when the
/// service found nothing.
fn best_match(response: GeocodeResponse) -> Result<Option<GeocodedLocation>, GeocodeError> {
    match response.status.as_str() {
        "OK" => Ok(response.results.into_iter().next().map(|result| {
            GeocodedLocation {
                latitude: result.geometry.location.lat,
                longitude: result.geometry.location.lng,
                formatted_address: result.formatted_address,
            }
        })),
        "ZERO_RESULTS" => Ok(None),
        status => Err(GeocodeError::Service(
            response
                .error_message
                .unwrap_or_else(|| status.to_string()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_geocode_response() {
        let json = r#"{
            "status": "OK",
            "results": [
                {
                    "formatted_address": "Yosemite Valley, CA 95389, USA",
                    "geometry": {
                        "location": { "lat": 37.7455906, "lng": -119.5936038 }
                    }
                }
            ]
        }"#;

        let response: GeocodeResponse = serde_json::from_str(json).unwrap();
        let location = best_match(response).unwrap().unwrap();

        assert_eq!(location.formatted_address, "Yosemite Valley, CA 95389, USA");
        assert_eq!(location.latitude, 37.7455906);
        assert_eq!(location.longitude, -119.5936038);
    }

    #[test]
    fn test_zero_results_is_none() {
        let json = r#"{ "status": "ZERO_RESULTS", "results": [] }"#;

        let response: GeocodeResponse = serde_json::from_str(json).unwrap();

        assert!(best_match(response).unwrap().is_none());
    }

    #[test]
    fn test_empty_result_list_with_ok_status_is_none() {
        let json = r#"{ "status": "OK", "results": [] }"#;

        let response: GeocodeResponse = serde_json::from_str(json).unwrap();

        assert!(best_match(response).unwrap().is_none());
    }

    #[test]
    fn test_error_status_surfaces_message() {
        let json = r#"{
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid."
        }"#;

        let response: GeocodeResponse = serde_json::from_str(json).unwrap();
        let err = best_match(response).unwrap_err();

        assert!(err.to_string().contains("API key is invalid"));
    }
}
