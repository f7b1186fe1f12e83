//! Best-effort address geocoding against a Google-compatible geocode API.

use crate::retry::{with_retry_if, RetryConfig};
use isocountry::CountryCode;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_GEOCODE_API_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Latitude and longitude of an address; both `None` when it couldn't be
/// resolved.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Coordinates {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Error)]
enum GeocodeError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("geocode API returned {0}")]
    Status(StatusCode),
}

impl GeocodeError {
    /// 5xx, 429 and network failures are worth another attempt.
    fn is_transient(&self) -> bool {
        match self {
            GeocodeError::Http(e) => !e.is_decode(),
            GeocodeError::Status(status) => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// English name of an ISO 3166-1 alpha-2 country code. Codes that aren't in
/// the registry are returned as given.
pub fn country_name(code: &str) -> String {
    let code = code.trim();
    CountryCode::for_alpha2(&code.to_uppercase())
        .map(|country| country.name().to_string())
        .unwrap_or_else(|_| code.to_string())
}

/// Join the non-empty address parts with single spaces, spelling out the
/// country.
pub fn address_query(street: &str, number: &str, city: &str, zip: &str, country: &str) -> String {
    let country = country_name(country);
    [street, number, city, zip, country.as_str()]
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone)]
pub struct Geocoder {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    retry: RetryConfig,
}

impl Geocoder {
    pub fn new(client: reqwest::Client, api_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            api_key,
            retry: RetryConfig::geocode(),
        }
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Look up the coordinates of an address. Never fails: any error is
    /// logged and yields empty coordinates.
    pub async fn get_coordinates(
        &self,
        street: &str,
        number: &str,
        city: &str,
        zip: &str,
        country: &str,
    ) -> Coordinates {
        let address = address_query(street, number, city, zip, country);
        if address.is_empty() {
            return Coordinates::default();
        }

        let result = with_retry_if(
            &self.retry,
            "Geocode",
            || self.fetch(&address),
            GeocodeError::is_transient,
        )
        .await;

        match result {
            Ok(Some(location)) => Coordinates {
                latitude: Some(location.lat),
                longitude: Some(location.lng),
            },
            Ok(None) => {
                debug!("No geocode results for '{}'", address);
                Coordinates::default()
            }
            Err(e) => {
                warn!("Geocoding '{}' failed: {}", address, e);
                Coordinates::default()
            }
        }
    }

    async fn fetch(&self, address: &str) -> Result<Option<LatLng>, GeocodeError> {
        let mut query = vec![("address", address)];
        if let Some(key) = &self.api_key {
            query.push(("key", key.as_str()));
        }

        let response = self.client.get(&self.api_url).query(&query).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status));
        }

        let body: GeocodeResponse = response.json().await?;
        Ok(body.results.into_iter().next().map(|result| result.geometry.location))
    }
}
