//! Reverse geocoding through a Nominatim-compatible `/reverse` endpoint.

use crate::config::{Config, DEFAULT_HTTP_TIMEOUT};
use crate::http_client::build_http_client;
use crate::{Address, CarStatusError, GeocodeAddress, GeocodeResult, GeocodingClient};
use async_trait::async_trait;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct NominatimGeocodingClient {
    base_url: String,
    client: reqwest::Client,
}

impl NominatimGeocodingClient {
    pub fn new(base_url: &str) -> Result<Self, CarStatusError> {
        Self::with_timeout(base_url, DEFAULT_HTTP_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, CarStatusError> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: build_http_client(timeout)?,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, CarStatusError> {
        Self::with_timeout(&config.geocoder_base_url, config.http_timeout)
    }
}

#[async_trait]
impl GeocodingClient for NominatimGeocodingClient {
    /// Without both coordinates no request is made and the empty address is returned.
    async fn reverse_geocode(
        &self,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<Address, CarStatusError> {
        let (Some(lat), Some(lon)) = (latitude, longitude) else {
            tracing::debug!("no coordinates in telemetry, skipping reverse geocoding");
            return Ok(Address::from(&GeocodeAddress::default()));
        };

        let url = format!("{}/reverse", self.base_url);
        let (lat, lon) = (lat.to_string(), lon.to_string());
        let qp = [("format", "json"), ("lat", lat.as_str()), ("lon", lon.as_str())];
        tracing::debug!(%url, %lat, %lon, "reverse geocoding");

        let result: GeocodeResult = self
            .client
            .get(&url)
            .query(&qp)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(Address::from(&result.address))
    }
}
