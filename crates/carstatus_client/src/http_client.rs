//! HTTP client implementation for the vehicle telemetry API.
//!
//! This module provides a reqwest-based implementation of the [`VehicleClient`](crate::VehicleClient) trait.

use crate::config::{Config, DEFAULT_HTTP_TIMEOUT};
use crate::{ApiResponse, CarStatusError, VehicleClient};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

pub(crate) const USER_AGENT: &str = concat!("carstatus/", env!("CARGO_PKG_VERSION"));

/// Build a reqwest client with the shared user agent and an explicit timeout.
pub(crate) fn build_http_client(timeout: Duration) -> Result<reqwest::Client, CarStatusError> {
    Ok(reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()?)
}

/// Client for the vehicle telemetry API using reqwest.
#[derive(Clone, Debug)]
pub struct ReqwestVehicleClient {
    base_url: String,
    vehicle_id: String,
    token: SecretString,
    client: reqwest::Client,
}

impl ReqwestVehicleClient {
    /// Create a new client instance.
    ///
    /// # Arguments
    /// * `base_url` - The API root (e.g., "https://owner-api.teslamotors.com/api/1")
    /// * `vehicle_id` - The vehicle to query
    /// * `token` - Bearer token sent with every request
    pub fn new(
        base_url: &str,
        vehicle_id: impl Into<String>,
        token: SecretString,
    ) -> Result<Self, CarStatusError> {
        Self::with_timeout(base_url, vehicle_id, token, DEFAULT_HTTP_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: &str,
        vehicle_id: impl Into<String>,
        token: SecretString,
        timeout: Duration,
    ) -> Result<Self, CarStatusError> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            vehicle_id: vehicle_id.into(),
            token,
            client: build_http_client(timeout)?,
        })
    }

    /// Build a client from configuration. Fails before any network I/O when
    /// the credential or vehicle id is missing.
    pub fn from_config(config: &Config) -> Result<Self, CarStatusError> {
        let token = config
            .tesla_token
            .clone()
            .ok_or(CarStatusError::MissingCredentials)?;
        let vehicle_id = config
            .vehicle_id
            .clone()
            .ok_or_else(|| CarStatusError::Config("VEHICLE_ID missing".into()))?;
        Self::with_timeout(&config.api_base_url, vehicle_id, token, config.http_timeout)
    }

    fn vehicle_url(&self, endpoint: &str) -> String {
        format!(
            "{}/vehicles/{}/{}",
            self.base_url, self.vehicle_id, endpoint
        )
    }

    /// Build an authenticated GET request.
    fn get_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .bearer_auth(self.token.expose_secret())
    }

    /// Build an authenticated POST request.
    fn post_request(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .bearer_auth(self.token.expose_secret())
    }
}

#[async_trait]
impl VehicleClient for ReqwestVehicleClient {
    async fn vehicle_data(&self) -> Result<ApiResponse, CarStatusError> {
        let url = self.vehicle_url("vehicle_data");
        tracing::debug!(%url, "requesting vehicle data");
        let resp = self.get_request(&url).send().await?;
        let status = resp.status().as_u16();
        Ok(ApiResponse {
            status,
            body: resp.text().await?,
        })
    }

    async fn wake_up(&self) -> Result<(), CarStatusError> {
        let url = self.vehicle_url("wake_up");
        tracing::debug!(%url, "sending wake-up");
        let resp = self.post_request(&url).send().await?;
        tracing::debug!(status = resp.status().as_u16(), "wake-up sent");
        Ok(())
    }
}
