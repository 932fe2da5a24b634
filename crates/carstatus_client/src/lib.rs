//! Vehicle telemetry and reverse-geocoding clients behind small async traits.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub mod allowance;
pub mod config;
pub mod geocoding;
pub mod http_client;
pub mod retry;
pub mod units;
pub mod vehicle;

pub use vehicle::{fetch_vehicle_data, load_snapshot_file, load_vehicle_data};

#[derive(Debug, Error)]
pub enum CarStatusError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("reading snapshot {path}: {source}")]
    SnapshotFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("You need to provide valid tesla credentials in the .env file!")]
    MissingCredentials,
    #[error("vehicle still asleep after {attempts} retries")]
    VehicleAsleep { attempts: u32 },
}

/// Status and raw body of a telemetry API call.
///
/// The body is kept as text because non-2xx responses are still parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Point-in-time vehicle state as returned under `response` by the vehicle data endpoint.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct TelemetrySnapshot {
    pub display_name: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub charge_state: ChargeState,
    #[serde(deserialize_with = "null_as_default")]
    pub climate_state: ClimateState,
    #[serde(deserialize_with = "null_as_default")]
    pub vehicle_state: VehicleState,
    #[serde(deserialize_with = "null_as_default")]
    pub drive_state: DriveState,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ChargeState {
    /// Kept as the JSON number so integers and floats print as received.
    pub battery_level: Option<serde_json::Number>,
    /// Miles.
    pub battery_range: Option<f64>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ClimateState {
    pub inside_temp: Option<serde_json::Number>,
    pub outside_temp: Option<serde_json::Number>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct VehicleState {
    pub car_version: Option<String>,
    pub locked: Option<bool>,
    /// Miles.
    pub odometer: Option<f64>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DriveState {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Address fields of a reverse-geocoding result. Absent fields stay `None`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeocodeAddress {
    pub house_number: Option<String>,
    pub road: Option<String>,
    pub postcode: Option<String>,
    pub city: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeocodeResult {
    #[serde(deserialize_with = "null_as_default")]
    pub address: GeocodeAddress,
}

/// A formatted one-line address: `"{road} {house_number}, {postcode} {city}"`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Address(String);

impl Address {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&GeocodeAddress> for Address {
    fn from(parts: &GeocodeAddress) -> Self {
        let house_number = parts
            .house_number
            .as_deref()
            .unwrap_or_default()
            .to_uppercase();
        let road = parts.road.as_deref().unwrap_or_default();
        let street = if house_number.is_empty() {
            road.to_string()
        } else {
            format!("{road} {house_number}")
        };
        // postcode and city are only space-joined when both are present
        let locality: Vec<&str> = [parts.postcode.as_deref(), parts.city.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();
        Address(format!("{street}, {}", locality.join(" ")))
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[async_trait]
pub trait VehicleClient: Send + Sync + 'static {
    /// GET the current telemetry. Non-2xx statuses are returned, not raised.
    async fn vehicle_data(&self) -> Result<ApiResponse, CarStatusError>;

    /// POST a wake-up request. The response body is ignored.
    async fn wake_up(&self) -> Result<(), CarStatusError>;
}

#[async_trait]
pub trait GeocodingClient: Send + Sync + 'static {
    async fn reverse_geocode(
        &self,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<Address, CarStatusError>;
}
