//! Telemetry loading: live API with wake-up handling, or a captured snapshot file.

use crate::config::{Config, RunMode};
use crate::http_client::ReqwestVehicleClient;
use crate::retry::WakePolicy;
use crate::{CarStatusError, TelemetrySnapshot, VehicleClient};
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize)]
struct VehicleDataEnvelope {
    #[serde(default)]
    response: Option<TelemetrySnapshot>,
}

/// Load the current telemetry according to `config.mode`.
pub async fn load_vehicle_data(config: &Config) -> Result<TelemetrySnapshot, CarStatusError> {
    match config.mode {
        RunMode::Prod => {
            let client = ReqwestVehicleClient::from_config(config)?;
            fetch_vehicle_data(&client, &config.wake_policy()).await
        }
        RunMode::Offline => {
            tracing::info!(path = %config.snapshot_path.display(), "offline mode, reading snapshot");
            load_snapshot_file(&config.snapshot_path).await
        }
    }
}

/// Fetch telemetry, waking the vehicle if needed.
///
/// Statuses outside the success range and the asleep set are logged and the
/// body is parsed anyway; only transport and JSON failures are errors.
pub async fn fetch_vehicle_data<C>(
    client: &C,
    policy: &WakePolicy,
) -> Result<TelemetrySnapshot, CarStatusError>
where
    C: VehicleClient + ?Sized,
{
    let resp = policy
        .run(|| client.vehicle_data(), || client.wake_up())
        .await?;
    if !resp.is_success() {
        tracing::warn!(status = resp.status, "An error occurred, status: {}", resp.status);
    }
    let envelope: VehicleDataEnvelope = serde_json::from_str(&resp.body)?;
    Ok(envelope.response.unwrap_or_default())
}

/// Parse a captured snapshot. The file holds the telemetry itself, not the API envelope.
pub async fn load_snapshot_file(path: &Path) -> Result<TelemetrySnapshot, CarStatusError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CarStatusError::SnapshotFile {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(serde_json::from_str(&text)?)
}
