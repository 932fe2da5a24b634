use crate::CarStatusError;
use crate::allowance::ProRataAllowance;
use crate::retry::WakePolicy;
use chrono::NaiveDate;
use secrecy::SecretString;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://owner-api.teslamotors.com/api/1";
pub const DEFAULT_GEOCODER_BASE_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_SNAPSHOT_PATH: &str = "data/vehicle_data.json";
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Where telemetry comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    /// Live API calls.
    Prod,
    /// Read a captured snapshot from disk, no network for telemetry.
    Offline,
}

impl RunMode {
    fn parse(value: Option<&str>) -> Self {
        match value.unwrap_or("prod") {
            "prod" => RunMode::Prod,
            _ => RunMode::Offline,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub tesla_token: Option<SecretString>,
    pub vehicle_id: Option<String>,
    pub mode: RunMode,
    pub allowance: Option<ProRataAllowance>,
    pub api_base_url: String,
    pub geocoder_base_url: String,
    pub http_timeout: Duration,
    pub wake_retry_delay: Duration,
    pub wake_max_retries: Option<u32>,
    pub snapshot_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, CarStatusError> {
        Self::from_env_with(|k| std::env::var(k).ok())
    }

    /// Reads configuration values through `get`, so tests never have to
    /// mutate the process environment. Empty values count as unset.
    pub fn from_env_with<F>(mut get: F) -> Result<Self, CarStatusError>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut get = move |k: &str| get(k).filter(|v| !v.trim().is_empty());

        let allowance = match (
            get("DATE_OF_OWNERSHIP"),
            get("ALLOWED_KILOMETERS_PER_YEAR"),
        ) {
            (Some(date), Some(km)) => Some(ProRataAllowance::new(
                parse_date("DATE_OF_OWNERSHIP", &date)?,
                parse_number("ALLOWED_KILOMETERS_PER_YEAR", &km)?,
            )),
            _ => None,
        };

        let http_timeout = get("HTTP_TIMEOUT_SECS")
            .map(|v| parse_number::<u64>("HTTP_TIMEOUT_SECS", &v))
            .transpose()?
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_HTTP_TIMEOUT);
        let wake_retry_delay = get("WAKE_RETRY_DELAY_MS")
            .map(|v| parse_number::<u64>("WAKE_RETRY_DELAY_MS", &v))
            .transpose()?
            .map(Duration::from_millis)
            .unwrap_or(WakePolicy::DEFAULT_RETRY_DELAY);
        let wake_max_retries = get("WAKE_MAX_RETRIES")
            .map(|v| parse_number::<u32>("WAKE_MAX_RETRIES", &v))
            .transpose()?;

        Ok(Self {
            tesla_token: get("TESLA_TOKEN").map(|t| SecretString::new(t.into())),
            vehicle_id: get("VEHICLE_ID"),
            mode: RunMode::parse(get("ENV").as_deref()),
            allowance,
            api_base_url: get("TESLA_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.into()),
            geocoder_base_url: get("GEOCODER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEOCODER_BASE_URL.into()),
            http_timeout,
            wake_retry_delay,
            wake_max_retries,
            snapshot_path: get("VEHICLE_DATA_FILE")
                .unwrap_or_else(|| DEFAULT_SNAPSHOT_PATH.into())
                .into(),
        })
    }

    pub fn wake_policy(&self) -> WakePolicy {
        WakePolicy {
            retry_delay: self.wake_retry_delay,
            max_retries: self.wake_max_retries,
            ..WakePolicy::default()
        }
    }
}

fn parse_date(key: &str, value: &str) -> Result<NaiveDate, CarStatusError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| CarStatusError::Config(format!("{key}: invalid date {value:?}: {e}")))
}

fn parse_number<T>(key: &str, value: &str) -> Result<T, CarStatusError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| CarStatusError::Config(format!("{key}: invalid number {value:?}: {e}")))
}
