//! The printed status report.

use carstatus_client::allowance::{AllowanceUsage, ProRataAllowance};
use carstatus_client::units::to_kilometers;
use carstatus_client::{GeocodingClient, TelemetrySnapshot};
use chrono::NaiveDate;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::fmt::Display;
use std::io::Write;

pub const MAPS_SEARCH_URL: &str = "https://www.google.ch/maps/search/";

/// Shown when reverse geocoding fails.
pub const UNKNOWN_LOCATION: &str = "unknown location";

const MISSING: &str = "n/a";

/// Everything except ASCII alphanumerics, `_.-~` and `/` is escaped.
const LOCATION_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/');

/// Everything the report prints, already converted to metric.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    pub car_name: Option<String>,
    pub battery_level: Option<serde_json::Number>,
    pub range_km: f64,
    pub inside_temp: Option<serde_json::Number>,
    pub outside_temp: Option<serde_json::Number>,
    pub car_version: Option<String>,
    pub location: String,
    pub odometer_km: f64,
    pub allowance: Option<AllowanceUsage>,
    pub locked: bool,
}

impl Report {
    /// Gather report values. Geocoding failures degrade to [`UNKNOWN_LOCATION`].
    pub async fn build<G>(
        snapshot: &TelemetrySnapshot,
        geocoder: &G,
        allowance: Option<&ProRataAllowance>,
        today: NaiveDate,
    ) -> Self
    where
        G: GeocodingClient + ?Sized,
    {
        let drive = &snapshot.drive_state;
        let location = match geocoder
            .reverse_geocode(drive.latitude, drive.longitude)
            .await
        {
            Ok(address) => address.to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "reverse geocoding failed");
                UNKNOWN_LOCATION.to_string()
            }
        };

        let odometer_km = to_kilometers(snapshot.vehicle_state.odometer.unwrap_or(0.0));
        Self {
            car_name: snapshot.display_name.clone(),
            battery_level: snapshot.charge_state.battery_level.clone(),
            range_km: to_kilometers(snapshot.charge_state.battery_range.unwrap_or(0.0)),
            inside_temp: snapshot.climate_state.inside_temp.clone(),
            outside_temp: snapshot.climate_state.outside_temp.clone(),
            car_version: snapshot.vehicle_state.car_version.clone(),
            location,
            odometer_km,
            allowance: allowance.and_then(|a| a.usage(odometer_km, today)),
            locked: snapshot.vehicle_state.locked.unwrap_or(false),
        }
    }

    pub fn map_link(&self) -> String {
        map_link(&self.location)
    }

    pub fn lines(&self) -> Vec<String> {
        let allowance_suffix = self
            .allowance
            .filter(|u| u.reached_percentage != 0.0)
            .map(|u| {
                format!(
                    " ({}% of max. {} km)",
                    decimal(u.reached_percentage),
                    decimal(u.allowed_kilometers)
                )
            })
            .unwrap_or_default();

        vec![
            format!("🚀 {} stats", or_missing(self.car_name.as_deref())),
            format!(
                "🔋 SoC: {}% ({} km range)",
                or_missing(self.battery_level.as_ref()),
                decimal(self.range_km)
            ),
            format!(
                "🌡  Temp: {}˚ ({}˚ outside)",
                or_missing(self.inside_temp.as_ref()),
                or_missing(self.outside_temp.as_ref())
            ),
            format!("💻 Version: {}", or_missing(self.car_version.as_deref())),
            format!("📌 Location: {}", self.location),
            format!("🗺  Google Maps: {}", self.map_link()),
            format!(
                "🛣  Odometer: {} km{allowance_suffix}",
                decimal(self.odometer_km)
            ),
            if self.locked {
                "🔒 Car locked".to_string()
            } else {
                "🚗 Car unlocked".to_string()
            },
        ]
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for line in self.lines() {
            writeln!(out, "{line}")?;
        }
        out.flush()
    }
}

/// Build the report and write it to `out`.
pub async fn print_stats<G, W>(
    out: &mut W,
    snapshot: &TelemetrySnapshot,
    geocoder: &G,
    allowance: Option<&ProRataAllowance>,
    today: NaiveDate,
) -> std::io::Result<()>
where
    G: GeocodingClient + ?Sized,
    W: Write,
{
    Report::build(snapshot, geocoder, allowance, today)
        .await
        .write_to(out)
}

/// Maps search URL with `location` percent-encoded; `/` is left as is.
pub fn map_link(location: &str) -> String {
    format!(
        "{MAPS_SEARCH_URL}{}",
        utf8_percent_encode(location, LOCATION_ENCODE_SET)
    )
}

/// Computed float values always carry a fractional part: `1609.0`, `321.8`.
fn decimal(value: f64) -> String {
    format!("{value:?}")
}

fn or_missing<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use carstatus_client::{Address, CarStatusError, GeocodeAddress};
    use serde_json::json;
    use std::sync::Mutex;

    struct FixedGeocoder {
        address: GeocodeAddress,
        calls: Mutex<Vec<(Option<f64>, Option<f64>)>>,
    }

    impl FixedGeocoder {
        fn zurich() -> Self {
            Self {
                address: GeocodeAddress {
                    house_number: Some("12".into()),
                    road: Some("Main St".into()),
                    postcode: Some("8000".into()),
                    city: Some("Zürich".into()),
                },
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GeocodingClient for FixedGeocoder {
        async fn reverse_geocode(
            &self,
            latitude: Option<f64>,
            longitude: Option<f64>,
        ) -> Result<Address, CarStatusError> {
            self.calls.lock().expect("lock").push((latitude, longitude));
            Ok(Address::from(&self.address))
        }
    }

    struct FailingGeocoder;

    #[async_trait]
    impl GeocodingClient for FailingGeocoder {
        async fn reverse_geocode(
            &self,
            _latitude: Option<f64>,
            _longitude: Option<f64>,
        ) -> Result<Address, CarStatusError> {
            Err(CarStatusError::Config("geocoder offline".into()))
        }
    }

    fn snapshot() -> TelemetrySnapshot {
        serde_json::from_value(json!({
            "display_name": "Red Rocket",
            "charge_state": {"battery_level": 81, "battery_range": 200.0},
            "climate_state": {"inside_temp": 21.5, "outside_temp": 12.0},
            "vehicle_state": {"car_version": "2024.8.7", "locked": true, "odometer": 10000.0},
            "drive_state": {"latitude": 47.3769, "longitude": 8.5417}
        }))
        .expect("snapshot")
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).expect("date")
    }

    #[tokio::test]
    async fn renders_all_lines() {
        let geocoder = FixedGeocoder::zurich();
        let mut out = Vec::new();
        print_stats(&mut out, &snapshot(), &geocoder, None, today())
            .await
            .expect("write");
        let text = String::from_utf8(out).expect("utf8");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "🚀 Red Rocket stats",
                "🔋 SoC: 81% (321.8 km range)",
                "🌡  Temp: 21.5˚ (12.0˚ outside)",
                "💻 Version: 2024.8.7",
                "📌 Location: Main St 12, 8000 Zürich",
                "🗺  Google Maps: https://www.google.ch/maps/search/Main%20St%2012%2C%208000%20Z%C3%BCrich",
                "🛣  Odometer: 16090.0 km",
                "🔒 Car locked",
            ]
        );
        assert_eq!(
            *geocoder.calls.lock().expect("lock"),
            vec![(Some(47.3769), Some(8.5417))]
        );
    }

    #[tokio::test]
    async fn missing_values_default_and_render_placeholders() {
        let geocoder = FixedGeocoder::zurich();
        let report = Report::build(&TelemetrySnapshot::default(), &geocoder, None, today()).await;
        assert_eq!(report.range_km, 0.0);
        assert_eq!(report.odometer_km, 0.0);
        let lines = report.lines();
        assert_eq!(lines[0], "🚀 n/a stats");
        assert_eq!(lines[1], "🔋 SoC: n/a% (0.0 km range)");
        assert_eq!(lines[7], "🚗 Car unlocked");
        assert_eq!(
            *geocoder.calls.lock().expect("lock"),
            vec![(None, None)]
        );
    }

    #[tokio::test]
    async fn allowance_suffix_when_configured() {
        let geocoder = FixedGeocoder::zurich();
        let mut snap = snapshot();
        // 7500 km expressed in miles
        snap.vehicle_state.odometer = Some(7500.0 / 1.609);
        let allowance = ProRataAllowance::new(today() - chrono::Duration::days(365), 15000.0);
        let report = Report::build(&snap, &geocoder, Some(&allowance), today()).await;

        let usage = report.allowance.expect("usage");
        assert!((usage.allowed_kilometers - 15000.0).abs() < 0.01);
        assert!((usage.reached_percentage - 50.0).abs() < 0.01);
        assert_eq!(
            report.lines()[6],
            "🛣  Odometer: 7500.0 km (50.0% of max. 15000.0 km)"
        );
    }

    #[tokio::test]
    async fn computed_values_keep_a_decimal_and_integers_stay_whole() {
        let geocoder = FixedGeocoder::zurich();
        let snap: TelemetrySnapshot = serde_json::from_value(json!({
            "charge_state": {"battery_level": 64, "battery_range": 100.0},
            "climate_state": {"inside_temp": 21.0, "outside_temp": 3},
            "vehicle_state": {"odometer": 1000}
        }))
        .expect("snapshot");
        let report = Report::build(&snap, &geocoder, None, today()).await;
        let lines = report.lines();
        assert_eq!(lines[1], "🔋 SoC: 64% (160.9 km range)");
        assert_eq!(lines[2], "🌡  Temp: 21.0˚ (3˚ outside)");
        assert_eq!(lines[6], "🛣  Odometer: 1609.0 km");
    }

    #[tokio::test]
    async fn no_suffix_when_percentage_is_zero() {
        let geocoder = FixedGeocoder::zurich();
        let mut snap = snapshot();
        snap.vehicle_state.odometer = None;
        let allowance = ProRataAllowance::new(today() - chrono::Duration::days(30), 15000.0);
        let report = Report::build(&snap, &geocoder, Some(&allowance), today()).await;

        let usage = report.allowance.expect("usage");
        assert_eq!(usage.reached_percentage, 0.0);
        assert_eq!(report.lines()[6], "🛣  Odometer: 0.0 km");
    }

    #[tokio::test]
    async fn no_suffix_on_first_day_of_ownership() {
        let geocoder = FixedGeocoder::zurich();
        let allowance = ProRataAllowance::new(today(), 15000.0);
        let report = Report::build(&snapshot(), &geocoder, Some(&allowance), today()).await;
        assert!(report.allowance.is_none());
        assert_eq!(report.lines()[6], "🛣  Odometer: 16090.0 km");
    }

    #[tokio::test]
    async fn geocoding_failure_degrades_to_placeholder() {
        let report = Report::build(&snapshot(), &FailingGeocoder, None, today()).await;
        assert_eq!(report.location, UNKNOWN_LOCATION);
        assert_eq!(
            report.map_link(),
            "https://www.google.ch/maps/search/unknown%20location"
        );
    }

    #[test]
    fn map_link_encodes_reserved_characters() {
        assert_eq!(
            map_link("Main St 12, 8000 Zürich"),
            "https://www.google.ch/maps/search/Main%20St%2012%2C%208000%20Z%C3%BCrich"
        );
        assert_eq!(
            map_link("a/b?c#d"),
            "https://www.google.ch/maps/search/a/b%3Fc%23d"
        );
        assert_eq!(
            map_link("x_y.z-1~2"),
            "https://www.google.ch/maps/search/x_y.z-1~2"
        );
        assert_eq!(map_link(", "), "https://www.google.ch/maps/search/%2C%20");
    }
}
