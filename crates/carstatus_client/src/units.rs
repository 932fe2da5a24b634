//! Imperial to metric conversion.

pub const MILES_TO_KILOMETERS: f64 = 1.609;

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Convert miles to kilometers, rounded to two decimals.
pub fn to_kilometers(miles: f64) -> f64 {
    round2(miles * MILES_TO_KILOMETERS)
}
