//! Vehicle status report: telemetry, location and mileage rendered as text lines.

pub mod logging;
pub mod report;

pub use report::{Report, print_stats};
