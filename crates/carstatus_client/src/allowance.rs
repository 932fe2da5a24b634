//! Pro-rata yearly mileage allowance, e.g. for lease contracts.

use crate::units::round2;
use chrono::NaiveDate;

const DAYS_PER_YEAR: f64 = 365.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProRataAllowance {
    pub since: NaiveDate,
    pub kilometers_per_year: f64,
}

/// Share of the pro-rata allowance consumed so far.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AllowanceUsage {
    pub allowed_kilometers: f64,
    pub reached_percentage: f64,
}

impl ProRataAllowance {
    pub fn new(since: NaiveDate, kilometers_per_year: f64) -> Self {
        Self {
            since,
            kilometers_per_year,
        }
    }

    /// Whole days between the ownership date and `today`.
    pub fn days_owned(&self, today: NaiveDate) -> i64 {
        (today - self.since).num_days()
    }

    /// Kilometers allowed up to `today`, rounded to two decimals.
    pub fn allowed_kilometers(&self, today: NaiveDate) -> f64 {
        round2(self.kilometers_per_year / DAYS_PER_YEAR * self.days_owned(today) as f64)
    }

    /// Returns `None` while no kilometers are allowed yet (ownership starts today
    /// or in the future), since no meaningful percentage exists then.
    pub fn usage(&self, odometer_km: f64, today: NaiveDate) -> Option<AllowanceUsage> {
        let allowed_kilometers = self.allowed_kilometers(today);
        if allowed_kilometers <= 0.0 {
            return None;
        }
        Some(AllowanceUsage {
            allowed_kilometers,
            reached_percentage: round2(100.0 / allowed_kilometers * odometer_km),
        })
    }
}
