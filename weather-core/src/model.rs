use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Format used for observation timestamps everywhere a record is rendered.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Normalized weather observation for one city.
///
/// Only ever built by [`crate::normalize::normalize`] from a payload whose
/// status is the provider's success sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    /// Place name as returned by the provider, not as typed by the user.
    pub city: String,
    pub country: String,
    /// Condition text, lowercase as the provider sends it.
    pub description: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
    pub humidity_pct: f64,
    pub wind_speed_mps: f64,
    pub observed_at: DateTime<Utc>,
}

impl WeatherRecord {
    /// Observation time as `YYYY-MM-DD HH:MM:SS` in UTC.
    pub fn timestamp(&self) -> String {
        self.observed_at.format(TIMESTAMP_FORMAT).to_string()
    }
}
