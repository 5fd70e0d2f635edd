use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::{model::WeatherRecord, provider::RawResponse};

/// The payload claimed success but cannot be turned into a record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("provider reported success but `{0}` is missing from the payload")]
    MissingField(&'static str),

    #[error("provider reported success but `{field}` is not a {expected}")]
    InvalidField { field: &'static str, expected: &'static str },

    #[error("provider timestamp {0} is outside the representable range")]
    InvalidTimestamp(i64),
}

/// Validates a raw payload and extracts the record fields.
///
/// `Ok(None)` covers both an absent fetch and a non-success status. A success
/// status with a missing or wrongly typed field is an error, never a
/// partially filled record.
pub fn normalize(raw: Option<RawResponse>) -> Result<Option<WeatherRecord>, NormalizeError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    if !raw.is_success() {
        return Ok(None);
    }

    let dt = integer(&raw, "/dt", "dt")?;

    Ok(Some(WeatherRecord {
        city: text(&raw, "/name", "name")?,
        country: text(&raw, "/sys/country", "sys.country")?,
        description: text(&raw, "/weather/0/description", "weather[0].description")?,
        temperature_c: number(&raw, "/main/temp", "main.temp")?,
        feels_like_c: number(&raw, "/main/feels_like", "main.feels_like")?,
        temp_min_c: number(&raw, "/main/temp_min", "main.temp_min")?,
        temp_max_c: number(&raw, "/main/temp_max", "main.temp_max")?,
        humidity_pct: number(&raw, "/main/humidity", "main.humidity")?,
        wind_speed_mps: number(&raw, "/wind/speed", "wind.speed")?,
        observed_at: unix_to_utc(dt)?,
    }))
}

fn required<'a>(
    raw: &'a RawResponse,
    pointer: &str,
    field: &'static str,
) -> Result<&'a Value, NormalizeError> {
    raw.field(pointer).ok_or(NormalizeError::MissingField(field))
}

fn text(raw: &RawResponse, pointer: &str, field: &'static str) -> Result<String, NormalizeError> {
    required(raw, pointer, field)?
        .as_str()
        .map(str::to_owned)
        .ok_or(NormalizeError::InvalidField { field, expected: "string" })
}

fn number(raw: &RawResponse, pointer: &str, field: &'static str) -> Result<f64, NormalizeError> {
    required(raw, pointer, field)?
        .as_f64()
        .ok_or(NormalizeError::InvalidField { field, expected: "number" })
}

fn integer(raw: &RawResponse, pointer: &str, field: &'static str) -> Result<i64, NormalizeError> {
    required(raw, pointer, field)?
        .as_i64()
        .ok_or(NormalizeError::InvalidField { field, expected: "integer" })
}

fn unix_to_utc(ts: i64) -> Result<DateTime<Utc>, NormalizeError> {
    DateTime::<Utc>::from_timestamp(ts, 0).ok_or(NormalizeError::InvalidTimestamp(ts))
}
