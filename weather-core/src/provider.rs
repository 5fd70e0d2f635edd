use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::fmt::Debug;

pub mod openweather;

pub use openweather::{FetchError, OpenWeatherClient};

/// Status value the provider puts in `cod` for a usable payload.
pub const SUCCESS_STATUS: i64 = 200;

/// Fetches the raw provider payload for one city.
///
/// Implementations report their own failures to a diagnostic sink and return
/// `None`; a failed fetch never aborts the caller's run.
#[async_trait]
pub trait WeatherFetcher: Send + Sync + Debug {
    async fn fetch(&self, city: &str) -> Option<RawResponse>;
}

/// Provider payload as received, before validation.
///
/// Any JSON document decodes. Field presence and field types are checked by
/// the normalizer, so a success body with a broken field is reported as a
/// malformed payload rather than a transport fault.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct RawResponse(Value);

impl RawResponse {
    /// True only for a numeric `cod` of 200; the provider sends error codes
    /// as strings ("404").
    pub fn is_success(&self) -> bool {
        self.0.get("cod").and_then(Value::as_i64) == Some(SUCCESS_STATUS)
    }

    /// Looks up a JSON pointer such as `/main/temp`. Explicit nulls count as absent.
    pub fn field(&self, pointer: &str) -> Option<&Value> {
        self.0.pointer(pointer).filter(|value| !value.is_null())
    }
}

impl From<Value> for RawResponse {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
