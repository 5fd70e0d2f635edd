//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather fetcher and its raw payload shape
//! - Normalization into a canonical [`WeatherRecord`]
//! - Console rendering and the append-only weather log
//! - The sequential per-city pipeline that ties them together
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod diagnostics;
pub mod input;
pub mod logfile;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod provider;
pub mod report;

pub use config::Config;
pub use diagnostics::{DiagnosticEvent, DiagnosticSink, FailureKind, Severity, TracingSink};
pub use logfile::{LogError, WeatherLog};
pub use model::WeatherRecord;
pub use normalize::{NormalizeError, normalize};
pub use pipeline::{Pipeline, RunSummary};
pub use provider::{FetchError, OpenWeatherClient, RawResponse, WeatherFetcher};
