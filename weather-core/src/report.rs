//! Text layout shared by the console presenter and the log file.

use std::io::{self, Write};

use crate::model::WeatherRecord;

pub const UNAVAILABLE_NOTICE: &str = "Could not display weather information.";

/// Line closing every log block.
pub const SEPARATOR: &str = "----------------------------------------";

/// The six content lines describing a record, without trailing newlines.
pub fn render_lines(record: &WeatherRecord) -> [String; 6] {
    [
        format!(
            "Weather in {}, {} at {} UTC:",
            record.city,
            record.country,
            record.timestamp()
        ),
        format!("Condition   : {}", capitalize_first(&record.description)),
        format!(
            "Temperature : {}°C (Feels like: {}°C)",
            record.temperature_c, record.feels_like_c
        ),
        format!("Min/Max Temp: {}°C / {}°C", record.temp_min_c, record.temp_max_c),
        format!("Humidity    : {}%", record.humidity_pct),
        format!("Wind Speed  : {} m/s", record.wind_speed_mps),
    ]
}

/// Writes the console rendering of a record, or the unavailable notice.
pub fn present<W: Write>(record: Option<&WeatherRecord>, out: &mut W) -> io::Result<()> {
    let Some(record) = record else {
        return writeln!(out, "{UNAVAILABLE_NOTICE}");
    };

    writeln!(out)?;
    for line in render_lines(record) {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

/// Uppercases the first character and leaves the rest as-is.
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
