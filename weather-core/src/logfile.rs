use std::{
    fs::OpenOptions,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};

use thiserror::Error;

use crate::{
    model::WeatherRecord,
    report::{SEPARATOR, render_lines},
};

#[derive(Debug, Error)]
#[error("failed to append to weather log {}: {source}", .path.display())]
pub struct LogError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Append-only plain-text log of rendered records.
///
/// Each record becomes one block: the six rendered lines followed by a
/// separator line. A block is written with a single `write_all` while holding
/// the log's lock, so concurrent appends through the same `WeatherLog` never
/// interleave.
#[derive(Debug)]
pub struct WeatherLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl WeatherLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one block for `record`. Returns `Ok(false)` without touching
    /// the file when there is no record.
    pub fn append(&self, record: Option<&WeatherRecord>) -> Result<bool, LogError> {
        let Some(record) = record else {
            return Ok(false);
        };

        let block = render_block(record);

        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| self.error(source))?;
        file.write_all(block.as_bytes()).map_err(|source| self.error(source))?;

        Ok(true)
    }

    fn error(&self, source: io::Error) -> LogError {
        LogError { path: self.path.clone(), source }
    }
}

/// A full log block including the trailing separator line.
pub fn render_block(record: &WeatherRecord) -> String {
    let mut block = String::new();
    for line in render_lines(record) {
        block.push_str(&line);
        block.push('\n');
    }
    block.push_str(SEPARATOR);
    block.push('\n');
    block
}
