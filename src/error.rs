use std::path::PathBuf;

use thiserror::Error;

/// Validation failures for work-hour settings.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("work slot ends before it starts ({start} > {end})")]
    SlotEndsBeforeStart { start: String, end: String },

    #[error("work slot time {0} is not on a 15-minute boundary")]
    SlotGranularity(String),

    #[error("{weekday} has {count} work slots (max {max})")]
    TooManySlots {
        weekday: String,
        count: usize,
        max: usize,
    },

    #[error("work slot duration {found}h does not match {start}-{end}")]
    SlotDurationMismatch {
        start: String,
        end: String,
        found: f64,
    },
}

/// Errors raised by a [`WorkspaceStore`](crate::io::WorkspaceStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed workspace file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid settings: {0}")]
    Invalid(#[from] ModelError),
}

/// Errors raised while importing or exporting CSV files.
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("CSV is missing required columns. Found headers: {0:?}. Need columns for: name, date.")]
    MissingColumns(Vec<String>),

    #[error("no valid holidays found in CSV ({0} rows skipped)")]
    NoValidRows(usize),

    #[error("CSV file is empty or has no data rows")]
    Empty,
}

/// Errors raised while loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
