//! Error type shared by the store, config, export and parsing layers.
//!
//! Statistics never produce errors: an unavailable average is `None`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CubikError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("no session with id '{0}'")]
    UnknownSession(String),

    #[error("no solve with id '{0}' in the current session")]
    UnknownSolve(String),

    #[error("invalid time '{0}': expected e.g. 12.34, 1:02.50, 12.34+ or DNF")]
    InvalidTime(String),

    #[error("unknown average '{0}': expected MO3 or AO<n>")]
    UnknownAverage(String),

    #[error("unknown event '{0}'")]
    UnknownEvent(String),

    #[error("session name cannot be empty")]
    InvalidName,
}

pub type Result<T> = std::result::Result<T, CubikError>;
