//! Error types for track loading

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unexpected payload: {0}")]
    UnexpectedPayload(String),

    #[error("invalid endpoint '{0}'")]
    InvalidEndpoint(String),

    #[error("invalid track id '{0}'")]
    InvalidId(String),
}

pub type TrackResult<T> = Result<T, TrackError>;
