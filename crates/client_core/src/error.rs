use shared::{domain::ModelError, error::ApiError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{endpoint} request failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned HTTP {status}{}", detail_suffix(.detail))]
    Status {
        endpoint: &'static str,
        status: u16,
        detail: Option<ApiError>,
    },
    #[error("{endpoint} returned a malformed body: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid run payload: {0}")]
    InvalidRun(#[from] ModelError),
    #[error("review rejected by run store: {0}")]
    ReviewRejected(String),
    #[error("failed to read upload {path}: {source}")]
    UploadRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid api base url {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

fn detail_suffix(detail: &Option<ApiError>) -> String {
    match detail {
        Some(detail) => format!(" ({detail})"),
        None => String::new(),
    }
}

impl ClientError {
    /// True for failures where the server may never have seen the request.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}
