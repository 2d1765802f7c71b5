//! Adapters for the external run store and validation service.
//!
//! The workflow controller only sees the [`RunStore`] and [`ValidationService`]
//! traits; [`ReviewApiClient`] implements both over the HTTP API.

use std::{fmt, path::Path, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::Run,
    error::ApiError,
    protocol::{ReviewAck, ReviewDecision, ReviewQuery},
};
use tracing::{debug, info, warn};
use url::Url;

pub mod config;
pub mod error;

pub use config::{load_settings, ClientSettings, LatestRunPolicy};
pub use error::ClientError;

const LIST_RUNS: &str = "list_runs";
const VALIDATE_UPLOAD: &str = "validate_upload";
const SUBMIT_REVIEW: &str = "submit_review";
const UPLOAD_FIELD: &str = "file";

#[async_trait]
pub trait RunStore: Send + Sync {
    /// Full, authoritative list of runs in store order.
    async fn list_runs(&self) -> Result<Vec<Run>>;
    async fn submit_review(&self, decision: &ReviewDecision) -> Result<()>;
}

#[async_trait]
pub trait ValidationService: Send + Sync {
    /// Validates an uploaded batch and returns the completed run.
    async fn validate_upload(&self, file: UploadFile) -> Result<Run>;
}

#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub filename: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadFile")
            .field("filename", &self.filename)
            .field("mime_type", &self.mime_type)
            .field("size_bytes", &self.bytes.len())
            .finish()
    }
}

impl UploadFile {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let filename = filename.into();
        let mime_type = mime_guess::from_path(&filename)
            .first()
            .map(|mime| mime.essence_str().to_string());
        Self {
            filename,
            mime_type,
            bytes: bytes.into(),
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ClientError::UploadRead {
                path: path.display().to_string(),
                source,
            })?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(filename, bytes))
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}

pub struct ReviewApiClient {
    http: Client,
    base: Url,
    request_timeout: Duration,
    validate_timeout: Duration,
}

impl ReviewApiClient {
    pub fn new(settings: &ClientSettings) -> Result<Self, ClientError> {
        Self::with_http(Client::new(), settings)
    }

    pub fn with_http(http: Client, settings: &ClientSettings) -> Result<Self, ClientError> {
        let normalized = config::normalize_api_base(&settings.api_base)?;
        let base = Url::parse(&normalized).map_err(|err| ClientError::InvalidBaseUrl {
            url: normalized.clone(),
            reason: err.to_string(),
        })?;
        Ok(Self {
            http,
            base,
            request_timeout: settings.request_timeout,
            validate_timeout: settings.validate_timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub async fn fetch_runs(&self) -> Result<Vec<Run>, ClientError> {
        let response = self
            .http
            .get(self.endpoint(&["runs"]))
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                endpoint: LIST_RUNS,
                source,
            })?;
        let runs: Vec<Run> = read_json(LIST_RUNS, response).await?;
        for run in &runs {
            accept_run(LIST_RUNS, run)?;
        }
        debug!(count = runs.len(), "fetched validation runs");
        Ok(runs)
    }

    pub async fn post_upload(&self, file: UploadFile) -> Result<Run, ClientError> {
        let filename = file.filename.clone();
        let size_bytes = file.size_bytes();
        let mut part = multipart::Part::bytes(file.bytes).file_name(file.filename);
        if let Some(mime) = file.mime_type.as_deref() {
            part = part
                .mime_str(mime)
                .map_err(|source| ClientError::Transport {
                    endpoint: VALIDATE_UPLOAD,
                    source,
                })?;
        }
        let form = multipart::Form::new().part(UPLOAD_FIELD, part);

        info!(filename = %filename, size_bytes, "submitting upload for validation");
        let response = self
            .http
            .post(self.endpoint(&["validate"]))
            .timeout(self.validate_timeout)
            .multipart(form)
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                endpoint: VALIDATE_UPLOAD,
                source,
            })?;
        let run: Run = read_json(VALIDATE_UPLOAD, response).await?;
        accept_run(VALIDATE_UPLOAD, &run)?;
        info!(
            run_id = %run.run_id,
            total = run.total_providers,
            flagged = run.flagged,
            "validation run completed"
        );
        Ok(run)
    }

    pub async fn post_review(&self, decision: &ReviewDecision) -> Result<(), ClientError> {
        let url = self.endpoint(&[
            "review",
            decision.run_id.as_str(),
            decision.provider_id.as_str(),
        ]);
        let response = self
            .http
            .post(url)
            .timeout(self.request_timeout)
            .query(&ReviewQuery::from(decision))
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                endpoint: SUBMIT_REVIEW,
                source,
            })?;
        let response = check_status(SUBMIT_REVIEW, response).await?;
        let body = response
            .bytes()
            .await
            .map_err(|source| ClientError::Transport {
                endpoint: SUBMIT_REVIEW,
                source,
            })?;

        // The acknowledgement body is optional; only an explicit error status counts.
        if let Ok(ack) = serde_json::from_slice::<ReviewAck>(&body) {
            if ack.is_rejection() {
                let message = ack
                    .message
                    .unwrap_or_else(|| "no reason given".to_string());
                warn!(
                    run_id = %decision.run_id,
                    provider_id = %decision.provider_id,
                    reason = %message,
                    "review decision rejected"
                );
                return Err(ClientError::ReviewRejected(message));
            }
        }

        info!(
            run_id = %decision.run_id,
            provider_id = %decision.provider_id,
            action = %decision.action,
            "review decision acknowledged"
        );
        Ok(())
    }
}

#[async_trait]
impl RunStore for ReviewApiClient {
    async fn list_runs(&self) -> Result<Vec<Run>> {
        Ok(self.fetch_runs().await?)
    }

    async fn submit_review(&self, decision: &ReviewDecision) -> Result<()> {
        Ok(self.post_review(decision).await?)
    }
}

#[async_trait]
impl ValidationService for ReviewApiClient {
    async fn validate_upload(&self, file: UploadFile) -> Result<Run> {
        Ok(self.post_upload(file).await?)
    }
}

/// Only inconsistent counts make a run unusable; per-provider anomalies are
/// logged and the run is kept.
fn accept_run(endpoint: &'static str, run: &Run) -> Result<(), ClientError> {
    run.validate()?;
    for anomaly in run.anomalies() {
        warn!(endpoint, run_id = %run.run_id, %anomaly, "accepting run with anomaly");
    }
    Ok(())
}

async fn check_status(endpoint: &'static str, response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = response.json::<ApiError>().await.ok();
    Err(ClientError::Status {
        endpoint,
        status: status.as_u16(),
        detail,
    })
}

async fn read_json<T: DeserializeOwned>(
    endpoint: &'static str,
    response: Response,
) -> Result<T, ClientError> {
    let response = check_status(endpoint, response).await?;
    let body = response
        .bytes()
        .await
        .map_err(|source| ClientError::Transport { endpoint, source })?;
    serde_json::from_slice(&body).map_err(|source| ClientError::Decode { endpoint, source })
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
