use std::{collections::HashMap, fs, path::Path, time::Duration};

use url::Url;

use crate::error::ClientError;

pub const SETTINGS_FILE: &str = "review_client.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LatestRunPolicy {
    /// The last run in the order the run store listed them.
    #[default]
    LastInList,
    /// The run with the newest parseable timestamp; list position breaks ties.
    NewestTimestamp,
}

impl LatestRunPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "last_in_list" | "last" => Some(Self::LastInList),
            "newest_timestamp" | "newest" => Some(Self::NewestTimestamp),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub api_base: String,
    pub request_timeout: Duration,
    pub validate_timeout: Duration,
    pub latest_run_policy: LatestRunPolicy,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8000/api".into(),
            request_timeout: Duration::from_secs(30),
            validate_timeout: Duration::from_secs(300),
            latest_run_policy: LatestRunPolicy::LastInList,
        }
    }
}

/// Defaults, then `review_client.toml` in the working directory, then the
/// environment.
pub fn load_settings() -> ClientSettings {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> ClientSettings {
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<HashMap<String, toml::Value>>(&raw) {
            Ok(file_cfg) => apply_file_settings(&mut settings, &file_cfg),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignoring unreadable settings file")
            }
        }
    }

    if let Some(v) = env("REVIEW_API_BASE") {
        settings.api_base = v;
    }
    if let Some(v) = env("APP__API_BASE") {
        settings.api_base = v;
    }
    if let Some(secs) = env("APP__REQUEST_TIMEOUT_SECS").and_then(|v| v.parse::<u64>().ok()) {
        settings.request_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = env("APP__VALIDATE_TIMEOUT_SECS").and_then(|v| v.parse::<u64>().ok()) {
        settings.validate_timeout = Duration::from_secs(secs);
    }
    if let Some(policy) = env("APP__LATEST_RUN_POLICY").and_then(|v| LatestRunPolicy::parse(&v)) {
        settings.latest_run_policy = policy;
    }

    settings
}

fn apply_file_settings(settings: &mut ClientSettings, file_cfg: &HashMap<String, toml::Value>) {
    if let Some(v) = file_cfg.get("api_base").and_then(toml::Value::as_str) {
        settings.api_base = v.to_string();
    }
    if let Some(secs) = file_cfg
        .get("request_timeout_secs")
        .and_then(toml::Value::as_integer)
        .and_then(|v| u64::try_from(v).ok())
    {
        settings.request_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = file_cfg
        .get("validate_timeout_secs")
        .and_then(toml::Value::as_integer)
        .and_then(|v| u64::try_from(v).ok())
    {
        settings.validate_timeout = Duration::from_secs(secs);
    }
    if let Some(policy) = file_cfg
        .get("latest_run_policy")
        .and_then(toml::Value::as_str)
        .and_then(LatestRunPolicy::parse)
    {
        settings.latest_run_policy = policy;
    }
}

/// Trims whitespace and trailing slashes and checks the result is an http(s) URL.
pub fn normalize_api_base(raw: &str) -> Result<String, ClientError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Ok(ClientSettings::default().api_base);
    }

    let parsed = Url::parse(trimmed).map_err(|err| ClientError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: err.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.to_string()),
        other => Err(ClientError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme {other}"),
        }),
    }
}
