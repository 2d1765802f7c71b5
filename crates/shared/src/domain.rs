use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(RunId);
id_newtype!(ProviderId);

pub const MAX_CONFIDENCE_SCORE: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderStatus {
    Valid,
    Flagged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    Approve,
    Reject,
}

impl ReviewAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }
}

impl std::fmt::Display for ReviewAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One record inside a validation run.
///
/// Contact fields are optional because the validation service passes through
/// whatever the uploaded file contained. Fields the service sends that are not
/// modelled here are kept in `extra` so suggestions for them can still be
/// paired with a current value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub provider_id: ProviderId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    pub status: ProviderStatus,
    pub confidence_score: u8,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub suggested_values: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Provider {
    pub fn is_reviewable(&self) -> bool {
        self.status == ProviderStatus::Flagged
    }

    /// Current value of a named field. Empty strings count as missing.
    pub fn field_value(&self, field: &str) -> Option<&str> {
        let value = match field {
            "provider_id" => Some(self.provider_id.as_str()),
            "name" => self.name.as_deref(),
            "specialty" => self.specialty.as_deref(),
            "phone" => self.phone.as_deref(),
            "license_number" => self.license_number.as_deref(),
            "address" => self.address.as_deref(),
            "email" => self.email.as_deref(),
            "last_updated" => self.last_updated.as_deref(),
            other => self.extra.get(other).and_then(serde_json::Value::as_str),
        };
        value.filter(|v| !v.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub run_id: RunId,
    pub timestamp: String,
    pub total_providers: u32,
    pub validated: u32,
    pub flagged: u32,
    #[serde(default)]
    pub results: Vec<Provider>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error(
        "run {run_id}: validated ({validated}) + flagged ({flagged}) != total_providers ({total})"
    )]
    CountMismatch {
        run_id: RunId,
        validated: u32,
        flagged: u32,
        total: u32,
    },
    #[error("run {run_id}: duplicate provider id {provider_id}")]
    DuplicateProvider {
        run_id: RunId,
        provider_id: ProviderId,
    },
    #[error("run {run_id}: provider {provider_id} has confidence score {score} above 100")]
    ConfidenceOutOfRange {
        run_id: RunId,
        provider_id: ProviderId,
        score: u8,
    },
}

impl Run {
    pub fn counts_consistent(&self) -> bool {
        u64::from(self.validated) + u64::from(self.flagged) == u64::from(self.total_providers)
    }

    /// Rejects runs whose summary counts disagree. Per-provider problems are
    /// reported by [`Run::anomalies`] and never make a run unusable.
    pub fn validate(&self) -> Result<(), ModelError> {
        if !self.counts_consistent() {
            return Err(ModelError::CountMismatch {
                run_id: self.run_id.clone(),
                validated: self.validated,
                flagged: self.flagged,
                total: self.total_providers,
            });
        }
        Ok(())
    }

    /// Repeated provider ids and out-of-range scores, in result order.
    pub fn anomalies(&self) -> Vec<ModelError> {
        let mut seen = HashSet::with_capacity(self.results.len());
        let mut found = Vec::new();
        for provider in &self.results {
            if !seen.insert(&provider.provider_id) {
                found.push(ModelError::DuplicateProvider {
                    run_id: self.run_id.clone(),
                    provider_id: provider.provider_id.clone(),
                });
            }
            if provider.confidence_score > MAX_CONFIDENCE_SCORE {
                found.push(ModelError::ConfidenceOutOfRange {
                    run_id: self.run_id.clone(),
                    provider_id: provider.provider_id.clone(),
                    score: provider.confidence_score,
                });
            }
        }
        found
    }

    pub fn provider(&self, provider_id: &ProviderId) -> Option<&Provider> {
        self.results
            .iter()
            .find(|provider| &provider.provider_id == provider_id)
    }

    /// Parses `timestamp` as RFC 3339, falling back to a naive ISO-8601 value
    /// read as UTC.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.timestamp.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
