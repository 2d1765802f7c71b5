use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{ProviderId, ReviewAction, RunId};

/// A single operator decision on a flagged provider.
///
/// The idempotency key is generated once per decision so a store that honours
/// it can recognise a resubmission of the same click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDecision {
    pub run_id: RunId,
    pub provider_id: ProviderId,
    pub action: ReviewAction,
    pub idempotency_key: Uuid,
}

impl ReviewDecision {
    pub fn new(run_id: RunId, provider_id: ProviderId, action: ReviewAction) -> Self {
        Self {
            run_id,
            provider_id,
            action,
            idempotency_key: Uuid::new_v4(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewQuery {
    pub action: ReviewAction,
    pub idempotency_key: Uuid,
}

impl From<&ReviewDecision> for ReviewQuery {
    fn from(decision: &ReviewDecision) -> Self {
        Self {
            action: decision.action,
            idempotency_key: decision.idempotency_key,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AckStatus {
    Success,
    Error,
}

/// Optional acknowledgement body returned by the review endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewAck {
    pub status: AckStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ReviewAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ReviewAck {
    pub fn is_rejection(&self) -> bool {
        self.status == AckStatus::Error
    }
}
