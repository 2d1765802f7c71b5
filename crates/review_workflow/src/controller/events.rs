//! Workflow events and user-facing error modeling.

use client_core::{ClientError, UploadFile};
use shared::{
    domain::{Provider, ReviewAction, Run, RunId},
    protocol::ReviewDecision,
};

/// Everything the reducer reacts to: operator intents and I/O completions.
#[derive(Debug, Clone)]
pub enum WorkflowEvent {
    RefreshRequested,
    UploadRequested(UploadFile),
    RunOpened(Run),
    ProviderOpened(Provider),
    ReviewDecided(ReviewAction),
    BackToDashboard,
    NoticeDismissed,
    RunsLoaded {
        runs: Vec<Run>,
        reconcile: Option<RunId>,
    },
    RunsLoadFailed {
        error: UiError,
        reconcile: Option<RunId>,
    },
    ValidationCompleted(Run),
    ValidationFailed(UiError),
    ReviewAcknowledged(ReviewDecision),
    ReviewFailed {
        decision: ReviewDecision,
        error: UiError,
    },
    /// The operation that submitted this decision was dropped before its
    /// outcome came back.
    ReviewInterrupted(ReviewDecision),
}

impl WorkflowEvent {
    pub fn failure(&self) -> Option<&UiError> {
        match self {
            Self::RunsLoadFailed { error, .. }
            | Self::ValidationFailed(error)
            | Self::ReviewFailed { error, .. } => Some(error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Validation,
    Rejected,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    Refresh,
    Upload,
    Review,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_error(context: UiErrorContext, err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");
        let category = match err.downcast_ref::<ClientError>() {
            Some(client_err) => categorize_client_error(client_err),
            None => categorize_message(&message),
        };
        Self {
            category,
            context,
            message,
        }
    }

    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            category: categorize_message(&message),
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// One-line notice for the operator.
    pub fn notice(&self) -> String {
        let action = match self.context {
            UiErrorContext::Refresh => "Could not refresh validation runs",
            UiErrorContext::Upload => "Upload failed",
            UiErrorContext::Review => "Review decision was not applied",
        };
        let hint = match self.category {
            UiErrorCategory::Transport => "service unreachable; retry when it is back",
            UiErrorCategory::Validation => "the service rejected or returned invalid data",
            UiErrorCategory::Rejected => "the run store refused the decision",
            UiErrorCategory::Unknown => "unexpected error",
        };
        format!("{action}: {hint} ({})", self.message)
    }
}

fn categorize_client_error(err: &ClientError) -> UiErrorCategory {
    match err {
        ClientError::Transport { .. } => UiErrorCategory::Transport,
        ClientError::Status { status, .. } if *status >= 500 => UiErrorCategory::Transport,
        ClientError::Status { .. } => UiErrorCategory::Validation,
        ClientError::Decode { .. }
        | ClientError::InvalidRun(_)
        | ClientError::UploadRead { .. }
        | ClientError::InvalidBaseUrl { .. } => UiErrorCategory::Validation,
        ClientError::ReviewRejected(_) => UiErrorCategory::Rejected,
    }
}

fn categorize_message(message: &str) -> UiErrorCategory {
    let lower = message.to_ascii_lowercase();
    if lower.contains("timed out")
        || lower.contains("timeout")
        || lower.contains("connection")
        || lower.contains("unavailable")
        || lower.contains("network")
    {
        UiErrorCategory::Transport
    } else if lower.contains("rejected") || lower.contains("not found") {
        UiErrorCategory::Rejected
    } else if lower.contains("invalid") || lower.contains("malformed") || lower.contains("missing")
    {
        UiErrorCategory::Validation
    } else {
        UiErrorCategory::Unknown
    }
}
