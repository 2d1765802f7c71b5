//! Render models for the three screens and the intents they emit.
//!
//! Every model is built from a snapshot and never touches controller state;
//! intents go back through [`crate::WorkflowController::handle_intent`].

use std::fmt;

use client_core::{LatestRunPolicy, UploadFile};
use shared::domain::{Provider, ReviewAction, Run, RunId};

use crate::controller::reducer::{View, WorkflowState};

pub mod dashboard;
pub mod results;
pub mod review;

pub use dashboard::{DashboardModel, DashboardSummary, RunRow};
pub use results::{ConfidenceBand, ProviderRow, ResultsModel};
pub use review::{CorrectionRow, ReviewModel, MISSING_VALUE_LABEL};

pub const NOT_AVAILABLE_LABEL: &str = "N/A";

#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Upload(UploadFile),
    /// Resolved against the controller's current run list.
    OpenRun(RunId),
    OpenProvider(Provider),
    Decide(ReviewAction),
    BackToDashboard,
}

/// `round(validated / total * 100)`, or a placeholder for an empty run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessRate {
    Percent(u32),
    NotAvailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateTier {
    High,
    Medium,
    Low,
}

impl SuccessRate {
    pub fn of(validated: u32, total: u32) -> Self {
        if total == 0 {
            return Self::NotAvailable;
        }
        let validated = u64::from(validated);
        let total = u64::from(total);
        // Integer round-half-up of validated * 100 / total.
        let percent = (validated * 200 + total) / (2 * total);
        Self::Percent(u32::try_from(percent).unwrap_or(u32::MAX))
    }

    pub fn for_run(run: &Run) -> Self {
        Self::of(run.validated, run.total_providers)
    }

    pub fn tier(self) -> Option<RateTier> {
        match self {
            Self::Percent(p) if p >= 80 => Some(RateTier::High),
            Self::Percent(p) if p >= 60 => Some(RateTier::Medium),
            Self::Percent(_) => Some(RateTier::Low),
            Self::NotAvailable => None,
        }
    }
}

impl fmt::Display for SuccessRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percent(p) => write!(f, "{p}%"),
            Self::NotAvailable => f.write_str(NOT_AVAILABLE_LABEL),
        }
    }
}

/// Formats a run timestamp for display, keeping the raw value when it does not parse.
pub(crate) fn display_timestamp(run: &Run) -> String {
    run.created_at()
        .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| run.timestamp.clone())
}

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Dashboard(DashboardModel),
    Results(ResultsModel),
    Review(ReviewModel),
}

impl Screen {
    /// Review needs a selected provider and results a selected run; anything
    /// else falls back to the dashboard.
    pub fn render(state: &WorkflowState, policy: LatestRunPolicy) -> Self {
        match (state.view, &state.selected_run, &state.selected_provider) {
            (View::Review, _, Some(provider)) => Self::Review(ReviewModel::build(provider)),
            (View::Results, Some(run), _) => Self::Results(ResultsModel::build(run)),
            _ => Self::Dashboard(DashboardModel::build(&state.runs, policy)),
        }
    }

    pub fn view(&self) -> View {
        match self {
            Self::Dashboard(_) => View::Dashboard,
            Self::Results(_) => View::Results,
            Self::Review(_) => View::Review,
        }
    }
}

#[cfg(test)]
#[path = "../tests/views_tests.rs"]
mod tests;
