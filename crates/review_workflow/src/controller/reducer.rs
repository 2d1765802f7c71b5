//! Pure state transitions for the review workflow.
//!
//! `reduce` never performs I/O. Requests to the run store or validation
//! service are returned as [`Effect`]s; their outcomes come back in as
//! completion events. Run and provider snapshots are never patched locally:
//! after a review decision the only way counts or statuses change is a fresh
//! run list.

use client_core::UploadFile;
use shared::{
    domain::{Provider, Run, RunId},
    protocol::ReviewDecision,
};
use tracing::{debug, warn};

use crate::controller::events::{UiError, UiErrorContext, WorkflowEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Dashboard,
    Results,
    Review,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorkflowState {
    pub view: View,
    /// Last run list fetched from the store, in store order.
    pub runs: Vec<Run>,
    /// May be stale after a review decision if the run vanished from the store.
    pub selected_run: Option<Run>,
    pub selected_provider: Option<Provider>,
    pub notice: Option<UiError>,
    pub pending_review: Option<ReviewDecision>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// `reconcile` names the run whose selected snapshot must be replaced by
    /// the refreshed copy once the list arrives.
    FetchRuns { reconcile: Option<RunId> },
    ValidateUpload(UploadFile),
    SubmitReview(ReviewDecision),
}

impl Effect {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FetchRuns { .. } => "fetch_runs",
            Self::ValidateUpload(_) => "validate_upload",
            Self::SubmitReview(_) => "submit_review",
        }
    }
}

pub fn reduce(mut state: WorkflowState, event: WorkflowEvent) -> (WorkflowState, Vec<Effect>) {
    let mut effects = Vec::new();

    match event {
        WorkflowEvent::RefreshRequested => {
            effects.push(Effect::FetchRuns { reconcile: None });
        }
        WorkflowEvent::UploadRequested(file) => {
            state.notice = None;
            effects.push(Effect::ValidateUpload(file));
        }
        WorkflowEvent::RunOpened(run) => {
            state.selected_run = Some(run);
            state.view = View::Results;
        }
        WorkflowEvent::ProviderOpened(provider) => {
            state.selected_provider = Some(provider);
            state.view = View::Review;
        }
        WorkflowEvent::ReviewDecided(action) => {
            let selection = state
                .selected_run
                .as_ref()
                .zip(state.selected_provider.as_ref())
                .map(|(run, provider)| (run.run_id.clone(), provider.provider_id.clone()));
            let Some((run_id, provider_id)) = selection else {
                warn!(
                    %action,
                    has_run = state.selected_run.is_some(),
                    has_provider = state.selected_provider.is_some(),
                    "review decision without a selected run and provider; ignoring"
                );
                return (state, effects);
            };

            if let Some(pending) = &state.pending_review {
                debug!(
                    run_id = %pending.run_id,
                    provider_id = %pending.provider_id,
                    "review decision already in flight; ignoring duplicate"
                );
                state.notice = Some(UiError::from_message(
                    UiErrorContext::Review,
                    format!(
                        "a decision for provider {} in run {} is still in flight",
                        pending.provider_id, pending.run_id
                    ),
                ));
                return (state, effects);
            }

            let decision = ReviewDecision::new(run_id, provider_id, action);
            state.pending_review = Some(decision.clone());
            state.notice = None;
            effects.push(Effect::SubmitReview(decision));
        }
        WorkflowEvent::BackToDashboard => {
            state.view = View::Dashboard;
        }
        WorkflowEvent::NoticeDismissed => {
            state.notice = None;
        }
        WorkflowEvent::RunsLoaded { runs, reconcile } => {
            state.runs = runs;
            if let Some(run_id) = reconcile {
                reconcile_selection(&mut state, &run_id);
                state.view = View::Results;
            }
        }
        WorkflowEvent::RunsLoadFailed { error, reconcile } => {
            state.notice = Some(error);
            if reconcile.is_some() {
                // The decision was acknowledged; fall back to the stale snapshot.
                state.view = View::Results;
            }
        }
        WorkflowEvent::ValidationCompleted(run) => {
            state.selected_run = Some(run);
            state.view = View::Results;
            effects.push(Effect::FetchRuns { reconcile: None });
        }
        WorkflowEvent::ValidationFailed(error) => {
            state.notice = Some(error);
        }
        WorkflowEvent::ReviewAcknowledged(decision) => {
            clear_pending(&mut state, &decision);
            effects.push(Effect::FetchRuns {
                reconcile: Some(decision.run_id),
            });
        }
        WorkflowEvent::ReviewFailed { decision, error } => {
            clear_pending(&mut state, &decision);
            state.notice = Some(error);
        }
        WorkflowEvent::ReviewInterrupted(decision) => {
            clear_pending(&mut state, &decision);
            state.notice = Some(UiError::from_message(
                UiErrorContext::Review,
                format!(
                    "{} for provider {} in run {} was interrupted; its outcome is unknown until the next refresh",
                    decision.action, decision.provider_id, decision.run_id
                ),
            ));
        }
    }

    (state, effects)
}

fn clear_pending(state: &mut WorkflowState, decision: &ReviewDecision) {
    if state
        .pending_review
        .as_ref()
        .is_some_and(|pending| pending.idempotency_key == decision.idempotency_key)
    {
        state.pending_review = None;
    }
}

fn reconcile_selection(state: &mut WorkflowState, run_id: &RunId) {
    let still_selected = state
        .selected_run
        .as_ref()
        .is_some_and(|selected| &selected.run_id == run_id);
    if !still_selected {
        return;
    }

    let Some(fresh) = state.runs.iter().find(|run| &run.run_id == run_id) else {
        debug!(%run_id, "run missing after refresh; keeping stale snapshot");
        return;
    };

    if let Some(provider) = &state.selected_provider {
        if let Some(fresh_provider) = fresh.provider(&provider.provider_id) {
            state.selected_provider = Some(fresh_provider.clone());
        }
    }
    state.selected_run = Some(fresh.clone());
}

#[cfg(test)]
#[path = "../tests/reducer_tests.rs"]
mod tests;
