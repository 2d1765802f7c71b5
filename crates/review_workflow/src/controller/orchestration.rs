//! Effect orchestration: runs reducer effects against the run store and
//! validation service and feeds their outcomes back as events.

use std::{collections::VecDeque, sync::Arc};

use client_core::{
    ClientSettings, LatestRunPolicy, ReviewApiClient, RunStore, UploadFile, ValidationService,
};
use shared::domain::{Provider, ReviewAction, Run};
use tracing::{debug, warn};

use crate::{
    controller::{
        events::{UiError, UiErrorContext, WorkflowEvent},
        reducer::{reduce, Effect, WorkflowState},
    },
    views::{Intent, Screen},
};

/// Owns the workflow state. Operations run to completion one at a time; each
/// one reduces its event, then executes the resulting effects in order.
pub struct WorkflowController {
    store: Arc<dyn RunStore>,
    validator: Arc<dyn ValidationService>,
    latest_run_policy: LatestRunPolicy,
    state: WorkflowState,
}

impl WorkflowController {
    pub fn new(store: Arc<dyn RunStore>, validator: Arc<dyn ValidationService>) -> Self {
        Self {
            store,
            validator,
            latest_run_policy: LatestRunPolicy::default(),
            state: WorkflowState::default(),
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self, client_core::ClientError> {
        let client = Arc::new(ReviewApiClient::new(settings)?);
        Ok(Self::new(client.clone(), client).with_latest_run_policy(settings.latest_run_policy))
    }

    pub fn with_latest_run_policy(mut self, policy: LatestRunPolicy) -> Self {
        self.latest_run_policy = policy;
        self
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn screen(&self) -> Screen {
        Screen::render(&self.state, self.latest_run_policy)
    }

    /// Initial run list load.
    pub async fn start(&mut self) -> Result<(), UiError> {
        self.refresh_runs().await
    }

    pub async fn refresh_runs(&mut self) -> Result<(), UiError> {
        self.dispatch(WorkflowEvent::RefreshRequested).await
    }

    /// Also returns a failure of the follow-up refresh, with context
    /// [`UiErrorContext::Refresh`]; the returned run stays selected either way.
    pub async fn upload_and_validate(&mut self, file: UploadFile) -> Result<(), UiError> {
        self.dispatch(WorkflowEvent::UploadRequested(file)).await
    }

    pub fn select_run(&mut self, run: Run) {
        self.apply_local(WorkflowEvent::RunOpened(run));
    }

    pub fn select_provider(&mut self, provider: Provider) {
        self.apply_local(WorkflowEvent::ProviderOpened(provider));
    }

    /// Without a selected run and provider this logs and does nothing.
    pub async fn submit_review(&mut self, action: ReviewAction) -> Result<(), UiError> {
        self.dispatch(WorkflowEvent::ReviewDecided(action)).await
    }

    pub fn back_to_dashboard(&mut self) {
        self.apply_local(WorkflowEvent::BackToDashboard);
    }

    pub fn dismiss_notice(&mut self) {
        self.apply_local(WorkflowEvent::NoticeDismissed);
    }

    pub async fn handle_intent(&mut self, intent: Intent) -> Result<(), UiError> {
        match intent {
            Intent::Upload(file) => self.upload_and_validate(file).await,
            Intent::OpenRun(run_id) => {
                let listed = self
                    .state
                    .runs
                    .iter()
                    .find(|run| run.run_id == run_id)
                    .cloned();
                match listed {
                    Some(run) => self.select_run(run),
                    None => warn!(%run_id, "run no longer listed; staying on the current view"),
                }
                Ok(())
            }
            Intent::OpenProvider(provider) => {
                self.select_provider(provider);
                Ok(())
            }
            Intent::Decide(action) => self.submit_review(action).await,
            Intent::BackToDashboard => {
                self.back_to_dashboard();
                Ok(())
            }
        }
    }

    /// Reduces `event` and every completion it leads to. Returns the first
    /// failure seen along the way.
    ///
    /// A review still pending on entry belongs to an earlier dispatch whose
    /// future was dropped; it is settled as interrupted before `event` runs.
    pub async fn dispatch(&mut self, event: WorkflowEvent) -> Result<(), UiError> {
        if let Some(interrupted) = self.state.pending_review.clone() {
            warn!(
                run_id = %interrupted.run_id,
                provider_id = %interrupted.provider_id,
                idempotency_key = %interrupted.idempotency_key,
                "previous review decision was interrupted before completing"
            );
            self.apply_local(WorkflowEvent::ReviewInterrupted(interrupted));
        }

        let mut queue = VecDeque::from([event]);
        let mut first_failure = None;

        while let Some(event) = queue.pop_front() {
            if first_failure.is_none() {
                first_failure = event.failure().cloned();
            }
            for effect in self.transition(event) {
                let completion = self.execute(effect).await;
                queue.push_back(completion);
            }
        }

        match first_failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn transition(&mut self, event: WorkflowEvent) -> Vec<Effect> {
        let state = std::mem::take(&mut self.state);
        let (next, effects) = reduce(state, event);
        self.state = next;
        effects
    }

    fn apply_local(&mut self, event: WorkflowEvent) {
        let effects = self.transition(event);
        debug_assert!(effects.is_empty(), "local events never produce effects");
    }

    async fn execute(&self, effect: Effect) -> WorkflowEvent {
        debug!(effect = effect.name(), "executing workflow effect");
        match effect {
            Effect::FetchRuns { reconcile } => match self.store.list_runs().await {
                Ok(runs) => WorkflowEvent::RunsLoaded { runs, reconcile },
                Err(err) => {
                    warn!(error = %format!("{err:#}"), "failed to refresh validation runs");
                    WorkflowEvent::RunsLoadFailed {
                        error: UiError::from_error(UiErrorContext::Refresh, &err),
                        reconcile,
                    }
                }
            },
            Effect::ValidateUpload(file) => match self.validator.validate_upload(file).await {
                Ok(run) => WorkflowEvent::ValidationCompleted(run),
                Err(err) => {
                    warn!(error = %format!("{err:#}"), "validation upload failed");
                    WorkflowEvent::ValidationFailed(UiError::from_error(
                        UiErrorContext::Upload,
                        &err,
                    ))
                }
            },
            Effect::SubmitReview(decision) => match self.store.submit_review(&decision).await {
                Ok(()) => WorkflowEvent::ReviewAcknowledged(decision),
                Err(err) => {
                    warn!(
                        run_id = %decision.run_id,
                        provider_id = %decision.provider_id,
                        error = %format!("{err:#}"),
                        "review decision failed"
                    );
                    WorkflowEvent::ReviewFailed {
                        decision,
                        error: UiError::from_error(UiErrorContext::Review, &err),
                    }
                }
            },
        }
    }
}

#[cfg(test)]
#[path = "../tests/orchestration_tests.rs"]
mod tests;
