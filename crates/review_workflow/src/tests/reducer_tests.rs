use super::*;
use crate::{
    controller::events::{UiErrorCategory, UiErrorContext},
    fixtures::{flagged_p3, run, scenario_run, scenario_run_after_approval},
};
use shared::domain::ReviewAction;

fn reviewing_p3() -> WorkflowState {
    let selected = scenario_run();
    WorkflowState {
        view: View::Review,
        runs: vec![selected.clone()],
        selected_provider: Some(flagged_p3(&selected)),
        selected_run: Some(selected),
        notice: None,
        pending_review: None,
    }
}

fn submitted_decision(state: WorkflowState) -> (WorkflowState, ReviewDecision) {
    let (state, effects) = reduce(state, WorkflowEvent::ReviewDecided(ReviewAction::Approve));
    match effects.as_slice() {
        [Effect::SubmitReview(decision)] => {
            let decision = decision.clone();
            (state, decision)
        }
        other => panic!("unexpected effects: {other:?}"),
    }
}

#[test]
fn review_decision_targets_selected_run_and_provider() {
    let (state, decision) = submitted_decision(reviewing_p3());

    assert_eq!(decision.run_id.as_str(), "R1");
    assert_eq!(decision.provider_id.as_str(), "P3");
    assert_eq!(decision.action, ReviewAction::Approve);
    assert_eq!(state.pending_review.as_ref(), Some(&decision));
    assert_eq!(state.view, View::Review);
}

#[test]
fn review_without_selection_is_a_no_op() {
    let mut state = reviewing_p3();
    state.selected_provider = None;
    let before = state.clone();

    let (after, effects) = reduce(state, WorkflowEvent::ReviewDecided(ReviewAction::Reject));

    assert!(effects.is_empty());
    assert_eq!(after, before);
}

#[test]
fn duplicate_decision_while_in_flight_is_ignored() {
    let (state, first) = submitted_decision(reviewing_p3());

    let (state, effects) = reduce(state, WorkflowEvent::ReviewDecided(ReviewAction::Approve));

    assert!(effects.is_empty());
    assert_eq!(state.pending_review, Some(first));
    assert_eq!(
        state.notice.as_ref().map(UiError::context),
        Some(UiErrorContext::Review)
    );
}

#[test]
fn interrupted_decision_clears_the_in_flight_marker() {
    let (state, decision) = submitted_decision(reviewing_p3());
    let snapshot = state.selected_run.clone();

    let (state, effects) = reduce(state, WorkflowEvent::ReviewInterrupted(decision));

    assert!(effects.is_empty());
    assert!(state.pending_review.is_none());
    assert_eq!(state.selected_run, snapshot);
    assert_eq!(state.view, View::Review);
    assert_eq!(
        state.notice.as_ref().map(UiError::context),
        Some(UiErrorContext::Review)
    );

    let (_, effects) = reduce(state, WorkflowEvent::ReviewDecided(ReviewAction::Approve));
    assert!(matches!(effects.as_slice(), [Effect::SubmitReview(_)]));
}

#[test]
fn acknowledgement_refreshes_before_touching_the_snapshot() {
    let (state, decision) = submitted_decision(reviewing_p3());
    let snapshot = state.selected_run.clone();

    let (state, effects) = reduce(state, WorkflowEvent::ReviewAcknowledged(decision));

    assert_eq!(
        effects,
        vec![Effect::FetchRuns {
            reconcile: Some(RunId::new("R1"))
        }]
    );
    assert!(state.pending_review.is_none());
    assert_eq!(state.selected_run, snapshot, "no optimistic local patch");
    assert_eq!(state.view, View::Review);
}

#[test]
fn reconciliation_replaces_selected_run_with_refreshed_copy() {
    let (state, decision) = submitted_decision(reviewing_p3());
    let (state, _) = reduce(state, WorkflowEvent::ReviewAcknowledged(decision));

    let refreshed = scenario_run_after_approval();
    let (state, effects) = reduce(
        state,
        WorkflowEvent::RunsLoaded {
            runs: vec![refreshed.clone()],
            reconcile: Some(RunId::new("R1")),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.view, View::Results);
    assert_eq!(state.selected_run.as_ref(), Some(&refreshed));
    let selected = state.selected_run.as_ref().expect("selected run");
    assert_eq!(selected.validated, 9);
    assert_eq!(selected.flagged, 1);
    assert_eq!(
        state.selected_provider.as_ref().map(|p| p.status),
        Some(shared::domain::ProviderStatus::Valid)
    );
}

#[test]
fn reconciliation_miss_keeps_stale_snapshot() {
    let (state, decision) = submitted_decision(reviewing_p3());
    let snapshot = state.selected_run.clone();
    let (state, _) = reduce(state, WorkflowEvent::ReviewAcknowledged(decision));

    let other = run("R2", "2024-05-02T09:00:00", Vec::new());
    let (state, _) = reduce(
        state,
        WorkflowEvent::RunsLoaded {
            runs: vec![other.clone()],
            reconcile: Some(RunId::new("R1")),
        },
    );

    assert_eq!(state.view, View::Results);
    assert_eq!(state.selected_run, snapshot);
    assert_eq!(state.runs, vec![other]);
    assert!(state.notice.is_none());
}

#[test]
fn failed_review_leaves_selection_and_view_unchanged() {
    let before = reviewing_p3();
    let (state, decision) = submitted_decision(before.clone());

    let error = UiError::from_message(UiErrorContext::Review, "review rejected: Provider not found");
    let (state, effects) = reduce(
        state,
        WorkflowEvent::ReviewFailed {
            decision,
            error: error.clone(),
        },
    );

    assert!(effects.is_empty(), "no refresh after a failed decision");
    assert_eq!(state.view, before.view);
    assert_eq!(state.selected_run, before.selected_run);
    assert_eq!(state.selected_provider, before.selected_provider);
    assert!(state.pending_review.is_none());
    assert_eq!(state.notice, Some(error));
    assert_eq!(
        state.notice.as_ref().map(UiError::category),
        Some(UiErrorCategory::Rejected)
    );
}

#[test]
fn refresh_failure_after_acknowledgement_still_returns_to_results() {
    let (state, decision) = submitted_decision(reviewing_p3());
    let snapshot = state.selected_run.clone();
    let (state, _) = reduce(state, WorkflowEvent::ReviewAcknowledged(decision));

    let (state, _) = reduce(
        state,
        WorkflowEvent::RunsLoadFailed {
            error: UiError::from_message(UiErrorContext::Refresh, "connection reset"),
            reconcile: Some(RunId::new("R1")),
        },
    );

    assert_eq!(state.view, View::Results);
    assert_eq!(state.selected_run, snapshot);
    assert!(state.notice.is_some());
}

#[test]
fn plain_refresh_does_not_replace_selected_run() {
    let uploaded = scenario_run();
    let (state, effects) = reduce(
        WorkflowState::default(),
        WorkflowEvent::ValidationCompleted(uploaded.clone()),
    );
    assert_eq!(effects, vec![Effect::FetchRuns { reconcile: None }]);

    let listed = scenario_run_after_approval();
    let (state, _) = reduce(
        state,
        WorkflowEvent::RunsLoaded {
            runs: vec![listed.clone()],
            reconcile: None,
        },
    );

    assert_eq!(state.selected_run, Some(uploaded));
    assert_eq!(state.runs, vec![listed]);
    assert_eq!(state.view, View::Results);
}

#[test]
fn last_completed_upload_wins_the_view() {
    let first = run("R1", "2024-05-01T10:00:00", Vec::new());
    let second = run("R2", "2024-05-01T10:00:05", Vec::new());

    // R2 was submitted second but its response lands first.
    let (state, _) = reduce(
        WorkflowState::default(),
        WorkflowEvent::ValidationCompleted(second),
    );
    let (state, _) = reduce(state, WorkflowEvent::ValidationCompleted(first.clone()));

    assert_eq!(state.selected_run, Some(first));
    assert_eq!(state.view, View::Results);
}

#[test]
fn failed_refresh_keeps_previous_runs() {
    let existing = vec![scenario_run()];
    let state = WorkflowState {
        runs: existing.clone(),
        ..WorkflowState::default()
    };

    let (state, _) = reduce(
        state,
        WorkflowEvent::RunsLoadFailed {
            error: UiError::from_message(UiErrorContext::Refresh, "timed out"),
            reconcile: None,
        },
    );

    assert_eq!(state.runs, existing);
    assert_eq!(state.view, View::Dashboard);
    assert_eq!(
        state.notice.as_ref().map(UiError::category),
        Some(UiErrorCategory::Transport)
    );
}

#[test]
fn failed_upload_stays_on_dashboard() {
    let (state, effects) = reduce(
        WorkflowState::default(),
        WorkflowEvent::ValidationFailed(UiError::from_message(
            UiErrorContext::Upload,
            "validate_upload returned a malformed body",
        )),
    );

    assert!(effects.is_empty());
    assert_eq!(state.view, View::Dashboard);
    assert!(state.selected_run.is_none());
    assert_eq!(
        state.notice.as_ref().map(UiError::context),
        Some(UiErrorContext::Upload)
    );
}

#[test]
fn navigation_events_move_between_views() {
    let selected = scenario_run();
    let (state, _) = reduce(
        WorkflowState::default(),
        WorkflowEvent::RunOpened(selected.clone()),
    );
    assert_eq!(state.view, View::Results);

    let (state, _) = reduce(state, WorkflowEvent::ProviderOpened(flagged_p3(&selected)));
    assert_eq!(state.view, View::Review);

    let (state, _) = reduce(state, WorkflowEvent::BackToDashboard);
    assert_eq!(state.view, View::Dashboard);
    assert_eq!(state.selected_run, Some(selected));
}
