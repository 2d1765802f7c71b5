//! Human-in-the-loop review workflow over validation runs.
//!
//! [`WorkflowController`] owns the dashboard/results/review state machine and
//! drives the run store and validation service through the traits in
//! `client_core`. The [`views`] module turns controller state into render
//! models and the intents each screen may emit.

pub mod controller;
pub mod policy;
pub mod views;

pub use controller::{
    reduce, Effect, UiError, UiErrorCategory, UiErrorContext, View, WorkflowController,
    WorkflowEvent, WorkflowState,
};
pub use views::{Intent, Screen, SuccessRate};

#[cfg(test)]
#[path = "tests/fixtures.rs"]
pub(crate) mod fixtures;
