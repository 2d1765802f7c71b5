//! Controller layer: workflow events, reducer-style state transitions, and effect orchestration.

pub mod events;
pub mod orchestration;
pub mod reducer;

pub use events::{UiError, UiErrorCategory, UiErrorContext, WorkflowEvent};
pub use orchestration::WorkflowController;
pub use reducer::{reduce, Effect, View, WorkflowState};
