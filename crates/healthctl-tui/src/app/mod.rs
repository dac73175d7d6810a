//! Application state and actions

mod action;
mod debug_form;
mod state;

pub use action::Action;
pub use debug_form::{DebugFormState, DebugStep, FormEvent};
pub use state::{AppState, ConfirmState, Focus, OutputView, Screen, UiState};
