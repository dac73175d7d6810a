//! TUI components for healthctl
//!
//! This crate provides the terminal user interface for healthctl,
//! including state management, keybindings, event handling, and UI components.

pub mod app;
pub mod config;
pub mod tui;
pub mod ui;

pub use app::{
    Action, AppState, ConfirmState, DebugFormState, DebugStep, Focus, FormEvent, OutputView,
    Screen, UiState,
};
pub use config::{KeyBinding, KeyBindings, KeyContext};
pub use tui::{Event, EventHandler, Tui};
pub use ui::components::{
    ConfirmDialog, DebugForm, ErrorPopup, HelpOverlay, ListSelector, ListSelectorExt,
    OutputPanel, StatusBar, dashboard_hints, list_nav_hints, redis_summary_lines,
};
pub use ui::screens::{ContextSelectScreen, DashboardScreen};
pub use ui::{Layout, Theme};
