mod confirm_dialog;
mod debug_form;
mod error_popup;
mod help_overlay;
mod list_selector;
mod output_panel;
mod status_bar;

pub use confirm_dialog::ConfirmDialog;
pub use debug_form::DebugForm;
pub use error_popup::ErrorPopup;
pub use help_overlay::HelpOverlay;
pub use list_selector::{ListSelector, ListSelectorExt};
pub use output_panel::{OutputPanel, redis_summary_lines};
pub use status_bar::{StatusBar, dashboard_hints, list_nav_hints};
