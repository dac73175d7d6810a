//! Health checks for healthctl
//!
//! Evaluators are plain functions over Kubernetes objects; the async
//! wrappers list the objects and turn API errors into failed checks.
//! `SuiteRunner` strings them together into the dashboard's suites.

mod cluster;
mod monitor;
mod presence;
mod report;
mod storage;
mod suite;
mod workload;

pub use monitor::{monitor_command, parse_monitor_output};
pub use report::{center_text, render_report};
pub use suite::{SuiteRunner, until_cancelled};

// Re-export types used in our public API
pub use healthctl_types::{CheckResult, Settings, SuiteKind, SuiteReport};
