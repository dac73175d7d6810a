mod context_select;
mod dashboard;

pub use context_select::ContextSelectScreen;
pub use dashboard::DashboardScreen;
