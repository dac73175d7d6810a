//! Kubernetes client for healthctl
//!
//! This crate provides kubeconfig handling, cluster metadata, listings used by
//! the debug-level form, and the exec-based diagnostics (alerts, Redis, debug
//! level).

mod alerts;
mod client;
mod debug;
mod exec;
mod redis;

pub use alerts::{fetch_alerts, parse_alerts};
pub use client::KubeClient;
pub use debug::{debug_level_command, set_debug_level};
pub use exec::{ExecError, ExecOutput, exec_shell};
pub use redis::{db_sizes, flush_all, redis_status, summarize_status};

// Re-export types that are used in our public API
pub use healthctl_types::{
    Alert, ClusterSummary, ContextInfo, DebugLevel, RedisDbSize, RedisStatus, Settings,
};
