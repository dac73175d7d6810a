//! Shared types for healthctl
//!
//! This crate contains data structures used across multiple healthctl crates.

mod settings;

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use ratatui::style::Color;
use serde::Deserialize;

pub use settings::{
    AlertManagerSettings, DebugSettings, KargoSettings, PresenceTarget, RedisSettings, Settings,
    SmfSettings, UpfSettings, default_infra_targets, default_paas_targets,
};

// ============================================================================
// Check Results
// ============================================================================

/// Outcome of a single health check
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckResult {
    /// Name of the checked component
    pub label: String,
    /// Human-readable description of what was found
    pub details: String,
    pub passed: bool,
}

impl CheckResult {
    pub fn new(label: impl Into<String>, details: impl Into<String>, passed: bool) -> Self {
        Self {
            label: label.into(),
            details: details.into(),
            passed,
        }
    }

    pub fn pass(label: impl Into<String>, details: impl Into<String>) -> Self {
        Self::new(label, details, true)
    }

    pub fn fail(label: impl Into<String>, details: impl Into<String>) -> Self {
        Self::new(label, details, false)
    }

    /// Text for the "Test Summary" column, prefixed with the label unless
    /// the details already name it
    pub fn summary(&self) -> String {
        if self.label.is_empty() || self.details.contains(&self.label) {
            self.details.clone()
        } else {
            format!("{}: {}", self.label, self.details)
        }
    }

    /// "PASS" or "FAIL"
    pub fn verdict(&self) -> &'static str {
        if self.passed { "PASS" } else { "FAIL" }
    }

    pub fn color(&self) -> Color {
        if self.passed { Color::Green } else { Color::Red }
    }
}

/// A named group of health checks
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SuiteKind {
    K8s,
    Infra,
    Paas,
    Smf,
    Upf,
    Storage,
}

impl SuiteKind {
    pub const ALL: [SuiteKind; 6] = [
        Self::K8s,
        Self::Infra,
        Self::Paas,
        Self::Smf,
        Self::Upf,
        Self::Storage,
    ];

    /// Display label used in menus and report titles
    pub fn label(&self) -> &'static str {
        match self {
            Self::K8s => "K8s health",
            Self::Infra => "Infra health",
            Self::Paas => "PAAS health",
            Self::Smf => "SMF health",
            Self::Upf => "UPF health",
            Self::Storage => "Storage health",
        }
    }

    /// Short name accepted on the command line
    pub fn cli_name(&self) -> &'static str {
        match self {
            Self::K8s => "k8s",
            Self::Infra => "infra",
            Self::Paas => "paas",
            Self::Smf => "smf",
            Self::Upf => "upf",
            Self::Storage => "storage",
        }
    }

    pub fn from_cli_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        Self::ALL.into_iter().find(|kind| kind.cli_name() == name)
    }
}

impl fmt::Display for SuiteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ordered results of one suite invocation
#[derive(Clone, Debug)]
pub struct SuiteReport {
    pub suite: SuiteKind,
    pub context: String,
    pub results: Vec<CheckResult>,
    pub finished_at: DateTime<Utc>,
    /// The run stopped before every check had finished
    pub interrupted: bool,
}

impl SuiteReport {
    pub fn new(suite: SuiteKind, context: impl Into<String>, results: Vec<CheckResult>) -> Self {
        Self {
            suite,
            context: context.into(),
            results,
            finished_at: Utc::now(),
            interrupted: false,
        }
    }

    /// Mark the report as holding only the checks completed before a cancel
    pub fn mark_interrupted(mut self) -> Self {
        self.interrupted = true;
        self
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.passed()
    }

    /// True only for a complete run without failures
    pub fn all_passed(&self) -> bool {
        !self.interrupted && self.results.iter().all(|r| r.passed)
    }
}

// ============================================================================
// Dashboard Tools
// ============================================================================

/// An entry of the dashboard tools menu
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tool {
    Suite(SuiteKind),
    ActiveAlerts,
    RedisStatus,
    CollectKargo,
    SetDebugLevel,
    FlushRedis,
}

impl Tool {
    /// Menu order
    pub const ALL: [Tool; 11] = [
        Self::Suite(SuiteKind::K8s),
        Self::Suite(SuiteKind::Infra),
        Self::Suite(SuiteKind::Paas),
        Self::Suite(SuiteKind::Smf),
        Self::Suite(SuiteKind::Upf),
        Self::Suite(SuiteKind::Storage),
        Self::ActiveAlerts,
        Self::RedisStatus,
        Self::CollectKargo,
        Self::SetDebugLevel,
        Self::FlushRedis,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Suite(kind) => kind.label(),
            Self::ActiveAlerts => "Active Alerts",
            Self::RedisStatus => "Redis status",
            Self::CollectKargo => "Collect Kargo",
            Self::SetDebugLevel => "Set Debug Level",
            Self::FlushRedis => "Flush Redis",
        }
    }

    /// Whether the tool asks for confirmation before running
    pub fn needs_confirmation(&self) -> bool {
        matches!(self, Self::Suite(_) | Self::FlushRedis)
    }

    /// Whether the tool changes anything inside the cluster
    pub fn is_mutating(&self) -> bool {
        matches!(self, Self::SetDebugLevel | Self::FlushRedis)
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Kubernetes Cluster Types
// ============================================================================

/// Kubernetes context information
#[derive(Clone, Debug)]
pub struct ContextInfo {
    pub name: String,
    pub cluster: String,
    pub user: String,
    pub namespace: Option<String>,
    pub is_current: bool,
}

impl ContextInfo {
    pub fn new(
        name: String,
        cluster: String,
        user: String,
        namespace: Option<String>,
        is_current: bool,
    ) -> Self {
        Self {
            name,
            cluster,
            user,
            namespace,
            is_current,
        }
    }
}

/// Details shown in the dashboard header for the connected cluster
#[derive(Clone, Debug, Default)]
pub struct ClusterSummary {
    pub context: String,
    pub cluster: String,
    pub api_server: String,
    pub control_plane_nodes: usize,
    pub worker_nodes: usize,
    pub server_version: Option<String>,
}

impl ClusterSummary {
    /// Format node counts as "Master: m, Worker: w"
    pub fn node_counts(&self) -> String {
        format!(
            "Master: {}, Worker: {}",
            self.control_plane_nodes, self.worker_nodes
        )
    }
}

// ============================================================================
// Alert Types
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AlertSeverity {
    Critical,
    Major,
    Other(String),
}

impl From<&str> for AlertSeverity {
    fn from(s: &str) -> Self {
        match s {
            "critical" => Self::Critical,
            "major" => Self::Major,
            other => Self::Other(other.to_string()),
        }
    }
}

impl AlertSeverity {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Critical => "critical",
            Self::Major => "major",
            Self::Other(s) => s,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Critical => Color::Red,
            Self::Major => Color::Yellow,
            Self::Other(_) => Color::Green,
        }
    }
}

/// An active alert reported by alertmanager
#[derive(Clone, Debug)]
pub struct Alert {
    pub name: String,
    pub severity: AlertSeverity,
    pub starts_at: Option<DateTime<Utc>>,
    pub pod: String,
    pub summary: String,
}

impl Alert {
    pub fn starts_at_display(&self) -> String {
        self.starts_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_default()
    }
}

// ============================================================================
// Redis Types
// ============================================================================

/// A Redis node as listed in the operator's cluster status
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct RedisNode {
    pub id: String,
    pub ip: String,
    pub pod_name: String,
    pub port: String,
    pub role: String,
    pub slots: Vec<String>,
    pub primary_ref: Option<String>,
    pub zone: String,
}

/// Hash slots of a Redis cluster
pub const REDIS_CLUSTER_SLOTS: u32 = 16384;

impl RedisNode {
    pub fn is_primary(&self) -> bool {
        self.role.eq_ignore_ascii_case("primary") || self.role.eq_ignore_ascii_case("master")
    }

    /// Number of hash slots in the node's `slots` ranges ("0-5460" or "5461").
    /// Malformed entries count as zero.
    pub fn slot_count(&self) -> u32 {
        self.slots
            .iter()
            .map(|range| {
                let parse = |s: &str| s.trim().parse::<u32>().ok();
                match range.split_once('-') {
                    Some((start, end)) => match (parse(start), parse(end)) {
                        (Some(start), Some(end)) if end >= start => end - start + 1,
                        _ => 0,
                    },
                    None => u32::from(parse(range).is_some()),
                }
            })
            .sum()
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RedisClusterInfo {
    pub label_selector_path: String,
    pub max_replication_factor: u32,
    pub min_replication_factor: u32,
    pub nodes: Vec<RedisNode>,
    pub number_of_pods: u32,
    pub number_of_pods_ready: u32,
    pub number_of_primaries: u32,
    pub number_of_primaries_ready: u32,
    pub number_of_redis_nodes_running: u32,
    pub number_of_replicas_per_primary: BTreeMap<String, u32>,
    pub status: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RedisCondition {
    pub message: String,
    pub reason: String,
    pub status: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub last_transition_time: Option<DateTime<Utc>>,
}

/// `.status` of the RedisCluster custom resource
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RedisClusterStatus {
    pub cluster: RedisClusterInfo,
    pub conditions: Vec<RedisCondition>,
    pub start_time: Option<DateTime<Utc>>,
}

/// Where a Redis pod runs and what it requested
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PodPlacement {
    pub worker: String,
    pub cpu: String,
    pub memory: String,
}

/// Summary of the Redis cluster shown by the "Redis status" tool
#[derive(Clone, Debug, Default)]
pub struct RedisStatus {
    pub primaries_configured: u32,
    pub replicas_configured: u32,
    pub pods_ready: bool,
    pub cluster_ok: bool,
    pub slots_ok: u32,
    pub slots_pfail: u32,
    pub slots_fail: u32,
    pub known_nodes: usize,
    pub cluster_size: u32,
    pub active_zones: usize,
    pub primary_zones: usize,
    pub nodes: Vec<RedisNode>,
    pub placements: BTreeMap<String, PodPlacement>,
}

/// Raw `dbsize` output of one Redis pod
#[derive(Clone, Debug)]
pub struct RedisDbSize {
    pub pod: String,
    pub output: String,
}

// ============================================================================
// Debug Level
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DebugLevel {
    #[default]
    Debug1,
    Debug2,
    Debug3,
}

impl DebugLevel {
    pub const ALL: [DebugLevel; 3] = [Self::Debug1, Self::Debug2, Self::Debug3];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug1 => "DEBUG_1",
            Self::Debug2 => "DEBUG_2",
            Self::Debug3 => "DEBUG_3",
        }
    }
}

impl fmt::Display for DebugLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
