//! Background execution of dashboard tools

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Result, bail};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use healthctl_checks::{SuiteRunner, until_cancelled};
use healthctl_k8s::{
    KubeClient, db_sizes, fetch_alerts, flush_all, redis_status, set_debug_level,
};
use healthctl_tui::OutputView;
use healthctl_types::{DebugLevel, RedisDbSize, Settings, Tool};

/// Unique per process, across sessions
static NEXT_RUN_ID: AtomicU64 = AtomicU64::new(1);

/// Work a tool run performs
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Job {
    Run(Tool),
    SetDebugLevel {
        namespace: String,
        pod: String,
        container: String,
        level: DebugLevel,
    },
}

impl Job {
    pub fn tool(&self) -> Tool {
        match self {
            Self::Run(tool) => *tool,
            Self::SetDebugLevel { .. } => Tool::SetDebugLevel,
        }
    }
}

/// A tool run has ended
pub struct ToolFinished {
    pub id: u64,
    pub tool: Tool,
    /// `None` when the run was stopped before producing output
    pub outcome: Option<Result<OutputView>>,
    pub cancelled: bool,
}

/// Everything a tool needs to reach the connected cluster
#[derive(Clone)]
pub struct ToolEnv {
    pub client: kube::Client,
    pub kube: Arc<KubeClient>,
    pub settings: Arc<Settings>,
    pub context: String,
}

/// Runs at most one tool at a time for a connected context
pub struct ToolRunner {
    env: ToolEnv,
    current: Option<(u64, CancellationToken)>,
}

impl ToolRunner {
    pub fn new(env: ToolEnv) -> Self {
        Self { env, current: None }
    }

    pub fn env(&self) -> &ToolEnv {
        &self.env
    }

    /// Spawn `job`, cancelling whatever is still running
    pub fn start(&mut self, job: Job, tx: mpsc::UnboundedSender<ToolFinished>) -> u64 {
        if let Some((_, cancel)) = self.current.take() {
            cancel.cancel();
        }

        let id = NEXT_RUN_ID.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();
        self.current = Some((id, cancel.clone()));

        let env = self.env.clone();
        tokio::spawn(async move {
            let tool = job.tool();
            let outcome = execute(env, job, cancel.clone()).await;
            let _ = tx.send(ToolFinished {
                id,
                tool,
                outcome,
                cancelled: cancel.is_cancelled(),
            });
        });

        id
    }

    /// Cancel the running tool; its result still arrives as [`ToolFinished`]
    pub fn stop(&self) -> bool {
        match &self.current {
            Some((_, cancel)) => {
                cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Accept the result of run `id`, false for superseded runs
    pub fn finish(&mut self, id: u64) -> bool {
        match &self.current {
            Some((current, _)) if *current == id => {
                self.current = None;
                true
            }
            _ => false,
        }
    }
}

impl Drop for ToolRunner {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn execute(env: ToolEnv, job: Job, cancel: CancellationToken) -> Option<Result<OutputView>> {
    info!(tool = %job.tool(), context = %env.context, "running tool");

    if let Job::Run(Tool::Suite(kind)) = job {
        // Suites stop between checks and report what completed
        let runner = SuiteRunner::new(env.client.clone(), env.settings.clone(), env.context.clone())
            .with_cancellation(cancel);
        return Some(Ok(OutputView::Report(runner.run(kind).await)));
    }

    let outcome = until_cancelled(&cancel, run_diagnostic(&env, job)).await;
    if outcome.is_none() {
        debug!("tool cancelled");
    }
    outcome
}

async fn run_diagnostic(env: &ToolEnv, job: Job) -> Result<OutputView> {
    let client = &env.client;
    let settings = &env.settings;

    match job {
        Job::Run(Tool::ActiveAlerts) => {
            let alerts = fetch_alerts(client, &settings.alertmanager).await?;
            Ok(OutputView::Alerts(alerts))
        }
        Job::Run(Tool::RedisStatus) => {
            let status = redis_status(client, &settings.redis).await?;
            Ok(OutputView::Redis(status))
        }
        Job::Run(Tool::CollectKargo) => {
            let kargo = &settings.kargo;
            let address = env
                .kube
                .load_balancer_ip(client, &kargo.namespace, &kargo.service)
                .await?;
            Ok(OutputView::lines(
                Tool::CollectKargo.label(),
                vec![
                    format!("Service: {}/{}", kargo.namespace, kargo.service),
                    format!("LoadBalancer address: {}", address),
                ],
            ))
        }
        Job::Run(Tool::FlushRedis) => {
            let before = db_sizes(client, &settings.redis).await?;
            let flush = flush_all(client, &settings.redis).await?;
            let after = db_sizes(client, &settings.redis).await?;
            Ok(OutputView::lines(
                Tool::FlushRedis.label(),
                flush_lines(&before, &flush, &after),
            ))
        }
        Job::SetDebugLevel {
            namespace,
            pod,
            container,
            level,
        } => {
            let output =
                set_debug_level(client, &namespace, &pod, &container, level, &settings.debug)
                    .await?;
            let mut lines = vec![format!(
                "Set {} on {}/{} container {}",
                level, namespace, pod, container
            )];
            lines.extend(output.lines().map(str::to_string));
            Ok(OutputView::lines(Tool::SetDebugLevel.label(), lines))
        }
        Job::Run(tool @ (Tool::Suite(_) | Tool::SetDebugLevel)) => {
            bail!("{} cannot run as a diagnostic", tool)
        }
    }
}

/// `dbsize` output per pod, one indented block each
pub fn db_size_lines(sizes: &[RedisDbSize]) -> Vec<String> {
    let mut lines = Vec::new();
    for size in sizes {
        lines.push(format!("{}:", size.pod));
        lines.extend(
            size.output
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(|l| format!("  {}", l)),
        );
    }
    if lines.is_empty() {
        lines.push("No redis pods found".to_string());
    }
    lines
}

/// Output of a flush: sizes before, the flush itself, sizes after
pub fn flush_lines(before: &[RedisDbSize], flush: &RedisDbSize, after: &[RedisDbSize]) -> Vec<String> {
    let mut lines = vec!["DB size before flush".to_string()];
    lines.extend(db_size_lines(before));
    lines.push(String::new());
    lines.push(format!("Flushing Redis Data from {}", flush.pod));
    lines.extend(
        flush
            .output
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| format!("  {}", l)),
    );
    lines.push(String::new());
    lines.push("DB size after flush".to_string());
    lines.extend(db_size_lines(after));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use healthctl_types::SuiteKind;

    fn size(pod: &str, output: &str) -> RedisDbSize {
        RedisDbSize {
            pod: pod.to_string(),
            output: output.to_string(),
        }
    }

    #[test]
    fn test_job_tool() {
        assert_eq!(
            Job::Run(Tool::Suite(SuiteKind::Smf)).tool(),
            Tool::Suite(SuiteKind::Smf)
        );
        let job = Job::SetDebugLevel {
            namespace: "fed-smf".to_string(),
            pod: "smf-0".to_string(),
            container: "smf-app".to_string(),
            level: DebugLevel::Debug2,
        };
        assert_eq!(job.tool(), Tool::SetDebugLevel);
    }

    #[test]
    fn test_db_size_lines() {
        let lines = db_size_lines(&[
            size("redis-0", ">>> Calling dbsize\n10.0.0.1:6379: 42\n\n"),
            size("redis-1", "error: pod not ready"),
        ]);
        assert_eq!(
            lines,
            vec![
                "redis-0:",
                "  >>> Calling dbsize",
                "  10.0.0.1:6379: 42",
                "redis-1:",
                "  error: pod not ready",
            ]
        );
        assert_eq!(db_size_lines(&[]), vec!["No redis pods found"]);
    }

    #[test]
    fn test_flush_lines_order() {
        let lines = flush_lines(
            &[size("redis-0", "10.0.0.1:6379: 42")],
            &size("redis-0", "10.0.0.1:6379: OK"),
            &[size("redis-0", "10.0.0.1:6379: 0")],
        );
        assert_eq!(lines[0], "DB size before flush");
        assert_eq!(lines[2], "  10.0.0.1:6379: 42");
        assert_eq!(lines[4], "Flushing Redis Data from redis-0");
        assert_eq!(lines[5], "  10.0.0.1:6379: OK");
        assert_eq!(lines.last().map(String::as_str), Some("  10.0.0.1:6379: 0"));
    }
}
