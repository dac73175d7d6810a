//! Suite runner

use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use healthctl_types::{CheckResult, Settings, SuiteKind, SuiteReport};

use crate::{cluster, monitor, presence, storage, workload};

/// Await `fut` unless `token` is cancelled first
pub async fn until_cancelled<F: Future>(token: &CancellationToken, fut: F) -> Option<F::Output> {
    tokio::select! {
        biased;
        _ = token.cancelled() => None,
        output = fut => Some(output),
    }
}

/// Runs check suites against one cluster context
pub struct SuiteRunner {
    client: kube::Client,
    settings: Arc<Settings>,
    context: String,
    cancel: CancellationToken,
}

impl SuiteRunner {
    pub fn new(client: kube::Client, settings: Arc<Settings>, context: impl Into<String>) -> Self {
        Self {
            client,
            settings,
            context: context.into(),
            cancel: CancellationToken::new(),
        }
    }

    /// Use an externally owned cancellation token
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run a suite's checks in order.
    ///
    /// On cancellation the report holds the checks completed so far.
    pub async fn run(&self, kind: SuiteKind) -> SuiteReport {
        info!(suite = kind.cli_name(), context = %self.context, "running suite");

        let mut results = Vec::new();
        let completed = match kind {
            SuiteKind::K8s => self.k8s(&mut results).await,
            SuiteKind::Infra => self.infra(&mut results).await,
            SuiteKind::Paas => self.paas(&mut results).await,
            SuiteKind::Smf => self.smf(&mut results).await,
            SuiteKind::Upf => self.upf(&mut results).await,
            SuiteKind::Storage => self.storage(&mut results).await,
        };

        let report = SuiteReport::new(kind, self.context.clone(), results);
        match completed {
            Some(()) => report,
            None => {
                info!(suite = kind.cli_name(), done = report.total(), "suite cancelled");
                report.mark_interrupted()
            }
        }
    }

    async fn step<F: Future>(&self, fut: F) -> Option<F::Output> {
        until_cancelled(&self.cancel, fut).await
    }

    async fn k8s(&self, results: &mut Vec<CheckResult>) -> Option<()> {
        let client = &self.client;
        results.push(self.step(cluster::nodes(client)).await?);
        results.push(self.step(cluster::pods(client)).await?);
        results.push(self.step(cluster::persistent_volumes(client)).await?);
        results.push(self.step(cluster::persistent_volume_claims(client)).await?);
        results.push(self.step(cluster::services(client)).await?);
        results.push(self.step(cluster::deployments(client)).await?);
        results.push(self.step(cluster::replica_sets(client)).await?);
        results.push(self.step(cluster::events(client)).await?);
        results.push(self.step(cluster::ingresses(client)).await?);
        results.push(self.step(cluster::daemon_sets(client)).await?);
        results.push(self.step(cluster::stateful_sets(client)).await?);
        Some(())
    }

    async fn infra(&self, results: &mut Vec<CheckResult>) -> Option<()> {
        for target in &self.settings.infra {
            results.push(self.step(presence::check_presence(&self.client, target)).await?);
        }
        results.push(self.step(presence::check_crds(&self.client)).await?);
        Some(())
    }

    async fn paas(&self, results: &mut Vec<CheckResult>) -> Option<()> {
        for target in &self.settings.paas {
            results.push(self.step(presence::check_presence(&self.client, target)).await?);
        }
        Some(())
    }

    async fn smf(&self, results: &mut Vec<CheckResult>) -> Option<()> {
        let smf = &self.settings.smf;
        results.extend(
            self.step(workload::check_workloads(&self.client, &smf.namespace))
                .await?,
        );
        results.extend(self.step(monitor::check_smf_monitor(&self.client, smf)).await?);
        Some(())
    }

    async fn upf(&self, results: &mut Vec<CheckResult>) -> Option<()> {
        let namespace = &self.settings.upf.namespace;
        results.extend(
            self.step(workload::check_workloads(&self.client, namespace))
                .await?,
        );
        Some(())
    }

    async fn storage(&self, results: &mut Vec<CheckResult>) -> Option<()> {
        let client = &self.client;
        results.push(self.step(cluster::persistent_volumes(client)).await?);
        results.push(self.step(cluster::persistent_volume_claims(client)).await?);
        results.push(self.step(storage::storage_classes(client)).await?);
        Some(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const EMPTY_LIST: &str = r#"{"apiVersion":"v1","kind":"List","metadata":{},"items":[]}"#;

    fn client_for(url: &str) -> kube::Client {
        let config = kube::Config::new(url.parse().unwrap());
        kube::Client::try_from(config).unwrap()
    }

    /// API server stand-in that answers the first request with an empty list
    /// and leaves every later request hanging
    async fn answer_once_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            let mut answered = false;
            while let Ok((mut socket, _)) = listener.accept().await {
                if answered {
                    held.push(socket);
                    continue;
                }
                answered = true;
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\
                     Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                    EMPTY_LIST.len(),
                    EMPTY_LIST
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_cancelled_before_first_check() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let runner = SuiteRunner::new(
            client_for("http://127.0.0.1:1"),
            Arc::new(Settings::default()),
            "lab",
        )
        .with_cancellation(cancel);

        let report = runner.run(SuiteKind::K8s).await;
        assert_eq!(report.total(), 0);
        assert!(report.interrupted);
        assert!(!report.all_passed());
    }

    #[tokio::test]
    async fn test_cancel_mid_suite_keeps_completed_checks() {
        let url = answer_once_server().await;
        let cancel = CancellationToken::new();
        let runner = SuiteRunner::new(client_for(&url), Arc::new(Settings::default()), "lab")
            .with_cancellation(cancel.clone());

        let stopper = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            cancel.cancel();
        });
        let report = runner.run(SuiteKind::Storage).await;
        stopper.await.unwrap();

        // The persistent volume check got its answer, the claim check hung
        assert_eq!(report.total(), 1);
        assert_eq!(report.results[0].label, "Persistent Volumes");
        assert!(report.interrupted);
        assert!(!report.all_passed());
    }

    #[tokio::test]
    async fn test_completed_run_is_not_interrupted() {
        let runner = SuiteRunner::new(
            client_for("http://127.0.0.1:1"),
            Arc::new(Settings::default()),
            "lab",
        );
        let report = runner.run(SuiteKind::Storage).await;
        assert_eq!(report.total(), 3);
        assert!(!report.interrupted);
        // Unreachable API server, every check fails
        assert_eq!(report.failed(), 3);
    }

    #[tokio::test]
    async fn test_until_cancelled_completes() {
        let token = CancellationToken::new();
        assert_eq!(until_cancelled(&token, async { 7 }).await, Some(7));
    }

    #[tokio::test]
    async fn test_until_cancelled_interrupts_pending_work() {
        let token = CancellationToken::new();
        token.cancel();
        let result = until_cancelled(&token, std::future::pending::<()>()).await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_cancel_from_another_task() {
        let token = CancellationToken::new();
        let child = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            child.cancel();
        });
        let result = until_cancelled(&token, std::future::pending::<()>()).await;
        assert!(result.is_none());
        assert!(token.is_cancelled());
    }
}
