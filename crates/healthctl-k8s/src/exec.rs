use k8s_openapi::api::core::v1::Pod;
use kube::Api;
use kube::api::AttachParams;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("failed to exec into {namespace}/{pod} ({container}): {source}")]
    Attach {
        namespace: String,
        pod: String,
        container: String,
        #[source]
        source: kube::Error,
    },

    #[error("exec stream for {pod} terminated abnormally: {message}")]
    Stream { pod: String, message: String },
}

/// Captured output of a remote command
#[derive(Clone, Debug, Default)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
    /// Whether the API server reported the command as successful
    pub success: bool,
    /// Failure message from the exec status, if any
    pub message: Option<String>,
}

/// Run `/bin/sh -c <command>` in a container through the pod exec subresource
pub async fn exec_shell(
    client: &kube::Client,
    namespace: &str,
    pod: &str,
    container: &str,
    command: &str,
) -> Result<ExecOutput, ExecError> {
    debug!(namespace, pod, container, command, "exec");

    let pods: Api<Pod> = Api::namespaced(client.clone(), namespace);
    let params = AttachParams::default()
        .container(container)
        .stdin(false)
        .stdout(true)
        .stderr(true);

    let mut attached = pods
        .exec(pod, ["/bin/sh", "-c", command], &params)
        .await
        .map_err(|source| ExecError::Attach {
            namespace: namespace.to_string(),
            pod: pod.to_string(),
            container: container.to_string(),
            source,
        })?;

    let stdout = attached.stdout();
    let stderr = attached.stderr();
    let status = attached.take_status();

    let (stdout, stderr) = tokio::join!(read_all(stdout), read_all(stderr));

    let status = match status {
        Some(status) => status.await,
        None => None,
    };

    attached.join().await.map_err(|e| ExecError::Stream {
        pod: pod.to_string(),
        message: e.to_string(),
    })?;

    let success = status
        .as_ref()
        .and_then(|s| s.status.as_deref())
        .is_none_or(|s| s == "Success");
    let message = status.and_then(|s| s.message);

    Ok(ExecOutput {
        stdout,
        stderr,
        success,
        message,
    })
}

async fn read_all<R: AsyncRead + Unpin>(reader: Option<R>) -> String {
    let Some(mut reader) = reader else {
        return String::new();
    };

    let mut buf = Vec::new();
    if let Err(e) = reader.read_to_end(&mut buf).await {
        debug!(error = %e, "exec stream read failed");
    }
    String::from_utf8_lossy(&buf).into_owned()
}
