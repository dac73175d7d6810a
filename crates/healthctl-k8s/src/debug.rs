use anyhow::{Result, bail};
use tracing::info;

use healthctl_types::{DebugLevel, DebugSettings};

use crate::exec::exec_shell;

/// Shell command enabling trace output at `level` on the local trace-control port
pub fn debug_level_command(port: u16, level: DebugLevel) -> String {
    format!(
        "curl http://127.0.0.1:{}/tenv/eTrace/enable?filter=all\\&level={}",
        port,
        level.as_str()
    )
}

/// Switch the trace level of one container, returning the command output
pub async fn set_debug_level(
    client: &kube::Client,
    namespace: &str,
    pod: &str,
    container: &str,
    level: DebugLevel,
    settings: &DebugSettings,
) -> Result<String> {
    let command = debug_level_command(settings.port_for(container), level);
    let output = exec_shell(client, namespace, pod, container, &command).await?;

    if !output.success {
        bail!(
            "Setting {} on {}/{} failed: {}",
            level,
            pod,
            container,
            output
                .message
                .unwrap_or_else(|| output.stderr.trim().to_string())
        );
    }

    info!(namespace, pod, container, level = %level, "debug level set");
    Ok(output.stdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_level_command() {
        assert_eq!(
            debug_level_command(9090, DebugLevel::Debug2),
            "curl http://127.0.0.1:9090/tenv/eTrace/enable?filter=all\\&level=DEBUG_2"
        );
    }

    #[test]
    fn test_port_follows_container() {
        let mut settings = DebugSettings::default();
        settings.ports.insert("smf-app".to_string(), 9191);
        assert!(debug_level_command(settings.port_for("smf-app"), DebugLevel::Debug1)
            .contains(":9191/"));
        assert!(debug_level_command(settings.port_for("other"), DebugLevel::Debug3)
            .ends_with(":9090/tenv/eTrace/enable?filter=all\\&level=DEBUG_3"));
    }
}
