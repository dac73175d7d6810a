use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use healthctl_types::{Alert, AlertManagerSettings, AlertSeverity};

use crate::exec::exec_shell;

/// Alert as printed by `amtool -o json alert query`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AmtoolAlert {
    #[serde(default)]
    labels: HashMap<String, String>,
    #[serde(default)]
    annotations: HashMap<String, String>,
    #[serde(default)]
    starts_at: Option<String>,
}

impl From<AmtoolAlert> for Alert {
    fn from(mut raw: AmtoolAlert) -> Self {
        let starts_at = raw
            .starts_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc));

        Alert {
            name: raw.labels.remove("alertname").unwrap_or_default(),
            severity: AlertSeverity::from(
                raw.labels.get("severity").map(String::as_str).unwrap_or(""),
            ),
            starts_at,
            pod: raw.labels.remove("pod").unwrap_or_default(),
            summary: raw.annotations.remove("summary").unwrap_or_default(),
        }
    }
}

/// Parse the JSON array printed by amtool
pub fn parse_alerts(json: &str) -> Result<Vec<Alert>> {
    let trimmed = json.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let raw: Vec<AmtoolAlert> =
        serde_json::from_str(trimmed).context("Failed to parse amtool output")?;
    Ok(raw.into_iter().map(Alert::from).collect())
}

/// Query alertmanager for all active alerts via amtool inside its pod
pub async fn fetch_alerts(
    client: &kube::Client,
    settings: &AlertManagerSettings,
) -> Result<Vec<Alert>> {
    let command = format!(
        "amtool -o json alert query -a --alertmanager.url {}",
        settings.url
    );

    let output = exec_shell(
        client,
        &settings.namespace,
        &settings.pod,
        &settings.container,
        &command,
    )
    .await?;

    if !output.success && output.stdout.trim().is_empty() {
        anyhow::bail!(
            "amtool failed: {}",
            output
                .message
                .unwrap_or_else(|| output.stderr.trim().to_string())
        );
    }

    parse_alerts(&output.stdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amtool_output() {
        let json = r#"[
            {
                "labels": {"alertname": "KubePodCrashLooping", "severity": "critical", "pod": "smf-0"},
                "annotations": {"summary": "Pod is crash looping"},
                "startsAt": "2024-05-01T10:00:00.000Z",
                "endsAt": "2024-05-01T11:00:00.000Z"
            },
            {
                "labels": {"alertname": "Watchdog", "severity": "none"},
                "annotations": {},
                "startsAt": "not-a-date"
            }
        ]"#;

        let alerts = parse_alerts(json).unwrap();
        assert_eq!(alerts.len(), 2);

        assert_eq!(alerts[0].name, "KubePodCrashLooping");
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
        assert_eq!(alerts[0].pod, "smf-0");
        assert_eq!(alerts[0].summary, "Pod is crash looping");
        assert_eq!(alerts[0].starts_at_display(), "2024-05-01 10:00:00");

        assert_eq!(alerts[1].severity, AlertSeverity::Other("none".to_string()));
        assert!(alerts[1].starts_at.is_none());
        assert!(alerts[1].pod.is_empty());
    }

    #[test]
    fn test_parse_empty_output() {
        assert!(parse_alerts("  \n").unwrap().is_empty());
        assert!(parse_alerts("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_garbage_is_error() {
        assert!(parse_alerts("error: connection refused").is_err());
    }
}
