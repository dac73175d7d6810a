//! SMF monitor check
//!
//! The monitor pod serves a plain-text status page. Each critical service is
//! printed on one line as `|`-separated segments, for example:
//!
//! ```text
//! ServiceName: smf-sm | Current No Of Instances: Available : 3 | Minimum No Of Instances Required: 2, Threshold: 50 | Status: UP
//! ```

use k8s_openapi::api::core::v1::Pod;
use tracing::debug;

use healthctl_k8s::exec_shell;
use healthctl_types::{CheckResult, SmfSettings};

use crate::cluster::list_in;

const LABEL: &str = "SMF Monitor";
const SECTION_TITLE: &str = "Critical Ready Services Monitoring Status";

const CURRENT_MARKERS: [&str; 2] = ["Current No Of Instances", "Current Available Servers Count"];
const MINIMUM_MARKERS: [&str; 3] = [
    "Minimum No Of Instances Required",
    "Minimum No Of Clusters Required",
    "Minimum No Of Servers Required",
];

/// Shell command printing the monitor's critical-services section
pub fn monitor_command(url: &str) -> String {
    format!("curl -s {} | grep -A26 '{}'", url, SECTION_TITLE)
}

pub async fn check_smf_monitor(client: &kube::Client, settings: &SmfSettings) -> Vec<CheckResult> {
    let selector = Some(settings.monitor_selector.as_str());
    let pods = match list_in::<Pod>(client, &settings.namespace, selector).await {
        Ok(pods) => pods,
        Err(e) => {
            debug!(error = %e, "monitor pod lookup failed");
            Vec::new()
        }
    };

    let Some(pod) = pods.first().and_then(|p| p.metadata.name.as_deref()) else {
        return vec![CheckResult::fail(LABEL, "Failed to find smf-monitor pod")];
    };

    let output = match exec_shell(
        client,
        &settings.namespace,
        pod,
        &settings.monitor_container,
        &monitor_command(&settings.monitor_url),
    )
    .await
    {
        Ok(output) => output,
        Err(e) => {
            debug!(pod, error = %e, "monitor exec failed");
            return vec![CheckResult::fail(
                LABEL,
                format!("Failed to query monitor in {}", pod),
            )];
        }
    };

    let results = parse_monitor_output(&output.stdout);
    if results.is_empty() {
        return vec![CheckResult::fail(
            LABEL,
            "No service status found in monitor output",
        )];
    }
    results
}

/// `:`-separated field `index` of a segment, trimmed; empty when absent
fn field(segment: &str, index: usize) -> &str {
    segment.split(':').nth(index).unwrap_or_default().trim()
}

/// Parse every `ServiceName:` line into a record that passes iff its status is UP
pub fn parse_monitor_output(output: &str) -> Vec<CheckResult> {
    output
        .lines()
        .filter(|line| line.contains("ServiceName:"))
        .map(parse_service_line)
        .collect()
}

fn parse_service_line(line: &str) -> CheckResult {
    let segments: Vec<&str> = line.split('|').collect();
    let name = field(segments.first().copied().unwrap_or_default(), 1);

    let mut current = "";
    let mut minimum = "";
    let mut status = "";

    for segment in &segments {
        if CURRENT_MARKERS.iter().any(|m| segment.contains(m)) {
            current = field(segment, 2);
        }
        if MINIMUM_MARKERS.iter().any(|m| segment.contains(m)) {
            minimum = field(segment, 1)
                .split(',')
                .next()
                .unwrap_or_default()
                .trim();
        }
        if segment.contains("Status") {
            status = field(segment, 1);
        }
    }

    CheckResult::new(
        name,
        format!("Service {}: Avl: {}, Min Req: {}", name, current, minimum),
        status == "UP",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTPUT: &str = "\
========== Critical Ready Services Monitoring Status ==========
ServiceName: smf-sm | Current No Of Instances: Available : 3 | Minimum No Of Instances Required: 2, Threshold: 50 | Status: UP
ServiceName: cdb | Current Available Servers Count: Ready : 1 | Minimum No Of Servers Required: 2 | Status: DOWN
ServiceName: redis | Current No Of Instances: Available : 6 | Minimum No Of Clusters Required: 1 | Status: UP
--
";

    #[test]
    fn test_parse_services() {
        let results = parse_monitor_output(OUTPUT);
        assert_eq!(results.len(), 3);

        assert_eq!(
            results[0],
            CheckResult::pass("smf-sm", "Service smf-sm: Avl: 3, Min Req: 2")
        );
        assert_eq!(
            results[1],
            CheckResult::fail("cdb", "Service cdb: Avl: 1, Min Req: 2")
        );
        assert_eq!(results[2].details, "Service redis: Avl: 6, Min Req: 1");
        assert!(results[2].passed);
    }

    #[test]
    fn test_malformed_line_yields_empty_fields() {
        let results = parse_monitor_output("ServiceName: | Current No Of Instances | Status");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].label, "");
        assert_eq!(results[0].details, "Service : Avl: , Min Req: ");
        assert!(!results[0].passed);
    }

    #[test]
    fn test_no_service_lines() {
        assert!(parse_monitor_output("").is_empty());
        assert!(parse_monitor_output("curl: (7) Failed to connect").is_empty());
    }

    #[test]
    fn test_monitor_command() {
        assert_eq!(
            monitor_command("http://127.0.0.1:9090/info"),
            "curl -s http://127.0.0.1:9090/info | grep -A26 'Critical Ready Services Monitoring Status'"
        );
    }
}
