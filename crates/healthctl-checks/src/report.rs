//! Plain-text rendering of suite reports

use unicode_width::UnicodeWidthStr;

use healthctl_types::SuiteReport;

const NO_WIDTH: usize = 5;
const RESULT_WIDTH: usize = 7;
const MIN_SUMMARY_WIDTH: usize = 40;

/// Pad `text` on both sides to `width` columns.
/// Text wider than `width` is returned unchanged.
pub fn center_text(text: &str, width: usize) -> String {
    let len = text.width();
    if len >= width {
        return text.to_string();
    }
    let left = (width - len) / 2;
    let right = width - len - left;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(right))
}

fn pad_right(text: &str, width: usize) -> String {
    let len = text.width();
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}

fn separator(summary_width: usize) -> String {
    format!(
        "+{}+{}+{}+",
        "-".repeat(NO_WIDTH + 2),
        "-".repeat(summary_width + 2),
        "-".repeat(RESULT_WIDTH + 2)
    )
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push('\n');
}

fn row(out: &mut String, no: &str, summary: &str, result: &str, summary_width: usize) {
    let line = format!("| {} | {} | {} |", no, summary, pad_right(result, RESULT_WIDTH));
    push_line(out, &line);
    push_line(out, &separator(summary_width));
}

/// Render a report as a boxed "No. | Test Summary | Result" table
pub fn render_report(report: &SuiteReport) -> String {
    let summaries: Vec<String> = report.results.iter().map(|r| r.summary()).collect();
    let summary_width = summaries
        .iter()
        .map(|s| s.width())
        .max()
        .unwrap_or(0)
        .max(MIN_SUMMARY_WIDTH);

    let mut out = String::new();
    let heading = format!(
        "{} on {} ({})",
        report.suite.label(),
        report.context,
        report.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    push_line(&mut out, &heading);
    push_line(&mut out, &separator(summary_width));
    row(
        &mut out,
        &center_text("No.", NO_WIDTH),
        &center_text("Test Summary", summary_width),
        &center_text("Result", RESULT_WIDTH),
        summary_width,
    );

    for (index, (result, summary)) in report.results.iter().zip(&summaries).enumerate() {
        row(
            &mut out,
            &center_text(&(index + 1).to_string(), NO_WIDTH),
            &pad_right(summary, summary_width),
            result.verdict(),
            summary_width,
        );
    }

    row(
        &mut out,
        &" ".repeat(NO_WIDTH),
        &center_text("Total Tests", summary_width),
        &report.total().to_string(),
        summary_width,
    );
    push_line(
        &mut out,
        &format!("Passed: {}, Failed: {}", report.passed(), report.failed()),
    );
    if report.interrupted {
        push_line(&mut out, "Interrupted: remaining checks were not run");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use healthctl_types::{CheckResult, SuiteKind};

    #[test]
    fn test_center_text() {
        assert_eq!(center_text("No.", 5), " No. ");
        assert_eq!(center_text("ab", 5), " ab  ");
        assert_eq!(center_text("Result", 7), "Result ");
    }

    #[test]
    fn test_center_text_too_wide() {
        assert_eq!(center_text("Total Tests", 4), "Total Tests");
        assert_eq!(center_text("exact", 5), "exact");
    }

    #[test]
    fn test_render_report() {
        let report = SuiteReport::new(
            SuiteKind::Infra,
            "lab",
            vec![
                CheckResult::pass("OPA", "OPA is Up"),
                CheckResult::fail("MetalLB", "No MetalLB pods found"),
            ],
        );

        let text = render_report(&report);
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("Infra health on lab ("));
        assert!(lines[2].contains("No."));
        assert!(lines[2].contains("Test Summary"));
        assert!(lines[4].contains("OPA is Up"));
        assert!(lines[4].contains("| PASS    |"));
        assert!(lines[6].contains("| FAIL    |"));
        assert!(lines[8].contains("Total Tests"));
        assert!(lines[8].contains("| 2       |"));
        assert_eq!(lines.last(), Some(&"Passed: 1, Failed: 1"));

        // Every table line has the same width
        let widths: Vec<usize> = lines[1..lines.len() - 1].iter().map(|l| l.width()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_render_interrupted_report() {
        let report = SuiteReport::new(
            SuiteKind::Paas,
            "lab",
            vec![CheckResult::pass("OPA", "OPA is Up")],
        )
        .mark_interrupted();

        let text = render_report(&report);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[lines.len() - 2], "Passed: 1, Failed: 0");
        assert_eq!(
            lines.last(),
            Some(&"Interrupted: remaining checks were not run")
        );

        let complete = SuiteReport::new(SuiteKind::Paas, "lab", Vec::new());
        assert!(!render_report(&complete).contains("Interrupted"));
    }

    #[test]
    fn test_summary_column_grows() {
        let long = "x".repeat(MIN_SUMMARY_WIDTH + 10);
        let report = SuiteReport::new(
            SuiteKind::K8s,
            "prod",
            vec![CheckResult::pass("Pods", long.clone())],
        );
        let text = render_report(&report);
        assert!(text.contains(&long));
        assert!(text.lines().nth(1).unwrap().width() > MIN_SUMMARY_WIDTH + 10);
    }
}
