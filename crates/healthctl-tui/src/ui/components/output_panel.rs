use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout as RatatuiLayout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use healthctl_types::{Alert, RedisStatus, SuiteReport, Tool};

use crate::app::{AppState, Focus, OutputView};
use crate::ui::Theme;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Right-hand dashboard pane showing tool results
pub struct OutputPanel;

impl OutputPanel {
    pub fn render(frame: &mut Frame, area: Rect, state: &mut AppState) {
        let focused = state.ui_state.focus == Focus::Output;
        let title = Self::title(&state.output);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border_for(focused))
            .title(Span::styled(title, Theme::title()));

        let inner = block.inner(area);
        frame.render_widget(block, area);

        match &state.output {
            OutputView::Welcome => Self::render_welcome(frame, inner),
            OutputView::Running(tool) => Self::render_running(frame, inner, *tool, state.tick),
            OutputView::Report(report) => {
                let rows = report_rows(report);
                // One line goes to the table header
                let scroll = clamp_scroll(
                    state.ui_state.output_scroll,
                    rows.len(),
                    inner.height.saturating_sub(1) as usize,
                );
                state.ui_state.output_scroll = scroll;
                Self::render_report(frame, inner, rows, scroll);
            }
            OutputView::Alerts(alerts) => {
                let rows = alert_rows(alerts);
                let scroll = clamp_scroll(
                    state.ui_state.output_scroll,
                    rows.len(),
                    inner.height.saturating_sub(1) as usize,
                );
                state.ui_state.output_scroll = scroll;
                Self::render_alerts(frame, inner, rows, scroll);
            }
            OutputView::Redis(status) => {
                let scroll = clamp_scroll(
                    state.ui_state.output_scroll,
                    status.nodes.len(),
                    inner.height.saturating_sub(REDIS_SUMMARY_HEIGHT + 1) as usize,
                );
                state.ui_state.output_scroll = scroll;
                Self::render_redis(frame, inner, status, scroll);
            }
            OutputView::Lines { lines, .. } => {
                let scroll = clamp_scroll(
                    state.ui_state.output_scroll,
                    lines.len(),
                    inner.height as usize,
                );
                state.ui_state.output_scroll = scroll;
                let text: Vec<Line> = lines
                    .iter()
                    .map(|l| Line::from(Span::styled(l.as_str(), Theme::text())))
                    .collect();
                let paragraph = Paragraph::new(text).scroll((scroll as u16, 0));
                frame.render_widget(paragraph, inner);
            }
        }
    }

    fn title(output: &OutputView) -> String {
        match output {
            OutputView::Report(report) => format!(
                " {} on {} ({} UTC{}) ",
                report.suite.label(),
                report.context,
                report.finished_at.format("%H:%M:%S"),
                if report.interrupted { ", interrupted" } else { "" }
            ),
            OutputView::Alerts(_) => " Active Alerts ".to_string(),
            OutputView::Redis(_) => " Redis status ".to_string(),
            OutputView::Lines { title, .. } => format!(" {} ", title),
            OutputView::Welcome | OutputView::Running(_) => " Output ".to_string(),
        }
    }

    fn render_welcome(frame: &mut Frame, area: Rect) {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled("Welcome to healthctl", Theme::text_highlight())),
            Line::from(""),
            Line::from(Span::styled(
                "Pick a tool on the left and press Enter or Ctrl+R to run it.",
                Theme::text(),
            )),
            Line::from(Span::styled(
                "Suites and Flush Redis ask for confirmation first.",
                Theme::text_dim(),
            )),
            Line::from(Span::styled(
                "Press a for active alerts, ? for all keys.",
                Theme::text_dim(),
            )),
        ];
        frame.render_widget(Paragraph::new(text), area);
    }

    fn render_running(frame: &mut Frame, area: Rect, tool: Tool, tick: u64) {
        let frame_char = SPINNER[(tick % SPINNER.len() as u64) as usize];
        let text = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled(format!(" {} ", frame_char), Theme::text_highlight()),
                Span::styled(format!("Running {}...", tool.label()), Theme::text()),
            ]),
            Line::from(""),
            Line::from(Span::styled(" Ctrl+S stops it", Theme::text_dim())),
        ];
        frame.render_widget(Paragraph::new(text), area);
    }

    fn render_report(frame: &mut Frame, area: Rect, rows: Vec<Row<'static>>, scroll: usize) {
        let header = Row::new(["No.", "Test Summary", "Result"]).style(Theme::table_header());
        let table = Table::new(
            rows.into_iter().skip(scroll),
            [
                Constraint::Length(5),
                Constraint::Min(40),
                Constraint::Length(8),
            ],
        )
        .header(header);
        frame.render_widget(table, area);
    }

    fn render_alerts(frame: &mut Frame, area: Rect, rows: Vec<Row<'static>>, scroll: usize) {
        let header = Row::new(["Alertname", "Severity", "Starts At", "Pod Name", "Summary"])
            .style(Theme::table_header());
        let table = Table::new(
            rows.into_iter().skip(scroll),
            [
                Constraint::Length(30),
                Constraint::Length(9),
                Constraint::Length(20),
                Constraint::Percentage(25),
                Constraint::Min(20),
            ],
        )
        .header(header);
        frame.render_widget(table, area);
    }

    fn render_redis(frame: &mut Frame, area: Rect, status: &RedisStatus, scroll: usize) {
        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(REDIS_SUMMARY_HEIGHT), Constraint::Min(1)])
            .split(area);

        let healthy = status.pods_ready && status.cluster_ok;
        let summary: Vec<Line> = redis_summary_lines(status)
            .into_iter()
            .enumerate()
            .map(|(i, line)| {
                // The last line is the overall verdict
                let style = if i + 1 == REDIS_SUMMARY_HEIGHT as usize {
                    Theme::verdict(healthy)
                } else {
                    Theme::text()
                };
                Line::from(Span::styled(line, style))
            })
            .collect();
        frame.render_widget(Paragraph::new(summary), chunks[0]);

        let header = Row::new([
            "PodName", "PodIp", "RedisNodeId", "WorkerNode", "Zone", "CPU", "Memory",
        ])
        .style(Theme::table_header());
        let rows = status.nodes.iter().skip(scroll).map(|node| {
            let placement = status.placements.get(&node.pod_name);
            Row::new(vec![
                node.pod_name.clone(),
                node.ip.clone(),
                node.id.clone(),
                placement.map(|p| p.worker.clone()).unwrap_or_default(),
                node.zone.clone(),
                placement.map(|p| p.cpu.clone()).unwrap_or_default(),
                placement.map(|p| p.memory.clone()).unwrap_or_default(),
            ])
        });
        let table = Table::new(
            rows,
            [
                Constraint::Length(22),
                Constraint::Length(15),
                Constraint::Length(16),
                Constraint::Min(16),
                Constraint::Length(8),
                Constraint::Length(6),
                Constraint::Length(8),
            ],
        )
        .header(header);
        frame.render_widget(table, chunks[1]);
    }
}

const REDIS_SUMMARY_HEIGHT: u16 = 12;

/// Header lines of the Redis status view
pub fn redis_summary_lines(status: &RedisStatus) -> Vec<String> {
    let pods = if status.pods_ready {
        "All redis cluster pods are in n/n ready state"
    } else {
        "Redis cluster pods are NOT in n/n ready state"
    };
    let verdict = if status.pods_ready && status.cluster_ok {
        "Redis Cluster is working as expected"
    } else {
        "Redis Cluster is NOT working as expected"
    };

    vec![
        format!("Number of Primaries Configured: {}", status.primaries_configured),
        format!("Number of Replicas Configured: {}", status.replicas_configured),
        pods.to_string(),
        format!(
            "cluster_state: {}",
            if status.cluster_ok { "ok" } else { "fail" }
        ),
        format!("cluster_slots_ok: {}", status.slots_ok),
        format!("cluster_known_nodes: {}", status.known_nodes),
        format!("cluster_size: {}", status.cluster_size),
        format!("cluster_slots_pfail: {}", status.slots_pfail),
        format!("cluster_slots_fail: {}", status.slots_fail),
        format!("Number of Active zones: {}", status.active_zones),
        format!(
            "Number of zones where Redis primaries are present: {}",
            status.primary_zones
        ),
        verdict.to_string(),
    ]
}

fn report_rows(report: &SuiteReport) -> Vec<Row<'static>> {
    let mut rows: Vec<Row> = report
        .results
        .iter()
        .enumerate()
        .map(|(i, result)| {
            Row::new(vec![
                Cell::from((i + 1).to_string()),
                Cell::from(result.summary()),
                Cell::from(Span::styled(result.verdict(), Theme::verdict(result.passed))),
            ])
        })
        .collect();

    rows.push(
        Row::new(vec![
            Cell::from(""),
            Cell::from(format!(
                "Total Tests: {} (Passed: {}, Failed: {})",
                report.total(),
                report.passed(),
                report.failed()
            )),
            Cell::from(""),
        ])
        .style(Theme::label()),
    );
    rows
}

fn alert_rows(alerts: &[Alert]) -> Vec<Row<'static>> {
    let mut rows: Vec<Row> = alerts
        .iter()
        .map(|alert| {
            Row::new(vec![
                Cell::from(alert.name.clone()),
                Cell::from(Span::styled(
                    alert.severity.as_str().to_string(),
                    Style::default().fg(alert.severity.color()),
                )),
                Cell::from(alert.starts_at_display()),
                Cell::from(alert.pod.clone()),
                Cell::from(alert.summary.clone()),
            ])
        })
        .collect();

    rows.push(
        Row::new(vec![Cell::from(format!("Total Alerts: {}", alerts.len()))])
            .style(Theme::label()),
    );
    rows
}

/// Largest offset that still fills the visible area
fn clamp_scroll(scroll: usize, total: usize, visible: usize) -> usize {
    scroll.min(total.saturating_sub(visible))
}

#[cfg(test)]
mod tests {
    use super::*;
    use healthctl_types::{CheckResult, SuiteKind};

    #[test]
    fn test_clamp_scroll() {
        assert_eq!(clamp_scroll(100, 30, 10), 20);
        assert_eq!(clamp_scroll(5, 30, 10), 5);
        assert_eq!(clamp_scroll(5, 3, 10), 0);
    }

    #[test]
    fn test_report_rows_include_total() {
        let report = SuiteReport::new(
            SuiteKind::Upf,
            "lab",
            vec![
                CheckResult::pass("upf", "Deployment: upf-0"),
                CheckResult::fail("upf-cp", "Deployment: upf-cp-0"),
            ],
        );
        assert_eq!(report_rows(&report).len(), 3);
        assert_eq!(alert_rows(&[]).len(), 1);
    }

    #[test]
    fn test_redis_summary_lines() {
        let status = RedisStatus {
            primaries_configured: 3,
            replicas_configured: 1,
            pods_ready: true,
            cluster_ok: true,
            known_nodes: 6,
            cluster_size: 3,
            slots_ok: 16384,
            active_zones: 2,
            primary_zones: 2,
            ..Default::default()
        };
        let lines = redis_summary_lines(&status);
        assert_eq!(lines.len(), REDIS_SUMMARY_HEIGHT as usize);
        assert_eq!(lines[0], "Number of Primaries Configured: 3");
        assert_eq!(lines[3], "cluster_state: ok");
        assert_eq!(lines[4], "cluster_slots_ok: 16384");
        assert_eq!(lines[7], "cluster_slots_pfail: 0");
        assert_eq!(lines[8], "cluster_slots_fail: 0");
        assert_eq!(
            lines[10],
            "Number of zones where Redis primaries are present: 2"
        );
        assert_eq!(lines[11], "Redis Cluster is working as expected");

        let broken = RedisStatus {
            pods_ready: false,
            ..status
        };
        let lines = redis_summary_lines(&broken);
        assert_eq!(lines[2], "Redis cluster pods are NOT in n/n ready state");
        assert_eq!(lines[11], "Redis Cluster is NOT working as expected");
    }
}
