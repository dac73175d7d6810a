use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::{
    app::{AppState, Focus},
    ui::{
        Layout, Theme,
        components::{ListSelector, ListSelectorExt, OutputPanel, StatusBar, dashboard_hints},
    },
};

const LOGO: [&str; 3] = [
    "╻ ╻┏━╸┏━┓╻  ╺┳╸╻ ╻┏━╸╺┳╸╻  ",
    "┣━┫┣╸ ┣━┫┃   ┃ ┣━┫┃   ┃ ┃  ",
    "╹ ╹┗━╸╹ ╹┗━╸ ╹ ╹ ╹┗━╸ ╹ ┗━╸",
];

/// Main screen once a cluster is connected
pub struct DashboardScreen;

impl DashboardScreen {
    pub fn render(frame: &mut Frame, state: &mut AppState) {
        let (header, tools, output, status) = Layout::dashboard(frame.area());

        Self::render_header(frame, header, state);
        Self::render_tools(frame, tools, state);
        OutputPanel::render(frame, output, state);
        Self::render_status_bar(frame, status, state);
    }

    fn render_header(frame: &mut Frame, area: Rect, state: &AppState) {
        let (details_area, shortcuts_area, logo_area) = Layout::dashboard_header(area);

        let details = match &state.cluster {
            Some(cluster) => vec![
                Self::detail("Context", cluster.context.clone()),
                Self::detail("Cluster", cluster.cluster.clone()),
                Self::detail("Nodes", cluster.node_counts()),
                Self::detail("Apiserver", cluster.api_server.clone()),
                Self::detail(
                    "Version",
                    cluster
                        .server_version
                        .clone()
                        .unwrap_or_else(|| "unknown".to_string()),
                ),
            ],
            None => vec![Line::from(Span::styled("Not connected", Theme::text_dim()))],
        };
        let details = Paragraph::new(details).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border())
                .title(Span::styled(" Cluster ", Theme::title())),
        );
        frame.render_widget(details, details_area);

        let shortcuts = Paragraph::new(vec![
            Self::shortcut("Ctrl+R", "Run tool"),
            Self::shortcut("Ctrl+S", "Stop tool"),
            Self::shortcut("Ctrl+O", "Export report"),
            Self::shortcut("a", "Active alerts"),
            Self::shortcut("?", "Help"),
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border())
                .title(Span::styled(" Shortcuts ", Theme::title())),
        );
        frame.render_widget(shortcuts, shortcuts_area);

        let mut logo: Vec<Line> = vec![Line::from("")];
        logo.extend(
            LOGO.iter()
                .map(|row| Line::from(Span::styled(*row, Theme::text_highlight().fg(Theme::LOGO)))),
        );
        let logo = Paragraph::new(logo).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border()),
        );
        frame.render_widget(logo, logo_area);
    }

    fn detail(name: &'static str, value: String) -> Line<'static> {
        Line::from(vec![
            Span::styled(format!("{:<10}", format!("{}:", name)), Theme::label()),
            Span::styled(value, Theme::text()),
        ])
    }

    fn shortcut(key: &'static str, desc: &'static str) -> Line<'static> {
        Line::from(vec![
            Span::styled(format!("<{}>", key), Theme::label()),
            Span::styled(format!(" {}", desc), Theme::text()),
        ])
    }

    fn render_tools(frame: &mut Frame, area: Rect, state: &mut AppState) {
        let running = state.running;
        let items = state.tools.iter().map(|tool| {
            let style = if Some(*tool) == running {
                Theme::list_item_current()
            } else if tool.is_mutating() {
                Theme::list_item_mutating()
            } else {
                Theme::list_item()
            };
            (tool.label(), style)
        });

        let selector = ListSelector::new(" Tools ")
            .styled_items(items)
            .focused(state.ui_state.focus == Focus::Tools);

        frame.render_list_selector(area, selector, &mut state.ui_state.tools_state);
    }

    fn render_status_bar(frame: &mut Frame, area: Rect, state: &AppState) {
        let right = match (&state.running, &state.ui_state.status_message) {
            (Some(tool), _) => format!("running: {}", tool.label()),
            (None, Some(message)) => message.clone(),
            (None, None) => state.selected_context.clone().unwrap_or_default(),
        };

        let status = StatusBar::new()
            .hints(dashboard_hints(state.ui_state.focus))
            .right(right);

        frame.render_widget(status, area);
    }
}
