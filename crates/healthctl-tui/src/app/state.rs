use ratatui::widgets::ListState;
use tokio::sync::mpsc;

use healthctl_types::{Alert, ClusterSummary, ContextInfo, RedisStatus, SuiteReport, Tool};

use super::{Action, DebugFormState};

/// Screen enumeration
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    ContextSelect,
    Dashboard,
}

/// Dashboard pane receiving list keys
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Tools,
    Output,
}

/// What the output panel shows
#[derive(Clone, Debug)]
pub enum OutputView {
    Welcome,
    Running(Tool),
    Report(SuiteReport),
    Alerts(Vec<Alert>),
    Redis(RedisStatus),
    Lines { title: String, lines: Vec<String> },
}

impl OutputView {
    pub fn lines(title: impl Into<String>, lines: Vec<String>) -> Self {
        Self::Lines {
            title: title.into(),
            lines,
        }
    }
}

/// Pending confirmation before a tool runs
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfirmState {
    pub tool: Tool,
    pub cluster: String,
    /// Whether "Start" (rather than "Cancel") is highlighted
    pub start_selected: bool,
}

impl ConfirmState {
    pub fn message(&self) -> String {
        format!(
            "Executing {} command on {} cluster",
            self.tool.label(),
            self.cluster
        )
    }
}

/// UI-specific transient state
pub struct UiState {
    /// Is help overlay visible?
    pub help_visible: bool,

    /// List state for the context list
    pub list_state: ListState,

    /// List state for the dashboard tools menu
    pub tools_state: ListState,

    /// Dashboard pane receiving list keys
    pub focus: Focus,

    /// Scroll position in the output panel
    pub output_scroll: usize,

    /// Error message to display (if any)
    pub error_message: Option<String>,

    /// Informational message for the status bar
    pub status_message: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            help_visible: false,
            list_state: ListState::default().with_selected(Some(0)),
            tools_state: ListState::default().with_selected(Some(0)),
            focus: Focus::Tools,
            output_scroll: 0,
            error_message: None,
            status_message: None,
        }
    }
}

/// Global application state
pub struct AppState {
    /// Current screen being displayed
    pub current_screen: Screen,

    /// Navigation stack for back navigation
    pub screen_stack: Vec<Screen>,

    /// Available Kubernetes contexts
    pub contexts: Vec<ContextInfo>,

    /// Connected Kubernetes context
    pub selected_context: Option<String>,

    /// Header details of the connected cluster
    pub cluster: Option<ClusterSummary>,

    /// Dashboard tools menu
    pub tools: Vec<Tool>,

    /// Output panel content
    pub output: OutputView,

    /// Tool currently executing
    pub running: Option<Tool>,

    /// Most recent suite report, kept for export
    pub last_report: Option<SuiteReport>,

    /// Open confirmation dialog
    pub confirm: Option<ConfirmState>,

    /// Open debug level form
    pub debug_form: Option<DebugFormState>,

    /// UI state
    pub ui_state: UiState,

    /// Whether app should quit
    pub should_quit: bool,

    /// Channel sender for async actions
    pub action_tx: mpsc::UnboundedSender<Action>,

    /// Ticks since start, drives the running indicator
    pub tick: u64,
}

impl AppState {
    pub fn new(action_tx: mpsc::UnboundedSender<Action>) -> Self {
        Self {
            current_screen: Screen::ContextSelect,
            screen_stack: Vec::new(),
            contexts: Vec::new(),
            selected_context: None,
            cluster: None,
            tools: Tool::ALL.to_vec(),
            output: OutputView::Welcome,
            running: None,
            last_report: None,
            confirm: None,
            debug_form: None,
            ui_state: UiState::default(),
            should_quit: false,
            action_tx,
            tick: 0,
        }
    }

    /// Navigate to a new screen, pushing current to stack
    pub fn navigate_to(&mut self, screen: Screen) {
        self.screen_stack.push(self.current_screen.clone());
        self.current_screen = screen;
    }

    /// Go back to previous screen
    pub fn go_back(&mut self) -> bool {
        if let Some(prev_screen) = self.screen_stack.pop() {
            self.current_screen = prev_screen;
            true
        } else {
            false
        }
    }

    /// Enter the dashboard for a freshly connected cluster
    pub fn connected(&mut self, summary: ClusterSummary) {
        self.selected_context = Some(summary.context.clone());
        self.cluster = Some(summary);
        self.output = OutputView::Welcome;
        self.last_report = None;
        self.ui_state.focus = Focus::Tools;
        self.ui_state.tools_state.select(Some(0));
        self.ui_state.output_scroll = 0;
        self.navigate_to(Screen::Dashboard);
    }

    /// Leave the dashboard, forgetting the connected cluster
    pub fn disconnect(&mut self) {
        self.cluster = None;
        self.selected_context = None;
        self.running = None;
        self.confirm = None;
        self.debug_form = None;
    }

    fn list_state_mut(&mut self) -> Option<(&mut ListState, usize)> {
        match self.current_screen {
            Screen::ContextSelect => Some((&mut self.ui_state.list_state, self.contexts.len())),
            Screen::Dashboard if self.ui_state.focus == Focus::Tools => {
                Some((&mut self.ui_state.tools_state, self.tools.len()))
            }
            Screen::Dashboard => None,
        }
    }

    /// Move selection up
    pub fn list_up(&mut self) {
        let Some((list_state, len)) = self.list_state_mut() else {
            return;
        };
        if len == 0 {
            return;
        }

        let i = match list_state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        list_state.select(Some(i));
    }

    /// Move selection down
    pub fn list_down(&mut self) {
        let Some((list_state, len)) = self.list_state_mut() else {
            return;
        };
        if len == 0 {
            return;
        }

        let i = match list_state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        list_state.select(Some(i));
    }

    /// Get currently selected index of the context list
    pub fn selected_index(&self) -> Option<usize> {
        self.ui_state.list_state.selected()
    }

    /// Tool highlighted in the dashboard menu
    pub fn selected_tool(&self) -> Option<Tool> {
        self.ui_state
            .tools_state
            .selected()
            .and_then(|i| self.tools.get(i))
            .copied()
    }

    pub fn toggle_focus(&mut self) {
        self.ui_state.focus = match self.ui_state.focus {
            Focus::Tools => Focus::Output,
            Focus::Output => Focus::Tools,
        };
    }

    /// Cluster name shown in confirmation prompts
    pub fn cluster_name(&self) -> String {
        self.cluster
            .as_ref()
            .map(|c| c.cluster.clone())
            .or_else(|| self.selected_context.clone())
            .unwrap_or_default()
    }

    /// Ask before running `tool`
    pub fn request_confirmation(&mut self, tool: Tool) {
        self.confirm = Some(ConfirmState {
            tool,
            cluster: self.cluster_name(),
            start_selected: true,
        });
    }

    pub fn toggle_confirm_choice(&mut self) {
        if let Some(confirm) = &mut self.confirm {
            confirm.start_selected = !confirm.start_selected;
        }
    }

    /// Close the dialog, returning the tool when "Start" was chosen
    pub fn accept_confirmation(&mut self) -> Option<Tool> {
        let confirm = self.confirm.take()?;
        confirm.start_selected.then_some(confirm.tool)
    }

    /// Replace the output panel content
    pub fn set_output(&mut self, output: OutputView) {
        self.output = output;
        self.ui_state.output_scroll = 0;
    }

    /// Mark `tool` as executing
    pub fn start_running(&mut self, tool: Tool) {
        self.running = Some(tool);
        self.ui_state.status_message = None;
        self.set_output(OutputView::Running(tool));
    }

    /// Show a tool's result and clear the running marker
    pub fn finish_running(&mut self, output: OutputView) {
        if let OutputView::Report(report) = &output {
            self.last_report = Some(report.clone());
        }
        self.running = None;
        self.set_output(output);
    }

    pub fn scroll_up(&mut self, n: usize) {
        self.ui_state.output_scroll = self.ui_state.output_scroll.saturating_sub(n);
    }

    /// Not capped here; rendering clamps to the content length
    pub fn scroll_down(&mut self, n: usize) {
        self.ui_state.output_scroll = self.ui_state.output_scroll.saturating_add(n);
    }

    /// Show an error message
    pub fn show_error(&mut self, msg: String) {
        self.ui_state.error_message = Some(msg);
    }

    /// Dismiss the error message
    pub fn dismiss_error(&mut self) {
        self.ui_state.error_message = None;
    }

    pub fn show_status(&mut self, msg: String) {
        self.ui_state.status_message = Some(msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use healthctl_types::{CheckResult, SuiteKind};

    fn state() -> AppState {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut state = AppState::new(tx);
        state.contexts = vec![
            ContextInfo::new("prod".into(), "prod-cluster".into(), "admin".into(), None, true),
            ContextInfo::new("lab".into(), "lab-cluster".into(), "dev".into(), None, false),
        ];
        state
    }

    fn summary() -> ClusterSummary {
        ClusterSummary {
            context: "lab".to_string(),
            cluster: "lab-cluster".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_context_list_wraps() {
        let mut state = state();
        state.list_up();
        assert_eq!(state.selected_index(), Some(1));
        state.list_down();
        assert_eq!(state.selected_index(), Some(0));
    }

    #[test]
    fn test_connect_and_go_back() {
        let mut state = state();
        state.connected(summary());
        assert_eq!(state.current_screen, Screen::Dashboard);
        assert_eq!(state.selected_context.as_deref(), Some("lab"));

        assert!(state.go_back());
        assert_eq!(state.current_screen, Screen::ContextSelect);
        assert!(!state.go_back());
    }

    #[test]
    fn test_tools_menu_follows_focus() {
        let mut state = state();
        state.connected(summary());
        assert_eq!(state.selected_tool(), Some(Tool::Suite(SuiteKind::K8s)));

        state.list_up();
        assert_eq!(state.selected_tool(), Some(Tool::FlushRedis));

        state.toggle_focus();
        state.list_down();
        assert_eq!(state.selected_tool(), Some(Tool::FlushRedis));
    }

    #[test]
    fn test_confirmation_flow() {
        let mut state = state();
        state.connected(summary());

        state.request_confirmation(Tool::FlushRedis);
        assert_eq!(
            state.confirm.as_ref().map(|c| c.message()),
            Some("Executing Flush Redis command on lab-cluster cluster".to_string())
        );
        assert_eq!(state.accept_confirmation(), Some(Tool::FlushRedis));
        assert!(state.confirm.is_none());

        state.request_confirmation(Tool::Suite(SuiteKind::Paas));
        state.toggle_confirm_choice();
        assert_eq!(state.accept_confirmation(), None);
        assert!(state.confirm.is_none());
    }

    #[test]
    fn test_finished_report_is_kept() {
        let mut state = state();
        state.start_running(Tool::Suite(SuiteKind::K8s));
        assert_eq!(state.running, Some(Tool::Suite(SuiteKind::K8s)));

        state.scroll_down(5);
        let report = SuiteReport::new(
            SuiteKind::K8s,
            "lab",
            vec![CheckResult::pass("Nodes", "ok")],
        );
        state.finish_running(OutputView::Report(report));

        assert!(state.running.is_none());
        assert_eq!(state.ui_state.output_scroll, 0);
        assert_eq!(state.last_report.as_ref().map(|r| r.total()), Some(1));
    }

    #[test]
    fn test_scroll_saturates_at_top() {
        let mut state = state();
        state.scroll_down(3);
        state.scroll_up(10);
        assert_eq!(state.ui_state.output_scroll, 0);
    }
}
