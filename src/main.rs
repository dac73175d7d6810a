mod config;
mod tools;

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use healthctl_checks::{SuiteRunner, render_report};
use healthctl_k8s::KubeClient;
use healthctl_tui::{
    Action, AppState, ConfirmDialog, ContextSelectScreen, DashboardScreen, DebugForm,
    DebugFormState, ErrorPopup, Event, EventHandler, Focus, FormEvent, HelpOverlay, KeyBindings,
    KeyContext, OutputView, Screen, Tui,
};
use healthctl_types::{ClusterSummary, Settings, SuiteKind, SuiteReport, Tool};

use crate::tools::{Job, ToolEnv, ToolFinished, ToolRunner};

/// Lines moved by PgUp/PgDn in the output panel
const PAGE_SIZE: usize = 20;

/// healthctl - Kubernetes cluster health checks in the terminal
#[derive(Parser, Debug)]
#[command(name = "healthctl")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Kubernetes context name (optional, will prompt if not provided)
    #[arg(value_name = "CONTEXT")]
    context: Option<String>,

    /// Kubeconfig file to use instead of the default one
    #[arg(long, value_name = "PATH")]
    kubeconfig: Option<PathBuf>,

    /// Settings file (default: <config dir>/healthctl/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Run one suite without the dashboard, print the report and exit
    #[arg(long, value_name = "SUITE", value_parser = parse_suite)]
    suite: Option<SuiteKind>,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Dashboard refresh interval in milliseconds
    #[arg(long, default_value = "250")]
    tick_rate_ms: u64,
}

fn parse_suite(name: &str) -> Result<SuiteKind, String> {
    SuiteKind::from_cli_name(name).ok_or_else(|| {
        let names: Vec<&str> = SuiteKind::ALL.iter().map(|k| k.cli_name()).collect();
        format!("unknown suite '{}', expected one of: {}", name, names.join(", "))
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_tracing(args.log_file.as_deref()) {
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }

    let result = match args.suite {
        Some(kind) => run_headless(&args, kind).await,
        None => run_app(args).await.map(|()| true),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            builder.with_writer(Mutex::new(file)).with_ansi(false).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }

    Ok(())
}

/// Run a single suite, print its table and report whether every check passed
async fn run_headless(args: &Args, kind: SuiteKind) -> Result<bool> {
    let settings = Arc::new(config::load_settings(args.config.as_deref())?);
    let kube = KubeClient::load(args.kubeconfig.as_deref())?;

    let context = match &args.context {
        Some(context) => context.clone(),
        None => kube
            .current_context()
            .context("No context given and the kubeconfig has no current context")?
            .to_string(),
    };
    let client = kube.client_for_context(&context).await?;

    // Ctrl+C stops the run; the checks completed so far are still printed
    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let report = SuiteRunner::new(client, settings, context)
        .with_cancellation(cancel)
        .run(kind)
        .await;
    println!("{}", render_report(&report));

    // An interrupted run never counts as a pass
    Ok(report.all_passed())
}

/// Internal actions for async operations
#[derive(Debug)]
enum InternalAction {
    Connect(String),
    Disconnect,
    StartTool(Tool),
    StopTool,
    OpenDebugForm,
    Form(FormEvent),
}

async fn run_app(args: Args) -> Result<()> {
    let settings = Arc::new(config::load_settings(args.config.as_deref())?);
    let kube = Arc::new(KubeClient::load(args.kubeconfig.as_deref())?);

    // Create action channels
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (internal_tx, mut internal_rx) = mpsc::unbounded_channel::<InternalAction>();
    let (finished_tx, mut finished_rx) = mpsc::unbounded_channel::<ToolFinished>();

    let mut state = AppState::new(action_tx.clone());
    state.contexts = kube.get_contexts();
    if let Some(current) = state.contexts.iter().position(|c| c.is_current) {
        state.ui_state.list_state.select(Some(current));
    }

    // Tool runner of the connected context
    let mut session: Option<ToolRunner> = None;

    // Connect before entering the alternate screen so errors print plainly
    if let Some(context_name) = &args.context {
        if !state.contexts.iter().any(|c| &c.name == context_name) {
            bail!("Context '{}' not found in kubeconfig", context_name);
        }
        let (client, summary) = connect(&kube, context_name).await?;
        session = Some(new_session(client, &kube, &settings, context_name));
        state.connected(summary);
    }

    let mut tui = Tui::new()?;
    let mut events = EventHandler::new(Duration::from_millis(args.tick_rate_ms.max(16)));
    let keybindings = KeyBindings::new();

    render(&mut tui, &mut state)?;

    // Main event loop
    loop {
        tokio::select! {
            // Handle terminal events
            Some(event) = events.next() => {
                match event {
                    Event::Key(key) => {
                        // Any key dismisses the error popup
                        if state.ui_state.error_message.is_some() {
                            let _ = action_tx.send(Action::DismissError);
                        } else if let Some(action) = keybindings.get_action(key_context(&state), &key) {
                            let _ = action_tx.send(action);
                        }
                    }
                    Event::Tick => {
                        let _ = action_tx.send(Action::Tick);
                    }
                    Event::Resize(_, _) => {
                        let _ = action_tx.send(Action::Render);
                    }
                    Event::Error(e) => {
                        state.show_error(e);
                    }
                }
            }

            // Handle user actions
            Some(action) = action_rx.recv() => {
                handle_action(&mut state, &internal_tx, action);
            }

            // Handle finished tool runs
            Some(finished) = finished_rx.recv() => {
                let accepted = session.as_mut().is_some_and(|runner| runner.finish(finished.id));
                if accepted {
                    show_tool_result(&mut state, finished);
                } else {
                    debug!(id = finished.id, tool = %finished.tool, "dropping superseded tool result");
                }
            }

            // Handle internal async actions
            Some(internal) = internal_rx.recv() => {
                match internal {
                    InternalAction::Connect(context_name) => {
                        state.ui_state.status_message = None;
                        match connect(&kube, &context_name).await {
                            Ok((client, summary)) => {
                                session = Some(new_session(client, &kube, &settings, &context_name));
                                state.connected(summary);
                            }
                            Err(e) => {
                                state.show_error(format!("Failed to connect to cluster: {:#}", e));
                            }
                        }
                    }

                    InternalAction::Disconnect => {
                        // Dropping the runner cancels its tool
                        session = None;
                    }

                    InternalAction::StartTool(tool) => {
                        if let Some(runner) = session.as_mut() {
                            runner.start(Job::Run(tool), finished_tx.clone());
                            state.start_running(tool);
                        }
                    }

                    InternalAction::StopTool => {
                        if let Some(tool) = state.running {
                            if session.as_ref().is_some_and(|runner| runner.stop()) {
                                state.show_status(format!("Stopping {}...", tool.label()));
                            }
                        }
                    }

                    InternalAction::OpenDebugForm => {
                        let Some(runner) = session.as_ref() else { continue };
                        let env = runner.env();
                        match env.kube.list_namespaces(&env.client).await {
                            Ok(namespaces) => state.debug_form = Some(DebugFormState::new(namespaces)),
                            Err(e) => state.show_error(format!("Failed to load namespaces: {:#}", e)),
                        }
                    }

                    InternalAction::Form(form_event) => {
                        if let Some(runner) = session.as_mut() {
                            handle_form_event(&mut state, runner, &finished_tx, form_event).await;
                        }
                    }
                }
            }
        }

        if state.should_quit {
            break;
        }

        render(&mut tui, &mut state)?;
    }

    // Cleanup
    drop(session);
    events.shutdown();
    tui.restore()?;

    Ok(())
}

async fn connect(kube: &KubeClient, context_name: &str) -> Result<(kube::Client, ClusterSummary)> {
    let client = kube.client_for_context(context_name).await?;
    let summary = kube.cluster_summary(&client, context_name).await?;
    info!(context = %context_name, "connected");
    Ok((client, summary))
}

fn new_session(
    client: kube::Client,
    kube: &Arc<KubeClient>,
    settings: &Arc<Settings>,
    context_name: &str,
) -> ToolRunner {
    ToolRunner::new(ToolEnv {
        client,
        kube: kube.clone(),
        settings: settings.clone(),
        context: context_name.to_string(),
    })
}

/// Keybinding context for the topmost element on screen
fn key_context(state: &AppState) -> KeyContext {
    if state.debug_form.is_some() {
        return KeyContext::DebugForm;
    }
    if state.confirm.is_some() {
        return KeyContext::Confirm;
    }
    match state.current_screen {
        Screen::ContextSelect => KeyContext::ListNavigation,
        Screen::Dashboard => match state.ui_state.focus {
            Focus::Tools => KeyContext::Tools,
            Focus::Output => KeyContext::Output,
        },
    }
}

fn handle_action(
    state: &mut AppState,
    internal_tx: &mpsc::UnboundedSender<InternalAction>,
    action: Action,
) {
    match action {
        Action::Quit => {
            let _ = internal_tx.send(InternalAction::StopTool);
            state.should_quit = true;
        }
        Action::GoBack => {
            if state.ui_state.help_visible {
                state.ui_state.help_visible = false;
                return;
            }
            if state.current_screen == Screen::Dashboard {
                let _ = internal_tx.send(InternalAction::Disconnect);
                state.disconnect();
            }
            if !state.go_back() {
                state.should_quit = true;
            }
        }
        Action::SelectContext(name) => {
            state.show_status(format!("Connecting to {}...", name));
            let _ = internal_tx.send(InternalAction::Connect(name));
        }
        Action::ToggleHelp => {
            state.ui_state.help_visible = !state.ui_state.help_visible;
        }
        Action::SwitchFocus => {
            state.toggle_focus();
        }
        Action::ListUp => {
            state.list_up();
        }
        Action::ListDown => {
            state.list_down();
        }
        Action::ListSelect => {
            if state.current_screen == Screen::ContextSelect {
                if let Some(ctx) = state.selected_index().and_then(|i| state.contexts.get(i)) {
                    let name = ctx.name.clone();
                    let _ = state.action_tx.send(Action::SelectContext(name));
                }
            }
        }

        // Tools
        Action::RunSelectedTool => {
            if let Some(tool) = state.selected_tool() {
                request_tool(state, internal_tx, tool);
            }
        }
        Action::RunTool(tool) => {
            request_tool(state, internal_tx, tool);
        }
        Action::StopTool => {
            let _ = internal_tx.send(InternalAction::StopTool);
        }
        Action::ExportReport => {
            export_report(state);
        }

        // Confirmation dialog
        Action::ConfirmToggle => {
            state.toggle_confirm_choice();
        }
        Action::ConfirmAccept => {
            if let Some(tool) = state.accept_confirmation() {
                let _ = internal_tx.send(InternalAction::StartTool(tool));
            }
        }
        Action::ConfirmCancel => {
            state.confirm = None;
        }

        // Debug level form
        Action::FormUp => {
            if let Some(form) = state.debug_form.as_mut() {
                form.up();
            }
        }
        Action::FormDown => {
            if let Some(form) = state.debug_form.as_mut() {
                form.down();
            }
        }
        Action::FormSelect => {
            let Some(form) = state.debug_form.as_mut() else {
                return;
            };
            if let Some(event) = form.select() {
                if matches!(event, FormEvent::Submit { .. }) {
                    state.debug_form = None;
                }
                let _ = internal_tx.send(InternalAction::Form(event));
            }
        }
        Action::FormBack => {
            if let Some(form) = state.debug_form.as_mut() {
                if !form.back() {
                    state.debug_form = None;
                }
            }
        }

        // Output panel
        Action::ScrollUp(n) => {
            state.scroll_up(n);
        }
        Action::ScrollDown(n) => {
            state.scroll_down(n);
        }
        Action::PageUp => {
            state.scroll_up(PAGE_SIZE);
        }
        Action::PageDown => {
            state.scroll_down(PAGE_SIZE);
        }
        Action::ScrollToTop => {
            state.ui_state.output_scroll = 0;
        }
        Action::ScrollToBottom => {
            // Rendering clamps to the actual bottom
            state.ui_state.output_scroll = usize::MAX;
        }

        Action::ShowError(msg) => {
            state.show_error(msg);
        }
        Action::DismissError => {
            state.dismiss_error();
        }
        Action::Tick => {
            state.tick = state.tick.wrapping_add(1);
        }
        Action::Render => {}
    }
}

/// Ask for confirmation, open the debug form, or start `tool` directly
fn request_tool(
    state: &mut AppState,
    internal_tx: &mpsc::UnboundedSender<InternalAction>,
    tool: Tool,
) {
    if state.current_screen != Screen::Dashboard {
        return;
    }

    if tool.needs_confirmation() {
        state.request_confirmation(tool);
    } else if tool == Tool::SetDebugLevel {
        let _ = internal_tx.send(InternalAction::OpenDebugForm);
    } else {
        let _ = internal_tx.send(InternalAction::StartTool(tool));
    }
}

async fn handle_form_event(
    state: &mut AppState,
    runner: &mut ToolRunner,
    finished_tx: &mpsc::UnboundedSender<ToolFinished>,
    event: FormEvent,
) {
    let env = runner.env().clone();

    match event {
        FormEvent::LoadPods(namespace) => {
            let pods = env.kube.list_pods(&env.client, &namespace, None).await;
            let Some(form) = state.debug_form.as_mut() else {
                return;
            };
            match pods {
                Ok(pods) => form.set_pods(pods),
                Err(e) => {
                    form.load_failed();
                    state.show_error(format!("Failed to load pods: {:#}", e));
                }
            }
        }
        FormEvent::LoadContainers { namespace, pod } => {
            let containers = env.kube.list_containers(&env.client, &namespace, &pod).await;
            let Some(form) = state.debug_form.as_mut() else {
                return;
            };
            match containers {
                Ok(containers) => form.set_containers(containers),
                Err(e) => {
                    form.load_failed();
                    state.show_error(format!("Failed to load containers: {:#}", e));
                }
            }
        }
        FormEvent::Submit {
            namespace,
            pod,
            container,
            level,
        } => {
            let job = Job::SetDebugLevel {
                namespace,
                pod,
                container,
                level,
            };
            runner.start(job, finished_tx.clone());
            state.start_running(Tool::SetDebugLevel);
        }
    }
}

fn show_tool_result(state: &mut AppState, finished: ToolFinished) {
    let label = finished.tool.label();

    match finished.outcome {
        Some(Ok(output)) => state.finish_running(output),
        Some(Err(e)) => {
            state.finish_running(OutputView::lines(label, vec![format!("Error: {:#}", e)]));
            state.show_error(format!("{} failed: {:#}", label, e));
        }
        None => {
            state.finish_running(OutputView::lines(label, vec![format!("{} stopped", label)]));
        }
    }

    if finished.cancelled {
        state.show_status(format!("{} stopped", label));
    }
}

/// Write the last suite report to `<suite>_<context>_<timestamp>.txt`
fn export_report(state: &mut AppState) {
    let Some(report) = &state.last_report else {
        state.show_status("No report to export yet".to_string());
        return;
    };

    let filename = report_filename(report);
    match fs::write(&filename, render_report(report)) {
        Ok(()) => {
            info!(file = %filename, "exported report");
            state.show_status(format!("Exported report to {}", filename));
        }
        Err(e) => {
            state.show_error(format!("Export failed: {}", e));
        }
    }
}

fn report_filename(report: &SuiteReport) -> String {
    let context: String = report
        .context
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "{}_{}_{}.txt",
        report.suite.cli_name(),
        context,
        report.finished_at.format("%Y%m%d_%H%M%S")
    )
}

fn render(tui: &mut Tui, state: &mut AppState) -> Result<()> {
    tui.terminal().draw(|frame| {
        match state.current_screen {
            Screen::ContextSelect => {
                ContextSelectScreen::render(frame, state);
            }
            Screen::Dashboard => {
                DashboardScreen::render(frame, state);
            }
        }

        if let Some(confirm) = &state.confirm {
            ConfirmDialog::render(frame, confirm);
        }

        if let Some(form) = state.debug_form.as_mut() {
            DebugForm::render(frame, form);
        }

        if state.ui_state.help_visible {
            HelpOverlay::render(frame);
        }

        if let Some(message) = &state.ui_state.error_message {
            ErrorPopup::render(frame, message);
        }
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use healthctl_types::{CheckResult, ContextInfo};

    fn state() -> AppState {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut state = AppState::new(tx);
        state.contexts = vec![ContextInfo::new(
            "lab".into(),
            "lab-cluster".into(),
            "admin".into(),
            None,
            true,
        )];
        state
    }

    fn dashboard() -> AppState {
        let mut state = state();
        state.connected(ClusterSummary {
            context: "lab".to_string(),
            cluster: "lab-cluster".to_string(),
            ..Default::default()
        });
        state
    }

    #[test]
    fn test_parse_suite() {
        assert_eq!(parse_suite("upf"), Ok(SuiteKind::Upf));
        let err = parse_suite("dns").unwrap_err();
        assert!(err.contains("k8s, infra, paas, smf, upf, storage"));
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from(["healthctl", "lab", "--suite", "k8s", "--tick-rate-ms", "100"])
            .unwrap();
        assert_eq!(args.context.as_deref(), Some("lab"));
        assert_eq!(args.suite, Some(SuiteKind::K8s));
        assert_eq!(args.tick_rate_ms, 100);
        assert!(Args::try_parse_from(["healthctl", "--suite", "nope"]).is_err());
    }

    #[test]
    fn test_report_filename() {
        let report = SuiteReport::new(SuiteKind::Paas, "arn:aws/prod", Vec::new());
        let name = report_filename(&report);
        assert!(name.starts_with("paas_arn_aws_prod_"));
        assert!(name.ends_with(".txt"));
    }

    #[test]
    fn test_key_context_follows_overlays() {
        assert_eq!(key_context(&state()), KeyContext::ListNavigation);

        let mut app = dashboard();
        assert_eq!(key_context(&app), KeyContext::Tools);
        app.toggle_focus();
        assert_eq!(key_context(&app), KeyContext::Output);
        app.request_confirmation(Tool::FlushRedis);
        assert_eq!(key_context(&app), KeyContext::Confirm);
        app.debug_form = Some(DebugFormState::new(Vec::new()));
        assert_eq!(key_context(&app), KeyContext::DebugForm);
    }

    #[test]
    fn test_confirmed_tool_starts_after_accept() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut state = dashboard();

        handle_action(&mut state, &tx, Action::RunTool(Tool::FlushRedis));
        assert!(state.confirm.is_some());
        assert!(rx.try_recv().is_err());

        handle_action(&mut state, &tx, Action::ConfirmAccept);
        assert!(matches!(
            rx.try_recv(),
            Ok(InternalAction::StartTool(Tool::FlushRedis))
        ));
    }

    #[test]
    fn test_unconfirmed_tools_start_directly() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut state = dashboard();

        handle_action(&mut state, &tx, Action::RunTool(Tool::ActiveAlerts));
        assert!(matches!(
            rx.try_recv(),
            Ok(InternalAction::StartTool(Tool::ActiveAlerts))
        ));

        handle_action(&mut state, &tx, Action::RunTool(Tool::SetDebugLevel));
        assert!(matches!(rx.try_recv(), Ok(InternalAction::OpenDebugForm)));
    }

    #[test]
    fn test_tools_need_a_connection() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut state = state();
        handle_action(&mut state, &tx, Action::RunTool(Tool::ActiveAlerts));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_go_back_disconnects() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut state = dashboard();

        handle_action(&mut state, &tx, Action::GoBack);
        assert!(matches!(rx.try_recv(), Ok(InternalAction::Disconnect)));
        assert_eq!(state.current_screen, Screen::ContextSelect);
        assert!(state.cluster.is_none());

        handle_action(&mut state, &tx, Action::GoBack);
        assert!(state.should_quit);
    }

    #[test]
    fn test_form_submit_closes_form() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut state = dashboard();
        let mut form = DebugFormState::new(vec!["fed-smf".to_string()]);
        form.select();
        form.set_pods(vec!["smf-0".to_string()]);
        form.select();
        form.set_containers(vec!["smf-app".to_string()]);
        form.select();
        state.debug_form = Some(form);

        handle_action(&mut state, &tx, Action::FormSelect);
        assert!(state.debug_form.is_none());
        assert!(matches!(
            rx.try_recv(),
            Ok(InternalAction::Form(FormEvent::Submit { .. }))
        ));
    }

    #[test]
    fn test_stopped_tool_result() {
        let mut state = dashboard();
        state.start_running(Tool::Suite(SuiteKind::K8s));

        let partial = SuiteReport::new(
            SuiteKind::K8s,
            "lab",
            vec![CheckResult::pass("Nodes", "All nodes are ready")],
        )
        .mark_interrupted();
        show_tool_result(
            &mut state,
            ToolFinished {
                id: 1,
                tool: Tool::Suite(SuiteKind::K8s),
                outcome: Some(Ok(OutputView::Report(partial))),
                cancelled: true,
            },
        );

        assert!(state.running.is_none());
        assert_eq!(state.last_report.as_ref().map(|r| r.total()), Some(1));
        assert!(state.last_report.as_ref().is_some_and(|r| !r.all_passed()));
        assert_eq!(
            state.ui_state.status_message.as_deref(),
            Some("K8s health stopped")
        );
    }

    #[test]
    fn test_failed_tool_shows_error() {
        let mut state = dashboard();
        state.start_running(Tool::RedisStatus);
        show_tool_result(
            &mut state,
            ToolFinished {
                id: 2,
                tool: Tool::RedisStatus,
                outcome: Some(Err(anyhow::anyhow!("status field missing"))),
                cancelled: false,
            },
        );

        assert_eq!(
            state.ui_state.error_message.as_deref(),
            Some("Redis status failed: status field missing")
        );
        assert!(matches!(state.output, OutputView::Lines { .. }));
    }

    #[test]
    fn test_export_without_report() {
        let mut state = dashboard();
        export_report(&mut state);
        assert_eq!(
            state.ui_state.status_message.as_deref(),
            Some("No report to export yet")
        );
    }
}
