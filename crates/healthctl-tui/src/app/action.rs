use healthctl_types::Tool;

/// All possible actions in the application (command pattern)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    // Navigation
    GoBack,
    Quit,

    // Selection
    SelectContext(String),

    // UI toggles
    ToggleHelp,
    SwitchFocus,

    // List navigation
    ListUp,
    ListDown,
    ListSelect,

    // Tools
    RunSelectedTool,
    RunTool(Tool),
    StopTool,
    ExportReport,

    // Confirmation dialog
    ConfirmToggle,
    ConfirmAccept,
    ConfirmCancel,

    // Debug level form
    FormUp,
    FormDown,
    FormSelect,
    FormBack,

    // Output panel
    ScrollUp(usize),
    ScrollDown(usize),
    PageUp,
    PageDown,
    ScrollToTop,
    ScrollToBottom,

    // Error handling
    ShowError(String),
    DismissError,

    // Tick (for periodic updates)
    Tick,

    // Render request
    Render,
}
