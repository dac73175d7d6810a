use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

use healthctl_types::Tool;

use crate::app::Action;

/// A key combination
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub fn shift(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::SHIFT,
        }
    }

    pub fn from_event(event: &KeyEvent) -> Self {
        Self {
            code: event.code,
            modifiers: event.modifiers,
        }
    }
}

/// Context for keybindings
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyContext {
    Global,
    ListNavigation,
    Tools,
    Output,
    Confirm,
    DebugForm,
}

/// Keybinding configuration
pub struct KeyBindings {
    bindings: HashMap<KeyContext, HashMap<KeyBinding, Action>>,
}

/// Shortcuts available anywhere on the dashboard
fn insert_dashboard_shortcuts(map: &mut HashMap<KeyBinding, Action>) {
    map.insert(KeyBinding::ctrl(KeyCode::Char('r')), Action::RunSelectedTool);
    map.insert(KeyBinding::ctrl(KeyCode::Char('s')), Action::StopTool);
    map.insert(KeyBinding::ctrl(KeyCode::Char('o')), Action::ExportReport);
    map.insert(
        KeyBinding::new(KeyCode::Char('a')),
        Action::RunTool(Tool::ActiveAlerts),
    );
    map.insert(KeyBinding::new(KeyCode::Tab), Action::SwitchFocus);
    map.insert(KeyBinding::shift(KeyCode::BackTab), Action::SwitchFocus);
    map.insert(KeyBinding::new(KeyCode::PageUp), Action::PageUp);
    map.insert(KeyBinding::new(KeyCode::PageDown), Action::PageDown);
}

impl KeyBindings {
    pub fn new() -> Self {
        let mut bindings = HashMap::new();

        // Global bindings
        let mut global = HashMap::new();
        global.insert(KeyBinding::new(KeyCode::Char('?')), Action::ToggleHelp);
        global.insert(KeyBinding::new(KeyCode::Esc), Action::GoBack);
        global.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::Quit);
        global.insert(KeyBinding::new(KeyCode::Char('q')), Action::Quit);
        bindings.insert(KeyContext::Global, global);

        // List navigation bindings
        let mut list_nav = HashMap::new();
        list_nav.insert(KeyBinding::new(KeyCode::Char('j')), Action::ListDown);
        list_nav.insert(KeyBinding::new(KeyCode::Down), Action::ListDown);
        list_nav.insert(KeyBinding::new(KeyCode::Char('k')), Action::ListUp);
        list_nav.insert(KeyBinding::new(KeyCode::Up), Action::ListUp);
        list_nav.insert(KeyBinding::new(KeyCode::Enter), Action::ListSelect);
        bindings.insert(KeyContext::ListNavigation, list_nav);

        // Tools menu bindings
        let mut tools = HashMap::new();
        tools.insert(KeyBinding::new(KeyCode::Char('j')), Action::ListDown);
        tools.insert(KeyBinding::new(KeyCode::Down), Action::ListDown);
        tools.insert(KeyBinding::new(KeyCode::Char('k')), Action::ListUp);
        tools.insert(KeyBinding::new(KeyCode::Up), Action::ListUp);
        tools.insert(KeyBinding::new(KeyCode::Enter), Action::RunSelectedTool);
        insert_dashboard_shortcuts(&mut tools);
        bindings.insert(KeyContext::Tools, tools);

        // Output panel bindings - less-like scrolling
        let mut output = HashMap::new();
        output.insert(KeyBinding::new(KeyCode::Char('j')), Action::ScrollDown(1));
        output.insert(KeyBinding::new(KeyCode::Down), Action::ScrollDown(1));
        output.insert(KeyBinding::new(KeyCode::Char('k')), Action::ScrollUp(1));
        output.insert(KeyBinding::new(KeyCode::Up), Action::ScrollUp(1));
        output.insert(KeyBinding::ctrl(KeyCode::Char('d')), Action::PageDown);
        output.insert(KeyBinding::ctrl(KeyCode::Char('u')), Action::PageUp);
        output.insert(KeyBinding::new(KeyCode::Char('g')), Action::ScrollToTop);
        output.insert(KeyBinding::shift(KeyCode::Char('G')), Action::ScrollToBottom);
        output.insert(KeyBinding::new(KeyCode::Home), Action::ScrollToTop);
        output.insert(KeyBinding::new(KeyCode::End), Action::ScrollToBottom);
        insert_dashboard_shortcuts(&mut output);
        bindings.insert(KeyContext::Output, output);

        // Confirmation dialog bindings
        let mut confirm = HashMap::new();
        confirm.insert(KeyBinding::new(KeyCode::Left), Action::ConfirmToggle);
        confirm.insert(KeyBinding::new(KeyCode::Right), Action::ConfirmToggle);
        confirm.insert(KeyBinding::new(KeyCode::Char('h')), Action::ConfirmToggle);
        confirm.insert(KeyBinding::new(KeyCode::Char('l')), Action::ConfirmToggle);
        confirm.insert(KeyBinding::new(KeyCode::Tab), Action::ConfirmToggle);
        confirm.insert(KeyBinding::new(KeyCode::Enter), Action::ConfirmAccept);
        confirm.insert(KeyBinding::new(KeyCode::Esc), Action::ConfirmCancel);
        confirm.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::ConfirmCancel);
        bindings.insert(KeyContext::Confirm, confirm);

        // Debug level form bindings
        let mut form = HashMap::new();
        form.insert(KeyBinding::new(KeyCode::Char('j')), Action::FormDown);
        form.insert(KeyBinding::new(KeyCode::Down), Action::FormDown);
        form.insert(KeyBinding::new(KeyCode::Char('k')), Action::FormUp);
        form.insert(KeyBinding::new(KeyCode::Up), Action::FormUp);
        form.insert(KeyBinding::new(KeyCode::Enter), Action::FormSelect);
        form.insert(KeyBinding::new(KeyCode::Esc), Action::FormBack);
        form.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::FormBack);
        bindings.insert(KeyContext::DebugForm, form);

        Self { bindings }
    }

    /// Look up action for key event in given context
    pub fn get_action(&self, context: KeyContext, key: &KeyEvent) -> Option<Action> {
        let binding = KeyBinding::from_event(key);

        // First check context-specific bindings
        if let Some(action) = self
            .bindings
            .get(&context)
            .and_then(|context_bindings| context_bindings.get(&binding))
        {
            return Some(action.clone());
        }

        // Modal dialogs do not fall back to global bindings
        if matches!(context, KeyContext::Confirm | KeyContext::DebugForm) {
            return None;
        }

        self.bindings
            .get(&KeyContext::Global)?
            .get(&binding)
            .cloned()
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}
