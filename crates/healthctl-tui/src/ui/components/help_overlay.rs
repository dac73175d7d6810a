use ratatui::{
    Frame,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::ui::{Layout, Theme};

/// Help overlay showing keybindings
pub struct HelpOverlay;

impl HelpOverlay {
    pub fn render(frame: &mut Frame) {
        let area = frame.area();
        let popup_area = Layout::centered_rect(
            52.min(area.width.saturating_sub(4)),
            26.min(area.height.saturating_sub(4)),
            area,
        );

        frame.render_widget(Clear, popup_area);

        let help_text = vec![
            Line::from(Span::styled("Keybindings", Theme::text_highlight())),
            Line::from(""),
            Self::section("Tools"),
            Self::key_line("j/↓", "Next tool"),
            Self::key_line("k/↑", "Previous tool"),
            Self::key_line("Enter", "Run selected tool"),
            Self::key_line("Ctrl+r", "Run selected tool"),
            Self::key_line("Ctrl+s", "Stop running tool"),
            Self::key_line("a", "Active alerts"),
            Self::key_line("Ctrl+o", "Export last report"),
            Line::from(""),
            Self::section("Output"),
            Self::key_line("j/k", "Scroll"),
            Self::key_line("PgDn/PgUp", "Page down / up"),
            Self::key_line("g/G", "Top / bottom"),
            Line::from(""),
            Self::section("General"),
            Self::key_line("Tab", "Switch tools / output"),
            Self::key_line("←/→", "Choose in dialogs"),
            Self::key_line("?", "Toggle this help"),
            Self::key_line("Esc", "Go back"),
            Self::key_line("q", "Quit"),
        ];

        let help_widget = Paragraph::new(help_text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border_focused())
                .title(Span::styled(" Help ", Theme::title())),
        );

        frame.render_widget(help_widget, popup_area);
    }

    fn section(name: &str) -> Line<'_> {
        Line::from(Span::styled(name, Theme::label()))
    }

    fn key_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
        Line::from(vec![
            Span::styled(format!("  {:>10}", key), Theme::verdict(true)),
            Span::styled(format!("  {}", desc), Theme::text()),
        ])
    }
}
