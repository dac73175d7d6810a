use ratatui::{
    Frame,
    layout::Alignment,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::app::ConfirmState;
use crate::ui::{Layout, Theme};

/// Start / Cancel prompt shown before a confirmed tool runs
pub struct ConfirmDialog;

impl ConfirmDialog {
    pub fn render(frame: &mut Frame, confirm: &ConfirmState) {
        let message = confirm.message();
        let width = (message.width() as u16 + 6).clamp(36, 70);
        let popup_area = Layout::centered_rect(width, 7, frame.area());

        frame.render_widget(Clear, popup_area);

        let (start, cancel) = if confirm.start_selected {
            (Theme::list_item_selected(), Theme::text_dim())
        } else {
            (Theme::text_dim(), Theme::list_item_selected())
        };

        let text = vec![
            Line::from(""),
            Line::from(Span::styled(message, Theme::text())),
            Line::from(""),
            Line::from(vec![
                Span::styled("  Start  ", start),
                Span::raw("    "),
                Span::styled("  Cancel  ", cancel),
            ]),
        ];

        let dialog = Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Theme::border_focused())
                    .title(Span::styled(
                        format!(" {} ", confirm.tool.label()),
                        Theme::title(),
                    )),
            );

        frame.render_widget(dialog, popup_area);
    }
}
