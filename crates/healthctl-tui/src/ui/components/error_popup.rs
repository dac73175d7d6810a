use ratatui::{
    Frame,
    layout::Alignment,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::ui::{Layout, Theme};

/// Modal error message, dismissed with any key
pub struct ErrorPopup;

impl ErrorPopup {
    pub fn render(frame: &mut Frame, message: &str) {
        let area = frame.area();
        let width = 60.min(area.width.saturating_sub(4));
        // Rough wrap estimate plus borders and the hint line
        let text_lines = (message.chars().count() as u16 / width.saturating_sub(2).max(1)) + 1;
        let popup_area = Layout::centered_rect(width, text_lines + 4, area);

        frame.render_widget(Clear, popup_area);

        let text = vec![
            Line::from(Span::styled(message, Theme::text())),
            Line::from(""),
            Line::from(Span::styled("press any key", Theme::text_dim())),
        ];

        let popup = Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Theme::error())
                    .title(Span::styled(" Error ", Theme::error())),
            );

        frame.render_widget(popup, popup_area);
    }
}
