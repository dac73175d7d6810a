use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout as RatatuiLayout},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::app::DebugFormState;
use crate::ui::components::{ListSelector, ListSelectorExt};
use crate::ui::{Layout, Theme};

/// Cascading namespace, pod, container and level picker
pub struct DebugForm;

impl DebugForm {
    pub fn render(frame: &mut Frame, form: &mut DebugFormState) {
        let area = frame.area();
        let popup_area = Layout::centered_rect(
            60.min(area.width.saturating_sub(4)),
            20.min(area.height.saturating_sub(2)),
            area,
        );

        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border_focused())
            .title(Span::styled(" Set Debug Level ", Theme::title()));
        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(3)])
            .split(inner);

        frame.render_widget(Paragraph::new(Self::breadcrumbs(form)), chunks[0]);

        if form.loading {
            let loading = Paragraph::new(Line::from(Span::styled(
                " Loading...",
                Theme::text_dim(),
            )));
            frame.render_widget(loading, chunks[1]);
            return;
        }

        let options = form.options();
        if options.is_empty() {
            let empty = Paragraph::new(Line::from(Span::styled(
                " Nothing to choose here, Esc to go back",
                Theme::text_dim(),
            )));
            frame.render_widget(empty, chunks[1]);
            return;
        }

        let selector = ListSelector::new(form.step.title())
            .items(options.into_iter().map(|option| (option, false)));
        frame.render_list_selector(chunks[1], selector, &mut form.list_state);
    }

    fn breadcrumbs(form: &DebugFormState) -> Line<'static> {
        let mut spans = Vec::new();
        for value in [&form.namespace, &form.pod, &form.container]
            .into_iter()
            .flatten()
        {
            if !spans.is_empty() {
                spans.push(Span::styled(" › ", Theme::text_dim()));
            }
            spans.push(Span::styled(value.clone(), Theme::label()));
        }
        if spans.is_empty() {
            spans.push(Span::styled("Choose a namespace", Theme::text_dim()));
        }
        Line::from(spans)
    }
}
