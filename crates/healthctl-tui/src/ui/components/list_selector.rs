use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, StatefulWidget},
};

use crate::ui::Theme;

/// A generic list selector component
pub struct ListSelector<'a> {
    items: Vec<ListItem<'a>>,
    title: &'a str,
    focused: bool,
}

impl<'a> ListSelector<'a> {
    pub fn new(title: &'a str) -> Self {
        Self {
            items: Vec::new(),
            title,
            focused: true,
        }
    }

    /// Add items from an iterator of (display_text, is_current) tuples
    pub fn items<I, S>(self, items: I) -> Self
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<String>,
    {
        self.styled_items(items.into_iter().map(|(text, is_current)| {
            let text = text.into();
            if is_current {
                (format!("{} (current)", text), Theme::list_item_current())
            } else {
                (text, Theme::list_item())
            }
        }))
    }

    /// Add items with an explicit style each
    pub fn styled_items<I, S>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = (S, Style)>,
        S: Into<String>,
    {
        self.items = items
            .into_iter()
            .map(|(text, style)| ListItem::new(Line::from(Span::styled(text.into(), style))))
            .collect();
        self
    }

    /// Dim the border when another pane has focus
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

impl StatefulWidget for ListSelector<'_> {
    type State = ListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::border_for(self.focused))
            .title(Span::styled(self.title, Theme::title()));

        let list = List::new(self.items)
            .block(block)
            .highlight_style(Theme::list_item_selected())
            .highlight_symbol("▶ ");

        StatefulWidget::render(list, area, buf, state);
    }
}

/// Extension trait to render ListSelector more easily
pub trait ListSelectorExt {
    fn render_list_selector(&mut self, area: Rect, selector: ListSelector, state: &mut ListState);
}

impl ListSelectorExt for ratatui::Frame<'_> {
    fn render_list_selector(&mut self, area: Rect, selector: ListSelector, state: &mut ListState) {
        self.render_stateful_widget(selector, area, state);
    }
}
