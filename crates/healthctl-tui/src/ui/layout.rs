use ratatui::layout::{Constraint, Direction, Layout as RatatuiLayout, Rect};

/// Width of the dashboard tools menu
pub const TOOLS_WIDTH: u16 = 30;

/// Height of the dashboard header, borders included
pub const DASHBOARD_HEADER_HEIGHT: u16 = 8;

/// Layout helper for consistent screen layouts
pub struct Layout;

impl Layout {
    /// Create the main layout with header, content, and status bar
    pub fn main(area: Rect) -> (Rect, Rect, Rect) {
        Self::with_header(area, 3)
    }

    fn with_header(area: Rect, header_height: u16) -> (Rect, Rect, Rect) {
        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(header_height),
                Constraint::Min(1),
                Constraint::Length(1), // Status bar
            ])
            .split(area);

        (chunks[0], chunks[1], chunks[2])
    }

    /// Create a centered content area (for selection screens)
    pub fn centered_list(area: Rect, width_percent: u16) -> Rect {
        let horizontal = RatatuiLayout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage((100 - width_percent) / 2),
                Constraint::Percentage(width_percent),
                Constraint::Percentage((100 - width_percent) / 2),
            ])
            .split(area);

        let vertical = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(1),
            ])
            .split(horizontal[1]);

        vertical[1]
    }

    /// Dashboard regions: header, tools menu, output panel, status bar
    pub fn dashboard(area: Rect) -> (Rect, Rect, Rect, Rect) {
        let (header, body, status) = Self::with_header(area, DASHBOARD_HEADER_HEIGHT);

        let columns = RatatuiLayout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(TOOLS_WIDTH), Constraint::Min(1)])
            .split(body);

        (header, columns[0], columns[1], status)
    }

    /// Header panes: cluster details, shortcuts, logo
    pub fn dashboard_header(area: Rect) -> (Rect, Rect, Rect) {
        let chunks = RatatuiLayout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(45),
                Constraint::Percentage(30),
                Constraint::Min(31),
            ])
            .split(area);

        (chunks[0], chunks[1], chunks[2])
    }

    /// A rect of at most `width` x `height` centered in `area`
    pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
        let width = width.min(area.width);
        let height = height.min(area.height);
        let x = area.x + (area.width - width) / 2;
        let y = area.y + (area.height - height) / 2;
        Rect::new(x, y, width, height)
    }
}
