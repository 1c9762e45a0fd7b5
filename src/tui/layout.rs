use ratatui::prelude::*;

use crate::config::LayoutConfig;

pub struct DashboardLayout {
    pub header: Rect,
    pub cards: [Rect; 4],
    pub weekly_hours: Option<Rect>,
    pub presence_status: Option<Rect>,
    pub message: Option<Rect>,
}

pub fn create_layout(area: Rect, layout: &LayoutConfig) -> DashboardLayout {
    let message_height = if layout.message_panel { 3 } else { 0 };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),              // header
            Constraint::Length(5),              // metric cards
            Constraint::Min(10),                // charts
            Constraint::Length(message_height), // message bar
        ])
        .split(area);

    let cards = Layout::horizontal([Constraint::Ratio(1, 4); 4]).split(rows[1]);

    let (weekly_hours, presence_status) = match (layout.weekly_hours_chart, layout.presence_status_chart) {
        (true, true) => {
            let cols = Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(rows[2]);
            (Some(cols[0]), Some(cols[1]))
        }
        (true, false) => (Some(rows[2]), None),
        (false, true) => (None, Some(rows[2])),
        (false, false) => (None, None),
    };

    DashboardLayout {
        header: rows[0],
        cards: [cards[0], cards[1], cards[2], cards[3]],
        weekly_hours,
        presence_status,
        message: layout.message_panel.then_some(rows[3]),
    }
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
