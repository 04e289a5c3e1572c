use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Top-level layout: main view, control bar, optional debug row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppLayout {
    pub main_view: Rect,
    pub control_bar: Rect,
    pub debug: Option<Rect>,
}

/// Top-level vertical layout: main view (fill), control bar (1 row), optional debug (1 row).
pub fn app_layout(area: Rect, debug_enabled: bool) -> AppLayout {
    let mut constraints = vec![Constraint::Fill(1), Constraint::Length(1)];

    if debug_enabled {
        constraints.push(Constraint::Length(1));
    }

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    AppLayout {
        main_view: layout[0],
        control_bar: layout[1],
        debug: debug_enabled.then(|| layout[2]),
    }
}

/// Sidebar blocks, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SidebarLayout {
    pub crops: Rect,
    pub gender: Rect,
    pub village: Rect,
    pub columns: Rect,
}

/// Dashboard regions of the main area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardLayout {
    pub title: Rect,
    pub metrics: Rect,
    pub crop_chart: Rect,
    pub gender_chart: Rect,
    pub village_chart: Rect,
    pub area_chart: Rect,
    pub farmers: Rect,
    pub village_farmers: Rect,
}

/// Split the main view into sidebar and dashboard. The sidebar never takes more than a third.
pub fn split_sidebar(area: Rect, sidebar_width: u16) -> (Rect, Rect) {
    let width = sidebar_width.min(area.width / 3);
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(width), Constraint::Fill(1)])
        .split(area);
    (chunks[0], chunks[1])
}

pub fn sidebar_layout(area: Rect, column_count: usize) -> SidebarLayout {
    // Column list: one line per header plus borders, capped.
    let columns_height = u16::try_from(column_count)
        .unwrap_or(u16::MAX)
        .saturating_add(2)
        .clamp(3, 11);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(3),
            Constraint::Length(3),
            Constraint::Fill(2),
            Constraint::Length(columns_height),
        ])
        .split(area);
    SidebarLayout {
        crops: chunks[0],
        gender: chunks[1],
        village: chunks[2],
        columns: chunks[3],
    }
}

pub fn dashboard_layout(area: Rect) -> DashboardLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Fill(3),
            Constraint::Fill(2),
            Constraint::Fill(3),
        ])
        .split(area);

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(35),
            Constraint::Percentage(30),
            Constraint::Percentage(35),
        ])
        .split(rows[2]);

    let tables = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[4]);

    DashboardLayout {
        title: rows[0],
        metrics: rows[1],
        crop_chart: charts[0],
        gender_chart: charts[1],
        village_chart: charts[2],
        area_chart: rows[3],
        farmers: tables[0],
        village_farmers: tables[1],
    }
}

/// Centered rect within `r` with given percentage width and height.
pub fn centered_rect(r: Rect, percent_x: u16, percent_y: u16) -> Rect {
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

/// Centered rect with fixed width and height, clamped to fit inside `r`.
pub fn centered_rect_fixed(r: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(r.width);
    let h = height.min(r.height);
    let x = r.x + r.width.saturating_sub(w) / 2;
    let y = r.y + r.height.saturating_sub(h) / 2;
    Rect {
        x,
        y,
        width: w,
        height: h,
    }
}
