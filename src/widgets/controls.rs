use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Paragraph, Widget},
};

use crate::render::context::RenderContext;

const CONTROLS: [(&str, &str); 8] = [
    ("Tab", "Focus"),
    ("Space", "Toggle"),
    ("a", "All"),
    ("n", "None"),
    ("o", "Open"),
    ("e", "Export"),
    ("?", "Help"),
    ("q", "Quit"),
];

/// Severity of the message shown at the right of the control bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Warning,
    Error,
}

pub struct Controls<'a> {
    pub row_count: Option<usize>,
    pub status: Option<(StatusKind, &'a str)>,
    pub dimmed: bool,
    pub ctx: &'a RenderContext,
}

impl<'a> Controls<'a> {
    pub fn new(ctx: &'a RenderContext) -> Self {
        Self {
            row_count: None,
            status: None,
            dimmed: false,
            ctx,
        }
    }

    pub fn with_row_count(mut self, row_count: Option<usize>) -> Self {
        self.row_count = row_count;
        self
    }

    pub fn with_status(mut self, status: Option<(StatusKind, &'a str)>) -> Self {
        self.status = status;
        self
    }

    pub fn with_dimmed(mut self, dimmed: bool) -> Self {
        self.dimmed = dimmed;
        self
    }

    fn status_color(&self, kind: StatusKind) -> Color {
        match kind {
            StatusKind::Info => self.ctx.keybind_labels,
            StatusKind::Success => self.ctx.success,
            StatusKind::Warning => self.ctx.warning,
            StatusKind::Error => self.ctx.error,
        }
    }
}

impl Widget for Controls<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut constraints = CONTROLS.iter().fold(vec![], |mut acc, (key, action)| {
            acc.push(Constraint::Length(key.chars().count() as u16 + 2));
            acc.push(Constraint::Length(action.chars().count() as u16 + 1));
            acc
        });
        constraints.push(Constraint::Fill(1));
        if self.row_count.is_some() {
            constraints.push(Constraint::Length(15)); // "Rows: 12345"
        }

        let layout = Layout::new(Direction::Horizontal, constraints).split(area);
        let bg = Style::default().bg(self.ctx.controls_bg);
        let (key_style, label_style) = if self.dimmed {
            (bg.fg(self.ctx.dimmed), bg.fg(self.ctx.dimmed))
        } else {
            (
                bg.fg(self.ctx.keybind_hints).add_modifier(Modifier::BOLD),
                bg.fg(self.ctx.keybind_labels),
            )
        };

        for (i, (key, action)) in CONTROLS.iter().enumerate() {
            let j = i * 2;
            Paragraph::new(*key)
                .style(key_style)
                .centered()
                .render(layout[j], buf);
            Paragraph::new(*action)
                .style(label_style)
                .render(layout[j + 1], buf);
        }

        let status_idx = CONTROLS.len() * 2;
        match self.status {
            Some((kind, message)) => Paragraph::new(message)
                .style(bg.fg(self.status_color(kind)))
                .right_aligned()
                .render(layout[status_idx], buf),
            None => Paragraph::new("").style(bg).render(layout[status_idx], buf),
        }

        if let Some(count) = self.row_count {
            Paragraph::new(format!("Rows: {}", count))
                .style(bg.fg(self.ctx.text_primary))
                .right_aligned()
                .render(layout[status_idx + 1], buf);
        }
    }
}
