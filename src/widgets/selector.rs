//! Sidebar option list: multi-select with checkboxes (crops) or single-select (village).

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

use crate::render::context::RenderContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorKind {
    /// `[x]` / `[ ]` per option.
    Multi,
    /// `●` on the chosen option, `○` elsewhere.
    Single,
}

pub struct Selector<'a> {
    pub title: &'a str,
    pub kind: SelectorKind,
    pub options: &'a [String],
    /// Parallel to `options`.
    pub checked: Vec<bool>,
    pub cursor: usize,
    pub focused: bool,
    pub ctx: &'a RenderContext,
}

impl<'a> Selector<'a> {
    pub fn new(
        title: &'a str,
        kind: SelectorKind,
        options: &'a [String],
        checked: Vec<bool>,
        ctx: &'a RenderContext,
    ) -> Self {
        Self {
            title,
            kind,
            options,
            checked,
            cursor: 0,
            focused: false,
            ctx,
        }
    }

    pub fn cursor(mut self, cursor: usize) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    fn marker(&self, checked: bool) -> &'static str {
        match (self.kind, checked) {
            (SelectorKind::Multi, true) => "[x]",
            (SelectorKind::Multi, false) => "[ ]",
            (SelectorKind::Single, true) => "●",
            (SelectorKind::Single, false) => "○",
        }
    }
}

/// First visible index so that `cursor` stays inside a window of `height` rows.
pub fn scroll_offset(cursor: usize, height: usize) -> usize {
    if height == 0 {
        0
    } else {
        cursor.saturating_sub(height - 1)
    }
}

impl Widget for Selector<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let n_checked = self.checked.iter().filter(|c| **c).count();
        let title = match self.kind {
            SelectorKind::Multi => format!("{} ({}/{})", self.title, n_checked, self.options.len()),
            SelectorKind::Single => self.title.to_string(),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(title)
            .border_style(self.ctx.border(self.focused));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.options.is_empty() {
            Paragraph::new("(none)")
                .style(Style::default().fg(self.ctx.dimmed))
                .render(inner, buf);
            return;
        }

        let height = inner.height as usize;
        let offset = scroll_offset(self.cursor, height);
        let lines: Vec<Line> = self
            .options
            .iter()
            .enumerate()
            .skip(offset)
            .take(height)
            .map(|(i, option)| {
                let checked = self.checked.get(i).copied().unwrap_or(false);
                let mut style = if checked {
                    Style::default().fg(self.ctx.text_primary)
                } else {
                    Style::default().fg(self.ctx.text_secondary)
                };
                if self.focused && i == self.cursor {
                    style = style.patch(self.ctx.selected);
                }
                Line::from(Span::styled(
                    format!("{} {}", self.marker(checked), option),
                    style,
                ))
            })
            .collect();
        Paragraph::new(lines).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_offset_keeps_cursor_visible() {
        assert_eq!(scroll_offset(0, 5), 0);
        assert_eq!(scroll_offset(4, 5), 0);
        assert_eq!(scroll_offset(7, 5), 3);
        assert_eq!(scroll_offset(3, 0), 0);
    }
}
