//! Share breakdown drawn as one proportional bar per slice with its percentage.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

use crate::render::context::RenderContext;
use crate::views::Share;

pub struct ShareChart<'a> {
    pub title: String,
    pub shares: &'a [Share],
    pub ctx: &'a RenderContext,
}

impl<'a> ShareChart<'a> {
    pub fn new(title: impl Into<String>, shares: &'a [Share], ctx: &'a RenderContext) -> Self {
        Self {
            title: title.into(),
            shares,
            ctx,
        }
    }

    fn slice_color(&self, idx: usize) -> Color {
        if idx % 2 == 0 {
            self.ctx.primary_chart_series_color
        } else {
            self.ctx.secondary_chart_series_color
        }
    }
}

/// Filled cells for `percent` of `width`, rounded to the nearest cell.
pub fn filled_cells(percent: f64, width: usize) -> usize {
    ((percent.clamp(0.0, 100.0) / 100.0) * width as f64).round() as usize
}

impl Widget for ShareChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(self.title.as_str())
            .border_style(Style::default().fg(self.ctx.sidebar_border));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.shares.is_empty() {
            Paragraph::new("No data for this selection")
                .style(Style::default().fg(self.ctx.dimmed))
                .centered()
                .render(inner, buf);
            return;
        }

        let label_width = self
            .shares
            .iter()
            .map(|s| s.value.chars().count())
            .max()
            .unwrap_or(0);
        // label, space, bar, space, "100.0% (n)"
        let bar_width = (inner.width as usize).saturating_sub(label_width + 2 + 16);

        let lines: Vec<Line> = self
            .shares
            .iter()
            .enumerate()
            .map(|(i, share)| {
                let filled = filled_cells(share.percent, bar_width);
                Line::from(vec![
                    Span::styled(
                        format!("{:>width$} ", share.value, width = label_width),
                        Style::default().fg(self.ctx.text_secondary),
                    ),
                    Span::styled("█".repeat(filled), Style::default().fg(self.slice_color(i))),
                    Span::styled(
                        "░".repeat(bar_width - filled),
                        Style::default().fg(self.ctx.dimmed),
                    ),
                    Span::styled(
                        format!(" {:5.1}% ({})", share.percent, share.count),
                        Style::default().fg(self.ctx.text_primary),
                    ),
                ])
            })
            .collect();
        Paragraph::new(lines).render(inner, buf);
    }
}
