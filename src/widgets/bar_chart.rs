//! Horizontal bar chart of labelled values (frequency counts or areas).

use ratatui::{
    buffer::Buffer,
    layout::{Direction, Rect},
    style::Style,
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Block, BorderType, Borders, Paragraph, Widget},
};

use crate::chart_export::BarPoint;
use crate::render::context::RenderContext;

/// Values are scaled by this factor so fractional areas keep their proportions.
const SCALE: f64 = 100.0;

pub struct FrequencyChart<'a> {
    pub title: String,
    pub bars: &'a [BarPoint],
    pub max_bars: usize,
    pub color: ratatui::style::Color,
    pub ctx: &'a RenderContext,
}

impl<'a> FrequencyChart<'a> {
    pub fn new(title: impl Into<String>, bars: &'a [BarPoint], ctx: &'a RenderContext) -> Self {
        Self {
            title: title.into(),
            bars,
            max_bars: ctx.max_bars,
            color: ctx.primary_chart_series_color,
            ctx,
        }
    }

    pub fn color(mut self, color: ratatui::style::Color) -> Self {
        self.color = color;
        self
    }
}

fn value_text(v: f64) -> String {
    if v.fract().abs() < 1e-9 {
        format!("{:.0}", v)
    } else {
        format!("{:.2}", v)
    }
}

impl Widget for FrequencyChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let shown = self.bars.len().min(self.max_bars);
        let title = if shown < self.bars.len() {
            format!("{} (top {} of {})", self.title, shown, self.bars.len())
        } else {
            self.title.clone()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(title)
            .border_style(Style::default().fg(self.ctx.sidebar_border));

        if self.bars.is_empty() {
            let inner = block.inner(area);
            block.render(area, buf);
            Paragraph::new("No data for this selection")
                .style(Style::default().fg(self.ctx.dimmed))
                .centered()
                .render(inner, buf);
            return;
        }

        let label_width = self.bars[..shown]
            .iter()
            .map(|b| b.label.chars().count())
            .max()
            .unwrap_or(0);
        let bars: Vec<Bar> = self.bars[..shown]
            .iter()
            .map(|b| {
                Bar::default()
                    .value((b.value.max(0.0) * SCALE).round() as u64)
                    .text_value(value_text(b.value))
                    .label(Line::from(format!("{:>width$}", b.label, width = label_width)))
                    .style(Style::default().fg(self.color))
            })
            .collect();

        BarChart::default()
            .block(block)
            .direction(Direction::Horizontal)
            .bar_width(1)
            .bar_gap(0)
            .value_style(Style::default().fg(self.ctx.text_primary))
            .label_style(Style::default().fg(self.ctx.text_secondary))
            .data(BarGroup::default().bars(&bars))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_text() {
        assert_eq!(value_text(4.0), "4");
        assert_eq!(value_text(1.5), "1.50");
    }
}
