use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

use crate::render::context::RenderContext;
use crate::views::Metric;

/// Row of equally sized metric tiles: label in the border, value centered.
pub struct MetricTiles<'a> {
    pub metrics: &'a [Metric],
    pub ctx: &'a RenderContext,
}

impl Widget for MetricTiles<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.metrics.is_empty() {
            return;
        }
        let n = self.metrics.len() as u32;
        let tiles = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(self.metrics.iter().map(|_| Constraint::Ratio(1, n)))
            .split(area);

        for (metric, tile) in self.metrics.iter().zip(tiles.iter()) {
            Paragraph::new(metric.value.as_str())
                .style(
                    Style::default()
                        .fg(self.ctx.text_primary)
                        .add_modifier(Modifier::BOLD),
                )
                .centered()
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_type(BorderType::Rounded)
                        .title(metric.label.as_str())
                        .border_style(Style::default().fg(self.ctx.sidebar_border)),
                )
                .render(*tile, buf);
        }
    }
}
