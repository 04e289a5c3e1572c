//! Gender radio buttons: a bordered block with one row of options (● selected, ○ unselected).

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

use crate::pipeline::GenderFilter;
use crate::render::context::RenderContext;

pub struct GenderRadio<'a> {
    pub selected: GenderFilter,
    pub focused: bool,
    pub ctx: &'a RenderContext,
}

impl<'a> GenderRadio<'a> {
    pub fn new(selected: GenderFilter, focused: bool, ctx: &'a RenderContext) -> Self {
        Self {
            selected,
            focused,
            ctx,
        }
    }
}

impl Widget for GenderRadio<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title("Gender")
            .border_style(self.ctx.border(self.focused));
        let inner = block.inner(area);
        block.render(area, buf);

        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(GenderFilter::ALL.map(|_| Constraint::Ratio(1, 3)))
            .split(inner);

        for (option, cell) in GenderFilter::ALL.iter().zip(cells.iter()) {
            let is_selected = *option == self.selected;
            let marker = if is_selected { "●" } else { "○" };
            let style = if is_selected {
                Style::default().fg(self.ctx.focus_border)
            } else {
                Style::default().fg(self.ctx.text_secondary)
            };
            let style = if self.focused && is_selected {
                style.add_modifier(Modifier::REVERSED)
            } else {
                style
            };
            Paragraph::new(Line::from(Span::styled(
                format!("{} {}", marker, option.as_str()),
                style,
            )))
            .render(*cell, buf);
        }
    }
}
