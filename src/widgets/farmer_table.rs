use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, Widget},
};

use crate::render::context::RenderContext;
use crate::views::TableView;

/// Scrollable grid of farmer rows. `offset` is the first row shown and is clamped on render.
pub struct FarmerTable<'a> {
    pub title: String,
    pub view: &'a TableView,
    pub offset: usize,
    pub focused: bool,
    pub ctx: &'a RenderContext,
}

impl<'a> FarmerTable<'a> {
    pub fn new(title: impl Into<String>, view: &'a TableView, ctx: &'a RenderContext) -> Self {
        Self {
            title: title.into(),
            view,
            offset: 0,
            focused: false,
            ctx,
        }
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

/// Width of each column: the longest of header and cells.
pub fn column_widths(view: &TableView) -> Vec<u16> {
    view.columns
        .iter()
        .enumerate()
        .map(|(i, header)| {
            view.rows
                .iter()
                .filter_map(|r| r.get(i))
                .map(|c| c.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0) as u16
        })
        .collect()
}

impl Widget for FarmerTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(format!("{} ({} rows)", self.title, self.view.len()))
            .border_style(self.ctx.border(self.focused));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.view.is_empty() {
            Paragraph::new("No farmers match this selection")
                .style(Style::default().fg(self.ctx.dimmed))
                .centered()
                .render(inner, buf);
            return;
        }

        let body_height = inner.height.saturating_sub(1) as usize;
        let max_offset = self.view.len().saturating_sub(body_height);
        let offset = self.offset.min(max_offset);

        let header = Row::new(self.view.columns.iter().map(|c| Cell::from(c.as_str()))).style(
            Style::default()
                .fg(self.ctx.table_header)
                .bg(self.ctx.table_header_bg)
                .add_modifier(Modifier::BOLD),
        );
        let rows = self
            .view
            .rows
            .iter()
            .skip(offset)
            .take(body_height)
            .map(|r| Row::new(r.iter().map(|c| Cell::from(c.as_str()))));
        let widths: Vec<Constraint> = column_widths(self.view)
            .into_iter()
            .map(Constraint::Length)
            .collect();

        Widget::render(
            Table::new(rows, widths)
                .header(header)
                .column_spacing(self.ctx.table_cell_padding)
                .style(Style::default().fg(self.ctx.text_primary)),
            inner,
            buf,
        );
    }
}
