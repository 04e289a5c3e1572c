//! Sidebar selectors and the dashboard body.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::prelude::Widget;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};

use crate::chart_export::BarPoint;
use crate::pipeline::{GenderFilter, Selection};
use crate::render::context::RenderContext;
use crate::render::layout::{dashboard_layout, sidebar_layout};
use crate::views::Views;
use crate::widgets::bar_chart::FrequencyChart;
use crate::widgets::farmer_table::FarmerTable;
use crate::widgets::metrics::MetricTiles;
use crate::widgets::pie::ShareChart;
use crate::widgets::radio_block::GenderRadio;
use crate::widgets::selector::{Selector, SelectorKind};
use crate::Focus;

/// What the sidebar shows. Options are empty while nothing is loaded or derivation failed.
pub struct SidebarModel<'a> {
    pub crop_options: &'a [String],
    pub village_options: &'a [String],
    pub selection: Option<&'a Selection>,
    pub headers: &'a [String],
    pub focus: Focus,
    pub crop_cursor: usize,
    pub village_cursor: usize,
}

pub fn render_sidebar(area: Rect, buf: &mut Buffer, model: &SidebarModel<'_>, ctx: &RenderContext) {
    let layout = sidebar_layout(area, model.headers.len());

    let crops_checked = model
        .crop_options
        .iter()
        .map(|c| model.selection.is_some_and(|s| s.has_crop(c)))
        .collect();
    Selector::new("Crops", SelectorKind::Multi, model.crop_options, crops_checked, ctx)
        .cursor(model.crop_cursor)
        .focused(model.focus == Focus::Crops)
        .render(layout.crops, buf);

    let gender = model.selection.map(|s| s.gender).unwrap_or(GenderFilter::All);
    GenderRadio::new(gender, model.focus == Focus::Gender, ctx).render(layout.gender, buf);

    let village = model.selection.and_then(|s| s.village.as_deref());
    let village_checked = model
        .village_options
        .iter()
        .map(|v| Some(v.as_str()) == village)
        .collect();
    Selector::new(
        "Village",
        SelectorKind::Single,
        model.village_options,
        village_checked,
        ctx,
    )
    .cursor(model.village_cursor)
    .focused(model.focus == Focus::Village)
    .render(layout.village, buf);

    let columns = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title("Columns")
        .border_style(Style::default().fg(ctx.sidebar_border));
    let text = if model.headers.is_empty() {
        "-".to_string()
    } else {
        model.headers.join("\n")
    };
    Paragraph::new(text)
        .style(Style::default().fg(ctx.text_secondary))
        .block(columns)
        .render(layout.columns, buf);
}

pub fn render_title(area: Rect, buf: &mut Buffer, title: &str, ctx: &RenderContext) {
    Paragraph::new(title)
        .style(
            Style::default()
                .fg(ctx.text_primary)
                .add_modifier(Modifier::BOLD),
        )
        .centered()
        .render(area, buf);
}

/// Dashboard body for a successful derivation.
pub fn render_dashboard(
    area: Rect,
    buf: &mut Buffer,
    title: &str,
    views: &Views,
    table_offset: usize,
    tables_focused: bool,
    ctx: &RenderContext,
) {
    let layout = dashboard_layout(area);
    let village = views.selection.village.as_deref().unwrap_or("-");

    render_title(layout.title, buf, title, ctx);
    MetricTiles {
        metrics: &views.metrics,
        ctx,
    }
    .render(layout.metrics, buf);

    let crop_bars: Vec<BarPoint> = views.crop_counts.iter().map(BarPoint::from).collect();
    FrequencyChart::new(format!("Production by Crop in {}", village), &crop_bars, ctx)
        .render(layout.crop_chart, buf);

    ShareChart::new(
        format!("Gender Distribution in {}", village),
        &views.gender_shares,
        ctx,
    )
    .render(layout.gender_chart, buf);

    let village_bars: Vec<BarPoint> = views.village_counts.iter().map(BarPoint::from).collect();
    FrequencyChart::new("Farmers per Village", &village_bars, ctx).render(layout.village_chart, buf);

    let area_bars: Vec<BarPoint> = views.area_by_farmer.iter().map(BarPoint::from).collect();
    FrequencyChart::new(
        format!("Total Area Holding (Ha) in {}", village),
        &area_bars,
        ctx,
    )
    .color(ctx.secondary_chart_series_color)
    .render(layout.area_chart, buf);

    FarmerTable::new("Farmers Information Table", &views.farmers, ctx)
        .offset(table_offset)
        .focused(tables_focused)
        .render(layout.farmers, buf);
    FarmerTable::new(format!("Farmers in {}", village), &views.village_farmers, ctx)
        .offset(table_offset)
        .focused(tables_focused)
        .render(layout.village_farmers, buf);
}

/// Bordered message in place of the dashboard body (no file, load or schema errors).
pub fn render_message_panel(
    area: Rect,
    buf: &mut Buffer,
    title: &str,
    message: &str,
    color: Color,
    border: Color,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title)
        .border_style(Style::default().fg(border));
    Paragraph::new(message)
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: true })
        .block(block)
        .render(area, buf);
}
