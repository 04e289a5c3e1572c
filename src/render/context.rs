use crate::config::{AppConfig, Theme};
use ratatui::style::{Color, Modifier, Style};

/// Snapshot of theme colors and display configuration for rendering.
/// Passed to widgets to avoid threading many individual parameters.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub keybind_hints: Color,
    pub keybind_labels: Color,
    pub controls_bg: Color,
    pub background: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub dimmed: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub sidebar_border: Color,
    pub focus_border: Color,
    pub error_border: Color,
    pub primary_chart_series_color: Color,
    pub secondary_chart_series_color: Color,

    pub table_header: Color,
    pub table_header_bg: Color,
    /// Style of the entry under the cursor in lists and tables.
    pub selected: Style,

    pub table_cell_padding: u16,
    pub sidebar_width: u16,
    pub max_bars: usize,
}

impl RenderContext {
    /// Build render context from app theme and config.
    pub fn from_theme_and_config(theme: &Theme, config: &AppConfig) -> Self {
        let selected = if theme.is_reversed("table_selected") {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
                .bg(theme.get("table_selected"))
                .add_modifier(Modifier::BOLD)
        };
        Self {
            keybind_hints: theme.get("keybind_hints"),
            keybind_labels: theme.get("keybind_labels"),
            controls_bg: theme.get("controls_bg"),
            background: theme.get("background"),
            text_primary: theme.get("text_primary"),
            text_secondary: theme.get("text_secondary"),
            dimmed: theme.get("dimmed"),
            success: theme.get("success"),
            warning: theme.get("warning"),
            error: theme.get("error"),
            sidebar_border: theme.get("sidebar_border"),
            focus_border: theme.get("focus_border"),
            error_border: theme.get("error_border"),
            primary_chart_series_color: theme.get("primary_chart_series_color"),
            secondary_chart_series_color: theme.get("secondary_chart_series_color"),

            table_header: theme.get("table_header"),
            table_header_bg: theme.get("table_header_bg"),
            selected,

            table_cell_padding: config.display.table_cell_padding,
            sidebar_width: config.display.sidebar_width,
            max_bars: config.display.max_bars,
        }
    }

    pub fn border(&self, focused: bool) -> Style {
        Style::default().fg(if focused {
            self.focus_border
        } else {
            self.sidebar_border
        })
    }
}
