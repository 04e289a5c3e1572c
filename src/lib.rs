use color_eyre::eyre::eyre;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use tracing::{debug, info, warn};

use ratatui::style::Style;
use ratatui::{buffer::Buffer, layout::Rect, widgets::Block, widgets::Widget};

pub mod chart_export;
pub mod config;
pub mod error_display;
mod help_strings;
pub mod pipeline;
mod render;
pub mod schema;
pub mod source;
pub mod table;
pub mod views;
pub mod widgets;

pub use config::{
    rgb_to_256_color, rgb_to_basic_ansi, AppConfig, ColorParser, ConfigManager, Theme,
};
pub use farmdash_cli::{Args, GenderArg, SpreadsheetFormat};
pub use pipeline::{GenderFilter, Pipeline, PipelineError, Selection, ValueCount};
pub use schema::{ColumnNames, SchemaError};
pub use source::LoadOptions;
pub use table::Table;
pub use views::{derive_views, DashboardSettings, Metric, Views};

use error_display::{user_message_from_pipeline, user_message_from_report};
use render::context::RenderContext;
use render::dashboard::{
    render_dashboard, render_message_panel, render_sidebar, render_title, SidebarModel,
};
use render::layout::{app_layout, split_sidebar};
use render::overlays::{render_error_modal, render_help_overlay, render_open_prompt};
use widgets::controls::{Controls, StatusKind};
use widgets::debug::DebugState;
use widgets::path_input::{PathInput, PathInputEvent};

/// Application name used for the config directory and other app-specific paths
pub const APP_NAME: &str = "farmdash";

/// Environment variable holding tracing filter directives.
pub const LOG_ENV: &str = "FARMDASH_LOG";

impl From<GenderArg> for GenderFilter {
    fn from(arg: GenderArg) -> Self {
        match arg {
            GenderArg::All => Self::All,
            GenderArg::M => Self::M,
            GenderArg::F => Self::F,
        }
    }
}

impl From<&Args> for LoadOptions {
    fn from(args: &Args) -> Self {
        match &args.sheet {
            Some(sheet) => LoadOptions::new().with_sheet(sheet.clone()),
            None => LoadOptions::new(),
        }
    }
}

/// Selector values requested before a table is loaded (from the command line).
/// Values absent from the table are dropped by the next derivation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionOverrides {
    /// Empty keeps the default of every crop.
    pub crops: Vec<String>,
    pub gender: GenderFilter,
    pub village: Option<String>,
}

impl From<&Args> for SelectionOverrides {
    fn from(args: &Args) -> Self {
        Self {
            crops: args.crops.clone(),
            gender: args.gender.into(),
            village: args.village.clone(),
        }
    }
}

impl SelectionOverrides {
    pub fn apply(&self, pipeline: &mut Pipeline) {
        pipeline.update_selection(|s| {
            if !self.crops.is_empty() {
                s.crops = self.crops.clone();
            }
            s.gender = self.gender;
            if self.village.is_some() {
                s.village = self.village.clone();
            }
        });
    }
}

/// Load a workbook and derive its views in one go (used by `--report` and `--export-charts`).
pub fn load_and_derive(
    path: &Path,
    options: &LoadOptions,
    config: &AppConfig,
    overrides: &SelectionOverrides,
) -> Result<Views> {
    let table = source::load_path(path, options, &config.columns)?;
    let mut pipeline = Pipeline::new();
    if let Err(e) = pipeline.load(table) {
        warn!(error = %e, "loaded sheet fails the schema check");
    }
    overrides.apply(&mut pipeline);
    match pipeline.derive(&config.dashboard) {
        Some(result) => Ok(result?),
        None => Err(eyre!("No table loaded")),
    }
}

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Open(PathBuf),
    ExportCharts,
    Exit,
    Resize(u16, u16), // resized (width, height)
}

/// Which sidebar block or table receives navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Crops,
    Gender,
    Village,
    Tables,
}

impl Focus {
    const ORDER: [Self; 4] = [Self::Crops, Self::Gender, Self::Village, Self::Tables];

    fn index(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

#[derive(Default)]
pub struct ErrorModal {
    pub active: bool,
    pub message: String,
}

impl ErrorModal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, message: String) {
        self.active = true;
        self.message = message;
    }

    pub fn hide(&mut self) {
        self.active = false;
        self.message.clear();
    }
}

/// Rows moved by PageUp/PageDown in the farmer tables.
const PAGE_ROWS: usize = 10;

pub struct App {
    events: Sender<AppEvent>,
    config: AppConfig,
    theme: Theme,
    pipeline: Pipeline,
    path: Option<PathBuf>,
    load_options: LoadOptions,
    /// Applied once to the next loaded table.
    pending_overrides: Option<SelectionOverrides>,
    views: Option<std::result::Result<Views, PipelineError>>,
    load_error: Option<String>,
    pub focus: Focus,
    crop_cursor: usize,
    village_cursor: usize,
    table_offset: usize,
    pub error_modal: ErrorModal,
    open_prompt: Option<PathInput>,
    pub show_help: bool,
    help_scroll: usize,
    status: Option<(StatusKind, String)>,
    debug: DebugState,
}

impl App {
    pub fn new(events: Sender<AppEvent>) -> Self {
        Self::with_config(events, AppConfig::default(), Theme::default())
    }

    pub fn with_config(events: Sender<AppEvent>, config: AppConfig, theme: Theme) -> Self {
        let debug = DebugState {
            enabled: config.debug.enabled,
            ..DebugState::default()
        };
        Self {
            events,
            config,
            theme,
            pipeline: Pipeline::new(),
            path: None,
            load_options: LoadOptions::default(),
            pending_overrides: None,
            views: None,
            load_error: None,
            focus: Focus::default(),
            crop_cursor: 0,
            village_cursor: 0,
            table_offset: 0,
            error_modal: ErrorModal::new(),
            open_prompt: None,
            show_help: false,
            help_scroll: 0,
            status: None,
            debug,
        }
    }

    pub fn send_event(&mut self, event: AppEvent) -> Result<()> {
        self.events.send(event)?;
        Ok(())
    }

    pub fn enable_debug(&mut self) {
        self.debug.enabled = true;
    }

    pub fn set_load_options(&mut self, options: LoadOptions) {
        self.load_options = options;
    }

    /// Selector values to apply to the next table that is opened.
    pub fn set_initial_selection(&mut self, overrides: SelectionOverrides) {
        self.pending_overrides = Some(overrides);
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Result of the latest derivation. None while nothing is loaded.
    pub fn views(&self) -> Option<&std::result::Result<Views, PipelineError>> {
        self.views.as_ref()
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_ref().map(|(_, m)| m.as_str())
    }

    pub fn is_prompt_open(&self) -> bool {
        self.open_prompt.is_some()
    }

    pub fn crop_cursor(&self) -> usize {
        self.crop_cursor
    }

    pub fn village_cursor(&self) -> usize {
        self.village_cursor
    }

    pub fn table_offset(&self) -> usize {
        self.table_offset
    }

    fn ok_views(&self) -> Option<&Views> {
        match &self.views {
            Some(Ok(v)) => Some(v),
            _ => None,
        }
    }

    fn crop_options(&self) -> Vec<String> {
        self.ok_views()
            .map(|v| v.crop_options.clone())
            .unwrap_or_default()
    }

    fn village_options(&self) -> Vec<String> {
        self.ok_views()
            .map(|v| v.village_options.clone())
            .unwrap_or_default()
    }

    /// Replace the current table with the workbook at `path`.
    ///
    /// The pipeline is reset first, so a failed read leaves nothing loaded.
    pub fn open(&mut self, path: &Path) {
        info!(path = %path.display(), "opening workbook");
        self.pipeline.reset();
        self.views = None;
        self.load_error = None;
        self.status = None;
        self.crop_cursor = 0;
        self.village_cursor = 0;
        self.table_offset = 0;
        self.path = Some(path.to_path_buf());

        let table = match source::load_path(path, &self.load_options, &self.config.columns) {
            Ok(table) => table,
            Err(e) => {
                let message = user_message_from_report(&e, Some(path));
                warn!(error = %e, "failed to load workbook");
                self.load_error = Some(message.clone());
                self.error_modal.show(message);
                return;
            }
        };

        let issues = table.area_issues();
        if let Err(e) = self.pipeline.load(table) {
            warn!(error = %e, "loaded sheet fails the schema check");
        }
        if let Some(overrides) = self.pending_overrides.take() {
            overrides.apply(&mut self.pipeline);
        }
        self.recompute();

        match &self.views {
            Some(Err(e)) => self.error_modal.show(user_message_from_pipeline(e)),
            Some(Ok(_)) if issues > 0 => {
                self.status = Some((
                    StatusKind::Warning,
                    format!("{} unreadable area value(s) treated as missing", issues),
                ));
            }
            _ => {}
        }
    }

    /// Re-derive every view from the current selection and sync the list cursors.
    fn recompute(&mut self) {
        self.views = self.pipeline.derive(&self.config.dashboard);
        self.debug.num_derivations += 1;
        match &self.views {
            Some(Ok(views)) => {
                self.crop_cursor = self
                    .crop_cursor
                    .min(views.crop_options.len().saturating_sub(1));
                self.village_cursor = views
                    .selection
                    .village
                    .as_ref()
                    .and_then(|v| views.village_options.iter().position(|o| o == v))
                    .unwrap_or(0);
                self.table_offset = self
                    .table_offset
                    .min(views.farmers.len().saturating_sub(1));
            }
            Some(Err(e)) => debug!(error = %e, "derivation failed"),
            None => {}
        }
    }

    /// Write the dashboard charts as PNG files into the configured export directory.
    pub fn export_charts(&mut self) {
        let Some(views) = self.ok_views() else {
            self.status = Some((StatusKind::Warning, "Nothing to export".to_string()));
            return;
        };
        let dir = self
            .config
            .chart_export
            .directory
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let size = (self.config.chart_export.width, self.config.chart_export.height);
        match chart_export::export_dashboard_charts(&dir, views, size) {
            Ok(written) => {
                self.status = Some((
                    StatusKind::Success,
                    format!("Exported {} chart(s) to {}", written.len(), dir.display()),
                ));
            }
            Err(e) => {
                warn!(error = %e, "chart export failed");
                self.error_modal
                    .show(format!("Chart export failed: {}", user_message_from_report(&e, None)));
            }
        }
    }

    fn open_prompt_with_current_path(&mut self) {
        let current = self
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        self.open_prompt = Some(PathInput::new(&current, self.color("text_primary")));
    }

    fn key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        self.debug.on_key(event);

        // Error modal has highest priority
        if self.error_modal.active {
            if matches!(event.code, KeyCode::Esc | KeyCode::Enter) {
                self.error_modal.hide();
            }
            return None;
        }

        if let Some(input) = self.open_prompt.as_mut() {
            match input.handle_key(event) {
                PathInputEvent::Cancel => self.open_prompt = None,
                PathInputEvent::Submit(text) => {
                    self.open_prompt = None;
                    if !text.is_empty() {
                        return Some(AppEvent::Open(expand_home(&text)));
                    }
                }
                PathInputEvent::None => {}
            }
            return None;
        }

        if self.show_help {
            match event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::F(1) | KeyCode::Char('q') => {
                    self.show_help = false;
                    self.help_scroll = 0;
                }
                KeyCode::Down | KeyCode::Char('j') => {
                    self.help_scroll = self.help_scroll.saturating_add(1)
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    self.help_scroll = self.help_scroll.saturating_sub(1)
                }
                KeyCode::PageDown => self.help_scroll = self.help_scroll.saturating_add(PAGE_ROWS),
                KeyCode::PageUp => self.help_scroll = self.help_scroll.saturating_sub(PAGE_ROWS),
                _ => {}
            }
            return None;
        }

        match event.code {
            KeyCode::Char('q') => return Some(AppEvent::Exit),
            KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => {
                return Some(AppEvent::Exit)
            }
            KeyCode::Char('?') | KeyCode::F(1) => {
                self.show_help = true;
                return None;
            }
            KeyCode::Char('o') => {
                self.open_prompt_with_current_path();
                return None;
            }
            KeyCode::Char('e') => return Some(AppEvent::ExportCharts),
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return None;
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
                return None;
            }
            KeyCode::Char('a') => {
                let options = self.crop_options();
                self.pipeline.select_all_crops(&options);
                self.after_selection_change("select_all_crops");
                return None;
            }
            KeyCode::Char('n') => {
                self.pipeline.clear_crops();
                self.after_selection_change("clear_crops");
                return None;
            }
            _ => {}
        }

        match self.focus {
            Focus::Crops => self.crops_key(event.code),
            Focus::Gender => self.gender_key(event.code),
            Focus::Village => self.village_key(event.code),
            Focus::Tables => self.tables_key(event.code),
        }
        None
    }

    fn after_selection_change(&mut self, action: &str) {
        debug!(action, "selection changed");
        self.debug.last_action = action.to_string();
        self.recompute();
    }

    fn crops_key(&mut self, code: KeyCode) {
        let options = self.crop_options();
        match code {
            KeyCode::Up | KeyCode::Char('k') => self.crop_cursor = self.crop_cursor.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                self.crop_cursor = (self.crop_cursor + 1).min(options.len().saturating_sub(1))
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(crop) = options.get(self.crop_cursor) {
                    self.pipeline.toggle_crop(crop, &options);
                    self.after_selection_change("toggle_crop");
                }
            }
            _ => {}
        }
    }

    fn gender_key(&mut self, code: KeyCode) {
        let Some(current) = self.pipeline.selection().map(|s| s.gender) else {
            return;
        };
        let next = match code {
            KeyCode::Left | KeyCode::Char('h') => current.prev(),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => current.next(),
            _ => return,
        };
        self.pipeline.set_gender(next);
        self.after_selection_change("set_gender");
    }

    fn village_key(&mut self, code: KeyCode) {
        let options = self.village_options();
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.village_cursor = self.village_cursor.saturating_sub(1)
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.village_cursor = (self.village_cursor + 1).min(options.len().saturating_sub(1))
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(village) = options.get(self.village_cursor) {
                    self.pipeline.set_village(Some(village.clone()));
                    self.after_selection_change("set_village");
                }
            }
            _ => {}
        }
    }

    fn tables_key(&mut self, code: KeyCode) {
        let max = self
            .ok_views()
            .map(|v| v.farmers.len().saturating_sub(1))
            .unwrap_or(0);
        self.table_offset = match code {
            KeyCode::Up | KeyCode::Char('k') => self.table_offset.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => self.table_offset + 1,
            KeyCode::PageUp => self.table_offset.saturating_sub(PAGE_ROWS),
            KeyCode::PageDown => self.table_offset + PAGE_ROWS,
            KeyCode::Home => 0,
            KeyCode::End => max,
            _ => self.table_offset,
        }
        .min(max);
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        self.debug.num_events += 1;
        match event {
            AppEvent::Key(key) => self.key(key),
            AppEvent::Open(path) => {
                self.open(path);
                None
            }
            AppEvent::ExportCharts => {
                self.export_charts();
                None
            }
            AppEvent::Resize(_, _) => None,
            AppEvent::Exit => None,
        }
    }

    fn color(&self, name: &str) -> ratatui::style::Color {
        self.theme.get(name)
    }
}

/// Expand a leading `~/` to the home directory.
fn expand_home(text: &str) -> PathBuf {
    match (text.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(text),
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.debug.num_frames += 1;

        Block::default()
            .style(Style::default().bg(self.color("background")))
            .render(area, buf);

        let ctx = RenderContext::from_theme_and_config(&self.theme, &self.config);
        let layout = app_layout(area, self.debug.enabled);
        let (sidebar_area, main_area) = split_sidebar(layout.main_view, ctx.sidebar_width);

        let headers = self
            .pipeline
            .table()
            .map(|t| t.headers())
            .unwrap_or_default();
        let empty: &[String] = &[];
        let (crop_options, village_options, selection) = match &self.views {
            Some(Ok(v)) => (
                v.crop_options.as_slice(),
                v.village_options.as_slice(),
                Some(&v.selection),
            ),
            _ => (empty, empty, self.pipeline.selection()),
        };
        render_sidebar(
            sidebar_area,
            buf,
            &SidebarModel {
                crop_options,
                village_options,
                selection,
                headers: &headers,
                focus: self.focus,
                crop_cursor: self.crop_cursor,
                village_cursor: self.village_cursor,
            },
            &ctx,
        );

        let title = self.config.dashboard.title.as_str();
        match &self.views {
            Some(Ok(views)) => render_dashboard(
                main_area,
                buf,
                title,
                views,
                self.table_offset,
                self.focus == Focus::Tables,
                &ctx,
            ),
            Some(Err(e)) => {
                let (title_area, body) = split_title(main_area);
                render_title(title_area, buf, title, &ctx);
                render_message_panel(
                    body,
                    buf,
                    "Error",
                    &user_message_from_pipeline(e),
                    ctx.error,
                    ctx.error_border,
                );
            }
            None => {
                let (title_area, body) = split_title(main_area);
                render_title(title_area, buf, title, &ctx);
                match &self.load_error {
                    Some(message) => render_message_panel(
                        body,
                        buf,
                        "Error",
                        message,
                        ctx.error,
                        ctx.error_border,
                    ),
                    None => render_message_panel(
                        body,
                        buf,
                        "No workbook loaded",
                        "Press o to open an Excel workbook (.xlsx, .xlsm, .xlsb, .xls), ? for help.",
                        ctx.dimmed,
                        ctx.sidebar_border,
                    ),
                }
            }
        }

        let row_count = self.ok_views().map(|v| v.filtered_rows);
        let status = self.status.as_ref().map(|(k, m)| (*k, m.as_str()));
        Controls::new(&ctx)
            .with_row_count(row_count)
            .with_status(status)
            .with_dimmed(self.error_modal.active || self.show_help || self.open_prompt.is_some())
            .render(layout.control_bar, buf);

        if let Some(debug_area) = layout.debug {
            (&self.debug).render(debug_area, buf);
        }

        if let Some(input) = &self.open_prompt {
            render_open_prompt(area, buf, input, help_strings::open_prompt(), &ctx);
        }
        if self.show_help {
            render_help_overlay(
                area,
                buf,
                "Help",
                help_strings::dashboard(),
                &mut self.help_scroll,
                &ctx,
            );
        }
        if self.error_modal.active {
            render_error_modal(area, buf, &self.error_modal.message, &ctx);
        }
    }
}

fn split_title(area: Rect) -> (Rect, Rect) {
    use ratatui::layout::{Constraint, Direction, Layout};
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Fill(1)])
        .split(area);
    (chunks[0], chunks[1])
}
