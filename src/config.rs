use color_eyre::eyre::eyre;
use color_eyre::Result;
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use supports_color::Stream;

use crate::schema::ColumnNames;
use crate::views::DashboardSettings;

/// Largest chart export edge in pixels.
pub const MAX_EXPORT_PX: u32 = 8192;

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get path to a specific config file or subdirectory
    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Generate default configuration template as a string with comments.
    /// All fields are commented out so defaults are used, but users can uncomment to override.
    pub fn generate_default_config(&self) -> String {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config)
            .unwrap_or_else(|e| panic!("Failed to serialize default config: {}", e));

        Self::comment_all_fields(&toml_str, &Self::collect_all_comments())
    }

    fn collect_all_comments() -> HashMap<String, String> {
        let mut comments = HashMap::new();
        let sections: [(&str, &[(&str, &str)]); 7] = [
            ("", APP_COMMENTS),
            ("columns", COLUMNS_COMMENTS),
            ("dashboard", DASHBOARD_COMMENTS),
            ("display", DISPLAY_COMMENTS),
            ("chart_export", CHART_EXPORT_COMMENTS),
            ("theme.colors", COLOR_COMMENTS),
            ("debug", DEBUG_COMMENTS),
        ];
        for (section, fields) in sections {
            for (field, comment) in fields {
                let key = if section.is_empty() {
                    field.to_string()
                } else {
                    format!("{}.{}", section, field)
                };
                comments.insert(key, comment.to_string());
            }
        }
        comments
    }

    /// Comment out every line of the serialized defaults, adding field and section comments.
    fn comment_all_fields(toml: &str, comments: &HashMap<String, String>) -> String {
        let mut result = String::new();
        result.push_str("# farmdash configuration file\n");
        result
            .push_str("# This file uses TOML format. See https://toml.io/ for syntax reference.\n");
        result.push('\n');

        let mut current_section = String::new();
        let mut seen_sections: HashSet<String> = HashSet::new();

        for line in toml.lines() {
            if let Some(section) = Self::extract_section_name(line) {
                if seen_sections.insert(section.clone()) {
                    if let Some((_, header)) = SECTION_HEADERS.iter().find(|(s, _)| *s == section)
                    {
                        result.push_str(header);
                        result.push('\n');
                    }
                }
                current_section = section;
                result.push_str("# ");
                result.push_str(line);
                result.push('\n');
                continue;
            }

            if let Some(field_path) = Self::extract_field_path(line, &current_section) {
                if let Some(comment) = comments.get(&field_path) {
                    for comment_line in comment.lines() {
                        result.push_str("# ");
                        result.push_str(comment_line);
                        result.push('\n');
                    }
                }
                result.push_str("# ");
                result.push_str(line);
                result.push('\n');
            } else {
                result.push_str(line);
                result.push('\n');
            }
        }

        result
    }

    /// Section name from a header line: "[display]" -> "display", "[[dashboard.metrics]]" -> "dashboard.metrics"
    fn extract_section_name(line: &str) -> Option<String> {
        let trimmed = line.trim();
        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            Some(
                trimmed
                    .trim_start_matches('[')
                    .trim_end_matches(']')
                    .to_string(),
            )
        } else {
            None
        }
    }

    fn extract_field_path(line: &str, current_section: &str) -> Option<String> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('[') {
            return None;
        }
        let eq_pos = trimmed.find('=')?;
        let field_name = trimmed[..eq_pos].trim().trim_matches('"');
        if current_section.is_empty() {
            Some(field_name.to_string())
        } else {
            Some(format!("{}.{}", current_section, field_name))
        }
    }

    /// Write default configuration to config file
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path("config.toml");

        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }

        self.ensure_config_dir()?;
        std::fs::write(&config_path, self.generate_default_config())?;

        Ok(config_path)
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version (for future compatibility)
    pub version: String,
    pub columns: ColumnNames,
    pub dashboard: DashboardSettings,
    pub display: DisplayConfig,
    pub chart_export: ChartExportConfig,
    pub theme: ThemeConfig,
    pub debug: DebugConfig,
}

const APP_COMMENTS: &[(&str, &str)] = &[(
    "version",
    "Configuration format version (for future compatibility)",
)];

const SECTION_HEADERS: &[(&str, &str)] = &[
    (
        "columns",
        "# ============================================================================\n# Workbook Columns\n# ============================================================================\n# Header names of the required columns, matched exactly (including spaces).",
    ),
    (
        "dashboard",
        "# ============================================================================\n# Dashboard\n# ============================================================================",
    ),
    (
        "dashboard.metrics",
        "# Fixed metric tiles shown after \"Farmers Count\". Repeat the block for more tiles.",
    ),
    (
        "display",
        "# ============================================================================\n# Display Settings\n# ============================================================================",
    ),
    (
        "chart_export",
        "# ============================================================================\n# Chart Export (PNG)\n# ============================================================================",
    ),
    (
        "theme.colors",
        "# ============================================================================\n# Color Theme\n# ============================================================================\n# Supported formats:\n#   - Named colors: \"red\", \"blue\", \"bright_red\", \"dark_gray\", etc. (case-insensitive)\n#   - Hex colors: \"#ff0000\"\n#   - Indexed colors: \"indexed(0-255)\"",
    ),
    (
        "debug",
        "# ============================================================================\n# Debug Settings\n# ============================================================================",
    ),
];

const COLUMNS_COMMENTS: &[(&str, &str)] = &[
    ("farmer_id", "Unique farmer identifier"),
    ("farmer_name", "Farmer name (the source workbooks use two spaces)"),
    ("mobile_no", "Mobile number"),
    ("village", "Village, used for the village selector and counts"),
    ("area", "Total area holding in hectares"),
    ("crop", "Production crop, used for the crop selector and counts"),
    ("gender", "Gender code: M or F"),
];

const DASHBOARD_COMMENTS: &[(&str, &str)] = &[
    ("title", "Title shown above the dashboard"),
    ("label", "Metric label"),
    ("value", "Metric value, shown as-is"),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Milliseconds between terminal event polls.
    pub event_poll_interval_ms: u64,
    /// Width of the selector sidebar in columns.
    pub sidebar_width: u16,
    pub table_cell_padding: u16,
    /// Maximum bars drawn per terminal chart (largest first).
    pub max_bars: usize,
}

const DISPLAY_COMMENTS: &[(&str, &str)] = &[
    (
        "event_poll_interval_ms",
        "Milliseconds between terminal event polls",
    ),
    ("sidebar_width", "Width of the selector sidebar in columns"),
    ("table_cell_padding", "Spaces between table columns"),
    (
        "max_bars",
        "Maximum bars drawn per chart in the terminal (largest first)",
    ),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartExportConfig {
    pub width: u32,
    pub height: u32,
    /// Directory used by the in-app export key. null = current directory.
    pub directory: Option<String>,
}

const CHART_EXPORT_COMMENTS: &[(&str, &str)] = &[
    ("width", "Image width in pixels"),
    ("height", "Image height in pixels"),
    (
        "directory",
        "Directory for charts exported from the interface. Unset = current directory",
    ),
];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    pub colors: ColorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
/// Color configuration for the application theme.
///
/// - `keybind_hints` / `keybind_labels`: keys and action labels in the control bar
/// - `controls_bg`: control bar background
/// - `primary_chart_series_color` / `secondary_chart_series_color`: bars and pie slices
/// - `success`, `warning`, `error`: status text
/// - `sidebar_border`, `focus_border`, `error_border`: block borders
/// - `table_header`, `table_header_bg`, `table_selected`: farmer tables
pub struct ColorConfig {
    pub keybind_hints: String,
    pub keybind_labels: String,
    pub controls_bg: String,
    pub primary_chart_series_color: String,
    pub secondary_chart_series_color: String,
    pub success: String,
    pub warning: String,
    pub error: String,
    pub dimmed: String,
    pub background: String,
    pub text_primary: String,
    pub text_secondary: String,
    pub table_header: String,
    pub table_header_bg: String,
    pub table_selected: String,
    pub sidebar_border: String,
    pub focus_border: String,
    pub error_border: String,
}

const COLOR_COMMENTS: &[(&str, &str)] = &[
    ("keybind_hints", "Keys in the control bar"),
    ("keybind_labels", "Action labels in the control bar"),
    ("controls_bg", "Control bar background"),
    ("primary_chart_series_color", "Bars and the first pie slice"),
    (
        "secondary_chart_series_color",
        "Area bars and alternating pie slices",
    ),
    ("success", "Success messages"),
    ("warning", "Warnings (e.g. unreadable area values)"),
    ("error", "Error messages"),
    ("dimmed", "Dimmed text and empty-state hints"),
    ("background", "Main background"),
    ("text_primary", "Primary text"),
    ("text_secondary", "Secondary text"),
    ("table_header", "Table header text"),
    ("table_header_bg", "Table header background"),
    ("table_selected", "Selected list entry"),
    ("sidebar_border", "Unfocused block borders"),
    ("focus_border", "Border of the focused selector"),
    ("error_border", "Border of the error panel"),
];

impl ColorConfig {
    /// (name, value) for every configured color.
    pub fn entries(&self) -> [(&'static str, &str); 18] {
        [
            ("keybind_hints", &self.keybind_hints),
            ("keybind_labels", &self.keybind_labels),
            ("controls_bg", &self.controls_bg),
            ("primary_chart_series_color", &self.primary_chart_series_color),
            (
                "secondary_chart_series_color",
                &self.secondary_chart_series_color,
            ),
            ("success", &self.success),
            ("warning", &self.warning),
            ("error", &self.error),
            ("dimmed", &self.dimmed),
            ("background", &self.background),
            ("text_primary", &self.text_primary),
            ("text_secondary", &self.text_secondary),
            ("table_header", &self.table_header),
            ("table_header_bg", &self.table_header_bg),
            ("table_selected", &self.table_selected),
            ("sidebar_border", &self.sidebar_border),
            ("focus_border", &self.focus_border),
            ("error_border", &self.error_border),
        ]
    }

    pub fn validate(&self, parser: &ColorParser) -> Result<()> {
        for (name, value) in self.entries() {
            parser
                .parse(value)
                .map_err(|e| eyre!("theme.colors.{}: {}", name, e))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DebugConfig {
    /// Show the debug row (event and frame counters) at startup.
    pub enabled: bool,
}

const DEBUG_COMMENTS: &[(&str, &str)] = &[(
    "enabled",
    "Show the debug row (event and frame counters) at startup",
)];

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            columns: ColumnNames::default(),
            dashboard: DashboardSettings::default(),
            display: DisplayConfig::default(),
            chart_export: ChartExportConfig::default(),
            theme: ThemeConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            event_poll_interval_ms: 25,
            sidebar_width: 32,
            table_cell_padding: 2,
            max_bars: 12,
        }
    }
}

impl Default for ChartExportConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            directory: None,
        }
    }
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            keybind_hints: "cyan".to_string(),
            keybind_labels: "indexed(252)".to_string(),
            controls_bg: "indexed(235)".to_string(),
            primary_chart_series_color: "cyan".to_string(),
            secondary_chart_series_color: "green".to_string(),
            success: "green".to_string(),
            warning: "yellow".to_string(),
            error: "red".to_string(),
            dimmed: "dark_gray".to_string(),
            background: "default".to_string(),
            text_primary: "default".to_string(),
            text_secondary: "indexed(245)".to_string(),
            table_header: "white".to_string(),
            table_header_bg: "indexed(235)".to_string(),
            table_selected: "reversed".to_string(),
            sidebar_border: "indexed(240)".to_string(),
            focus_border: "yellow".to_string(),
            error_border: "red".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from all layers (defaults, then the user's config file)
    pub fn load(app_name: &str) -> Result<Self> {
        let manager = ConfigManager::new(app_name)?;
        Self::load_from(&manager)
    }

    /// Load configuration using an explicit config directory
    pub fn load_from(manager: &ConfigManager) -> Result<Self> {
        let config_path = manager.config_path("config.toml");
        let mut config = AppConfig::default();
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path).map_err(|e| {
                eyre!(
                    "Failed to read config file at {}: {}",
                    config_path.display(),
                    e
                )
            })?;
            let user: AppConfig = toml::from_str(&content).map_err(|e| {
                eyre!(
                    "Failed to parse config file at {}: {}",
                    config_path.display(),
                    e
                )
            })?;
            config.merge(user);
        }

        config.validate().map_err(|e| {
            eyre!(
                "Invalid configuration in {}: {}",
                config_path.display(),
                e
            )
        })?;

        Ok(config)
    }

    /// Merge another config into this one (other takes precedence).
    /// Sections are `#[serde(default)]`, so omitted user fields already hold defaults.
    pub fn merge(&mut self, other: AppConfig) {
        if other.version != AppConfig::default().version {
            self.version = other.version;
        }
        self.columns = other.columns;
        self.dashboard = other.dashboard;
        self.display = other.display;
        self.chart_export.merge(other.chart_export);
        self.theme = other.theme;
        self.debug = other.debug;
    }

    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with("0.1") {
            return Err(eyre!(
                "Unsupported config version: {}. Expected 0.1.x",
                self.version
            ));
        }

        if self.display.event_poll_interval_ms == 0 {
            return Err(eyre!("event_poll_interval_ms must be greater than 0"));
        }

        if self.display.max_bars == 0 {
            return Err(eyre!("max_bars must be greater than 0"));
        }

        let (w, h) = (self.chart_export.width, self.chart_export.height);
        if w == 0 || h == 0 || w > MAX_EXPORT_PX || h > MAX_EXPORT_PX {
            return Err(eyre!(
                "chart_export width and height must be between 1 and {}, got {}x{}",
                MAX_EXPORT_PX,
                w,
                h
            ));
        }

        let mut seen = HashSet::new();
        for name in self.columns.required() {
            if name.is_empty() {
                return Err(eyre!("column names must not be empty"));
            }
            if !seen.insert(name) {
                return Err(eyre!("column \"{}\" is mapped more than once", name));
            }
        }

        self.theme.colors.validate(&ColorParser::new())?;

        Ok(())
    }
}

impl ChartExportConfig {
    pub fn merge(&mut self, other: Self) {
        self.width = other.width;
        self.height = other.height;
        if other.directory.is_some() {
            self.directory = other.directory;
        }
    }
}

/// Color parser with terminal capability detection
pub struct ColorParser {
    supports_true_color: bool,
    supports_256: bool,
    no_color: bool,
}

impl ColorParser {
    pub fn new() -> Self {
        let no_color = std::env::var("NO_COLOR").is_ok();
        let support = supports_color::on(Stream::Stdout);

        Self {
            supports_true_color: support.as_ref().map(|s| s.has_16m).unwrap_or(false),
            supports_256: support.as_ref().map(|s| s.has_256).unwrap_or(false),
            no_color,
        }
    }

    /// Parse a color string (hex, indexed or named) into a terminal color
    pub fn parse(&self, s: &str) -> Result<Color> {
        let trimmed = s.trim();
        let lower = trimmed.to_lowercase();

        let color = if trimmed.starts_with('#') {
            let (r, g, b) = parse_hex(trimmed)?;
            self.convert_rgb(r, g, b)
        } else if lower.starts_with("indexed(") && lower.ends_with(')') {
            let num = trimmed[8..trimmed.len() - 1].parse::<u8>().map_err(|_| {
                eyre!(
                    "Invalid indexed color: '{}'. Expected format: indexed(0-255)",
                    trimmed
                )
            })?;
            Color::Indexed(num)
        } else {
            match lower.as_str() {
                "black" => Color::Black,
                "red" => Color::Red,
                "green" => Color::Green,
                "yellow" => Color::Yellow,
                "blue" => Color::Blue,
                "magenta" => Color::Magenta,
                "cyan" => Color::Cyan,
                "white" => Color::White,
                "bright_red" => Color::Indexed(9),
                "bright_green" => Color::Indexed(10),
                "bright_yellow" => Color::Indexed(11),
                "bright_blue" => Color::Indexed(12),
                "bright_magenta" => Color::Indexed(13),
                "bright_cyan" => Color::Indexed(14),
                "bright_white" => Color::Indexed(15),
                "gray" | "grey" | "dark_gray" | "dark_grey" | "bright_black" => Color::Indexed(8),
                "light_gray" | "light_grey" => Color::Indexed(7),
                // "reversed" is applied as a modifier at render time
                "reset" | "default" | "none" | "reversed" => Color::Reset,
                _ => {
                    return Err(eyre!(
                        "Unknown color name: '{}'. Supported: basic ANSI colors (red, blue, etc.), \
                         bright variants (bright_red, etc.), indexed(n), or hex colors (#ff0000)",
                        trimmed
                    ))
                }
            }
        };

        // Parse first so invalid values are still reported under NO_COLOR.
        if self.no_color {
            return Ok(Color::Reset);
        }
        Ok(color)
    }

    fn convert_rgb(&self, r: u8, g: u8, b: u8) -> Color {
        if self.supports_true_color {
            Color::Rgb(r, g, b)
        } else if self.supports_256 {
            Color::Indexed(rgb_to_256_color(r, g, b))
        } else {
            rgb_to_basic_ansi(r, g, b)
        }
    }
}

impl Default for ColorParser {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_hex(s: &str) -> Result<(u8, u8, u8)> {
    if s.len() != 7 || !s.is_char_boundary(1) {
        return Err(eyre!(
            "Invalid hex color format: '{}'. Expected format: #rrggbb",
            s
        ));
    }
    let component = |range: std::ops::Range<usize>| {
        s.get(range)
            .and_then(|c| u8::from_str_radix(c, 16).ok())
            .ok_or_else(|| eyre!("Invalid hex color: {}", s))
    };
    Ok((component(1..3)?, component(3..5)?, component(5..7)?))
}

/// Nearest xterm 256-color palette index
pub fn rgb_to_256_color(r: u8, g: u8, b: u8) -> u8 {
    let max_diff = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if max_diff < 10 {
        let gray = (r as u16 + g as u16 + b as u16) / 3;
        return if gray < 8 {
            16
        } else if gray > 247 {
            231
        } else {
            232 + ((gray - 8) * 24 / 240) as u8
        };
    }

    let r_idx = (r as u16 * 5 / 255) as u8;
    let g_idx = (g as u16 * 5 / 255) as u8;
    let b_idx = (b as u16 * 5 / 255) as u8;
    16 + 36 * r_idx + 6 * g_idx + b_idx
}

/// Nearest basic ANSI color (8 colors)
pub fn rgb_to_basic_ansi(r: u8, g: u8, b: u8) -> Color {
    let max_diff = r.max(g).max(b) as i16 - r.min(g).min(b) as i16;
    if max_diff < 30 {
        let avg = (r as u16 + g as u16 + b as u16) / 3;
        return if avg < 64 { Color::Black } else { Color::White };
    }

    match (r > 128, g > 128, b > 128) {
        (false, false, false) => Color::Black,
        (true, false, false) => Color::Red,
        (false, true, false) => Color::Green,
        (true, true, false) => Color::Yellow,
        (false, false, true) => Color::Blue,
        (true, false, true) => Color::Magenta,
        (false, true, true) => Color::Cyan,
        (true, true, true) => Color::White,
    }
}

/// Theme containing parsed colors ready for use
#[derive(Debug, Clone)]
pub struct Theme {
    pub colors: HashMap<String, Color>,
    /// Names configured as "reversed" (drawn with the REVERSED modifier).
    pub reversed: HashSet<String>,
}

impl Theme {
    pub fn from_config(config: &ThemeConfig) -> Result<Self> {
        let parser = ColorParser::new();
        let mut colors = HashMap::new();
        let mut reversed = HashSet::new();
        for (name, value) in config.colors.entries() {
            colors.insert(name.to_string(), parser.parse(value)?);
            if value.trim().eq_ignore_ascii_case("reversed") {
                reversed.insert(name.to_string());
            }
        }
        Ok(Self { colors, reversed })
    }

    /// Get a color by name, returns Reset if not found
    pub fn get(&self, name: &str) -> Color {
        self.colors.get(name).copied().unwrap_or(Color::Reset)
    }

    pub fn is_reversed(&self, name: &str) -> bool {
        self.reversed.contains(name)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_config(&ThemeConfig::default()).unwrap_or_else(|_| Self {
            colors: HashMap::new(),
            reversed: HashSet::new(),
        })
    }
}
