//! Shared CLI definitions for farmdash.
//!
//! Used by the main application and by the build script (manpage) and
//! gen_docs binary (command-line-options markdown).

use clap::{CommandFactory, Parser, ValueEnum};
use std::path::{Path, PathBuf};

/// Spreadsheet formats accepted as input. Anything else is rejected before reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    /// Excel 2007+ workbook
    Xlsx,
    /// Excel 2007+ macro-enabled workbook
    Xlsm,
    /// Excel binary workbook
    Xlsb,
    /// Legacy Excel 97-2003 workbook
    Xls,
}

impl SpreadsheetFormat {
    pub const EXTENSIONS: [&'static str; 4] = ["xlsx", "xlsm", "xlsb", "xls"];

    /// Detect format from path extension. Returns None when extension is missing or not a spreadsheet.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "xlsx" => Some(Self::Xlsx),
            "xlsm" => Some(Self::Xlsm),
            "xlsb" => Some(Self::Xlsb),
            "xls" => Some(Self::Xls),
            _ => None,
        }
    }
}

/// Gender selector value on the command line.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum GenderArg {
    /// Do not filter by gender
    #[default]
    All,
    /// Male farmers only
    M,
    /// Female farmers only
    F,
}

/// Command-line arguments for farmdash
#[derive(Clone, Parser, Debug)]
#[command(
    name = "farmdash",
    version,
    about = "Farmer information dashboard in the terminal",
    long_about = include_str!("../long_about.txt")
)]
pub struct Args {
    /// Path to the Excel workbook (.xlsx, .xlsm, .xlsb, .xls) to open.
    /// When omitted, the dashboard starts empty; press `o` to open a file.
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Sheet to load: 0-based index (e.g. 0) or sheet name (e.g. "Farmers"). Default: first sheet
    #[arg(long = "sheet", value_name = "SHEET")]
    pub sheet: Option<String>,

    /// Initially selected crop. Use once per crop. Default: all crops
    #[arg(long = "crop", value_name = "CROP")]
    pub crops: Vec<String>,

    /// Initially selected gender
    #[arg(long = "gender", value_enum, default_value_t = GenderArg::All)]
    pub gender: GenderArg,

    /// Initially selected village. Default: first village offered after crop/gender filtering
    #[arg(long = "village", value_name = "VILLAGE")]
    pub village: Option<String>,

    /// Print all derived views as JSON and exit (no interface)
    #[arg(long = "report", action, requires = "path")]
    pub report: bool,

    /// Write the dashboard charts as PNG images into DIR and exit (no interface)
    #[arg(long = "export-charts", value_name = "DIR", requires = "path")]
    pub export_charts: Option<PathBuf>,

    /// Enable debug mode to show operational information
    #[arg(long = "debug", action)]
    pub debug: bool,

    /// Write log output to this file. Log level is read from FARMDASH_LOG (default: info)
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Generate default configuration file at ~/.config/farmdash/config.toml
    #[arg(long = "generate-config", action)]
    pub generate_config: bool,

    /// Force overwrite existing config file when using --generate-config
    #[arg(long = "force", requires = "generate_config", action)]
    pub force: bool,
}

impl Args {
    /// True when the run produces output and exits without starting the interface.
    pub fn headless(&self) -> bool {
        self.report || self.export_charts.is_some()
    }
}

/// Escape `|` and newlines for use in markdown table cells.
fn escape_table_cell(s: &str) -> String {
    s.replace('|', "\\|").replace(['\n', '\r'], " ")
}

fn value_placeholder(arg: &clap::Arg) -> String {
    arg.get_value_names()
        .map(|names| {
            names
                .iter()
                .map(|n: &clap::builder::Str| format!("<{}>", n.as_ref() as &str))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .unwrap_or_default()
}

/// Render command-line options as markdown.
pub fn render_options_markdown() -> String {
    let mut cmd = Args::command();
    cmd.build();

    let mut out = String::from("# Command Line Options\n\n");

    out.push_str("## Usage\n\n```\n");
    out.push_str(&cmd.render_usage().to_string());
    out.push_str("\n```\n\n");

    out.push_str("## Options\n\n");
    out.push_str("| Option | Description |\n");
    out.push_str("|--------|-------------|\n");

    for arg in cmd.get_arguments() {
        let id = arg.get_id().as_str();
        if id == "help" || id == "version" {
            continue;
        }

        let option_str = if arg.is_positional() {
            let placeholder = value_placeholder(arg);
            if arg.is_required_set() {
                placeholder
            } else {
                format!("[{placeholder}]")
            }
        } else {
            let mut parts = Vec::new();
            if let Some(s) = arg.get_short() {
                parts.push(format!("-{s}"));
            }
            if let Some(l) = arg.get_long() {
                parts.push(format!("--{l}"));
            }
            let op = parts.join(", ");
            let placeholder = if arg.get_action().takes_values() {
                value_placeholder(arg)
            } else {
                String::new()
            };
            if placeholder.is_empty() {
                op
            } else {
                format!("{op} {placeholder}")
            }
        };

        let help = arg
            .get_help()
            .map(|h| escape_table_cell(&h.to_string()))
            .unwrap_or_else(|| "-".to_string());

        out.push_str(&format!("| `{option_str}` | {help} |\n"));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spreadsheet_format_from_path() {
        assert_eq!(
            SpreadsheetFormat::from_path(Path::new("farmers.xlsx")),
            Some(SpreadsheetFormat::Xlsx)
        );
        assert_eq!(
            SpreadsheetFormat::from_path(Path::new("FARMERS.XLS")),
            Some(SpreadsheetFormat::Xls)
        );
        assert_eq!(SpreadsheetFormat::from_path(Path::new("farmers.csv")), None);
        assert_eq!(SpreadsheetFormat::from_path(Path::new("noext")), None);
        for ext in SpreadsheetFormat::EXTENSIONS {
            assert!(SpreadsheetFormat::from_extension(ext).is_some(), "{}", ext);
        }
    }

    #[test]
    fn test_args_parse_selection() {
        let args = Args::parse_from([
            "farmdash",
            "farmers.xlsx",
            "--crop",
            "Rice",
            "--crop",
            "Wheat",
            "--gender",
            "f",
            "--village",
            "Kadapa",
        ]);
        assert_eq!(args.path, Some(PathBuf::from("farmers.xlsx")));
        assert_eq!(args.crops, vec!["Rice".to_string(), "Wheat".to_string()]);
        assert_eq!(args.gender, GenderArg::F);
        assert_eq!(args.village.as_deref(), Some("Kadapa"));
        assert!(!args.headless());
    }

    #[test]
    fn test_report_requires_path() {
        assert!(Args::try_parse_from(["farmdash", "--report"]).is_err());
        let args = Args::try_parse_from(["farmdash", "f.xlsx", "--report"]).unwrap();
        assert!(args.headless());
    }

    #[test]
    fn test_options_markdown_lists_flags() {
        let md = render_options_markdown();
        assert!(md.contains("--export-charts"));
        assert!(md.contains("--sheet"));
        assert!(!md.contains("`--help`"));
    }
}
