//! User-facing error message formatting.
//!
//! Matches on typed errors (SchemaError, PolarsError variants, io::ErrorKind) rather than
//! parsing strings.

use polars::prelude::PolarsError;
use std::io;
use std::path::Path;

use crate::pipeline::PipelineError;
use crate::schema::SchemaError;

pub fn user_message_from_schema(err: &SchemaError) -> String {
    let noun = if err.missing.len() == 1 {
        "column"
    } else {
        "columns"
    };
    format!(
        "The sheet is missing the required {} {}. Check the header row of the workbook.",
        noun,
        err.missing
            .iter()
            .map(|m| format!("\"{}\"", m))
            .collect::<Vec<_>>()
            .join(", ")
    )
}

pub fn user_message_from_pipeline(err: &PipelineError) -> String {
    match err {
        PipelineError::Schema(e) => user_message_from_schema(e),
        PipelineError::Polars(e) => user_message_from_polars(e),
    }
}

/// Format a PolarsError as a user-facing message by matching on its variant.
pub fn user_message_from_polars(err: &PolarsError) -> String {
    use polars::prelude::PolarsError as PE;

    match err {
        PE::ColumnNotFound(msg) => format!("Column not found: {}.", msg),
        PE::Duplicate(msg) => format!(
            "Duplicate column header: {}. Each header in the sheet must be unique.",
            msg
        ),
        PE::IO { error, msg } => {
            user_message_from_io(error.as_ref(), msg.as_ref().map(|m| m.as_ref()))
        }
        PE::NoData(msg) => format!("No data: {}", msg),
        PE::SchemaMismatch(msg) => format!("Schema mismatch: {}", msg),
        PE::ShapeMismatch(msg) => format!("Row shape mismatch: {}", msg),
        PE::InvalidOperation(msg) => format!("Operation not allowed: {}", msg),
        PE::ComputeError(msg) => msg.to_string(),
        PE::Context { error, msg } => {
            let inner = user_message_from_polars(error);
            format!("{}: {}", msg, inner)
        }
        #[allow(unreachable_patterns)]
        _ => err.to_string(),
    }
}

/// Format an io::Error as a user-facing message by matching on ErrorKind.
pub fn user_message_from_io(err: &io::Error, context: Option<&str>) -> String {
    use std::io::ErrorKind;

    let base: String = match err.kind() {
        ErrorKind::NotFound => "File or directory not found.".to_string(),
        ErrorKind::PermissionDenied => "Permission denied. Check read access.".to_string(),
        ErrorKind::InvalidData | ErrorKind::InvalidInput => {
            "Invalid or corrupted data.".to_string()
        }
        ErrorKind::UnexpectedEof => "Unexpected end of file.".to_string(),
        ErrorKind::IsADirectory => "Path is a directory, not a file.".to_string(),
        _ => err.to_string(),
    };

    match context {
        Some(ctx) if !ctx.is_empty() => format!("{} {}", base, ctx),
        _ => base,
    }
}

/// Format a color_eyre Report by downcasting to known error types.
/// Walks the cause chain to find SchemaError, PolarsError or io::Error.
pub fn user_message_from_report(report: &color_eyre::eyre::Report, path: Option<&Path>) -> String {
    let with_path = |msg: String| match path {
        Some(p) => format!("Failed to load {}: {}", p.display(), msg),
        None => msg,
    };
    for cause in report.chain() {
        if let Some(e) = cause.downcast_ref::<PipelineError>() {
            return with_path(user_message_from_pipeline(e));
        }
        if let Some(e) = cause.downcast_ref::<SchemaError>() {
            return with_path(user_message_from_schema(e));
        }
        if let Some(e) = cause.downcast_ref::<PolarsError>() {
            return with_path(user_message_from_polars(e));
        }
        if let Some(e) = cause.downcast_ref::<io::Error>() {
            return with_path(user_message_from_io(e, None));
        }
    }

    // First line only, to keep tracebacks out of the modal.
    let display = report.to_string();
    let first_line = display.lines().next().unwrap_or("An error occurred");
    with_path(first_line.trim().to_string())
}
