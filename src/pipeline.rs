//! Filter-and-aggregate pipeline: selector state, filtering, distinct values and
//! frequency counts over the loaded [`Table`].

use polars::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::schema::SchemaError;
use crate::table::Table;
use crate::views::{derive_views, DashboardSettings, Views};

/// Error from any pipeline operation.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl PipelineError {
    pub fn as_schema(&self) -> Option<&SchemaError> {
        match self {
            Self::Schema(e) => Some(e),
            Self::Polars(_) => None,
        }
    }
}

/// Gender selector: everyone, or one recorded gender code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum GenderFilter {
    #[default]
    All,
    M,
    F,
}

impl GenderFilter {
    pub const ALL: [Self; 3] = [Self::All, Self::M, Self::F];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::M => "M",
            Self::F => "F",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::All => 0,
            Self::M => 1,
            Self::F => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Current values of the crop, gender and village selectors.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Selection {
    /// Selected crops, kept in option order.
    pub crops: Vec<String>,
    pub gender: GenderFilter,
    /// None only while no village is offered.
    pub village: Option<String>,
}

impl Selection {
    /// Defaults for a freshly loaded table: every crop, all genders, first village.
    pub fn defaults(table: &Table) -> Self {
        let crops = distinct(table.df(), &table.names().crop).unwrap_or_default();
        Self {
            crops,
            gender: GenderFilter::All,
            village: None,
        }
    }

    pub fn has_crop(&self, crop: &str) -> bool {
        self.crops.iter().any(|c| c == crop)
    }
}

/// How far [`apply_filters`] narrows the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Crop and gender filters only.
    CropGender,
    /// Crop, gender and the selected village.
    Village,
}

/// One bar of a frequency chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

impl ValueCount {
    pub fn new(value: impl Into<String>, count: usize) -> Self {
        Self {
            value: value.into(),
            count,
        }
    }
}

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, PipelineError> {
    df.column(name)
        .map_err(|_| PipelineError::Schema(SchemaError::column(name)))
}

/// Column values rendered as text, nulls kept as None.
fn text_values(df: &DataFrame, name: &str) -> Result<Column, PipelineError> {
    Ok(column(df, name)?.cast(&DataType::String)?)
}

/// Option label standing for blank cells in selectors and filters.
pub const BLANK: &str = "(blank)";

/// Alias of the count column produced by [`aggregate`].
const COUNT_COLUMN: &str = "__count";

/// Distinct values of `name` in first-seen order. Blank cells are offered once as [`BLANK`].
pub fn distinct(df: &DataFrame, name: &str) -> Result<Vec<String>, PipelineError> {
    let unique = text_values(df, name)?
        .as_materialized_series()
        .unique_stable()?;
    Ok(unique
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or(BLANK).to_string())
        .collect())
}

/// Predicate selecting rows whose `name` cell shows `value`; [`BLANK`] selects null cells.
fn value_matches(name: &str, value: &str) -> Expr {
    if value == BLANK {
        col(name).is_null()
    } else {
        col(name).eq(lit(value))
    }
}

/// Rows of the table matching the selection, in table order.
///
/// An empty crop set matches nothing, as does a village-scoped view with no village.
pub fn apply_filters(
    table: &Table,
    selection: &Selection,
    scope: Scope,
) -> Result<DataFrame, PipelineError> {
    let names = table.names();
    let df = table.df();
    column(df, &names.crop)?;
    column(df, &names.gender)?;

    let mut predicate = selection
        .crops
        .iter()
        .map(|c| value_matches(&names.crop, c))
        .reduce(|a, b| a.or(b))
        .unwrap_or_else(|| lit(false));

    if selection.gender != GenderFilter::All {
        predicate = predicate.and(col(names.gender.as_str()).eq(lit(selection.gender.as_str())));
    }

    if scope == Scope::Village {
        column(df, &names.village)?;
        predicate = match &selection.village {
            Some(v) => predicate.and(value_matches(&names.village, v)),
            None => lit(false),
        };
    }

    let view = df.clone().lazy().filter(predicate).collect()?;
    debug!(?scope, rows = view.height(), "applied filters");
    Ok(view)
}

/// Frequency of each non-null value of `name`, most frequent first.
/// Equal counts keep the order in which the values first appear.
pub fn aggregate(view: &DataFrame, name: &str) -> Result<Vec<ValueCount>, PipelineError> {
    column(view, name)?;
    let counts = view
        .clone()
        .lazy()
        .select([col(name).cast(DataType::String)])
        .filter(col(name).is_not_null())
        .group_by_stable([col(name)])
        .agg([len().alias(COUNT_COLUMN)])
        .sort(
            [COUNT_COLUMN],
            SortMultipleOptions::default()
                .with_order_descending(true)
                .with_maintain_order(true),
        )
        .collect()?;

    let values = counts.column(name)?.str()?;
    let totals = counts.column(COUNT_COLUMN)?.cast(&DataType::UInt64)?;
    Ok(values
        .into_iter()
        .zip(totals.u64()?.into_iter())
        .filter_map(|(value, count)| Some(ValueCount::new(value?, count? as usize)))
        .collect())
}

/// Pipeline state: nothing loaded, or a table with its current selection.
#[derive(Debug, Default)]
pub enum Pipeline {
    #[default]
    Empty,
    Loaded { table: Table, selection: Selection },
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold a newly loaded table with default selection.
    ///
    /// The table is kept even when required columns are missing; the returned schema
    /// error is the same one every later derivation reports.
    pub fn load(&mut self, table: Table) -> Result<(), SchemaError> {
        let check = table.schema_check();
        let selection = Selection::defaults(&table);
        *self = Self::Loaded { table, selection };
        check
    }

    /// Drop the current table, e.g. before a replacement is read.
    pub fn reset(&mut self) {
        *self = Self::Empty;
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }

    pub fn table(&self) -> Option<&Table> {
        match self {
            Self::Loaded { table, .. } => Some(table),
            Self::Empty => None,
        }
    }

    pub fn selection(&self) -> Option<&Selection> {
        match self {
            Self::Loaded { selection, .. } => Some(selection),
            Self::Empty => None,
        }
    }

    /// Apply a change to the selection. No-op while empty.
    pub fn update_selection(&mut self, f: impl FnOnce(&mut Selection)) {
        if let Self::Loaded { selection, .. } = self {
            f(selection);
        }
    }

    pub fn toggle_crop(&mut self, crop: &str, options: &[String]) {
        self.update_selection(|s| {
            if s.has_crop(crop) {
                s.crops.retain(|c| c != crop);
            } else {
                s.crops.push(crop.to_string());
                // Keep option order so the selection reads like the list.
                s.crops.sort_by_key(|c| options.iter().position(|o| o == c));
            }
        });
    }

    pub fn select_all_crops(&mut self, options: &[String]) {
        self.update_selection(|s| s.crops = options.to_vec());
    }

    pub fn clear_crops(&mut self) {
        self.update_selection(|s| s.crops.clear());
    }

    pub fn set_gender(&mut self, gender: GenderFilter) {
        self.update_selection(|s| s.gender = gender);
    }

    pub fn set_village(&mut self, village: Option<String>) {
        self.update_selection(|s| s.village = village);
    }

    /// Recompute every view from the table and current selection.
    ///
    /// Returns None while empty. The stored selection is reconciled with the options the
    /// derivation offered, so it never refers to values absent from the table.
    pub fn derive(&mut self, settings: &DashboardSettings) -> Option<Result<Views, PipelineError>> {
        let Self::Loaded { table, selection } = self else {
            return None;
        };
        let result = derive_views(table, selection, settings);
        if let Ok(views) = &result {
            selection.crops = views.selection.crops.clone();
            selection.village = views.selection.village.clone();
        }
        Some(result)
    }
}
