//! Every derived view the dashboard shows, computed in one pass from a table and a selection.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::pipeline::{
    aggregate, apply_filters, distinct, PipelineError, Scope, Selection, ValueCount,
};
use crate::table::Table;

/// Fixed label/value tile shown next to the computed metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    pub label: String,
    pub value: String,
}

impl Metric {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Dashboard content that does not come from the workbook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    pub title: String,
    pub metrics: Vec<Metric>,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            title: "Farmer Information Dashboard".to_string(),
            metrics: vec![
                Metric::new("Average Temperature", "34°C"),
                Metric::new("Location", "Kadapa"),
            ],
        }
    }
}

/// Rows rendered as text for a grid.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TableView {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableView {
    pub fn from_frame(df: &DataFrame, columns: &[&str]) -> Result<Self, PipelineError> {
        let mut cells: Vec<Vec<String>> = Vec::with_capacity(columns.len());
        for name in columns {
            let text = df
                .column(name)
                .map_err(|_| crate::schema::SchemaError::column(name))?
                .cast(&DataType::String)?;
            cells.push(
                text.str()?
                    .into_iter()
                    .map(|v| v.unwrap_or_default().to_string())
                    .collect(),
            );
        }
        let rows = (0..df.height())
            .map(|i| cells.iter().map(|c| c[i].clone()).collect())
            .collect();
        Ok(Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One pie slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
    pub value: String,
    pub count: usize,
    pub percent: f64,
}

pub fn shares(counts: &[ValueCount]) -> Vec<Share> {
    let total: usize = counts.iter().map(|c| c.count).sum();
    counts
        .iter()
        .map(|c| Share {
            value: c.value.clone(),
            count: c.count,
            percent: if total == 0 {
                0.0
            } else {
                c.count as f64 * 100.0 / total as f64
            },
        })
        .collect()
}

/// Area holding of one farmer in the selected village.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaBar {
    pub farmer: String,
    pub area: f64,
}

/// Everything the dashboard draws for one selection.
#[derive(Debug, Clone, Serialize)]
pub struct Views {
    /// Selection after reconciliation with the offered options.
    pub selection: Selection,
    pub crop_options: Vec<String>,
    pub village_options: Vec<String>,
    /// Rows left after crop and gender filtering.
    pub filtered_rows: usize,
    pub farmers: TableView,
    pub village_farmers: TableView,
    /// Crop frequencies within the selected village.
    pub crop_counts: Vec<ValueCount>,
    /// Village frequencies within the crop/gender view.
    pub village_counts: Vec<ValueCount>,
    pub gender_shares: Vec<Share>,
    pub area_by_farmer: Vec<AreaBar>,
    pub metrics: Vec<Metric>,
    pub area_issues: usize,
}

/// Compute all views for `selection`. Pure: the table is never modified.
///
/// Crops not present in the table are dropped from the selection. A village that is no
/// longer offered after crop/gender filtering is replaced by the first offered village.
pub fn derive_views(
    table: &Table,
    selection: &Selection,
    settings: &DashboardSettings,
) -> Result<Views, PipelineError> {
    table.schema_check()?;
    let names = table.names();

    let crop_options = distinct(table.df(), &names.crop)?;
    let mut resolved = selection.clone();
    resolved.crops = crop_options
        .iter()
        .filter(|c| selection.has_crop(c))
        .cloned()
        .collect();

    let filtered = apply_filters(table, &resolved, Scope::CropGender)?;
    let village_options = distinct(&filtered, &names.village)?;
    resolved.village = match &selection.village {
        Some(v) if village_options.contains(v) => Some(v.clone()),
        _ => village_options.first().cloned(),
    };

    let village_view = apply_filters(table, &resolved, Scope::Village)?;

    let display = names.display();
    let farmers = TableView::from_frame(table.df(), &display)?;
    let village_farmers = TableView::from_frame(&village_view, &display)?;

    let crop_counts = aggregate(&village_view, &names.crop)?;
    let village_counts = aggregate(&filtered, &names.village)?;
    let gender_shares = shares(&aggregate(&village_view, &names.gender)?);
    let area_by_farmer = area_bars(&village_view, table)?;

    let mut metrics = vec![Metric::new("Farmers Count", table.height().to_string())];
    metrics.extend(settings.metrics.iter().cloned());

    debug!(
        crops = resolved.crops.len(),
        gender = resolved.gender.as_str(),
        village = resolved.village.as_deref().unwrap_or("-"),
        filtered = filtered.height(),
        village_rows = village_view.height(),
        "derived views"
    );

    Ok(Views {
        selection: resolved,
        crop_options,
        village_options,
        filtered_rows: filtered.height(),
        farmers,
        village_farmers,
        crop_counts,
        village_counts,
        gender_shares,
        area_by_farmer,
        metrics,
        area_issues: table.area_issues(),
    })
}

fn area_bars(view: &DataFrame, table: &Table) -> Result<Vec<AreaBar>, PipelineError> {
    let names = table.names();
    let farmer = view.column(&names.farmer_name)?.cast(&DataType::String)?;
    let id = view.column(&names.farmer_id)?.cast(&DataType::String)?;
    let area = view.column(&names.area)?.cast(&DataType::Float64)?;
    let bars = farmer
        .str()?
        .into_iter()
        .zip(id.str()?.into_iter())
        .zip(area.f64()?.into_iter())
        .filter_map(|((name, id), area)| {
            let label = name.or(id).unwrap_or_default().to_string();
            area.map(|area| AreaBar {
                farmer: label,
                area,
            })
        })
        .collect();
    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::GenderFilter;
    use crate::schema::{ColumnNames, SchemaError};

    fn table() -> Table {
        let df = df!(
            "Farmer ID" => ["1", "2", "3", "4"],
            "Name of the  Farmer" => ["Ravi", "Lakshmi", "Suresh", "Anitha"],
            "Mobile No" => ["900", "901", "902", "903"],
            "Village" => ["A", "A", "B", "B"],
            "Total Area Holding (Ha)" => [Some(1.5), Some(2.0), Some(3.0), None],
            "Production area for crop" => ["Rice", "Rice", "Wheat", "Rice"],
            "Gender M/F" => ["M", "F", "M", "F"]
        )
        .unwrap();
        Table::from_dataframe(df, ColumnNames::default()).unwrap()
    }

    fn select(crops: &[&str], gender: GenderFilter, village: Option<&str>) -> Selection {
        Selection {
            crops: crops.iter().map(|c| c.to_string()).collect(),
            gender,
            village: village.map(str::to_string),
        }
    }

    #[test]
    fn test_defaults_pick_first_village() {
        let t = table();
        let views = derive_views(
            &t,
            &Selection::defaults(&t),
            &DashboardSettings::default(),
        )
        .unwrap();
        assert_eq!(views.crop_options, vec!["Rice", "Wheat"]);
        assert_eq!(views.village_options, vec!["A", "B"]);
        assert_eq!(views.selection.village.as_deref(), Some("A"));
        assert_eq!(views.farmers.len(), 4);
        assert_eq!(views.village_farmers.len(), 2);
        assert_eq!(views.crop_counts, vec![ValueCount::new("Rice", 2)]);
        assert_eq!(
            views.village_counts,
            vec![ValueCount::new("A", 2), ValueCount::new("B", 2)]
        );
        assert_eq!(views.gender_shares.len(), 2);
        assert!((views.gender_shares[0].percent - 50.0).abs() < 1e-9);
        assert_eq!(
            views.metrics,
            vec![
                Metric::new("Farmers Count", "4"),
                Metric::new("Average Temperature", "34°C"),
                Metric::new("Location", "Kadapa"),
            ]
        );
    }

    #[test]
    fn test_vanished_village_falls_back() {
        let t = table();
        // Only Wheat grows in B; village A disappears from the options.
        let views = derive_views(
            &t,
            &select(&["Wheat"], GenderFilter::All, Some("A")),
            &DashboardSettings::default(),
        )
        .unwrap();
        assert_eq!(views.village_options, vec!["B"]);
        assert_eq!(views.selection.village.as_deref(), Some("B"));
        assert_eq!(views.village_farmers.rows[0][1], "Suresh");
    }

    #[test]
    fn test_empty_view_has_no_village() {
        let t = table();
        let views = derive_views(
            &t,
            &select(&["Wheat"], GenderFilter::F, None),
            &DashboardSettings::default(),
        )
        .unwrap();
        assert_eq!(views.filtered_rows, 0);
        assert!(views.village_options.is_empty());
        assert_eq!(views.selection.village, None);
        assert!(views.village_farmers.is_empty());
        assert!(views.crop_counts.is_empty());
        assert!(views.gender_shares.is_empty());
        assert!(views.area_by_farmer.is_empty());
    }

    #[test]
    fn test_unknown_crops_dropped_from_selection() {
        let t = table();
        let views = derive_views(
            &t,
            &select(&["Cotton", "Rice"], GenderFilter::All, Some("B")),
            &DashboardSettings::default(),
        )
        .unwrap();
        assert_eq!(views.selection.crops, vec!["Rice"]);
        assert_eq!(views.selection.village.as_deref(), Some("B"));
    }

    #[test]
    fn test_area_bars_skip_missing_area() {
        let t = table();
        let views = derive_views(
            &t,
            &select(&["Rice", "Wheat"], GenderFilter::All, Some("B")),
            &DashboardSettings::default(),
        )
        .unwrap();
        assert_eq!(
            views.area_by_farmer,
            vec![AreaBar {
                farmer: "Suresh".to_string(),
                area: 3.0
            }]
        );
        assert_eq!(views.village_farmers.rows[1][4], "");
    }

    #[test]
    fn test_missing_column_fails_every_derivation() {
        let df = table().df().drop("Mobile No").unwrap();
        let t = Table::from_dataframe(df, ColumnNames::default()).unwrap();
        for village in [Some("A"), Some("B"), None] {
            let err = derive_views(
                &t,
                &select(&["Rice"], GenderFilter::All, village),
                &DashboardSettings::default(),
            )
            .unwrap_err();
            assert_eq!(err.as_schema(), Some(&SchemaError::column("Mobile No")));
        }
    }

    #[test]
    fn test_shares_of_nothing() {
        assert!(shares(&[]).is_empty());
        let s = shares(&[ValueCount::new("M", 3), ValueCount::new("F", 1)]);
        assert!((s[0].percent - 75.0).abs() < 1e-9);
        assert!((s[1].percent - 25.0).abs() < 1e-9);
    }
}
