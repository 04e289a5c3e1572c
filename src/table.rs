//! The immutable farmer table held for the session.

use polars::prelude::*;
use tracing::warn;

use crate::schema::{self, ColumnNames, SchemaError};

/// Parsed sheet plus the result of the load-time schema check.
///
/// Required text columns are cast to `String`; the area column is coerced to nullable
/// `f64`. Blank area cells become null silently, while unparsable or negative values
/// become null and are counted in [`Table::area_issues`].
#[derive(Debug, Clone)]
pub struct Table {
    df: DataFrame,
    names: ColumnNames,
    schema: Result<(), SchemaError>,
    area_issues: usize,
}

impl Table {
    pub fn from_dataframe(mut df: DataFrame, names: ColumnNames) -> PolarsResult<Self> {
        let schema = schema::validate(&df, &names);
        if let Err(e) = &schema {
            warn!(missing = ?e.missing, "sheet is missing required columns");
        }

        for name in names.categorical() {
            if df.get_column_index(name).is_some() {
                let as_text = df.column(name)?.cast(&DataType::String)?;
                df.with_column(as_text)?;
            }
        }

        let mut area_issues = 0;
        if df.get_column_index(&names.area).is_some() {
            let (coerced, issues) = coerce_area(&df, &names.area)?;
            df.with_column(Column::from(coerced))?;
            area_issues = issues;
            if issues > 0 {
                warn!(
                    column = %names.area,
                    issues,
                    "non-numeric or negative area values treated as missing"
                );
            }
        }

        Ok(Self {
            df,
            names,
            schema,
            area_issues,
        })
    }

    pub fn df(&self) -> &DataFrame {
        &self.df
    }

    pub fn names(&self) -> &ColumnNames {
        &self.names
    }

    /// Outcome of the required-column check performed when the table was built.
    pub fn schema_check(&self) -> Result<(), SchemaError> {
        self.schema.clone()
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    /// Header row, verbatim and in sheet order.
    pub fn headers(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .into_iter()
            .map(|n| n.to_string())
            .collect()
    }

    pub fn area_issues(&self) -> usize {
        self.area_issues
    }
}

fn coerce_area(df: &DataFrame, name: &str) -> PolarsResult<(Series, usize)> {
    let raw = df.column(name)?.cast(&DataType::String)?;
    let mut issues = 0;
    let values: Vec<Option<f64>> = raw
        .str()?
        .into_iter()
        .map(|cell| {
            let text = cell.map(str::trim).filter(|s| !s.is_empty())?;
            match text.parse::<f64>() {
                Ok(v) if v.is_finite() && v >= 0.0 => Some(v),
                _ => {
                    issues += 1;
                    None
                }
            }
        })
        .collect();
    Ok((Series::new(name.into(), values), issues))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(area: Series) -> DataFrame {
        let n = area.len();
        DataFrame::new(vec![
            Series::new("Farmer ID".into(), (1..=n as i64).collect::<Vec<_>>()).into(),
            Series::new("Name of the  Farmer".into(), vec!["x"; n]).into(),
            Series::new("Mobile No".into(), vec![9848012345i64; n]).into(),
            Series::new("Village".into(), vec!["A"; n]).into(),
            area.into(),
            Series::new("Production area for crop".into(), vec!["Rice"; n]).into(),
            Series::new("Gender M/F".into(), vec!["M"; n]).into(),
        ])
        .unwrap()
    }

    #[test]
    fn test_area_policy_coerces_and_counts_issues() {
        let area = Series::new(
            "Total Area Holding (Ha)".into(),
            vec![Some("1.25"), Some("abc"), Some("-2"), None, Some(" "), Some("3")],
        );
        let table = Table::from_dataframe(frame(area), ColumnNames::default()).unwrap();
        let col = table.df().column("Total Area Holding (Ha)").unwrap();
        assert_eq!(col.dtype(), &DataType::Float64);
        let values: Vec<Option<f64>> = col.f64().unwrap().into_iter().collect();
        assert_eq!(
            values,
            vec![Some(1.25), None, None, None, None, Some(3.0)]
        );
        assert_eq!(table.area_issues(), 2);
    }

    #[test]
    fn test_categorical_columns_become_text() {
        let area = Series::new("Total Area Holding (Ha)".into(), vec![1.0f64, 2.0]);
        let table = Table::from_dataframe(frame(area), ColumnNames::default()).unwrap();
        let mobile = table.df().column("Mobile No").unwrap();
        assert_eq!(mobile.dtype(), &DataType::String);
        assert_eq!(mobile.str().unwrap().get(0), Some("9848012345"));
        assert!(table.schema_check().is_ok());
        assert_eq!(table.area_issues(), 0);
    }

    #[test]
    fn test_missing_columns_recorded_not_fatal() {
        let area = Series::new("Total Area Holding (Ha)".into(), vec![1.0f64]);
        let df = frame(area).drop("Mobile No").unwrap();
        let table = Table::from_dataframe(df, ColumnNames::default()).unwrap();
        assert_eq!(
            table.schema_check().unwrap_err(),
            SchemaError::column("Mobile No")
        );
        assert_eq!(table.height(), 1);
        assert_eq!(table.headers().len(), 6);
    }
}
