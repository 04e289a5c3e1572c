//! Required-column set of the farmer workbook and the schema check run at load time.

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

/// Header names of the required columns. Matched verbatim against the sheet's header row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub farmer_id: String,
    pub farmer_name: String,
    pub mobile_no: String,
    pub village: String,
    pub area: String,
    pub crop: String,
    pub gender: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            farmer_id: "Farmer ID".to_string(),
            // Two spaces, as the source workbooks spell it.
            farmer_name: "Name of the  Farmer".to_string(),
            mobile_no: "Mobile No".to_string(),
            village: "Village".to_string(),
            area: "Total Area Holding (Ha)".to_string(),
            crop: "Production area for crop".to_string(),
            gender: "Gender M/F".to_string(),
        }
    }
}

impl ColumnNames {
    /// Every column the dashboard reads, in display order.
    pub fn required(&self) -> [&str; 7] {
        [
            &self.farmer_id,
            &self.farmer_name,
            &self.mobile_no,
            &self.village,
            &self.area,
            &self.crop,
            &self.gender,
        ]
    }

    /// Columns shown in the farmer tables.
    pub fn display(&self) -> [&str; 5] {
        [
            &self.farmer_id,
            &self.farmer_name,
            &self.mobile_no,
            &self.village,
            &self.area,
        ]
    }

    /// Required columns stored as text. The area column is numeric.
    pub fn categorical(&self) -> [&str; 6] {
        [
            &self.farmer_id,
            &self.farmer_name,
            &self.mobile_no,
            &self.village,
            &self.crop,
            &self.gender,
        ]
    }
}

/// One or more required columns are absent from the loaded sheet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("missing required column(s): {}", quoted(.missing))]
pub struct SchemaError {
    pub missing: Vec<String>,
}

impl SchemaError {
    pub fn column(name: &str) -> Self {
        Self {
            missing: vec![name.to_string()],
        }
    }
}

fn quoted(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("\"{}\"", n))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check that all required columns exist, reporting every missing one at once.
pub fn validate(df: &DataFrame, names: &ColumnNames) -> Result<(), SchemaError> {
    let missing: Vec<String> = names
        .required()
        .iter()
        .filter(|name| df.get_column_index(name).is_none())
        .map(|name| name.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(SchemaError { missing })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    fn full_frame() -> DataFrame {
        df!(
            "Farmer ID" => [1i64],
            "Name of the  Farmer" => ["Ravi"],
            "Mobile No" => ["98480"],
            "Village" => ["A"],
            "Total Area Holding (Ha)" => [1.5],
            "Production area for crop" => ["Rice"],
            "Gender M/F" => ["M"]
        )
        .unwrap()
    }

    #[test]
    fn test_validate_accepts_complete_sheet() {
        assert!(validate(&full_frame(), &ColumnNames::default()).is_ok());
    }

    #[test]
    fn test_validate_lists_every_missing_column() {
        let df = full_frame()
            .drop("Mobile No")
            .unwrap()
            .drop("Gender M/F")
            .unwrap();
        let err = validate(&df, &ColumnNames::default()).unwrap_err();
        assert_eq!(err.missing, vec!["Mobile No", "Gender M/F"]);
        assert_eq!(
            err.to_string(),
            "missing required column(s): \"Mobile No\", \"Gender M/F\""
        );
    }

    #[test]
    fn test_header_match_is_verbatim() {
        let mut df = full_frame();
        df.rename("Name of the  Farmer", "Name of the Farmer".into())
            .unwrap();
        let err = validate(&df, &ColumnNames::default()).unwrap_err();
        assert_eq!(err.missing, vec!["Name of the  Farmer"]);
    }
}
