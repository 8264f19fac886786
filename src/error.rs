// Error types for loading, configuration and view resolution.
//
// Load and config errors stop the current action; view errors are carried
// inside `ViewState::NoData` and only end the current render pass.
use crate::types::Column;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("data source not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to open workbook {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("sheet '{sheet}' not found (available: {})", available.join(", "))]
    SheetMissing {
        sheet: String,
        available: Vec<String>,
    },

    #[error("failed to read csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("source has no header row")]
    NoHeader,
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum ViewError {
    #[error("Column '{0}' not found in source.")]
    MissingColumn(Column),

    #[error("No data found for location: '{location}'")]
    EmptySelection { location: String },

    #[error("No data found for state: '{state}'")]
    NoRows { state: String },

    #[error("No inventory rows are loaded.")]
    EmptyTable,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] figment::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_errors_name_what_is_missing() {
        let err = ViewError::EmptySelection {
            location: "Central Court".to_string(),
        };
        assert_eq!(err.to_string(), "No data found for location: 'Central Court'");

        let err = ViewError::MissingColumn(Column::LocationName);
        assert_eq!(err.to_string(), "Column 'Location_Name' not found in source.");
    }

    #[test]
    fn sheet_missing_lists_available_sheets() {
        let err = LoadError::SheetMissing {
            sheet: "Tooli".to_string(),
            available: vec!["Sheet1".to_string(), "Summary".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "sheet 'Tooli' not found (available: Sheet1, Summary)"
        );
    }
}
