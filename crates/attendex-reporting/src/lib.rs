use std::str::FromStr;

use thiserror::Error;

pub mod export;

pub use export::{export_csv, export_json, export_table, format_cell, write_table};

/// Output formats for an attendance table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    /// Header row `S.No,Reg No,Name,<subjects...>`; missing values empty.
    #[default]
    Csv,
    /// `{"columns": [...], "students": [...]}`.
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("unknown export format: {other} (expected csv or json)")),
        }
    }
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write table: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize table: {0}")]
    Json(#[from] serde_json::Error),
}
