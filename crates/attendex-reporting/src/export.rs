use std::io::Write;
use std::path::Path;

use attendex_core::{AttendanceTable, Cell};

use crate::{ExportError, ExportFormat};

/// Render `table` in the given format.
pub fn export_table(table: &AttendanceTable, format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Csv => Ok(export_csv(table)),
        ExportFormat::Json => export_json(table),
    }
}

/// Write `table` to `path`, replacing any existing file.
pub fn write_table(
    table: &AttendanceTable,
    format: ExportFormat,
    path: &Path,
) -> Result<(), ExportError> {
    let content = export_table(table, format)?;
    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

/// Text form of one cell. Missing renders as an empty string; percentages
/// are plain decimals that always keep a decimal point (`90.0`, not `90`,
/// and `0.00001`, not `1e-5`).
pub fn format_cell(cell: &Cell<'_>) -> String {
    match cell {
        Cell::Integer(n) => n.to_string(),
        Cell::Text(s) => s.to_string(),
        Cell::Percentage(p) => format_percentage(*p),
        Cell::Missing => String::new(),
    }
}

fn format_percentage(p: f64) -> String {
    let s = p.to_string();
    if p.is_finite() && !s.contains('.') {
        format!("{s}.0")
    } else {
        s
    }
}

fn csv_escape(s: &str) -> String {
    if s.contains('"') || s.contains(',') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn csv_line(fields: impl IntoIterator<Item = String>) -> String {
    let mut line = fields
        .into_iter()
        .map(|f| csv_escape(&f))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

pub fn export_csv(table: &AttendanceTable) -> String {
    let mut out = csv_line(table.header().into_iter().map(str::to_string));
    for row in table.rows() {
        out.push_str(&csv_line(row.iter().map(format_cell)));
    }
    out
}

pub fn export_json(table: &AttendanceTable) -> Result<String, ExportError> {
    let mut json = serde_json::to_string_pretty(table)?;
    json.push('\n');
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use attendex_core::StudentRecord;

    fn sample() -> AttendanceTable {
        AttendanceTable::from_records(vec![
            StudentRecord::new(1, "RA1234567890123", "JOHN DOE")
                .with_subject("21CSE101", 85.5)
                .with_subject("21CSE102T", 90.0),
            StudentRecord::new(2, "RA1234567890124", "JANE ROE").with_subject("21CSE101", 70.25),
        ])
    }

    #[test]
    fn test_csv_escape_quotes() {
        assert_eq!(csv_escape(r#"He said "hi""#), r#""He said ""hi""""#);
    }

    #[test]
    fn test_csv_escape_comma() {
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
    }

    #[test]
    fn test_csv_escape_clean() {
        assert_eq!(csv_escape("JOHN DOE"), "JOHN DOE");
    }

    #[test]
    fn test_csv_layout() {
        let out = export_csv(&sample());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "S.No,Reg No,Name,21CSE101,21CSE102T");
        assert_eq!(lines[1], "1,RA1234567890123,JOHN DOE,85.5,90.0");
        assert_eq!(lines[2], "2,RA1234567890124,JANE ROE,70.25,");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_csv_empty_table() {
        let out = export_csv(&AttendanceTable::default());
        assert_eq!(out, "S.No,Reg No,Name\n");
    }

    #[test]
    fn test_csv_zero_is_not_empty() {
        let table = AttendanceTable::from_records(vec![
            StudentRecord::new(1, "RA0000000000001", "A").with_subject("21CSE101", 0.0),
        ]);
        assert!(export_csv(&table).ends_with("1,RA0000000000001,A,0.0\n"));
    }

    #[test]
    fn test_percentage_never_uses_exponent() {
        assert_eq!(format_cell(&Cell::Percentage(0.00001)), "0.00001");
        assert_eq!(format_cell(&Cell::Percentage(100.0)), "100.0");
        assert_eq!(format_cell(&Cell::Percentage(76.47)), "76.47");
        assert_eq!(format_cell(&Cell::Missing), "");
    }

    #[test]
    fn test_json_shape() {
        let out = export_json(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["columns"], serde_json::json!(["21CSE101", "21CSE102T"]));
        let students = value["students"].as_array().unwrap();
        assert_eq!(students.len(), 2);
        assert_eq!(students[0]["registration_id"], "RA1234567890123");
        assert_eq!(students[1]["attendance"]["21CSE101"], 70.25);
        assert!(students[1]["attendance"].get("21CSE102T").is_none());
    }

    #[test]
    fn test_write_table_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_table(&sample(), ExportFormat::Csv, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, export_csv(&sample()));
    }
}
