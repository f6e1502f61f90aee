use std::io::Write;

use attendex_core::{AttendanceTable, StudentRecord};
use attendex_store::SyncReport;
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the summary after a report has been parsed.
pub fn print_extraction_summary(
    w: &mut dyn Write,
    pdf_name: &str,
    table: &AttendanceTable,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w, "Extracting attendance from {}...", pdf_name)?;
    writeln!(
        w,
        "Found {} students across {} subjects",
        table.len(),
        table.subject_columns().len()
    )?;

    let without_subjects = table
        .records()
        .iter()
        .filter(|r| r.attendance.is_empty())
        .count();
    if without_subjects > 0 {
        let msg = format!("({} students with no subject rows)", without_subjects);
        if color.enabled() {
            writeln!(w, "{}", msg.dimmed())?;
        } else {
            writeln!(w, "{}", msg)?;
        }
    }
    Ok(())
}

/// Print one student block for `dry-run`.
pub fn print_student(
    w: &mut dyn Write,
    record: &StudentRecord,
    color: ColorMode,
) -> std::io::Result<()> {
    let tag = format!("[{}]", record.sequence_number);
    if color.enabled() {
        writeln!(
            w,
            "{} {} {}",
            tag.bold().yellow(),
            record.registration_id,
            record.full_name.bold()
        )?;
    } else {
        writeln!(w, "{} {} {}", tag, record.registration_id, record.full_name)?;
    }

    if record.attendance.is_empty() {
        if color.enabled() {
            writeln!(w, "  {}", "(no subjects)".dimmed())?;
        } else {
            writeln!(w, "  (no subjects)")?;
        }
    }
    for (code, pct) in &record.attendance {
        writeln!(w, "  {:<14} {:>6.2}", code, pct)?;
    }
    Ok(())
}

/// Print how a store sync went. Failed ids are listed individually.
pub fn print_sync_summary(
    w: &mut dyn Write,
    report: &SyncReport,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(
        w,
        "Synced {} students ({} new, {} updated)",
        report.succeeded(),
        report.created,
        report.updated
    )?;
    if !report.failed.is_empty() {
        let msg = format!("{} students failed to sync:", report.failed.len());
        if color.enabled() {
            writeln!(w, "{}", msg.red())?;
        } else {
            writeln!(w, "{}", msg)?;
        }
        for id in &report.failed {
            writeln!(w, "  {}", id)?;
        }
    }
    Ok(())
}
