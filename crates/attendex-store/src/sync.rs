use attendex_core::{AttendanceTable, DocumentStore, UpsertOutcome};

/// Outcome of pushing one table into a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub created: usize,
    pub updated: usize,
    /// Registration ids whose upsert failed, in table order.
    pub failed: Vec<String>,
}

impl SyncReport {
    pub fn succeeded(&self) -> usize {
        self.created + self.updated
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Upsert every student in `table` into `store`, in table order.
///
/// Only present values are written; missing cells never reach the store.
/// A failing student is logged and skipped: the loop always runs to the
/// end and there is no retry.
pub fn sync_table(store: &dyn DocumentStore, table: &AttendanceTable) -> SyncReport {
    let mut report = SyncReport::default();

    for record in table.records() {
        match store.upsert_attendance(&record.registration_id, &record.attendance) {
            Ok(UpsertOutcome::Created) => report.created += 1,
            Ok(UpsertOutcome::Updated) => report.updated += 1,
            Err(e) => {
                tracing::warn!(
                    registration_id = %record.registration_id,
                    error = %e,
                    "attendance upsert failed"
                );
                report.failed.push(record.registration_id.clone());
            }
        }
    }

    tracing::info!(
        created = report.created,
        updated = report.updated,
        failed = report.failed.len(),
        "synced attendance table"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use attendex_core::StudentRecord;

    fn table() -> AttendanceTable {
        AttendanceTable::from_records(vec![
            StudentRecord::new(1, "RA0000000000001", "ONE").with_subject("21CSE101", 85.5),
            StudentRecord::new(2, "RA0000000000002", "TWO").with_subject("21CSE102T", 60.0),
            StudentRecord::new(3, "RA0000000000003", "THREE")
                .with_subject("21CSE101", 70.0)
                .with_subject("21CSE102T", 75.0),
        ])
    }

    #[test]
    fn missing_cells_are_not_written() {
        let store = MemoryStore::new();
        let report = sync_table(&store, &table());
        assert_eq!(report.created, 3);
        assert!(report.is_complete());

        let two = store.get("RA0000000000002").unwrap().unwrap();
        assert_eq!(two.attendance.len(), 1);
        assert!(!two.attendance.contains_key("21CSE101"));
    }

    #[test]
    fn failure_does_not_abort_batch() {
        let store = MemoryStore::new().fail_for("RA0000000000002");
        let report = sync_table(&store, &table());

        assert_eq!(store.upsert_calls(), 3);
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed, vec!["RA0000000000002".to_string()]);
        assert!(store.get("RA0000000000003").unwrap().is_some());
    }

    #[test]
    fn second_run_updates() {
        let store = MemoryStore::new();
        sync_table(&store, &table());
        let report = sync_table(&store, &table());
        assert_eq!(report.created, 0);
        assert_eq!(report.updated, 3);
    }

    #[test]
    fn empty_table_touches_nothing() {
        let store = MemoryStore::new();
        let report = sync_table(&store, &AttendanceTable::default());
        assert_eq!(report, SyncReport::default());
        assert_eq!(store.upsert_calls(), 0);
    }
}
