//! In-memory document store.

use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::{DashMap, DashSet};

use attendex_core::{AttendanceMap, DocumentStore, StoreError, StudentDocument, UpsertOutcome};

/// A [`DocumentStore`] held entirely in a [`DashMap`].
///
/// Supports:
/// - The same merge semantics as [`SqliteStore`](crate::SqliteStore).
/// - Simulated outages for chosen registration ids via
///   [`fail_for()`](MemoryStore::fail_for).
/// - Call counting via [`upsert_calls()`](MemoryStore::upsert_calls).
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: DashMap<String, AttendanceMap>,
    failing: DashSet<String>,
    upsert_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every upsert for `registration_id` fail as if the store were
    /// unreachable.
    pub fn fail_for(self, registration_id: &str) -> Self {
        self.failing.insert(registration_id.to_string());
        self
    }

    /// Number of upsert calls received, including failed ones.
    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}

impl DocumentStore for MemoryStore {
    fn upsert_attendance(
        &self,
        registration_id: &str,
        attendance: &AttendanceMap,
    ) -> Result<UpsertOutcome, StoreError> {
        self.upsert_calls.fetch_add(1, Ordering::Relaxed);
        if self.failing.contains(registration_id) {
            return Err(StoreError::Unavailable(format!(
                "simulated outage for {registration_id}"
            )));
        }

        let mut created = false;
        let mut doc = self
            .docs
            .entry(registration_id.to_string())
            .or_insert_with(|| {
                created = true;
                AttendanceMap::new()
            });
        doc.extend(attendance.iter().map(|(k, v)| (k.clone(), *v)));

        Ok(if created {
            UpsertOutcome::Created
        } else {
            UpsertOutcome::Updated
        })
    }

    fn get(&self, registration_id: &str) -> Result<Option<StudentDocument>, StoreError> {
        Ok(self.docs.get(registration_id).map(|doc| StudentDocument {
            registration_id: registration_id.to_string(),
            attendance: doc.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conformance;

    #[test]
    fn memory_conformance() {
        conformance::check_all(&MemoryStore::new());
    }

    #[test]
    fn simulated_outage_only_hits_chosen_id() {
        let store = MemoryStore::new().fail_for("RA0000000000002");
        let map: AttendanceMap = [("21CSE101".to_string(), 90.0)].into();

        assert!(store.upsert_attendance("RA0000000000001", &map).is_ok());
        let err = store.upsert_attendance("RA0000000000002", &map).unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));

        assert_eq!(store.upsert_calls(), 2);
        assert_eq!(store.len(), 1);
        assert!(store.get("RA0000000000002").unwrap().is_none());
    }
}
