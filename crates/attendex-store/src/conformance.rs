//! Behaviour every [`DocumentStore`] must share, run against each
//! implementation from its own test module.

use attendex_core::{AttendanceMap, DocumentStore, UpsertOutcome};

fn map(pairs: &[(&str, f64)]) -> AttendanceMap {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

pub(crate) fn check_all(store: &dyn DocumentStore) {
    creates_missing_document(store);
    merge_keeps_absent_keys(store);
    idempotent_reapply(store);
    empty_map_registers_student(store);
}

fn creates_missing_document(store: &dyn DocumentStore) {
    assert!(store.get("RA1000000000001").unwrap().is_none());
    let outcome = store
        .upsert_attendance("RA1000000000001", &map(&[("21CSE101", 85.5)]))
        .unwrap();
    assert_eq!(outcome, UpsertOutcome::Created);

    let doc = store.get("RA1000000000001").unwrap().unwrap();
    assert_eq!(doc.registration_id, "RA1000000000001");
    assert_eq!(doc.attendance, map(&[("21CSE101", 85.5)]));
}

fn merge_keeps_absent_keys(store: &dyn DocumentStore) {
    store
        .upsert_attendance("RA1000000000002", &map(&[("A", 90.0)]))
        .unwrap();
    let outcome = store
        .upsert_attendance("RA1000000000002", &map(&[("B", 80.0)]))
        .unwrap();
    assert_eq!(outcome, UpsertOutcome::Updated);

    let doc = store.get("RA1000000000002").unwrap().unwrap();
    assert_eq!(doc.attendance, map(&[("A", 90.0), ("B", 80.0)]));

    // Overwrite one key, leave the other alone.
    store
        .upsert_attendance("RA1000000000002", &map(&[("A", 95.0)]))
        .unwrap();
    let doc = store.get("RA1000000000002").unwrap().unwrap();
    assert_eq!(doc.attendance, map(&[("A", 95.0), ("B", 80.0)]));
}

fn idempotent_reapply(store: &dyn DocumentStore) {
    let m = map(&[("21CSE101", 70.25), ("21CSE102T", 90.0)]);
    store.upsert_attendance("RA1000000000003", &m).unwrap();
    let once = store.get("RA1000000000003").unwrap();
    store.upsert_attendance("RA1000000000003", &m).unwrap();
    let twice = store.get("RA1000000000003").unwrap();
    assert_eq!(once, twice);
}

fn empty_map_registers_student(store: &dyn DocumentStore) {
    store
        .upsert_attendance("RA1000000000004", &AttendanceMap::new())
        .unwrap();
    let doc = store.get("RA1000000000004").unwrap().unwrap();
    assert!(doc.attendance.is_empty());
}
