use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{Connection, OpenFlags, OptionalExtension, params};

use attendex_core::{AttendanceMap, DocumentStore, StoreError, StudentDocument, UpsertOutcome};

fn backend(e: rusqlite::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn now_epoch() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

/// Open a SQLite connection with WAL mode and standard pragmas.
fn open_sqlite(path: &Path) -> Result<Connection, rusqlite::Error> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = Connection::open_with_flags(path, flags)?;
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA busy_timeout = 5000;",
    )?;
    Ok(conn)
}

fn init_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
         CREATE TABLE IF NOT EXISTS students (
             registration_id TEXT PRIMARY KEY,
             created_at      INTEGER NOT NULL
         );
         CREATE TABLE IF NOT EXISTS attendance (
             registration_id TEXT NOT NULL REFERENCES students(registration_id),
             subject_code    TEXT NOT NULL,
             percentage      REAL NOT NULL,
             updated_at      INTEGER NOT NULL,
             PRIMARY KEY (registration_id, subject_code)
         );",
    )
}

/// SQLite-backed [`DocumentStore`].
///
/// Each student document is a row in `students`; its attendance map is one
/// row per subject in `attendance`, so a merge is a per-key
/// `INSERT ... ON CONFLICT DO UPDATE` and never rewrites the whole
/// document. All access goes through one connection behind a [`Mutex`],
/// opened once and shared by every caller.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open (or create) a persistent store at `path`.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = open_sqlite(path).map_err(|e| {
            StoreError::Unavailable(format!(
                "failed to open store at {}: {}",
                path.display(),
                e
            ))
        })?;
        init_schema(&conn).map_err(backend)?;
        tracing::info!(path = %path.display(), "opened attendance store");
        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        })
    }

    /// A private in-memory database, discarded on drop.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory().map_err(backend)?;
        init_schema(&conn).map_err(backend)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of student documents.
    pub fn len(&self) -> Result<usize, StoreError> {
        let conn = self.lock()?;
        let n: i64 = conn
            .query_row("SELECT COUNT(*) FROM students", [], |row| row.get(0))
            .map_err(backend)?;
        Ok(n as usize)
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("store connection poisoned".into()))
    }
}

impl DocumentStore for SqliteStore {
    fn upsert_attendance(
        &self,
        registration_id: &str,
        attendance: &AttendanceMap,
    ) -> Result<UpsertOutcome, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(backend)?;
        let now = now_epoch();

        let inserted = tx
            .execute(
                "INSERT OR IGNORE INTO students (registration_id, created_at) VALUES (?1, ?2)",
                params![registration_id, now],
            )
            .map_err(backend)?;

        {
            let mut stmt = tx
                .prepare_cached(
                    "INSERT INTO attendance (registration_id, subject_code, percentage, updated_at)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT (registration_id, subject_code)
                     DO UPDATE SET percentage = excluded.percentage,
                                   updated_at = excluded.updated_at",
                )
                .map_err(backend)?;
            for (code, pct) in attendance {
                stmt.execute(params![registration_id, code, pct, now])
                    .map_err(backend)?;
            }
        }

        tx.commit().map_err(backend)?;

        if inserted == 1 {
            tracing::info!(registration_id, "created student document");
            Ok(UpsertOutcome::Created)
        } else {
            Ok(UpsertOutcome::Updated)
        }
    }

    fn get(&self, registration_id: &str) -> Result<Option<StudentDocument>, StoreError> {
        let conn = self.lock()?;

        let exists = conn
            .query_row(
                "SELECT 1 FROM students WHERE registration_id = ?1",
                params![registration_id],
                |_| Ok(()),
            )
            .optional()
            .map_err(backend)?
            .is_some();
        if !exists {
            return Ok(None);
        }

        let mut stmt = conn
            .prepare_cached(
                "SELECT subject_code, percentage FROM attendance
                 WHERE registration_id = ?1 ORDER BY subject_code",
            )
            .map_err(backend)?;
        let attendance = stmt
            .query_map(params![registration_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
            })
            .map_err(backend)?
            .collect::<Result<AttendanceMap, _>>()
            .map_err(backend)?;

        Ok(Some(StudentDocument {
            registration_id: registration_id.to_string(),
            attendance,
        }))
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::conformance;

    #[test]
    fn in_memory_conformance() {
        conformance::check_all(&SqliteStore::open_in_memory().unwrap());
    }

    #[test]
    fn documents_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attendance.db");

        let store = SqliteStore::open(&path).unwrap();
        let map: AttendanceMap = [("21CSE101".to_string(), 85.5)].into();
        store.upsert_attendance("RA1234567890123", &map).unwrap();
        drop(store);

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(reopened.len().unwrap(), 1);
        let doc = reopened.get("RA1234567890123").unwrap().unwrap();
        assert_eq!(doc.attendance["21CSE101"], 85.5);
        assert_eq!(reopened.path(), Some(path.as_path()));
    }

    #[test]
    fn later_run_merges_into_persisted_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attendance.db");

        let first: AttendanceMap = [
            ("21CSE101".to_string(), 80.0),
            ("21MAB201T".to_string(), 70.0),
        ]
        .into();
        SqliteStore::open(&path)
            .unwrap()
            .upsert_attendance("RA0000000000001", &first)
            .unwrap();

        let second: AttendanceMap = [("21CSE101".to_string(), 82.5)].into();
        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(
            store.upsert_attendance("RA0000000000001", &second).unwrap(),
            UpsertOutcome::Updated
        );

        let doc = store.get("RA0000000000001").unwrap().unwrap();
        assert_eq!(doc.attendance["21CSE101"], 82.5);
        assert_eq!(doc.attendance["21MAB201T"], 70.0);
    }

    #[test]
    fn shared_handle_across_threads() {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    let map: AttendanceMap = [(format!("21CSE10{i}"), 50.0 + i as f64)].into();
                    for _ in 0..10 {
                        store.upsert_attendance("RA0000000000042", &map).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(store.len().unwrap(), 1);
        let doc = store.get("RA0000000000042").unwrap().unwrap();
        assert_eq!(doc.attendance.len(), 8);
        assert_eq!(doc.attendance["21CSE107"], 57.0);
    }

    #[test]
    fn unopenable_path_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = SqliteStore::open(&dir.path().join("missing").join("x.db")).unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
