use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::debug;

use crate::error::SQLError;
use crate::traits::{Row, SQLStore, TxStatement, Value};

/// SqliteStore is a SQLStore implementation backed by rusqlite (bundled SQLite).
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a SQLite database at the given path.
    pub fn open(path: &Path) -> Result<Self, SQLError> {
        let conn = Connection::open(path)
            .map_err(|e| SQLError::Connection(e.to_string()))?;

        // Enable WAL mode for better concurrent read performance.
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .map_err(|e| SQLError::Connection(e.to_string()))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite database (useful for tests).
    pub fn open_in_memory() -> Result<Self, SQLError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| SQLError::Connection(e.to_string()))?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")
            .map_err(|e| SQLError::Connection(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

/// Convert our Value enum to rusqlite's ToSql.
fn bind_params(params: &[Value]) -> Vec<Box<dyn rusqlite::types::ToSql + '_>> {
    params
        .iter()
        .map(|v| -> Box<dyn rusqlite::types::ToSql + '_> {
            match v {
                Value::Null => Box::new(rusqlite::types::Null),
                Value::Integer(i) => Box::new(*i),
                Value::Real(f) => Box::new(*f),
                Value::Text(s) => Box::new(s.as_str()),
                Value::Blob(b) => Box::new(b.as_slice()),
            }
        })
        .collect()
}

impl SQLStore for SqliteStore {
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, SQLError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| SQLError::Query(e.to_string()))?;

        let bound = bind_params(params);
        let param_refs: Vec<&dyn rusqlite::types::ToSql> =
            bound.iter().map(|b| b.as_ref()).collect();

        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| SQLError::Query(e.to_string()))?;

        let column_names: Vec<String> = stmt
            .column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let rows = stmt
            .query_map(param_refs.as_slice(), |row| {
                let mut columns = Vec::new();
                for (i, name) in column_names.iter().enumerate() {
                    let val = row_value_at(row, i);
                    columns.push((name.clone(), val));
                }
                Ok(Row { columns })
            })
            .map_err(|e| SQLError::Query(e.to_string()))?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row.map_err(|e| SQLError::Query(e.to_string()))?);
        }
        Ok(result)
    }

    fn exec(&self, sql: &str, params: &[Value]) -> Result<u64, SQLError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| SQLError::Execution(e.to_string()))?;

        let bound = bind_params(params);
        let param_refs: Vec<&dyn rusqlite::types::ToSql> =
            bound.iter().map(|b| b.as_ref()).collect();

        let affected = conn
            .execute(sql, param_refs.as_slice())
            .map_err(|e| SQLError::Execution(e.to_string()))?;

        Ok(affected as u64)
    }

    fn exec_tx(&self, stmts: &[TxStatement]) -> Result<Vec<u64>, SQLError> {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| SQLError::Execution(e.to_string()))?;

        let tx = conn
            .transaction()
            .map_err(|e| SQLError::Execution(e.to_string()))?;

        let mut counts = Vec::with_capacity(stmts.len());
        for stmt in stmts {
            let bound = bind_params(&stmt.params);
            let param_refs: Vec<&dyn rusqlite::types::ToSql> =
                bound.iter().map(|b| b.as_ref()).collect();

            // Dropping `tx` without commit rolls back, so any `?` below
            // leaves the database untouched.
            let affected = tx
                .execute(&stmt.sql, param_refs.as_slice())
                .map_err(|e| SQLError::Execution(e.to_string()))?;

            if stmt.must_affect && affected == 0 {
                debug!(sql = %stmt.sql, "transaction guard affected zero rows");
                return Err(SQLError::TxAborted(format!(
                    "statement affected no rows: {}",
                    stmt.sql
                )));
            }
            counts.push(affected as u64);
        }

        tx.commit().map_err(|e| SQLError::Execution(e.to_string()))?;
        Ok(counts)
    }
}

/// Extract a Value from a rusqlite row at a given column index.
fn row_value_at(row: &rusqlite::Row, idx: usize) -> Value {
    // Try integer first, then real, then text, then blob, then null.
    if let Ok(i) = row.get::<_, i64>(idx) {
        return Value::Integer(i);
    }
    if let Ok(f) = row.get::<_, f64>(idx) {
        return Value::Real(f);
    }
    if let Ok(s) = row.get::<_, String>(idx) {
        return Value::Text(s);
    }
    if let Ok(b) = row.get::<_, Vec<u8>>(idx) {
        return Value::Blob(b);
    }
    Value::Null
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_table() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .exec(
                "CREATE TABLE t (id TEXT PRIMARY KEY, status TEXT NOT NULL)",
                &[],
            )
            .unwrap();
        store
    }

    #[test]
    fn exec_and_query_roundtrip() {
        let store = store_with_table();
        store
            .exec(
                "INSERT INTO t (id, status) VALUES (?1, ?2)",
                &[Value::Text("a".into()), Value::Text("OPEN".into())],
            )
            .unwrap();

        let rows = store
            .query("SELECT id, status FROM t", &[])
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_str("status"), Some("OPEN"));
    }

    #[test]
    fn open_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::open(&dir.path().join("t.sqlite")).unwrap();
        store.exec("CREATE TABLE t (id TEXT)", &[]).unwrap();
    }

    #[test]
    fn exec_tx_commits_all() {
        let store = store_with_table();
        let counts = store
            .exec_tx(&[
                TxStatement::new(
                    "INSERT INTO t (id, status) VALUES (?1, ?2)",
                    vec![Value::Text("a".into()), Value::Text("OPEN".into())],
                ),
                TxStatement::new(
                    "INSERT INTO t (id, status) VALUES (?1, ?2)",
                    vec![Value::Text("b".into()), Value::Text("OPEN".into())],
                ),
            ])
            .unwrap();
        assert_eq!(counts, vec![1, 1]);

        let rows = store.query("SELECT id FROM t", &[]).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn exec_tx_rolls_back_on_error() {
        let store = store_with_table();
        store
            .exec(
                "INSERT INTO t (id, status) VALUES (?1, ?2)",
                &[Value::Text("a".into()), Value::Text("OPEN".into())],
            )
            .unwrap();

        // Second statement violates the primary key; first must not survive.
        let err = store.exec_tx(&[
            TxStatement::new(
                "UPDATE t SET status = ?1 WHERE id = ?2",
                vec![Value::Text("CLOSED".into()), Value::Text("a".into())],
            ),
            TxStatement::new(
                "INSERT INTO t (id, status) VALUES (?1, ?2)",
                vec![Value::Text("a".into()), Value::Text("OPEN".into())],
            ),
        ]);
        assert!(err.is_err());

        let rows = store.query("SELECT status FROM t", &[]).unwrap();
        assert_eq!(rows[0].get_str("status"), Some("OPEN"));
    }

    #[test]
    fn exec_tx_guard_aborts_batch() {
        let store = store_with_table();
        store
            .exec(
                "INSERT INTO t (id, status) VALUES (?1, ?2)",
                &[Value::Text("a".into()), Value::Text("OPEN".into())],
            )
            .unwrap();

        // Guard requires a row in status DONE; there is none, so the
        // unguarded first update must also be rolled back.
        let err = store.exec_tx(&[
            TxStatement::new(
                "UPDATE t SET status = ?1 WHERE id = ?2",
                vec![Value::Text("CLOSED".into()), Value::Text("a".into())],
            ),
            TxStatement::guarded(
                "UPDATE t SET status = ?1 WHERE id = ?2 AND status = ?3",
                vec![
                    Value::Text("ARCHIVED".into()),
                    Value::Text("a".into()),
                    Value::Text("DONE".into()),
                ],
            ),
        ]);
        assert!(matches!(err, Err(SQLError::TxAborted(_))));

        let rows = store.query("SELECT status FROM t", &[]).unwrap();
        assert_eq!(rows[0].get_str("status"), Some("OPEN"));
    }
}
