//! Session management and process-wide connector state.
//!
//! A [`Session`] owns one SQLite connection and exposes the three primitives
//! the query builder needs: statement execution with a fully drained text
//! cursor, schema reflection, and raw execution for fixtures and DDL.
//!
//! Connector registration and the query counter are process-wide. The first
//! session to open registers the connector; [`shutdown`] is the matching
//! teardown hook for process exit.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use rusqlite::{ffi, types::ValueRef, Connection};
use tracing::debug;

use crate::error::{Error, Result};

static CONNECTOR_REGISTERED: AtomicBool = AtomicBool::new(false);
static QUERY_COUNT: AtomicU64 = AtomicU64::new(0);

/// Number of statements materialized by [`crate::SelectQuery::get`] since
/// process start. Monotone; only a process restart resets it.
pub fn query_count() -> u64 {
    QUERY_COUNT.load(Ordering::Relaxed)
}

pub(crate) fn count_query() {
    QUERY_COUNT.fetch_add(1, Ordering::Relaxed);
}

/// Registers the SQLite connector once per process. Repeat calls are no-ops.
fn register_connector() -> Result<()> {
    if CONNECTOR_REGISTERED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }
    let rc = unsafe { ffi::sqlite3_initialize() };
    if rc != ffi::SQLITE_OK {
        CONNECTOR_REGISTERED.store(false, Ordering::SeqCst);
        return Err(Error::Connection(format!(
            "sqlite3_initialize returned {rc}"
        )));
    }
    debug!("sqlite connector registered");
    Ok(())
}

/// Process teardown hook. Every [`Session`] must already be dropped; the
/// engine refuses to shut down while connections are open.
pub fn shutdown() {
    if CONNECTOR_REGISTERED.swap(false, Ordering::SeqCst) {
        let _ = unsafe { ffi::sqlite3_shutdown() };
        debug!("sqlite connector unregistered");
    }
}

/// An open session against one SQLite database.
///
/// One session is owned by one builder; there is no pooling. Each statement
/// runs to completion and its cursor is fully drained before the call
/// returns.
pub struct Session {
    conn: Connection,
}

impl Session {
    /// Opens the named database, registering the connector on first use.
    pub fn open(db_name: &str) -> Result<Self> {
        register_connector()?;
        let conn =
            Connection::open(db_name).map_err(|err| Error::Connection(err.to_string()))?;
        debug!(db = db_name, "session opened");
        Ok(Self { conn })
    }

    /// Runs one statement without reading a result set, returning the
    /// affected row count. Intended for DDL and fixtures.
    pub fn execute(&self, sql: &str) -> Result<usize> {
        Ok(self.conn.execute(sql, [])?)
    }

    /// Executes one statement and drains its cursor, converting every cell
    /// to text by ordinal position.
    pub fn query_text(&self, sql: &str) -> Result<Vec<Vec<String>>> {
        let mut stmt = self.conn.prepare(sql)?;
        let col_count = stmt.column_count();
        let mut rows = stmt.query([])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(col_count);
            for idx in 0..col_count {
                cells.push(cell_to_text(row.get_ref(idx)?));
            }
            out.push(cells);
        }
        Ok(out)
    }

    /// Ordered `(name, type)` pairs for a table, straight from
    /// `PRAGMA TABLE_INFO`. Empty if the table does not exist; existence is
    /// not validated here.
    pub fn table_info(&self, table: &str) -> Result<Vec<(String, String)>> {
        let sql = format!("PRAGMA TABLE_INFO(`{table}`);");
        let rows = self.query_text(&sql)?;
        Ok(rows
            .into_iter()
            .map(|cells| {
                // TABLE_INFO row layout: cid, name, type, notnull, dflt_value, pk
                let mut cells = cells.into_iter();
                let name = cells.nth(1).unwrap_or_default();
                let ty = cells.next().unwrap_or_default();
                (name, ty)
            })
            .collect())
    }
}

fn cell_to_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => String::from_utf8_lossy(b).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_text_conversion() {
        assert_eq!(cell_to_text(ValueRef::Null), "");
        assert_eq!(cell_to_text(ValueRef::Integer(42)), "42");
        assert_eq!(cell_to_text(ValueRef::Real(1.5)), "1.5");
        assert_eq!(cell_to_text(ValueRef::Text(b"abc")), "abc");
    }

    #[test]
    fn table_info_reports_declaration_order() {
        let session = Session::open(":memory:").unwrap();
        session
            .execute("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT, age INTEGER)")
            .unwrap();

        let info = session.table_info("t").unwrap();
        let names: Vec<_> = info.iter().map(|(name, _)| name.as_str()).collect();
        let types: Vec<_> = info.iter().map(|(_, ty)| ty.as_str()).collect();
        assert_eq!(names, ["id", "name", "age"]);
        assert_eq!(types, ["INTEGER", "TEXT", "INTEGER"]);
    }

    #[test]
    fn table_info_missing_table_is_empty() {
        let session = Session::open(":memory:").unwrap();
        assert!(session.table_info("nope").unwrap().is_empty());
    }
}
