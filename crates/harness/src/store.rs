//! Read-only backing-store verification
//!
//! The harness never owns or migrates the application's database; it only
//! reads row counts, projections, and ordered-row digests to verify side
//! effects. The digest is the state hash guard: SHA-256 over every column of
//! every row of an ordered query, so "no persisted effect" is provable as
//! byte equality of two digests.

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use sha2::{Digest as _, Sha256};
use std::path::Path;
use tracing::debug;

use crate::error::Result;

/// Hex-encoded content hash of an ordered row set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest(String);

impl Digest {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[cfg(test)]
    pub(crate) fn from_raw(hex: String) -> Self {
        Digest(hex)
    }
}

/// Read-only handle on the application's backing store
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open the application database read-only
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        debug!("Opened backing store at {:?} (read-only)", path.as_ref());
        Ok(Self { conn })
    }

    /// In-memory store for harness tests
    pub fn open_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Direct access for test fixtures that need to seed tables
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Row count of an arbitrary query
    pub fn row_count(&self, query: &str) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM ({})", query), [], |row| {
                row.get(0)
            })?;
        Ok(count)
    }

    /// All rows of a query as text projections, column order preserved
    pub fn rows(&self, query: &str) -> Result<Vec<Vec<String>>> {
        let mut stmt = self.conn.prepare(query)?;
        let column_count = stmt.column_count();
        let mut rows = stmt.query([])?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut projected = Vec::with_capacity(column_count);
            for i in 0..column_count {
                projected.push(render_value(row.get_ref(i)?));
            }
            out.push(projected);
        }
        Ok(out)
    }

    /// Content digest of an ordered query: the state-hash-guard capture.
    ///
    /// The query must carry its own ORDER BY; digesting an unordered row set
    /// would make the idempotence comparison depend on scan order.
    pub fn snapshot(&self, query: &str) -> Result<Digest> {
        let mut hasher = Sha256::new();
        for row in self.rows(query)? {
            for value in &row {
                hasher.update(value.as_bytes());
                hasher.update([0x1f]); // unit separator, keeps columns unambiguous
            }
            hasher.update([0x1e]); // record separator
        }
        Ok(Digest(hex::encode(hasher.finalize())))
    }
}

fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => hex::encode(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_store() -> Store {
        let store = Store::open_memory().unwrap();
        store
            .connection()
            .execute_batch(
                r#"
                CREATE TABLE items (
                    itemid INTEGER PRIMARY KEY,
                    hostid INTEGER NOT NULL,
                    name TEXT NOT NULL,
                    key_ TEXT NOT NULL,
                    delay TEXT NOT NULL DEFAULT '1m'
                );
                INSERT INTO items (itemid, hostid, name, key_) VALUES
                    (1, 40001, 'discoveryRuleNo1', 'discovery-key-no1'),
                    (2, 40001, 'testFormDiscoveryRule1', 'discovery-rule-form1');
                "#,
            )
            .unwrap();
        store
    }

    #[test]
    fn row_count_scopes_to_the_query() {
        let store = seeded_store();
        assert_eq!(
            store
                .row_count("SELECT * FROM items WHERE hostid = 40001")
                .unwrap(),
            2
        );
        assert_eq!(
            store
                .row_count("SELECT * FROM items WHERE key_ = 'discovery-key-no1'")
                .unwrap(),
            1
        );
        assert_eq!(
            store
                .row_count("SELECT * FROM items WHERE key_ = 'missing'")
                .unwrap(),
            0
        );
    }

    #[test]
    fn projection_preserves_column_order() {
        let store = seeded_store();
        let rows = store
            .rows("SELECT name, key_ FROM items WHERE itemid = 1")
            .unwrap();
        assert_eq!(rows, vec![vec![
            "discoveryRuleNo1".to_string(),
            "discovery-key-no1".to_string()
        ]]);
    }

    #[test]
    fn snapshot_is_stable_until_the_table_changes() {
        let store = seeded_store();
        let query = "SELECT itemid, hostid, name, key_, delay FROM items ORDER BY itemid";

        let before = store.snapshot(query).unwrap();
        let unchanged = store.snapshot(query).unwrap();
        assert_eq!(before, unchanged);

        store
            .connection()
            .execute(
                "INSERT INTO items (itemid, hostid, name, key_) VALUES (3, 40001, 'x', 'y')",
                [],
            )
            .unwrap();
        let after = store.snapshot(query).unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn snapshot_distinguishes_column_boundaries() {
        let store = Store::open_memory().unwrap();
        store
            .connection()
            .execute_batch(
                "CREATE TABLE t (a TEXT, b TEXT);
                 INSERT INTO t VALUES ('ab', 'c');",
            )
            .unwrap();
        let first = store.snapshot("SELECT a, b FROM t").unwrap();

        store
            .connection()
            .execute_batch("DELETE FROM t; INSERT INTO t VALUES ('a', 'bc');")
            .unwrap();
        let second = store.snapshot("SELECT a, b FROM t").unwrap();

        assert_ne!(first, second);
    }
}
