use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params_from_iter, Connection, Statement};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::Result;

/// Core value types for SQLite operations
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    /// Bound as integer `0`/`1`. SQLite has no boolean storage class, so
    /// values read back are always [`Value::Integer`].
    Boolean(bool),
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Integer(value.into())
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Integer(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Blob(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Blob(value.to_vec())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Real(f),
            // Text that is not valid UTF-8 is kept byte for byte.
            ValueRef::Text(t) => match std::str::from_utf8(t) {
                Ok(text) => Value::Text(text.to_string()),
                Err(_) => Value::Blob(t.to_vec()),
            },
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            Value::Integer(i) => ToSqlOutput::from(*i),
            Value::Real(f) => ToSqlOutput::from(*f),
            Value::Text(s) => ToSqlOutput::from(s.as_str()),
            Value::Blob(b) => ToSqlOutput::from(b.as_slice()),
            Value::Boolean(b) => ToSqlOutput::from(*b),
        })
    }
}

/// Positional parameter bindings, matched to `?` placeholders in order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Params {
    pub values: Vec<Value>,
}

impl Params {
    /// Create an empty parameter list
    pub fn new() -> Self {
        Self::default()
    }
    /// Append the next positional value
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.values.push(value.into());
        self
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values.iter()
    }
}

impl From<()> for Params {
    fn from(_: ()) -> Self {
        Self::new()
    }
}

impl From<Vec<Value>> for Params {
    fn from(values: Vec<Value>) -> Self {
        Self { values }
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Params {
    fn from(values: [T; N]) -> Self {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// Result handle of an executed statement.
///
/// Holds what the connection reported right after the call: the number of
/// changed rows, the last inserted rowid and, for statements that produce
/// rows, the fetched result set. Rows are consumed with [`Cursor::fetchone`],
/// [`Cursor::fetchall`] or by iterating.
#[derive(Debug, Clone)]
pub struct Cursor {
    rowcount: Option<usize>,
    lastrowid: i64,
    columns: Vec<String>,
    rows: std::vec::IntoIter<Vec<Value>>,
}

impl Cursor {
    fn new(rowcount: Option<usize>, lastrowid: i64) -> Self {
        Self {
            rowcount,
            lastrowid,
            columns: Vec::new(),
            rows: Vec::new().into_iter(),
        }
    }

    /// Rows changed by the call. `None` for scripts and row-producing queries.
    pub fn rowcount(&self) -> Option<usize> {
        self.rowcount
    }

    /// Rowid of the most recent successful insert on the connection.
    pub fn lastrowid(&self) -> i64 {
        self.lastrowid
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows not yet fetched.
    pub fn remaining(&self) -> &[Vec<Value>] {
        self.rows.as_slice()
    }

    pub fn fetchone(&mut self) -> Option<Vec<Value>> {
        self.rows.next()
    }

    pub fn fetchall(&mut self) -> Vec<Vec<Value>> {
        self.rows.by_ref().collect()
    }
}

impl Iterator for Cursor {
    type Item = Vec<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next()
    }
}

/// SQLite database configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SqliteConfig {
    /// Path to the SQLite database file (`:memory:` for a private in-memory database)
    pub db_path: PathBuf,
    /// Issue `PRAGMA foreign_keys = ON` after opening. SQLite leaves foreign
    /// key enforcement off unless asked.
    pub foreign_keys: bool,
    /// Create missing parent directories of `db_path` before opening
    pub create_parent_dirs: bool,
}

impl SqliteConfig {
    /// Create a config for the given path with engine defaults
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            foreign_keys: false,
            create_parent_dirs: false,
        }
    }
    pub fn with_foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = enabled;
        self
    }
    pub fn with_parent_dirs(mut self, enabled: bool) -> Self {
        self.create_parent_dirs = enabled;
        self
    }
}

/// One owned connection to a SQLite database file.
///
/// Every execution primitive commits before returning, so each call is its
/// own unit of work. The connection is released when the instance is dropped;
/// use [`DatabaseInstance::close`] to observe close failures.
#[derive(Debug)]
pub struct DatabaseInstance {
    conn: Connection,
    path: PathBuf,
}

impl DatabaseInstance {
    /// Open (or create) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_config(SqliteConfig::new(path.as_ref()))
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::with_config(SqliteConfig::new(":memory:"))
    }

    pub fn with_config(config: SqliteConfig) -> Result<Self> {
        if config.create_parent_dirs {
            if let Some(parent) = config.db_path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
        }

        let conn = Connection::open(&config.db_path)?;
        if config.foreign_keys {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        }
        info!(
            path = %config.db_path.display(),
            foreign_keys = config.foreign_keys,
            "opened sales database"
        );

        Ok(Self {
            conn,
            path: config.db_path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Underlying connection, for engine features this wrapper does not cover.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Run one statement with positional parameters, then commit.
    ///
    /// Row-producing statements have their rows captured in the returned
    /// cursor.
    pub fn execute(&self, statement: &str, params: impl Into<Params>) -> Result<Cursor> {
        let params = params.into();
        let mut stmt = self.conn.prepare(statement)?;
        let cursor = self.run(&mut stmt, &params)?;
        drop(stmt);
        self.commit()?;

        debug!(statement, rowcount = ?cursor.rowcount(), "executed statement");
        Ok(cursor)
    }

    /// Run `statement` once per parameter set, in order, inside a single
    /// transaction. A failing set rolls back the whole batch.
    ///
    /// When the connection is already inside a transaction, the batch runs in
    /// it and the transaction is committed on success; on failure it is left
    /// open for the caller to roll back.
    pub fn execute_to_many<I, P>(&self, statement: &str, parameter_sets: I) -> Result<Cursor>
    where
        I: IntoIterator<Item = P>,
        P: Into<Params>,
    {
        // Join a transaction the caller already opened instead of nesting one.
        let tx = if self.conn.is_autocommit() {
            Some(self.conn.unchecked_transaction()?)
        } else {
            None
        };
        let mut rowcount = 0;
        let mut sets = 0;
        {
            let mut stmt = self.conn.prepare(statement)?;
            for params in parameter_sets {
                let params = params.into();
                rowcount += stmt.execute(params_from_iter(params.iter()))?;
                sets += 1;
            }
        }
        match tx {
            Some(tx) => tx.commit()?,
            None => self.commit()?,
        }

        debug!(statement, sets, rowcount, "executed batch");
        Ok(Cursor::new(Some(rowcount), self.conn.last_insert_rowid()))
    }

    /// Run a multi-statement script, then commit.
    ///
    /// Statements run in order in autocommit mode: when one fails, those before
    /// it stay applied.
    pub fn execute_script(&self, script: &str) -> Result<Cursor> {
        self.conn.execute_batch(script)?;
        self.commit()?;

        debug!(bytes = script.len(), "executed script");
        Ok(Cursor::new(None, self.conn.last_insert_rowid()))
    }

    /// Close the connection, reporting any failure to do so.
    pub fn close(self) -> Result<()> {
        let Self { conn, path } = self;
        conn.close().map_err(|(_, err)| err)?;
        info!(path = %path.display(), "closed sales database");
        Ok(())
    }

    fn run(&self, stmt: &mut Statement<'_>, params: &Params) -> Result<Cursor> {
        let column_count = stmt.column_count();
        if column_count == 0 {
            let changed = stmt.execute(params_from_iter(params.iter()))?;
            return Ok(Cursor::new(Some(changed), self.conn.last_insert_rowid()));
        }

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let mut fetched = Vec::new();
        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(column_count);
            for idx in 0..column_count {
                values.push(Value::from(row.get_ref(idx)?));
            }
            fetched.push(values);
        }

        let mut cursor = Cursor::new(None, self.conn.last_insert_rowid());
        cursor.columns = columns;
        cursor.rows = fetched.into_iter();
        Ok(cursor)
    }

    // Commits a transaction left open by an explicit BEGIN; no-op otherwise.
    fn commit(&self) -> Result<()> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("COMMIT;")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_keep_positional_order() {
        let params = Params::new().with_value(1).with_value("two").with_value(3.0);
        assert_eq!(
            params.values,
            vec![
                Value::Integer(1),
                Value::Text("two".to_string()),
                Value::Real(3.0)
            ]
        );
        assert_eq!(Params::from(["a", "b"]).len(), 2);
        assert!(Params::from(()).is_empty());
    }

    #[test]
    fn option_maps_to_null() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".to_string()));
    }

    #[test]
    fn select_rows_are_captured() {
        let db = DatabaseInstance::open_in_memory().unwrap();
        let mut cursor = db
            .execute("SELECT ?1 AS a, ?2 AS b", [Value::from(7), Value::from("x")])
            .unwrap();
        assert_eq!(cursor.columns(), ["a", "b"]);
        assert_eq!(cursor.rowcount(), None);
        assert_eq!(cursor.remaining().len(), 1);
        assert_eq!(
            cursor.fetchone(),
            Some(vec![Value::Integer(7), Value::Text("x".to_string())])
        );
        assert!(cursor.fetchone().is_none());
        assert!(cursor.remaining().is_empty());
    }

    #[test]
    fn invalid_utf8_text_is_kept_as_bytes() {
        let db = DatabaseInstance::open_in_memory().unwrap();
        let rows = db
            .execute("SELECT CAST(x'ff' AS TEXT), CAST(x'6869' AS TEXT)", ())
            .unwrap()
            .fetchall();
        assert_eq!(
            rows,
            vec![vec![Value::Blob(vec![0xff]), Value::Text("hi".to_string())]]
        );
    }

    #[test]
    fn boolean_and_blob_bind() {
        let db = DatabaseInstance::open_in_memory().unwrap();
        let row = db
            .execute("SELECT ?, ?, ?", [Value::from(true), Value::from(&b"ab"[..]), Value::Null])
            .unwrap()
            .fetchall();
        assert_eq!(
            row,
            vec![vec![Value::Integer(1), Value::Blob(b"ab".to_vec()), Value::Null]]
        );
    }

    #[test]
    fn execute_commits_open_transaction() {
        let db = DatabaseInstance::open_in_memory().unwrap();
        db.execute_script("CREATE TABLE t (x integer); BEGIN;").unwrap();
        assert!(db.connection().is_autocommit());

        db.connection().execute_batch("BEGIN;").unwrap();
        db.execute("INSERT INTO t (x) VALUES (?)", [1]).unwrap();
        assert!(db.connection().is_autocommit());
    }

    #[test]
    fn batch_joins_open_transaction() {
        let db = DatabaseInstance::open_in_memory().unwrap();
        db.execute_script("CREATE TABLE t (x integer NOT NULL);").unwrap();

        db.connection().execute_batch("BEGIN;").unwrap();
        let cursor = db
            .execute_to_many("INSERT INTO t (x) VALUES (?)", [[1], [2]])
            .unwrap();
        assert_eq!(cursor.rowcount(), Some(2));
        assert!(db.connection().is_autocommit());

        // A failing batch leaves the caller's transaction open.
        db.connection().execute_batch("BEGIN;").unwrap();
        let sets = vec![Params::new().with_value(3), Params::new().with_value(Value::Null)];
        assert!(db.execute_to_many("INSERT INTO t (x) VALUES (?)", sets).is_err());
        assert!(!db.connection().is_autocommit());
        db.connection().execute_batch("ROLLBACK;").unwrap();

        let rows = db.execute("SELECT x FROM t ORDER BY x", ()).unwrap().fetchall();
        assert_eq!(rows, vec![vec![Value::Integer(1)], vec![Value::Integer(2)]]);
    }
}
