//! Runs answer keys and submitted queries against the target database.
//!
//! The SQL text is passed through as-is; nothing is parsed, validated or
//! sandboxed. Failures carry the driver's message verbatim.

use std::path::{Path, PathBuf};

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use serde::Serialize;
use tracing::debug;

use crate::assignments;
use crate::error::{Error, Result};
use crate::store::Store;

const NULL_TEXT: &str = "null";
const SEPARATOR: &str = "----------";
const NO_RESULTS: &str = "No results.";

/// Tabular result of a query, every value rendered as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryOutput {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

pub trait QueryExecutor {
    fn execute(&self, sql: &str) -> Result<QueryOutput>;
}

/// Executes against a SQLite database file, opened for the duration of one call.
pub struct SqliteExecutor {
    path: PathBuf,
}

impl SqliteExecutor {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn open(&self) -> rusqlite::Result<Connection> {
        // No SQLITE_OPEN_CREATE: a missing target database is an error, not an empty one.
        Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
    }
}

fn query_error(e: rusqlite::Error) -> Error {
    Error::Query(e.to_string())
}

fn value_to_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => NULL_TEXT.to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

impl QueryExecutor for SqliteExecutor {
    fn execute(&self, sql: &str) -> Result<QueryOutput> {
        debug!("Executing test query against {}", self.path.display());

        let conn = self.open().map_err(query_error)?;
        let mut stmt = conn.prepare(sql).map_err(query_error)?;

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let column_count = columns.len();

        let mut rows = Vec::new();
        let mut result = stmt.query([]).map_err(query_error)?;
        while let Some(row) = result.next().map_err(query_error)? {
            let mut values = Vec::with_capacity(column_count);
            for i in 0..column_count {
                values.push(value_to_text(row.get_ref(i).map_err(query_error)?));
            }
            rows.push(values);
        }

        debug!("Test query returned {} rows", rows.len());
        Ok(QueryOutput { columns, rows })
    }
}

/// Runs the selected assignment's answer key.
pub fn test_answer_key(
    store: &impl Store,
    executor: &dyn QueryExecutor,
    selection: Option<i64>,
) -> Result<QueryOutput> {
    let assignment =
        assignments::selected(store, selection, "select an assignment to test its answer key")?;
    executor.execute(&assignment.answer_key)
}

/// Runs a student's draft answer for the selected assignment.
pub fn test_submission(
    store: &impl Store,
    executor: &dyn QueryExecutor,
    selection: Option<i64>,
    sql: &str,
) -> Result<QueryOutput> {
    assignments::selected(store, selection, "select an assignment before testing a query")?;
    executor.execute(sql)
}

fn push_line(out: &mut String, cells: &[impl AsRef<str>]) {
    for cell in cells {
        out.push_str(cell.as_ref());
        out.push('\t');
    }
    out.push('\n');
}

/// Header, a dashed separator, then rows. Used for answer-key checks.
#[must_use]
pub fn render_report(output: &QueryOutput) -> String {
    let mut out = String::new();
    push_line(&mut out, &output.columns);
    push_line(&mut out, &vec![SEPARATOR; output.columns.len()]);
    for row in &output.rows {
        push_line(&mut out, row);
    }
    out
}

/// Header then rows, or "No results." when the statement produced no columns.
#[must_use]
pub fn render_plain(output: &QueryOutput) -> String {
    if output.columns.is_empty() {
        return NO_RESULTS.to_string();
    }

    let mut out = String::new();
    push_line(&mut out, &output.columns);
    for row in &output.rows {
        push_line(&mut out, row);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use crate::types::AssignmentDraft;
    use tempfile::TempDir;

    fn target_db(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("target.db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE employees (id INTEGER PRIMARY KEY, name TEXT, manager_id INTEGER);
             INSERT INTO employees VALUES (1, 'Steven', NULL);
             INSERT INTO employees VALUES (2, 'Neena', 1);",
        )
        .unwrap();
        path
    }

    #[test]
    fn test_execute_collects_columns_and_rows() {
        let dir = TempDir::new().unwrap();
        let executor = SqliteExecutor::new(target_db(&dir));

        let output = executor
            .execute("SELECT id, name, manager_id FROM employees ORDER BY id")
            .unwrap();

        assert_eq!(output.columns, vec!["id", "name", "manager_id"]);
        assert_eq!(
            output.rows,
            vec![
                vec!["1".to_string(), "Steven".to_string(), "null".to_string()],
                vec!["2".to_string(), "Neena".to_string(), "1".to_string()],
            ]
        );
    }

    #[test]
    fn test_sql_error_is_reported_verbatim() {
        let dir = TempDir::new().unwrap();
        let executor = SqliteExecutor::new(target_db(&dir));

        match executor.execute("SELECT * FROM missing_table") {
            Err(Error::Query(msg)) => assert!(msg.contains("no such table: missing_table")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_missing_target_database_is_a_query_error() {
        let dir = TempDir::new().unwrap();
        let executor = SqliteExecutor::new(dir.path().join("absent.db"));

        assert!(matches!(executor.execute("SELECT 1"), Err(Error::Query(_))));
        assert!(!dir.path().join("absent.db").exists());
    }

    #[test]
    fn test_render_report_has_separator_row() {
        let output = QueryOutput {
            columns: vec!["id".to_string(), "name".to_string()],
            rows: vec![vec!["1".to_string(), "Steven".to_string()]],
        };

        assert_eq!(
            render_report(&output),
            "id\tname\t\n----------\t----------\t\n1\tSteven\t\n"
        );
    }

    #[test]
    fn test_render_plain() {
        let output = QueryOutput {
            columns: vec!["n".to_string()],
            rows: vec![vec!["42".to_string()]],
        };
        assert_eq!(render_plain(&output), "n\t\n42\t\n");
        assert_eq!(render_plain(&QueryOutput::default()), "No results.");
    }

    #[test]
    fn test_answer_key_requires_selection() {
        let dir = TempDir::new().unwrap();
        let executor = SqliteExecutor::new(target_db(&dir));
        let store = SqliteStore::in_memory().unwrap();
        store.initialize().unwrap();

        assert!(matches!(
            test_answer_key(&store, &executor, None),
            Err(Error::NoSelection(_))
        ));
        assert!(matches!(
            test_submission(&store, &executor, None, "SELECT 1"),
            Err(Error::NoSelection(_))
        ));
    }

    #[test]
    fn test_answer_key_runs_stored_query() {
        let dir = TempDir::new().unwrap();
        let executor = SqliteExecutor::new(target_db(&dir));
        let store = SqliteStore::in_memory().unwrap();
        store.initialize().unwrap();
        let assignment = store
            .create_assignment(&AssignmentDraft {
                name: "Count".to_string(),
                instructions: "Count employees".to_string(),
                answer_key: "SELECT COUNT(*) AS total FROM employees".to_string(),
            })
            .unwrap();

        let output = test_answer_key(&store, &executor, Some(assignment.id)).unwrap();
        assert_eq!(output.columns, vec!["total"]);
        assert_eq!(output.rows, vec![vec!["2".to_string()]]);

        let output =
            test_submission(&store, &executor, Some(assignment.id), "SELECT name FROM employees WHERE id = 2")
                .unwrap();
        assert_eq!(output.rows, vec![vec!["Neena".to_string()]]);
    }
}
