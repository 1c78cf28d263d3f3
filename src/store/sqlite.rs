use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::Store;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        Self::from_connection(conn)
    }

    /// Opens a private in-memory database. Used by tests and throwaway sessions.
    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let role: String = row.get(3)?;
    let role = Role::parse(&role).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("unknown role '{role}'").into(),
        )
    })?;

    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
        role,
    })
}

fn assignment_from_row(row: &Row<'_>) -> rusqlite::Result<Assignment> {
    Ok(Assignment {
        id: row.get(0)?,
        name: row.get(1)?,
        instructions: row.get(2)?,
        answer_key: row.get(3)?,
        created_at: parse_datetime(&row.get::<_, String>(4)?),
        updated_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}

const ASSIGNMENT_COLUMNS: &str = "id, name, instructions, answer_key, created_at, updated_at";

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // User operations

    fn create_user(&self, username: &str, password: &str, role: Role) -> Result<User> {
        let conn = self.conn();
        let result = conn.execute(
            "INSERT INTO users (username, password, role) VALUES (?1, ?2, ?3)",
            params![username, password, role.as_str()],
        );

        match result {
            Ok(_) => Ok(User {
                id: conn.last_insert_rowid(),
                username: username.to_string(),
                password: password.to_string(),
                role,
            }),
            Err(e) if is_constraint_violation(&e) => Err(Error::AlreadyExists),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, username, password, role FROM users WHERE id = ?1",
            params![id],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, username, password, role FROM users WHERE username = ?1",
            params![username],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn find_user_for_login(&self, username: &str, role: Role) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, username, password, role FROM users WHERE username = ?1 AND role = ?2",
            params![username, role.as_str()],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT id, username, password, role FROM users ORDER BY id")?;

        let rows = stmt.query_map([], user_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn delete_user(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM users WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn has_admin_user(&self) -> Result<bool> {
        let conn = self.conn();
        let count: i32 = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE role = 'admin'",
            [],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    // Assignment operations

    fn create_assignment(&self, draft: &AssignmentDraft) -> Result<Assignment> {
        let now = Utc::now();
        let conn = self.conn();
        conn.execute(
            "INSERT INTO assignments (name, instructions, answer_key, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                draft.name,
                draft.instructions,
                draft.answer_key,
                format_datetime(&now),
                format_datetime(&now),
            ],
        )?;

        Ok(Assignment {
            id: conn.last_insert_rowid(),
            name: draft.name.clone(),
            instructions: draft.instructions.clone(),
            answer_key: draft.answer_key.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    fn get_assignment(&self, id: i64) -> Result<Option<Assignment>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {ASSIGNMENT_COLUMNS} FROM assignments WHERE id = ?1"),
            params![id],
            assignment_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_assignments(&self) -> Result<Vec<Assignment>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare(&format!("SELECT {ASSIGNMENT_COLUMNS} FROM assignments ORDER BY id"))?;

        let rows = stmt.query_map([], assignment_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_assignment(&self, id: i64, draft: &AssignmentDraft) -> Result<Assignment> {
        let conn = self.conn();
        let rows = conn.execute(
            "UPDATE assignments SET name = ?1, instructions = ?2, answer_key = ?3, updated_at = ?4
             WHERE id = ?5",
            params![
                draft.name,
                draft.instructions,
                draft.answer_key,
                format_datetime(&Utc::now()),
                id
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }

        conn.query_row(
            &format!("SELECT {ASSIGNMENT_COLUMNS} FROM assignments WHERE id = ?1"),
            params![id],
            assignment_from_row,
        )
        .map_err(Error::from)
    }

    fn delete_assignment(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM assignments WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Grade operations

    fn get_grade(&self, assignment_id: i64, user_id: i64) -> Result<Option<GradeRecord>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT assignment_id, user_id, grade, updated_at
             FROM grades WHERE assignment_id = ?1 AND user_id = ?2",
            params![assignment_id, user_id],
            |row| {
                Ok(GradeRecord {
                    assignment_id: row.get(0)?,
                    user_id: row.get(1)?,
                    grade: row.get(2)?,
                    updated_at: parse_datetime(&row.get::<_, String>(3)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_assignment_grades(&self, assignment_id: i64) -> Result<Vec<GradeEntry>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT u.username, g.grade
             FROM grades g
             JOIN users u ON g.user_id = u.id
             WHERE g.assignment_id = ?1
             ORDER BY u.username",
        )?;

        let rows = stmt.query_map(params![assignment_id], |row| {
            Ok(GradeEntry {
                username: row.get(0)?,
                grade: row.get(1)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn insert_grade(&self, assignment_id: i64, user_id: i64, grade: f64) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO grades (assignment_id, user_id, grade, updated_at) VALUES (?1, ?2, ?3, ?4)",
            params![assignment_id, user_id, grade, format_datetime(&Utc::now())],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
            {
                Err(Error::AlreadyExists)
            }
            Err(e) => Err(Error::from(e)),
        }
    }

    fn raise_grade(&self, assignment_id: i64, user_id: i64, grade: f64) -> Result<bool> {
        let rows = self.conn().execute(
            "UPDATE grades SET grade = ?1, updated_at = ?2
             WHERE assignment_id = ?3 AND user_id = ?4 AND grade < ?1",
            params![grade, format_datetime(&Utc::now()), assignment_id, user_id],
        )?;
        Ok(rows > 0)
    }
}
