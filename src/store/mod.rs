mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // User operations
    fn create_user(&self, username: &str, password: &str, role: Role) -> Result<User>;
    fn get_user(&self, id: i64) -> Result<Option<User>>;
    fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    fn find_user_for_login(&self, username: &str, role: Role) -> Result<Option<User>>;
    fn list_users(&self) -> Result<Vec<User>>;
    fn delete_user(&self, id: i64) -> Result<bool>;
    fn has_admin_user(&self) -> Result<bool>;

    // Assignment operations
    fn create_assignment(&self, draft: &AssignmentDraft) -> Result<Assignment>;
    fn get_assignment(&self, id: i64) -> Result<Option<Assignment>>;
    fn list_assignments(&self) -> Result<Vec<Assignment>>;
    fn update_assignment(&self, id: i64, draft: &AssignmentDraft) -> Result<Assignment>;
    fn delete_assignment(&self, id: i64) -> Result<bool>;

    // Grade operations
    fn get_grade(&self, assignment_id: i64, user_id: i64) -> Result<Option<GradeRecord>>;
    fn list_assignment_grades(&self, assignment_id: i64) -> Result<Vec<GradeEntry>>;
    /// Fails with `AlreadyExists` when a record for the key is already present.
    fn insert_grade(&self, assignment_id: i64, user_id: i64, grade: f64) -> Result<()>;
    /// Writes only when `grade` is strictly greater than the stored value.
    /// Returns false when nothing was written.
    fn raise_grade(&self, assignment_id: i64, user_id: i64, grade: f64) -> Result<bool>;
}
