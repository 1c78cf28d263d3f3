use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Stored credential: an argon2id PHC string, or plaintext on legacy rows.
    #[serde(skip)]
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: i64,
    pub name: String,
    pub instructions: String,
    pub answer_key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields an administrator fills in when creating or editing an assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentDraft {
    pub name: String,
    pub instructions: String,
    pub answer_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeRecord {
    pub assignment_id: i64,
    pub user_id: i64,
    pub grade: f64,
    pub updated_at: DateTime<Utc>,
}

/// A grade joined with the username it belongs to, for the admin grade listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeEntry {
    pub username: String,
    pub grade: f64,
}
