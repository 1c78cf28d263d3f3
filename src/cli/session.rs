use serde::Serialize;

use crate::auth::{Argon2Verifier, Session, authenticate};
use crate::config::AppConfig;
use crate::error::Error;
use crate::grading::current_grade;
use crate::store::{SqliteStore, Store};
use crate::types::Role;

use super::commands::LoginArgs;
use super::init_store;
use super::pickers::{format_grade, password_or_prompt, text_or_prompt};

/// Opens the store and logs in with the given role selector.
pub fn open_session(
    login: &LoginArgs,
    role_selector: &str,
) -> anyhow::Result<(AppConfig, SqliteStore, Session)> {
    let (config, store) = init_store(&login.data_dir)?;

    let username = text_or_prompt(
        login.username.clone(),
        "Username:",
        "--username",
        None,
        login.non_interactive,
    )?;
    let password = password_or_prompt(login.password.clone(), login.non_interactive)?;

    let session = authenticate(
        &store,
        &Argon2Verifier::new(),
        &username,
        &password,
        role_selector,
    )?;

    Ok((config, store, session))
}

/// Opens an administrator session. Students are rejected at login.
pub fn open_admin_session(login: &LoginArgs) -> anyhow::Result<(AppConfig, SqliteStore, Session)> {
    open_session(login, Role::Admin.as_str())
}

pub fn open_student_session(
    login: &LoginArgs,
) -> anyhow::Result<(AppConfig, SqliteStore, Session)> {
    open_session(login, Role::User.as_str())
}

#[derive(Serialize)]
struct AdminViewRow {
    id: i64,
    name: String,
    graded: usize,
}

#[derive(Serialize)]
struct StudentViewRow {
    id: i64,
    name: String,
    grade: Option<f64>,
}

#[derive(Serialize)]
#[serde(tag = "view", rename_all = "lowercase")]
enum LoginView {
    Admin {
        username: String,
        assignments: Vec<AdminViewRow>,
    },
    Student {
        username: String,
        assignments: Vec<StudentViewRow>,
    },
}

/// Logs in and prints the landing view for the session's role.
pub fn run_login(login: LoginArgs, role: String, json: bool) -> anyhow::Result<()> {
    let (_config, store, session) = open_session(&login, &role)?;
    let assignments = store.list_assignments()?;

    let view = match &session {
        Session::Admin(user) => {
            let mut rows = Vec::with_capacity(assignments.len());
            for assignment in assignments {
                rows.push(AdminViewRow {
                    graded: store.list_assignment_grades(assignment.id)?.len(),
                    id: assignment.id,
                    name: assignment.name,
                });
            }
            LoginView::Admin {
                username: user.username.clone(),
                assignments: rows,
            }
        }
        Session::Student(user) => {
            let mut rows = Vec::with_capacity(assignments.len());
            for assignment in assignments {
                rows.push(StudentViewRow {
                    grade: current_grade(&store, assignment.id, user.id)?,
                    id: assignment.id,
                    name: assignment.name,
                });
            }
            LoginView::Student {
                username: user.username.clone(),
                assignments: rows,
            }
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!();
    match view {
        LoginView::Admin {
            username,
            assignments,
        } => {
            println!("Admin View ({username})");
            println!("{}", "─".repeat(20));
            if assignments.is_empty() {
                println!("No assignments yet. Create one with 'sqltester assignment save'.");
            }
            for row in assignments {
                println!("  #{:<4} {}  ({} graded)", row.id, row.name, row.graded);
            }
        }
        LoginView::Student {
            username,
            assignments,
        } => {
            println!("User View ({username})");
            println!("{}", "─".repeat(20));
            if assignments.is_empty() {
                println!("No assignments available.");
            }
            for row in assignments {
                println!("  #{:<4} {}  [{}]", row.id, row.name, format_grade(row.grade));
            }
        }
    }
    println!();

    Ok(())
}

/// Maps a library error to the message shown to the user.
pub fn describe_error(error: &anyhow::Error) -> String {
    match error.downcast_ref::<Error>() {
        Some(Error::Unauthorized) => {
            "Login failed: invalid credentials. Please check your username and password.".to_string()
        }
        Some(Error::Database(e)) => format!(
            "Database error: could not complete the request ({e}). Please try again later."
        ),
        Some(Error::NoSelection(what)) => format!("No assignment selected: {what}."),
        Some(Error::Validation(msg)) => format!("Warning: {msg}."),
        _ => format!("{error:#}"),
    }
}
