use serde::Serialize;

use crate::assignments;
use crate::query::{SqliteExecutor, render_report, test_answer_key};
use crate::types::AssignmentDraft;

use super::commands::LoginArgs;
use super::pickers::{confirm_action, format_relative_time, select_assignment, text_or_prompt};
use super::session::open_admin_session;

#[derive(Serialize)]
struct AssignmentOutput {
    id: i64,
    name: String,
    instructions: String,
    answer_key: String,
    updated_at: String,
}

pub fn run_assignment_list(login: LoginArgs, json: bool) -> anyhow::Result<()> {
    let (_config, store, session) = open_admin_session(&login)?;
    session.require_admin()?;

    let assignments = assignments::list(&store)?;

    if json {
        let output: Vec<AssignmentOutput> = assignments
            .into_iter()
            .map(|a| AssignmentOutput {
                id: a.id,
                name: a.name,
                instructions: a.instructions,
                answer_key: a.answer_key,
                updated_at: a.updated_at.to_rfc3339(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if assignments.is_empty() {
        println!("No assignments found.");
        return Ok(());
    }

    println!();
    for a in &assignments {
        println!(
            "  #{:<4} {}  (updated {})",
            a.id,
            a.name,
            format_relative_time(&a.updated_at)
        );
    }
    println!();

    Ok(())
}

pub fn run_assignment_show(login: LoginArgs, assignment_id: Option<i64>) -> anyhow::Result<()> {
    let (_config, store, session) = open_admin_session(&login)?;
    session.require_admin()?;

    let selection = select_assignment(&store, assignment_id, login.non_interactive)?;
    let assignment = assignments::selected(&store, selection, "select an assignment to show")?;

    println!();
    println!("ID:           {}", assignment.id);
    println!("Name:         {}", assignment.name);
    println!("Instructions:");
    println!("{}", assignment.instructions);
    println!("Answer key:");
    println!("{}", assignment.answer_key);
    println!();

    Ok(())
}

/// Flag value, else the current value when editing non-interactively, else a prompt.
/// Missing fields in non-interactive mode stay empty and fail validation.
fn resolve_field(
    value: Option<String>,
    existing: Option<&str>,
    prompt: &str,
    non_interactive: bool,
) -> anyhow::Result<String> {
    match (value, existing) {
        (Some(value), _) => Ok(value),
        (None, Some(existing)) if non_interactive => Ok(existing.to_string()),
        (None, None) if non_interactive => Ok(String::new()),
        (None, existing) => text_or_prompt(None, prompt, prompt, existing, false),
    }
}

pub fn run_assignment_save(
    login: LoginArgs,
    assignment_id: Option<i64>,
    name: Option<String>,
    instructions: Option<String>,
    answer_key: Option<String>,
) -> anyhow::Result<()> {
    let (_config, store, session) = open_admin_session(&login)?;
    session.require_admin()?;

    // Editing starts from the selected assignment's current values.
    let current = match assignment_id {
        Some(id) => Some(assignments::selected(&store, Some(id), "select an assignment to edit")?),
        None => None,
    };
    let current = current.as_ref();

    let draft = AssignmentDraft {
        name: resolve_field(
            name,
            current.map(|a| a.name.as_str()),
            "Name:",
            login.non_interactive,
        )?,
        instructions: resolve_field(
            instructions,
            current.map(|a| a.instructions.as_str()),
            "Instructions:",
            login.non_interactive,
        )?,
        answer_key: resolve_field(
            answer_key,
            current.map(|a| a.answer_key.as_str()),
            "Answer key:",
            login.non_interactive,
        )?,
    };

    let saved = assignments::save(&store, assignment_id, &draft)?;

    println!();
    println!("Saved assignment #{} \"{}\"", saved.id, saved.name);
    println!();

    Ok(())
}

pub fn run_assignment_delete(
    login: LoginArgs,
    assignment_id: Option<i64>,
    yes: bool,
) -> anyhow::Result<()> {
    let (_config, store, session) = open_admin_session(&login)?;
    session.require_admin()?;

    let selection = select_assignment(&store, assignment_id, login.non_interactive)?;
    let assignment = assignments::selected(&store, selection, "select the assignment to delete")?;

    let confirmed = confirm_action(
        &format!(
            "Delete assignment '{}'? This also deletes its grades.",
            assignment.name
        ),
        yes,
        login.non_interactive,
    )?;

    if !confirmed {
        println!("Cancelled.");
        return Ok(());
    }

    assignments::delete(&store, Some(assignment.id))?;

    println!();
    println!("Deleted assignment '{}'", assignment.name);
    println!();

    Ok(())
}

pub fn run_assignment_test(login: LoginArgs, assignment_id: Option<i64>) -> anyhow::Result<()> {
    let (config, store, session) = open_admin_session(&login)?;
    session.require_admin()?;

    let selection = select_assignment(&store, assignment_id, login.non_interactive)?;
    let executor = SqliteExecutor::new(config.target_db_path());
    let output = test_answer_key(&store, &executor, selection)?;

    println!("Query output:");
    print!("{}", render_report(&output));

    Ok(())
}

#[derive(Serialize)]
struct GradeOutput {
    username: String,
    grade: f64,
}

pub fn run_assignment_grades(
    login: LoginArgs,
    assignment_id: Option<i64>,
    json: bool,
) -> anyhow::Result<()> {
    let (_config, store, session) = open_admin_session(&login)?;
    session.require_admin()?;

    let selection = select_assignment(&store, assignment_id, login.non_interactive)?;
    let entries = assignments::grades(&store, selection)?;

    if json {
        let output: Vec<GradeOutput> = entries
            .into_iter()
            .map(|e| GradeOutput {
                username: e.username,
                grade: e.grade,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No grades recorded yet.");
        return Ok(());
    }

    println!();
    println!("  {:<24} Grade", "Username");
    for entry in &entries {
        println!("  {:<24} {:.2}", entry.username, entry.grade);
    }
    println!();

    Ok(())
}
