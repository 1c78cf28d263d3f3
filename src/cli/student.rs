use serde::Serialize;

use crate::assignments;
use crate::error::Error;
use crate::grading::{RecordOutcome, current_grade, submit};
use crate::query::{SqliteExecutor, render_plain, test_submission};

use super::commands::LoginArgs;
use super::pickers::{format_grade, select_assignment, text_or_prompt};
use super::session::open_student_session;

#[derive(Serialize)]
struct StudentAssignmentOutput {
    id: i64,
    name: String,
    instructions: String,
    grade: Option<f64>,
}

pub fn run_student_list(login: LoginArgs, json: bool) -> anyhow::Result<()> {
    let (_config, store, session) = open_student_session(&login)?;
    let user_id = session.user().id;

    let mut output = Vec::new();
    for a in assignments::list(&store)? {
        output.push(StudentAssignmentOutput {
            grade: current_grade(&store, a.id, user_id)?,
            id: a.id,
            name: a.name,
            instructions: a.instructions,
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if output.is_empty() {
        println!("No assignments available.");
        return Ok(());
    }

    println!();
    for a in &output {
        println!("  #{:<4} {}  [{}]", a.id, a.name, format_grade(a.grade));
    }
    println!();

    Ok(())
}

pub fn run_student_show(login: LoginArgs, assignment_id: Option<i64>) -> anyhow::Result<()> {
    let (_config, store, session) = open_student_session(&login)?;

    let selection = select_assignment(&store, assignment_id, login.non_interactive)?;
    let assignment = assignments::selected(&store, selection, "select an assignment to show")?;
    let grade = current_grade(&store, assignment.id, session.user().id)?;

    println!();
    println!("ID:           {}", assignment.id);
    println!("Name:         {}", assignment.name);
    println!("Your grade:   {}", format_grade(grade));
    println!("Instructions:");
    println!("{}", assignment.instructions);
    println!();

    Ok(())
}

pub fn run_student_test(
    login: LoginArgs,
    assignment_id: Option<i64>,
    query: Option<String>,
) -> anyhow::Result<()> {
    let (config, store, _session) = open_student_session(&login)?;

    let selection = select_assignment(&store, assignment_id, login.non_interactive)?;
    let query = text_or_prompt(query, "Query:", "--query", None, login.non_interactive)?;
    let executor = SqliteExecutor::new(config.target_db_path());

    // Query failures are shown inline as the result text.
    match test_submission(&store, &executor, selection, &query) {
        Ok(output) => print!("{}", render_plain(&output)),
        Err(Error::Query(msg)) => {
            println!("An error occurred while running the query: {msg}");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

pub fn run_student_submit(
    login: LoginArgs,
    assignment_id: Option<i64>,
    query: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let (_config, store, session) = open_student_session(&login)?;

    let selection = select_assignment(&store, assignment_id, login.non_interactive)?;
    let answer = text_or_prompt(query, "Answer:", "--query", None, login.non_interactive)?;
    let result = submit(&store, &session, selection, &answer)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!();
    println!("Your grade: {:.2}", result.awarded);
    match result.outcome {
        RecordOutcome::Inserted => {}
        RecordOutcome::Raised { previous } => {
            println!("  Improved on your previous best of {previous:.2}");
        }
        RecordOutcome::Kept { existing } => {
            println!("  Your best grade stays at {existing:.2}");
        }
    }
    println!();

    Ok(())
}

pub fn run_student_grade(login: LoginArgs, assignment_id: Option<i64>) -> anyhow::Result<()> {
    let (_config, store, session) = open_student_session(&login)?;

    let selection = select_assignment(&store, assignment_id, login.non_interactive)?;
    let assignment = assignments::selected(&store, selection, "select an assignment")?;
    let grade = current_grade(&store, assignment.id, session.user().id)?;

    println!("Your grade: {}", format_grade(grade));

    Ok(())
}
