use std::fmt;

use chrono::{DateTime, Utc};
use inquire::{InquireError, Password, PasswordDisplayMode, Select, Text};

use crate::store::Store;
use crate::types::{Assignment, Role, User};

/// Assignment for display in pickers
pub struct AssignmentDisplay {
    pub assignment: Assignment,
}

impl fmt::Display for AssignmentDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.assignment.id, self.assignment.name)
    }
}

/// User with role for display in pickers
pub struct UserDisplay {
    pub user: User,
}

impl fmt::Display for UserDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] (id {})",
            self.user.username,
            self.user.role.as_str(),
            self.user.id
        )
    }
}

/// Format a grade the way it is reported to students
#[must_use]
pub fn format_grade(grade: Option<f64>) -> String {
    match grade {
        Some(g) => format!("{g:.2}"),
        None => "not graded yet".to_string(),
    }
}

/// Format a datetime as relative time (e.g., "2 days ago")
#[must_use]
pub fn format_relative_time(dt: &DateTime<Utc>) -> String {
    let diff = Utc::now().signed_duration_since(*dt);

    if diff.num_seconds() < 0 {
        return "in the future".to_string();
    }

    let (value, unit) = if diff.num_seconds() < 60 {
        return "just now".to_string();
    } else if diff.num_minutes() < 60 {
        (diff.num_minutes(), "minute")
    } else if diff.num_hours() < 24 {
        (diff.num_hours(), "hour")
    } else if diff.num_days() < 30 {
        (diff.num_days(), "day")
    } else if diff.num_days() < 365 {
        (diff.num_days() / 30, "month")
    } else {
        (diff.num_days() / 365, "year")
    };

    if value == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{value} {unit}s ago")
    }
}

/// Pick an assignment from the list
pub fn pick_assignment(store: &impl Store) -> anyhow::Result<Option<Assignment>> {
    let assignments: Vec<AssignmentDisplay> = store
        .list_assignments()?
        .into_iter()
        .map(|assignment| AssignmentDisplay { assignment })
        .collect();

    if assignments.is_empty() {
        println!("No assignments available.");
        return Ok(None);
    }

    let selection = Select::new("Select assignment:", assignments)
        .with_page_size(15)
        .with_help_message("Type to filter, Enter to select")
        .with_vim_mode(true)
        .prompt();

    match selection {
        Ok(display) => Ok(Some(display.assignment)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Pick a user from the list
pub fn pick_user(store: &impl Store) -> anyhow::Result<Option<User>> {
    let users: Vec<UserDisplay> = store
        .list_users()?
        .into_iter()
        .map(|user| UserDisplay { user })
        .collect();

    if users.is_empty() {
        println!("No users found.");
        return Ok(None);
    }

    let selection = Select::new("Select user:", users)
        .with_page_size(15)
        .with_help_message("Type to filter, Enter to select")
        .with_vim_mode(true)
        .prompt();

    match selection {
        Ok(display) => Ok(Some(display.user)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Pick a role for a new user
pub fn pick_role() -> anyhow::Result<Option<Role>> {
    match Select::new("Role:", Role::ALL.to_vec()).prompt() {
        Ok(role) => Ok(Some(role)),
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Resolves the selected assignment id.
///
/// An explicit id wins. Otherwise an interactive session shows a picker; a
/// non-interactive one (or a cancelled picker) yields no selection and the
/// operation reports it.
pub fn select_assignment(
    store: &impl Store,
    assignment_id: Option<i64>,
    non_interactive: bool,
) -> anyhow::Result<Option<i64>> {
    if assignment_id.is_some() || non_interactive {
        return Ok(assignment_id);
    }
    Ok(pick_assignment(store)?.map(|a| a.id))
}

pub fn get_or_pick_user(
    store: &impl Store,
    user_id: Option<i64>,
    non_interactive: bool,
) -> anyhow::Result<Option<User>> {
    if let Some(id) = user_id {
        match store.get_user(id)? {
            Some(user) => Ok(Some(user)),
            None => anyhow::bail!("User {id} not found"),
        }
    } else if non_interactive {
        anyhow::bail!("--user-id is required in non-interactive mode");
    } else {
        pick_user(store)
    }
}

/// Returns `value`, or prompts for it. `flag` names the option for the non-interactive error.
pub fn text_or_prompt(
    value: Option<String>,
    prompt: &str,
    flag: &str,
    initial: Option<&str>,
    non_interactive: bool,
) -> anyhow::Result<String> {
    if let Some(value) = value {
        return Ok(value);
    }
    if non_interactive {
        anyhow::bail!("{flag} is required in non-interactive mode");
    }

    let mut text = Text::new(prompt);
    if let Some(initial) = initial {
        text = text.with_initial_value(initial);
    }
    Ok(text.prompt()?)
}

pub fn password_or_prompt(value: Option<String>, non_interactive: bool) -> anyhow::Result<String> {
    if let Some(value) = value {
        return Ok(value);
    }
    if non_interactive {
        anyhow::bail!("--password is required in non-interactive mode");
    }

    Ok(Password::new("Password:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?)
}

pub fn confirm_action(message: &str, yes: bool, non_interactive: bool) -> anyhow::Result<bool> {
    if yes {
        Ok(true)
    } else if non_interactive {
        anyhow::bail!("--yes is required for destructive operations in non-interactive mode");
    } else {
        Ok(inquire::Confirm::new(message)
            .with_default(false)
            .prompt()?)
    }
}
