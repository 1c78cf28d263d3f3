use crate::error::{Error, Result};
use crate::types::AssignmentDraft;

const MAX_USERNAME_LEN: usize = 64;
const MAX_ASSIGNMENT_NAME_LEN: usize = 200;

fn is_valid_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'
}

pub fn validate_username(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::Validation("Username cannot be empty".to_string()));
    }
    if name.len() > MAX_USERNAME_LEN {
        return Err(Error::Validation(format!(
            "Username cannot exceed {MAX_USERNAME_LEN} characters"
        )));
    }
    if !name.chars().all(is_valid_name_char) {
        return Err(Error::Validation(
            "Username can only contain alphanumeric characters, hyphens, underscores, and periods"
                .to_string(),
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(Error::Validation("Password cannot be empty".to_string()));
    }
    Ok(())
}

/// Every field of an assignment is required.
pub fn validate_assignment(draft: &AssignmentDraft) -> Result<()> {
    let missing: Vec<&str> = [
        ("name", &draft.name),
        ("instructions", &draft.instructions),
        ("answer key", &draft.answer_key),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(field, _)| field)
    .collect();

    if !missing.is_empty() {
        return Err(Error::Validation(format!(
            "All fields must be filled in (missing: {})",
            missing.join(", ")
        )));
    }
    if draft.name.len() > MAX_ASSIGNMENT_NAME_LEN {
        return Err(Error::Validation(format!(
            "Assignment name cannot exceed {MAX_ASSIGNMENT_NAME_LEN} characters"
        )));
    }
    Ok(())
}
