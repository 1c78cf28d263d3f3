//! Administrator operations on assignments.

use tracing::info;

use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{Assignment, AssignmentDraft, GradeEntry};
use crate::validation::validate_assignment;

/// Looks up the selected assignment. `action` names what the selection is for.
pub fn selected(
    store: &impl Store,
    selection: Option<i64>,
    action: &'static str,
) -> Result<Assignment> {
    let id = selection.ok_or(Error::NoSelection(action))?;
    store.get_assignment(id)?.ok_or(Error::NotFound)
}

/// Updates the selected assignment, or creates a new one when nothing is selected.
pub fn save(
    store: &impl Store,
    selection: Option<i64>,
    draft: &AssignmentDraft,
) -> Result<Assignment> {
    validate_assignment(draft)?;

    let assignment = match selection {
        Some(id) => {
            let assignment = store.update_assignment(id, draft)?;
            info!("Updated assignment {} ('{}')", assignment.id, assignment.name);
            assignment
        }
        None => {
            let assignment = store.create_assignment(draft)?;
            info!("Created assignment {} ('{}')", assignment.id, assignment.name);
            assignment
        }
    };

    Ok(assignment)
}

/// Deletes the selected assignment together with its grades.
pub fn delete(store: &impl Store, selection: Option<i64>) -> Result<()> {
    let id = selection.ok_or(Error::NoSelection("select the assignment to delete"))?;
    if !store.delete_assignment(id)? {
        return Err(Error::NotFound);
    }
    info!("Deleted assignment {id}");
    Ok(())
}

pub fn list(store: &impl Store) -> Result<Vec<Assignment>> {
    store.list_assignments()
}

/// Grades recorded for the selected assignment, by username.
pub fn grades(store: &impl Store, selection: Option<i64>) -> Result<Vec<GradeEntry>> {
    let assignment = selected(store, selection, "select an assignment to view its grades")?;
    store.list_assignment_grades(assignment.id)
}
