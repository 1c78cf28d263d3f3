use serde::Serialize;
use tracing::{debug, info};

use super::evaluate;
use crate::auth::Session;
use crate::error::{Error, Result};
use crate::store::Store;

/// What `record_grade` did with the new grade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RecordOutcome {
    /// No earlier record existed.
    Inserted,
    /// The earlier, lower grade was replaced.
    Raised { previous: f64 },
    /// The stored grade was equal or higher and stays as it is.
    Kept { existing: f64 },
}

impl RecordOutcome {
    /// The grade held by the store after recording `recorded`.
    #[must_use]
    pub fn stored_grade(self, recorded: f64) -> f64 {
        match self {
            RecordOutcome::Inserted | RecordOutcome::Raised { .. } => recorded,
            RecordOutcome::Kept { existing } => existing,
        }
    }
}

/// Result of a student submitting an answer.
#[derive(Debug, Clone, Serialize)]
pub struct Submission {
    pub assignment_id: i64,
    pub user_id: i64,
    /// Grade earned by this submission alone.
    pub awarded: f64,
    /// Best grade on record after this submission.
    pub stored: f64,
    #[serde(flatten)]
    pub outcome: RecordOutcome,
}

/// Records `grade` for the pair, keeping whichever of the stored and new grade is higher.
///
/// Recording a grade that is not strictly greater than the stored one is a no-op,
/// not an error.
pub fn record_grade(
    store: &impl Store,
    assignment_id: i64,
    user_id: i64,
    grade: f64,
) -> Result<RecordOutcome> {
    match store.get_grade(assignment_id, user_id)? {
        None => match store.insert_grade(assignment_id, user_id, grade) {
            Ok(()) => Ok(RecordOutcome::Inserted),
            Err(Error::AlreadyExists) => {
                // A concurrent submission inserted first; fall back to the guarded update.
                let previous = store
                    .get_grade(assignment_id, user_id)?
                    .ok_or(Error::NotFound)?
                    .grade;
                raise_or_keep(store, assignment_id, user_id, grade, previous)
            }
            Err(e) => Err(e),
        },
        Some(existing) => raise_or_keep(store, assignment_id, user_id, grade, existing.grade),
    }
}

fn raise_or_keep(
    store: &impl Store,
    assignment_id: i64,
    user_id: i64,
    grade: f64,
    previous: f64,
) -> Result<RecordOutcome> {
    if previous >= grade {
        return Ok(RecordOutcome::Kept { existing: previous });
    }

    if store.raise_grade(assignment_id, user_id, grade)? {
        return Ok(RecordOutcome::Raised { previous });
    }

    let existing = store
        .get_grade(assignment_id, user_id)?
        .map_or(previous, |record| record.grade);
    Ok(RecordOutcome::Kept { existing })
}

/// Grades `answer` against the selected assignment's key and records the result
/// for the session's user.
pub fn submit(
    store: &impl Store,
    session: &Session,
    assignment_id: Option<i64>,
    answer: &str,
) -> Result<Submission> {
    let assignment_id =
        assignment_id.ok_or(Error::NoSelection("select an assignment before submitting"))?;
    let assignment = store.get_assignment(assignment_id)?.ok_or(Error::NotFound)?;
    let user_id = session.user().id;

    let awarded = evaluate(&assignment.answer_key, answer);
    let outcome = record_grade(store, assignment_id, user_id, awarded)?;
    let stored = outcome.stored_grade(awarded);

    debug!(assignment_id, user_id, ?outcome, "Recorded submission");
    info!(
        "User '{}' scored {awarded:.2} on assignment '{}' (best: {stored:.2})",
        session.user().username,
        assignment.name
    );

    Ok(Submission {
        assignment_id,
        user_id,
        awarded,
        stored,
        outcome,
    })
}

/// The stored grade for the pair, if any submission has been recorded.
pub fn current_grade(store: &impl Store, assignment_id: i64, user_id: i64) -> Result<Option<f64>> {
    Ok(store
        .get_grade(assignment_id, user_id)?
        .map(|record| record.grade))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::store::SqliteStore;
    use crate::types::{Assignment, AssignmentDraft, GradeEntry, GradeRecord, Role, User};

    struct Fixture {
        store: SqliteStore,
        assignment_id: i64,
        user: User,
    }

    fn fixture() -> Fixture {
        let store = SqliteStore::in_memory().unwrap();
        store.initialize().unwrap();
        let user = store.create_user("alice", "pw", Role::User).unwrap();
        let assignment = store
            .create_assignment(&AssignmentDraft {
                name: "Employees".to_string(),
                instructions: "List all employees".to_string(),
                answer_key: "SELECT * FROM employees".to_string(),
            })
            .unwrap();
        Fixture {
            store,
            assignment_id: assignment.id,
            user,
        }
    }

    /// Answers the first `get_grade` with a stale view, as if another
    /// submission wrote between the read and the write.
    struct StaleFirstRead {
        inner: SqliteStore,
        stale: Mutex<Option<Option<GradeRecord>>>,
    }

    impl StaleFirstRead {
        fn new(inner: SqliteStore, stale: Option<GradeRecord>) -> Self {
            Self {
                inner,
                stale: Mutex::new(Some(stale)),
            }
        }
    }

    impl Store for StaleFirstRead {
        fn initialize(&self) -> Result<()> {
            self.inner.initialize()
        }
        fn create_user(&self, username: &str, password: &str, role: Role) -> Result<User> {
            self.inner.create_user(username, password, role)
        }
        fn get_user(&self, id: i64) -> Result<Option<User>> {
            self.inner.get_user(id)
        }
        fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
            self.inner.get_user_by_username(username)
        }
        fn find_user_for_login(&self, username: &str, role: Role) -> Result<Option<User>> {
            self.inner.find_user_for_login(username, role)
        }
        fn list_users(&self) -> Result<Vec<User>> {
            self.inner.list_users()
        }
        fn delete_user(&self, id: i64) -> Result<bool> {
            self.inner.delete_user(id)
        }
        fn has_admin_user(&self) -> Result<bool> {
            self.inner.has_admin_user()
        }
        fn create_assignment(&self, draft: &AssignmentDraft) -> Result<Assignment> {
            self.inner.create_assignment(draft)
        }
        fn get_assignment(&self, id: i64) -> Result<Option<Assignment>> {
            self.inner.get_assignment(id)
        }
        fn list_assignments(&self) -> Result<Vec<Assignment>> {
            self.inner.list_assignments()
        }
        fn update_assignment(&self, id: i64, draft: &AssignmentDraft) -> Result<Assignment> {
            self.inner.update_assignment(id, draft)
        }
        fn delete_assignment(&self, id: i64) -> Result<bool> {
            self.inner.delete_assignment(id)
        }
        fn get_grade(&self, assignment_id: i64, user_id: i64) -> Result<Option<GradeRecord>> {
            if let Some(stale) = self.stale.lock().unwrap().take() {
                return Ok(stale);
            }
            self.inner.get_grade(assignment_id, user_id)
        }
        fn list_assignment_grades(&self, assignment_id: i64) -> Result<Vec<GradeEntry>> {
            self.inner.list_assignment_grades(assignment_id)
        }
        fn insert_grade(&self, assignment_id: i64, user_id: i64, grade: f64) -> Result<()> {
            self.inner.insert_grade(assignment_id, user_id, grade)
        }
        fn raise_grade(&self, assignment_id: i64, user_id: i64, grade: f64) -> Result<bool> {
            self.inner.raise_grade(assignment_id, user_id, grade)
        }
    }

    /// Fixture whose pair already holds `stored`, wrapped so the recorder's
    /// first read sees `stale`.
    fn raced(stored: f64, stale: Option<f64>) -> (StaleFirstRead, i64, i64) {
        let f = fixture();
        let (a, u) = (f.assignment_id, f.user.id);
        f.store.insert_grade(a, u, stored).unwrap();
        let stale = stale.map(|grade| GradeRecord {
            assignment_id: a,
            user_id: u,
            grade,
            updated_at: chrono::Utc::now(),
        });
        (StaleFirstRead::new(f.store, stale), a, u)
    }

    #[test]
    fn test_lost_insert_race_keeps_higher_stored_grade() {
        let (store, a, u) = raced(80.0, None);

        assert_eq!(
            record_grade(&store, a, u, 60.0).unwrap(),
            RecordOutcome::Kept { existing: 80.0 }
        );
        assert_eq!(current_grade(&store, a, u).unwrap(), Some(80.0));
    }

    #[test]
    fn test_lost_insert_race_raises_lower_stored_grade() {
        let (store, a, u) = raced(80.0, None);

        assert_eq!(
            record_grade(&store, a, u, 95.0).unwrap(),
            RecordOutcome::Raised { previous: 80.0 }
        );
        assert_eq!(current_grade(&store, a, u).unwrap(), Some(95.0));
    }

    #[test]
    fn test_lost_raise_race_reports_newer_grade() {
        // Read saw 80, but another submission has since stored 90.
        let (store, a, u) = raced(90.0, Some(80.0));

        assert_eq!(
            record_grade(&store, a, u, 85.0).unwrap(),
            RecordOutcome::Kept { existing: 90.0 }
        );
        assert_eq!(current_grade(&store, a, u).unwrap(), Some(90.0));
    }

    #[test]
    fn test_lower_grade_leaves_stored_grade_unchanged() {
        let f = fixture();
        let (a, u) = (f.assignment_id, f.user.id);

        assert_eq!(record_grade(&f.store, a, u, 80.0).unwrap(), RecordOutcome::Inserted);
        assert_eq!(
            record_grade(&f.store, a, u, 60.0).unwrap(),
            RecordOutcome::Kept { existing: 80.0 }
        );
        assert_eq!(current_grade(&f.store, a, u).unwrap(), Some(80.0));

        assert_eq!(
            record_grade(&f.store, a, u, 95.0).unwrap(),
            RecordOutcome::Raised { previous: 80.0 }
        );
        assert_eq!(current_grade(&f.store, a, u).unwrap(), Some(95.0));
    }

    #[test]
    fn test_repeated_equal_grade_is_a_no_op() {
        let f = fixture();
        let (a, u) = (f.assignment_id, f.user.id);

        record_grade(&f.store, a, u, 50.0).unwrap();
        let before = f.store.get_grade(a, u).unwrap().unwrap();

        for _ in 0..3 {
            assert_eq!(
                record_grade(&f.store, a, u, 50.0).unwrap(),
                RecordOutcome::Kept { existing: 50.0 }
            );
        }

        let after = f.store.get_grade(a, u).unwrap().unwrap();
        assert_eq!(after.grade, 50.0);
        assert_eq!(after.updated_at, before.updated_at);
    }

    #[test]
    fn test_current_grade_is_none_before_any_submission() {
        let f = fixture();
        assert_eq!(current_grade(&f.store, f.assignment_id, f.user.id).unwrap(), None);
    }

    #[test]
    fn test_submit_exact_answer_scores_full_marks() {
        let f = fixture();
        let session = Session::Student(f.user.clone());

        let result = submit(
            &f.store,
            &session,
            Some(f.assignment_id),
            "select *\n  from EMPLOYEES",
        )
        .unwrap();

        assert_eq!(result.awarded, 100.0);
        assert_eq!(result.stored, 100.0);
        assert_eq!(result.outcome, RecordOutcome::Inserted);
    }

    #[test]
    fn test_submit_keeps_best_grade_after_worse_attempt() {
        let f = fixture();
        let session = Session::Student(f.user.clone());

        submit(&f.store, &session, Some(f.assignment_id), "SELECT * FROM employees").unwrap();
        let second = submit(&f.store, &session, Some(f.assignment_id), "SELECT 1").unwrap();

        assert_eq!(second.awarded, 50.0);
        assert_eq!(second.stored, 100.0);
        assert_eq!(second.outcome, RecordOutcome::Kept { existing: 100.0 });
    }

    #[test]
    fn test_submit_without_selection_fails() {
        let f = fixture();
        let session = Session::Student(f.user.clone());

        let result = submit(&f.store, &session, None, "SELECT 1");
        assert!(matches!(result, Err(Error::NoSelection(_))));
        assert_eq!(current_grade(&f.store, f.assignment_id, f.user.id).unwrap(), None);
    }

    #[test]
    fn test_submit_unknown_assignment_is_not_found() {
        let f = fixture();
        let session = Session::Student(f.user.clone());

        let result = submit(&f.store, &session, Some(f.assignment_id + 100), "SELECT 1");
        assert!(matches!(result, Err(Error::NotFound)));
    }
}
