mod assignment;
mod commands;
pub mod pickers;
mod session;
mod student;
mod user;

pub use assignment::{
    run_assignment_delete, run_assignment_grades, run_assignment_list, run_assignment_save,
    run_assignment_show, run_assignment_test,
};
pub use commands::{AdminCommands, AssignmentCommands, LoginArgs, StudentCommands, UserCommands};
pub use session::{describe_error, open_session, run_login};
pub use student::{
    run_student_grade, run_student_list, run_student_show, run_student_submit, run_student_test,
};
pub use user::{run_user_add, run_user_list, run_user_remove};

use crate::config::AppConfig;
use crate::store::SqliteStore;

/// Initialize store from data directory, checking it exists
pub fn init_store(data_dir: &str) -> anyhow::Result<(AppConfig, SqliteStore)> {
    let config = AppConfig::load(data_dir)?;
    let db_path = config.db_path();

    if !db_path.exists() {
        anyhow::bail!(
            "Database not found at {}. Run 'sqltester admin init' first.",
            db_path.display()
        );
    }

    let store = SqliteStore::new(&db_path)?;
    Ok((config, store))
}
