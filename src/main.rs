use std::fs;
use std::process::ExitCode;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use sqltester::auth::Argon2Verifier;
use sqltester::cli::pickers::{password_or_prompt, text_or_prompt};
use sqltester::cli::{
    AdminCommands, AssignmentCommands, LoginArgs, StudentCommands, UserCommands, describe_error,
    run_assignment_delete, run_assignment_grades, run_assignment_list, run_assignment_save,
    run_assignment_show, run_assignment_test, run_login, run_student_grade, run_student_list,
    run_student_show, run_student_submit, run_student_test, run_user_add, run_user_list,
    run_user_remove,
};
use sqltester::config::AppConfig;
use sqltester::store::{SqliteStore, Store};
use sqltester::types::Role;
use sqltester::validation::{validate_password, validate_username};

#[cfg(unix)]
fn set_restrictive_permissions(path: &std::path::Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        tracing::warn!("Failed to set permissions on {}: {e}", path.display());
    }
}

#[derive(Parser)]
#[command(name = "sqltester")]
#[command(about = "Author SQL assignments, grade submissions, keep the best grade", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Log in and show the view for your role
    Login {
        #[command(flatten)]
        login: LoginArgs,

        /// Role to log in as (admin or user)
        #[arg(long, default_value = "user")]
        role: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage assignments (administrators)
    Assignment {
        #[command(subcommand)]
        command: AssignmentCommands,
    },

    /// Work on assignments (students)
    Student {
        #[command(subcommand)]
        command: StudentCommands,
    },
}

fn run_init(
    data_dir: String,
    username: Option<String>,
    password: Option<String>,
    non_interactive: bool,
) -> anyhow::Result<()> {
    let data_path: std::path::PathBuf = data_dir.into();
    fs::create_dir_all(&data_path)?;

    let config = AppConfig::load(&data_path)?;
    let db_path = config.db_path();
    let store = SqliteStore::new(&db_path)?;
    store.initialize()?;

    #[cfg(unix)]
    set_restrictive_permissions(&db_path);

    if store.has_admin_user()? {
        bail!(
            "Database already initialized at {}. Add users with 'sqltester admin user add'.",
            db_path.display()
        );
    }

    let username = text_or_prompt(
        username,
        "Administrator username:",
        "--username",
        None,
        non_interactive,
    )?;
    validate_username(&username)?;

    let password = password_or_prompt(password, non_interactive)?;
    validate_password(&password)?;

    let hash = Argon2Verifier::new().hash(&password)?;
    let admin = store.create_user(&username, &hash, Role::Admin)?;

    info!("Initialized database at {}", db_path.display());

    println!();
    println!("========================================");
    println!("Database:      {}", db_path.display());
    println!("Target DB:     {}", config.target_db_path().display());
    println!("Administrator: {} (id {})", admin.username, admin.id);
    println!("========================================");
    println!();

    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init {
                data_dir,
                username,
                password,
                non_interactive,
            } => run_init(data_dir, username, password, non_interactive),
            AdminCommands::User { command } => match command {
                UserCommands::Add {
                    data_dir,
                    username,
                    password,
                    role,
                    non_interactive,
                } => run_user_add(data_dir, username, password, role, non_interactive),
                UserCommands::Remove {
                    data_dir,
                    user_id,
                    non_interactive,
                    yes,
                } => run_user_remove(data_dir, user_id, non_interactive, yes),
                UserCommands::List { data_dir, json } => run_user_list(data_dir, json),
            },
        },
        Commands::Login { login, role, json } => run_login(login, role, json),
        Commands::Assignment { command } => match command {
            AssignmentCommands::List { login, json } => run_assignment_list(login, json),
            AssignmentCommands::Show {
                login,
                assignment_id,
            } => run_assignment_show(login, assignment_id),
            AssignmentCommands::Save {
                login,
                assignment_id,
                name,
                instructions,
                answer_key,
            } => run_assignment_save(login, assignment_id, name, instructions, answer_key),
            AssignmentCommands::Delete {
                login,
                assignment_id,
                yes,
            } => run_assignment_delete(login, assignment_id, yes),
            AssignmentCommands::Test {
                login,
                assignment_id,
            } => run_assignment_test(login, assignment_id),
            AssignmentCommands::Grades {
                login,
                assignment_id,
                json,
            } => run_assignment_grades(login, assignment_id, json),
        },
        Commands::Student { command } => match command {
            StudentCommands::List { login, json } => run_student_list(login, json),
            StudentCommands::Show {
                login,
                assignment_id,
            } => run_student_show(login, assignment_id),
            StudentCommands::Test {
                login,
                assignment_id,
                query,
            } => run_student_test(login, assignment_id, query),
            StudentCommands::Submit {
                login,
                assignment_id,
                query,
                json,
            } => run_student_submit(login, assignment_id, query, json),
            StudentCommands::Grade {
                login,
                assignment_id,
            } => run_student_grade(login, assignment_id),
        },
    }
}

fn main() -> ExitCode {
    let filter = match "sqltester=info".parse() {
        Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
        Err(_) => EnvFilter::from_default_env(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", describe_error(&e));
            ExitCode::FAILURE
        }
    }
}
