use clap::{Args, Subcommand};

/// Credentials and database location shared by every command that acts as a logged-in user.
#[derive(Args, Clone)]
pub struct LoginArgs {
    /// Data directory for the database and configuration
    #[arg(long, default_value = "./data")]
    pub data_dir: String,

    /// Username to log in as
    #[arg(long, short)]
    pub username: Option<String>,

    /// Password (prompted when omitted)
    #[arg(long)]
    pub password: Option<String>,

    /// Skip interactive prompts and pickers
    #[arg(long)]
    pub non_interactive: bool,
}

#[derive(Subcommand)]
pub enum AdminCommands {
    /// Initialize the database and create the first administrator
    Init {
        /// Data directory for the database and configuration
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Username for the first administrator
        #[arg(long)]
        username: Option<String>,

        /// Password for the first administrator
        #[arg(long)]
        password: Option<String>,

        /// Skip interactive prompts (requires --username and --password)
        #[arg(long)]
        non_interactive: bool,
    },

    /// Manage users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Add a new administrator or student
    Add {
        /// Data directory for the database and configuration
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Username for the new user
        #[arg(long)]
        username: Option<String>,

        /// Password for the new user
        #[arg(long)]
        password: Option<String>,

        /// Role for the new user (admin or user)
        #[arg(long)]
        role: Option<String>,

        /// Skip interactive prompts (requires --username, --password and --role)
        #[arg(long)]
        non_interactive: bool,
    },

    /// Remove a user and their grades
    Remove {
        /// Data directory for the database and configuration
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// User ID to remove
        #[arg(long)]
        user_id: Option<i64>,

        /// Skip interactive prompts (requires --user-id)
        #[arg(long)]
        non_interactive: bool,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// List users
    List {
        /// Data directory for the database and configuration
        #[arg(long, default_value = "./data")]
        data_dir: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum AssignmentCommands {
    /// List all assignments
    List {
        #[command(flatten)]
        login: LoginArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show an assignment with its answer key
    Show {
        #[command(flatten)]
        login: LoginArgs,

        /// Assignment to show
        #[arg(long)]
        assignment_id: Option<i64>,
    },

    /// Create an assignment, or update the one given by --assignment-id
    Save {
        #[command(flatten)]
        login: LoginArgs,

        /// Assignment to update (omit to create a new one)
        #[arg(long)]
        assignment_id: Option<i64>,

        /// Assignment name
        #[arg(long)]
        name: Option<String>,

        /// Instructions shown to students
        #[arg(long)]
        instructions: Option<String>,

        /// Reference query submissions are graded against
        #[arg(long)]
        answer_key: Option<String>,
    },

    /// Delete an assignment and its grades
    Delete {
        #[command(flatten)]
        login: LoginArgs,

        /// Assignment to delete
        #[arg(long)]
        assignment_id: Option<i64>,

        /// Skip confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Run the answer key against the target database
    Test {
        #[command(flatten)]
        login: LoginArgs,

        /// Assignment whose answer key to run
        #[arg(long)]
        assignment_id: Option<i64>,
    },

    /// Show the grades recorded for an assignment
    Grades {
        #[command(flatten)]
        login: LoginArgs,

        /// Assignment to show grades for
        #[arg(long)]
        assignment_id: Option<i64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum StudentCommands {
    /// List assignments with your grades
    List {
        #[command(flatten)]
        login: LoginArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show an assignment's instructions and your grade
    Show {
        #[command(flatten)]
        login: LoginArgs,

        /// Assignment to show
        #[arg(long)]
        assignment_id: Option<i64>,
    },

    /// Run a query against the target database without grading it
    Test {
        #[command(flatten)]
        login: LoginArgs,

        /// Assignment the query is for
        #[arg(long)]
        assignment_id: Option<i64>,

        /// Query to run (prompted when omitted)
        #[arg(long)]
        query: Option<String>,
    },

    /// Submit an answer for grading
    Submit {
        #[command(flatten)]
        login: LoginArgs,

        /// Assignment to answer
        #[arg(long)]
        assignment_id: Option<i64>,

        /// Answer query (prompted when omitted)
        #[arg(long)]
        query: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show your recorded grade for an assignment
    Grade {
        #[command(flatten)]
        login: LoginArgs,

        /// Assignment to show the grade for
        #[arg(long)]
        assignment_id: Option<i64>,
    },
}
