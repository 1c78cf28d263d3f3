use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("not found")]
    NotFound,

    #[error("already exists")]
    AlreadyExists,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// Bad credentials. Unknown user and wrong password are reported the same way.
    #[error("invalid credentials: check your username and password")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("credential error: {0}")]
    Credential(String),

    #[error("{0}")]
    Validation(String),

    /// An action that needs a selected assignment was run without one.
    #[error("no assignment selected: {0}")]
    NoSelection(&'static str),

    /// Failure while executing test SQL; carries the driver's message verbatim.
    #[error("error while running query: {0}")]
    Query(String),

    #[error("invalid role: {0}")]
    InvalidRole(String),
}

pub type Result<T> = std::result::Result<T, Error>;
