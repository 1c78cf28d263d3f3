//! # sqltester
//!
//! Grading for SQL exercises, usable both as a standalone binary and as a library.
//!
//! Administrators author assignments (instructions plus an answer-key query),
//! students submit queries, and each submission is scored against the key.
//! The best grade per student and assignment is kept.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! sqltester = { version = "0.0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use sqltester::auth::{Argon2Verifier, authenticate};
//! use sqltester::grading::submit;
//! use sqltester::store::{SqliteStore, Store};
//!
//! let store = SqliteStore::new("./data/sqltester.db").unwrap();
//! store.initialize().unwrap();
//!
//! let session = authenticate(&store, &Argon2Verifier::new(), "alice", "apple", "User").unwrap();
//! let result = submit(&store, &session, Some(1), "SELECT * FROM employees").unwrap();
//! println!("grade: {}", result.stored);
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes CLI module. Disable with `default-features = false`.

pub mod assignments;
pub mod auth;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod grading;
pub mod query;
pub mod store;
pub mod types;
pub mod validation;
