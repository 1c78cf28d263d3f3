use serde::Serialize;
use tracing::{info, warn};

use super::CredentialVerifier;
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{Role, User};

/// A logged-in user. The variant decides which view and operations are available.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "role", content = "user", rename_all = "lowercase")]
pub enum Session {
    Admin(User),
    #[serde(rename = "user")]
    Student(User),
}

impl Session {
    #[must_use]
    pub fn from_user(user: User) -> Self {
        match user.role {
            Role::Admin => Session::Admin(user),
            Role::User => Session::Student(user),
        }
    }

    #[must_use]
    pub fn user(&self) -> &User {
        match self {
            Session::Admin(user) | Session::Student(user) => user,
        }
    }

    #[must_use]
    pub fn role(&self) -> Role {
        match self {
            Session::Admin(_) => Role::Admin,
            Session::Student(_) => Role::User,
        }
    }

    pub fn require_admin(&self) -> Result<&User> {
        match self {
            Session::Admin(user) => Ok(user),
            Session::Student(_) => Err(Error::Forbidden),
        }
    }
}

/// Resolves a login attempt to a session.
///
/// The user row must match `username` exactly and the role chosen by
/// `role_selector` (case-insensitive). Unknown users, wrong passwords and
/// unknown roles all fail with `Error::Unauthorized`.
pub fn authenticate(
    store: &impl Store,
    verifier: &dyn CredentialVerifier,
    username: &str,
    password: &str,
    role_selector: &str,
) -> Result<Session> {
    let Some(role) = Role::parse(role_selector) else {
        warn!("Login rejected for '{username}': unknown role '{role_selector}'");
        return Err(Error::Unauthorized);
    };

    let Some(user) = store.find_user_for_login(username, role)? else {
        warn!("Login rejected for '{username}' as {role}");
        return Err(Error::Unauthorized);
    };

    if !verifier.verify(password, &user.password)? {
        warn!("Login rejected for '{username}' as {role}");
        return Err(Error::Unauthorized);
    }

    info!("User '{}' logged in as {}", user.username, role);
    Ok(Session::from_user(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Argon2Verifier;
    use crate::store::SqliteStore;

    fn store_with_users(verifier: &Argon2Verifier) -> SqliteStore {
        let store = SqliteStore::in_memory().unwrap();
        store.initialize().unwrap();
        store
            .create_user("teacher", &verifier.hash("chalk").unwrap(), Role::Admin)
            .unwrap();
        store
            .create_user("alice", &verifier.hash("apple").unwrap(), Role::User)
            .unwrap();
        store
    }

    #[test]
    fn test_admin_login_yields_admin_session() {
        let verifier = Argon2Verifier::new();
        let store = store_with_users(&verifier);

        let session = authenticate(&store, &verifier, "teacher", "chalk", "Admin").unwrap();
        assert!(matches!(session, Session::Admin(_)));
        assert_eq!(session.user().username, "teacher");
        assert!(session.require_admin().is_ok());
    }

    #[test]
    fn test_student_login_yields_student_session() {
        let verifier = Argon2Verifier::new();
        let store = store_with_users(&verifier);

        let session = authenticate(&store, &verifier, "alice", "apple", "user").unwrap();
        assert_eq!(session.role(), Role::User);
        assert!(matches!(session.require_admin(), Err(Error::Forbidden)));
    }

    #[test]
    fn test_role_selector_is_case_insensitive() {
        let verifier = Argon2Verifier::new();
        let store = store_with_users(&verifier);

        for selector in ["admin", "Admin", "ADMIN"] {
            assert!(authenticate(&store, &verifier, "teacher", "chalk", selector).is_ok());
        }
        assert!(matches!(
            authenticate(&store, &verifier, "teacher", "chalk", " Admin "),
            Err(Error::Unauthorized)
        ));
    }

    #[test]
    fn test_failures_are_indistinguishable() {
        let verifier = Argon2Verifier::new();
        let store = store_with_users(&verifier);

        let wrong_password = authenticate(&store, &verifier, "alice", "pear", "User");
        let unknown_user = authenticate(&store, &verifier, "mallory", "apple", "User");
        let wrong_role = authenticate(&store, &verifier, "alice", "apple", "Admin");
        let bad_selector = authenticate(&store, &verifier, "alice", "apple", "root");

        for result in [wrong_password, unknown_user, wrong_role, bad_selector] {
            assert!(matches!(result, Err(Error::Unauthorized)));
        }
    }

    #[test]
    fn test_username_match_is_exact() {
        let verifier = Argon2Verifier::new();
        let store = store_with_users(&verifier);

        let result = authenticate(&store, &verifier, "Alice", "apple", "User");
        assert!(matches!(result, Err(Error::Unauthorized)));
    }

    #[test]
    fn test_legacy_plaintext_row_still_logs_in() {
        let verifier = Argon2Verifier::new();
        let store = store_with_users(&verifier);
        store.create_user("legacy", "postgres", Role::User).unwrap();

        assert!(authenticate(&store, &verifier, "legacy", "postgres", "User").is_ok());
        assert!(matches!(
            authenticate(&store, &verifier, "legacy", "Postgres", "User"),
            Err(Error::Unauthorized)
        ));
    }
}
