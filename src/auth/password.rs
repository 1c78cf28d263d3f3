use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand::rngs::OsRng;

use crate::error::{Error, Result};

const ARGON2_MEMORY: u32 = 64 * 1024; // 64KB
const ARGON2_ITERATIONS: u32 = 1;
const ARGON2_PARALLELISM: u32 = 4;
const ARGON2_OUTPUT_LEN: usize = 32;

const PHC_PREFIX: &str = "$argon2";

/// Checks a presented password against the value stored on a user row.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, password: &str, stored: &str) -> Result<bool>;
}

/// Argon2id hashing for stored passwords.
///
/// Rows whose stored value is not a PHC string predate hashing and hold the
/// password in plaintext. Those are still accepted, compared byte for byte,
/// and logged so they can be re-created with a hash.
pub struct Argon2Verifier {
    argon2: Argon2<'static>,
}

impl Default for Argon2Verifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Argon2Verifier {
    #[must_use]
    pub fn new() -> Self {
        let params = Params::new(
            ARGON2_MEMORY,
            ARGON2_ITERATIONS,
            ARGON2_PARALLELISM,
            Some(ARGON2_OUTPUT_LEN),
        )
        .expect("invalid argon2 params");

        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Hashes a password using Argon2id
    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| Error::Credential(format!("failed to hash password: {e}")))?;
        Ok(hash.to_string())
    }

    /// Returns true if the stored value is an argon2 PHC string.
    #[must_use]
    pub fn is_hashed(stored: &str) -> bool {
        stored.starts_with(PHC_PREFIX)
    }
}

impl CredentialVerifier for Argon2Verifier {
    fn verify(&self, password: &str, stored: &str) -> Result<bool> {
        if !Self::is_hashed(stored) {
            tracing::warn!("Verifying a plaintext password; re-create this user to store a hash");
            return Ok(stored.as_bytes() == password.as_bytes());
        }

        let parsed_hash = PasswordHash::new(stored)
            .map_err(|e| Error::Credential(format!("invalid hash format: {e}")))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(Error::Credential(format!("failed to verify password: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_phc_format() {
        let verifier = Argon2Verifier::new();
        let hash = verifier.hash("hunter2").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(Argon2Verifier::is_hashed(&hash));
    }

    #[test]
    fn test_verification_correct() {
        let verifier = Argon2Verifier::new();
        let hash = verifier.hash("hunter2").unwrap();

        assert!(verifier.verify("hunter2", &hash).unwrap());
    }

    #[test]
    fn test_verification_wrong_password() {
        let verifier = Argon2Verifier::new();
        let hash = verifier.hash("hunter2").unwrap();

        assert!(!verifier.verify("hunter3", &hash).unwrap());
        assert!(!verifier.verify("", &hash).unwrap());
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let verifier = Argon2Verifier::new();
        assert_ne!(verifier.hash("pw").unwrap(), verifier.hash("pw").unwrap());
    }

    #[test]
    fn test_plaintext_rows_compare_exactly() {
        let verifier = Argon2Verifier::new();

        assert!(verifier.verify("postgres", "postgres").unwrap());
        assert!(!verifier.verify("Postgres", "postgres").unwrap());
        assert!(!verifier.verify("postgres ", "postgres").unwrap());
    }
}
