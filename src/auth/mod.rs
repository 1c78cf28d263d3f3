mod password;
mod session;

pub use password::{Argon2Verifier, CredentialVerifier};
pub use session::{Session, authenticate};
