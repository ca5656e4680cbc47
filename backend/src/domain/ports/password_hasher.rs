//! Driven port for password digests.
//!
//! The domain never sees the digest format; adapters decide how passwords are
//! salted and encoded.

use crate::domain::PasswordHash;

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hashing adapters.
    pub enum PasswordHasherError {
        /// The adapter could not produce a digest.
        Hashing { message: String } => "password hashing failed: {message}",
    }
}

/// Produces and checks password digests.
#[cfg_attr(test, mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    /// Derive a fresh salted digest for `password`.
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError>;

    /// Whether `password` matches `stored`. Malformed digests never match.
    fn verify(&self, password: &str, stored: &PasswordHash) -> bool;
}

/// Reversible stand-in for tests: the digest is the password with a prefix.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePasswordHasher;

const FIXTURE_PREFIX: &str = "fixture$";

impl PasswordHasher for FixturePasswordHasher {
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError> {
        Ok(PasswordHash::new(format!("{FIXTURE_PREFIX}{password}")))
    }

    fn verify(&self, password: &str, stored: &PasswordHash) -> bool {
        stored
            .as_str()
            .strip_prefix(FIXTURE_PREFIX)
            .is_some_and(|plain| plain == password)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[test]
    fn fixture_hasher_round_trips() {
        let hasher = FixturePasswordHasher;
        let digest = hasher.hash("secret1").expect("fixture hash");
        assert!(hasher.verify("secret1", &digest));
        assert!(!hasher.verify("secret2", &digest));
        assert!(!hasher.verify("secret1", &PasswordHash::new("secret1")));
    }
}
