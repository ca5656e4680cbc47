//! Argon2id password hashing.
//!
//! Digests are stored as PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`)
//! so the algorithm, cost parameters and salt travel with the digest. Stored
//! values produced with older parameters keep verifying after a cost change.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{
    PasswordHash as PhcString, PasswordHasher as _, PasswordVerifier as _, SaltString,
};

use crate::domain::PasswordHash;
use crate::domain::ports::{PasswordHasher, PasswordHasherError};

/// [`PasswordHasher`] backed by `argon2` with the crate's default Argon2id
/// cost parameters.
#[derive(Debug, Default, Clone)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError> {
        let salt = SaltString::generate(&mut OsRng);
        let phc = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| PasswordHasherError::hashing(err.to_string()))?;
        Ok(PasswordHash::new(phc.to_string()))
    }

    fn verify(&self, password: &str, stored: &PasswordHash) -> bool {
        PhcString::new(stored.as_str()).is_ok_and(|phc| {
            self.argon2
                .verify_password(password.as_bytes(), &phc)
                .is_ok()
        })
    }
}
