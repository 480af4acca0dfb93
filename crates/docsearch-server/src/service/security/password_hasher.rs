//! Argon2id hashing of account passwords.

use std::fmt::Display;

use argon2::password_hash::{Error as ArgonError, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier};
use rand::rngs::OsRng;

use crate::TRACING_TARGET_PASSWORD_HASHER;
use crate::handler::{Error, ErrorKind, Result};

/// Hashes passwords into PHC strings and checks them at login.
///
/// Failures come back as handler errors: a wrong password is 401, anything
/// else is a 500 that never reveals which step broke.
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

/// Internal failure of `stage`, logged with its cause.
fn hashing_failed(stage: &'static str, cause: impl Display) -> Error<'static> {
    tracing::error!(
        target: TRACING_TARGET_PASSWORD_HASHER,
        stage,
        error = %cause,
        "Password hashing failed"
    );
    ErrorKind::InternalServerError
        .with_message("Authentication temporarily unavailable")
        .with_context(stage)
        .with_resource("authentication")
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hashes `password` under a fresh random salt.
    pub fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::try_from_rng(&mut OsRng)
            .map_err(|e| hashing_failed("salt generation", e))?;
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| hashing_failed("hash generation", e))?;
        Ok(hash.to_string())
    }

    /// Checks `password` against `stored_hash`.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<()> {
        let stored = PasswordHash::new(stored_hash)
            .map_err(|e| hashing_failed("stored hash parsing", e))?;

        match self.argon2.verify_password(password.as_bytes(), &stored) {
            Ok(()) => Ok(()),
            Err(ArgonError::Password) => {
                tracing::debug!(target: TRACING_TARGET_PASSWORD_HASHER, "Password mismatch");
                Err(ErrorKind::Unauthorized
                    .with_message("Incorrect username or password")
                    .with_resource("authentication"))
            }
            Err(e) => Err(hashing_failed("verification", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_only_the_original_password() -> anyhow::Result<()> {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash_password("correct horse battery")?;

        assert!(hash.starts_with("$argon2id$"));
        hasher.verify_password("correct horse battery", &hash)?;

        let mismatch = hasher.verify_password("correct horse", &hash).err();
        assert_eq!(mismatch.map(|e| e.kind()), Some(ErrorKind::Unauthorized));
        Ok(())
    }

    #[test]
    fn salts_differ_between_hashes() -> anyhow::Result<()> {
        let hasher = PasswordHasher::new();
        assert_ne!(hasher.hash_password("same")?, hasher.hash_password("same")?);
        Ok(())
    }

    #[test]
    fn unparsable_hash_is_an_internal_error() {
        let error = PasswordHasher::new()
            .verify_password("anything", "plaintext-not-phc")
            .err();
        assert_eq!(
            error.map(|e| e.kind()),
            Some(ErrorKind::InternalServerError)
        );
    }
}
