//! Password hashing and token generation
//!
//! Passwords are stored as PBKDF2-HMAC-SHA256 in PHC string format:
//! `$pbkdf2-sha256$i=<rounds>,l=32$<salt>$<hash>`. Verification reads the
//! parameters back from the stored string, so the round count can be raised
//! without invalidating existing hashes.
//!
//! # Pure Functions
//!
//! No HTTP framework dependencies; cookie and header handling lives in the
//! service crate.

use crate::{Error, Result};
use pbkdf2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use pbkdf2::{Algorithm, Params, Pbkdf2};
use rand::distributions::Alphanumeric;
use rand::Rng;

/// PBKDF2 rounds for newly created hashes
pub const HASH_ITERATIONS: u32 = 260_000;

/// Minimum password length accepted at signup
pub const MIN_PASSWORD_LENGTH: usize = 8;

const HASH_LENGTH: usize = 32;
const SALT_BYTES: usize = 16;
const TOKEN_LENGTH: usize = 40;

/// Random alphanumeric string of `len` characters
pub fn random_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// New session identifier
pub fn generate_session_token() -> String {
    random_token(TOKEN_LENGTH)
}

/// New CSRF token for the double-submit cookie
pub fn generate_csrf_token() -> String {
    random_token(TOKEN_LENGTH)
}

/// Hash a password with a fresh random salt
pub fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; SALT_BYTES];
    rand::thread_rng().fill(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| Error::Internal(format!("salt encoding failed: {}", e)))?;

    let params = Params {
        rounds: HASH_ITERATIONS,
        output_length: HASH_LENGTH,
    };
    let hash = Pbkdf2
        .hash_password_customized(
            password.as_bytes(),
            Some(Algorithm::Pbkdf2Sha256.ident()),
            None,
            params,
            &salt,
        )
        .map_err(|e| Error::Internal(format!("password hashing failed: {}", e)))?;

    Ok(hash.to_string())
}

/// Check a password against a stored hash. Malformed hashes never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Pbkdf2.verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(_) => false,
    }
}

/// Password policy check. Returns the list of violated rules.
pub fn validate_password(password: &str) -> std::result::Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(format!(
            "This password is too short. It must contain at least {} characters.",
            MIN_PASSWORD_LENGTH
        ));
    }
    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        errors.push("This password is entirely numeric.".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let stored = hash_password("pass-1234").unwrap();
        assert!(stored.starts_with("$pbkdf2-sha256$i=260000,l=32$"));
        assert!(verify_password("pass-1234", &stored));
        assert!(!verify_password("pass-12345", &stored));
    }

    #[test]
    fn same_password_gets_different_salts() {
        assert_ne!(
            hash_password("pass-1234").unwrap(),
            hash_password("pass-1234").unwrap()
        );
    }

    #[test]
    fn verifies_with_the_rounds_stored_in_the_hash() {
        // Lower round count than HASH_ITERATIONS, as left behind by an older setting
        let salt = SaltString::encode_b64(b"fixed-salt-bytes").unwrap();
        let params = Params {
            rounds: 1_000,
            output_length: HASH_LENGTH,
        };
        let stored = Pbkdf2
            .hash_password_customized(
                b"pass-1234",
                Some(Algorithm::Pbkdf2Sha256.ident()),
                None,
                params,
                &salt,
            )
            .unwrap()
            .to_string();

        assert!(stored.contains("i=1000"));
        assert!(verify_password("pass-1234", &stored));
        assert!(!verify_password("pass-4321", &stored));
    }

    #[test]
    fn malformed_hash_never_verifies() {
        assert!(!verify_password("x", ""));
        assert!(!verify_password("x", "sha256$20000$salt$digest"));
        assert!(!verify_password("x", "$pbkdf2-sha256$i=abc$salt$hash"));
        assert!(!verify_password("x", "$argon2id$v=19$m=16,t=2,p=1$c2FsdHNhbHQ$aGFzaA"));
    }

    #[test]
    fn password_policy() {
        assert!(validate_password("pass-1234").is_ok());
        assert_eq!(validate_password("short").unwrap_err().len(), 1);
        assert_eq!(validate_password("1234567").unwrap_err().len(), 2);
        assert_eq!(validate_password("12345678").unwrap_err().len(), 1);
    }

    #[test]
    fn tokens_are_alphanumeric() {
        let token = generate_session_token();
        assert_eq!(token.len(), 40);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(token, generate_session_token());
    }
}
