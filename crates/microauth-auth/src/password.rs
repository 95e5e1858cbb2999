//! Password hashing and verification using Argon2id.
//!
//! Hashes are PHC strings carrying their own salt and cost parameters,
//! so verification does not need the configured cost. Verification is
//! constant-time in the password.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

use crate::config::AuthConfig;
use crate::error::AuthError;

fn peppered<'a>(password: &'a str, pepper: Option<&str>, buf: &'a mut String) -> &'a [u8] {
    match pepper {
        Some(p) => {
            *buf = format!("{p}{password}");
            buf.as_bytes()
        }
        None => password.as_bytes(),
    }
}

/// Hash a password with Argon2id using the configured cost parameters.
///
/// A fresh random salt is generated per call.
pub fn hash_password(password: &str, config: &AuthConfig) -> Result<String, AuthError> {
    let params = argon2::Params::new(
        config.argon2_memory_kib,
        config.argon2_iterations,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| AuthError::CredentialHashingFailed(format!("argon2 params: {e}")))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let mut buf = String::new();
    let input = peppered(password, config.pepper.as_deref(), &mut buf);

    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(input, &salt)
        .map_err(|e| AuthError::CredentialHashingFailed(e.to_string()))?;

    Ok(hash.to_string())
}

/// Verify a plaintext password against an Argon2id PHC-format hash.
///
/// Returns `Ok(true)` on match, `Ok(false)` on mismatch, or
/// `Err(AuthError::CredentialHashingFailed)` if the stored hash is
/// malformed.
pub fn verify_password(password: &str, hash: &str, pepper: Option<&str>) -> Result<bool, AuthError> {
    let mut buf = String::new();
    let input = peppered(password, pepper, &mut buf);

    let parsed_hash = argon2::PasswordHash::new(hash)
        .map_err(|e| AuthError::CredentialHashingFailed(format!("invalid hash format: {e}")))?;

    match Argon2::default().verify_password(input, &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::CredentialHashingFailed(format!("verify error: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Cheap parameters so the suite stays fast.
    fn test_config(pepper: Option<&str>) -> AuthConfig {
        AuthConfig {
            pepper: pepper.map(str::to_string),
            argon2_memory_kib: 1024,
            argon2_iterations: 1,
            ..Default::default()
        }
    }

    #[test]
    fn correct_password_matches() {
        let hash = hash_password("hunter2", &test_config(None)).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("hunter2", &hash, None).unwrap());
    }

    #[test]
    fn wrong_password_does_not_match() {
        let hash = hash_password("hunter2", &test_config(None)).unwrap();
        assert!(!verify_password("wrong", &hash, None).unwrap());
    }

    #[test]
    fn salts_differ_between_hashes() {
        let config = test_config(None);
        let a = hash_password("hunter2", &config).unwrap();
        let b = hash_password("hunter2", &config).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn pepper_is_applied() {
        let hash = hash_password("hunter2", &test_config(Some("pepper!"))).unwrap();
        assert!(verify_password("hunter2", &hash, Some("pepper!")).unwrap());
        // Without pepper should fail.
        assert!(!verify_password("hunter2", &hash, None).unwrap());
    }

    #[test]
    fn invalid_cost_fails_hashing() {
        let config = AuthConfig {
            argon2_memory_kib: 0,
            ..test_config(None)
        };
        assert!(matches!(
            hash_password("pw", &config),
            Err(AuthError::CredentialHashingFailed(_))
        ));
    }

    #[test]
    fn malformed_hash_returns_error() {
        let result = verify_password("pw", "not-a-hash", None);
        assert!(result.is_err());
    }
}
