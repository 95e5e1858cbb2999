//! Identity service configuration.

use crate::error::AuthError;

/// Longest access token lifetime accepted by [`AuthConfig::validate`]
/// (one leap year).
pub const MAX_ACCESS_TOKEN_LIFETIME_SECS: u64 = 366 * 24 * 60 * 60;

/// Configuration for the identity service.
///
/// Built once at process start and moved into [`IdentityService`]; there
/// is no way to change it afterwards.
///
/// [`IdentityService`]: crate::service::IdentityService
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HS256 secret for access tokens.
    pub access_token_secret: String,
    /// HS256 secret for refresh tokens. Must differ from the access
    /// token secret.
    pub refresh_token_secret: String,
    /// Access token lifetime in seconds (default: 3600 = 1 hour).
    pub access_token_lifetime_secs: u64,
    /// Optional pepper prepended to passwords before Argon2id hashing.
    pub pepper: Option<String>,
    /// Argon2id memory cost in KiB (default: 19456 = 19 MiB).
    pub argon2_memory_kib: u32,
    /// Argon2id iteration count (default: 2).
    pub argon2_iterations: u32,
    /// Argon2id parallelism (default: 1).
    pub argon2_parallelism: u32,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: String::new(),
            refresh_token_secret: String::new(),
            access_token_lifetime_secs: 3600,
            pepper: None,
            argon2_memory_kib: 19456,
            argon2_iterations: 2,
            argon2_parallelism: 1,
        }
    }
}

impl AuthConfig {
    /// Reject configurations that would let one token type pass as the
    /// other or that sign with an empty key.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.access_token_secret.is_empty() || self.refresh_token_secret.is_empty() {
            return Err(AuthError::Configuration(
                "token signing secrets must not be empty".into(),
            ));
        }
        if self.access_token_secret == self.refresh_token_secret {
            return Err(AuthError::Configuration(
                "access and refresh token secrets must differ".into(),
            ));
        }
        if self.access_token_lifetime_secs == 0 {
            return Err(AuthError::Configuration(
                "access token lifetime must be positive".into(),
            ));
        }
        if self.access_token_lifetime_secs > MAX_ACCESS_TOKEN_LIFETIME_SECS {
            return Err(AuthError::Configuration(format!(
                "access token lifetime must not exceed {MAX_ACCESS_TOKEN_LIFETIME_SECS} seconds"
            )));
        }
        Ok(())
    }
}
