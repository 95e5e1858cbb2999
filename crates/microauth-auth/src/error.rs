//! Identity service error types.

use microauth_core::error::{ErrorKind, MicroauthError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("account not found")]
    AccountNotFound,

    #[error("invalid credential")]
    InvalidCredential,

    #[error("invalid refresh token")]
    InvalidRefreshToken,

    #[error("invalid access token")]
    InvalidAccessToken,

    #[error("failed to hash credential: {0}")]
    CredentialHashingFailed(String),

    #[error("failed to create account: {0}")]
    AccountCreationFailed(#[source] MicroauthError),

    #[error("failed to issue token: {0}")]
    TokenIssuanceFailed(String),

    #[error("credential store error: {0}")]
    Store(#[source] MicroauthError),

    #[error("invalid auth configuration: {0}")]
    Configuration(String),
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::AccountNotFound => ErrorKind::NotFound,
            AuthError::InvalidCredential
            | AuthError::InvalidRefreshToken
            | AuthError::InvalidAccessToken => ErrorKind::ValidationConflict,
            // A duplicate email is the caller's doing; anything else is
            // the store's.
            AuthError::AccountCreationFailed(MicroauthError::AlreadyExists { .. }) => {
                ErrorKind::ValidationConflict
            }
            AuthError::AccountCreationFailed(_)
            | AuthError::CredentialHashingFailed(_)
            | AuthError::TokenIssuanceFailed(_)
            | AuthError::Store(_)
            | AuthError::Configuration(_) => ErrorKind::DependencyFailure,
        }
    }
}
