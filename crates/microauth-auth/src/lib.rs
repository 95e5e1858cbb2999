//! microauth Auth: password credentials, session-token issuance and
//! verification.

pub mod config;
pub mod error;
pub mod password;
pub mod service;
pub mod token;

pub use config::{AuthConfig, MAX_ACCESS_TOKEN_LIFETIME_SECS};
pub use error::AuthError;
pub use service::{IdentityService, SignupInput, TokenPair};
pub use token::AccessClaims;
