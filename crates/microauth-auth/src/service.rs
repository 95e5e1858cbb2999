//! Identity service: account creation, login and access-token refresh.

use chrono::Local;
use microauth_core::models::account::{Account, CreateAccount};
use microauth_core::repository::AccountRepository;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token::{self, AccessClaims};

/// Input for account creation.
#[derive(Debug)]
pub struct SignupInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Access + refresh token pair returned by login and refresh.
#[derive(Debug)]
pub struct TokenPair {
    /// Signed JWT access token.
    pub access_token: String,
    /// Signed JWT refresh token.
    pub refresh_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Identity service.
///
/// Generic over the credential store so that the auth layer has no
/// dependency on the database crate.
pub struct IdentityService<A: AccountRepository> {
    accounts: A,
    config: AuthConfig,
}

impl<A: AccountRepository> IdentityService<A> {
    pub fn new(accounts: A, config: AuthConfig) -> Self {
        Self { accounts, config }
    }

    /// Hash the password and insert a new account.
    ///
    /// Email uniqueness is left to the store; a duplicate surfaces as
    /// [`AuthError::AccountCreationFailed`]. Nothing is written if
    /// hashing fails.
    pub async fn create_account(&self, input: SignupInput) -> Result<Uuid, AuthError> {
        let password_hash = password::hash_password(&input.password, &self.config)?;

        let account = self
            .accounts
            .create(CreateAccount {
                first_name: input.first_name,
                last_name: input.last_name,
                email: input.email,
                password_hash,
            })
            .await
            .map_err(|e| {
                warn!(error = %e, "account insert failed");
                AuthError::AccountCreationFailed(e)
            })?;

        info!(account_id = %account.id, "account created");
        Ok(account.id)
    }

    /// Look up an account by email.
    pub async fn find_account_by_email(&self, email: &str) -> Result<Account, AuthError> {
        self.accounts.get_by_email(email).await.map_err(|e| {
            if e.is_not_found() {
                AuthError::AccountNotFound
            } else {
                AuthError::Store(e)
            }
        })
    }

    /// Verify email + password and issue a token pair.
    ///
    /// An unknown email and a wrong password are reported as distinct
    /// errors. If either token fails to sign, neither is returned.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        // 1. Look up account.
        let account = self.find_account_by_email(email).await?;

        // 2. Verify password.
        let valid = password::verify_password(
            password,
            &account.password_hash,
            self.config.pepper.as_deref(),
        )?;
        if !valid {
            warn!(account_id = %account.id, "password mismatch");
            return Err(AuthError::InvalidCredential);
        }

        // 3. Issue tokens.
        let access_token = token::issue_access_token(account.id, Some(&account.email), &self.config)?;
        let refresh_token = token::issue_refresh_token(account.id, Local::now(), &self.config)?;

        info!(account_id = %account.id, "login succeeded");
        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.config.access_token_lifetime_secs,
        })
    }

    /// Mint a new access token from a valid refresh token.
    ///
    /// The refresh token is returned unchanged (no rotation). The new
    /// access token carries no email claim.
    pub async fn refresh_access_token(&self, refresh_token: String) -> Result<TokenPair, AuthError> {
        let account_id = token::decode_refresh_token(&refresh_token, &self.config)?;
        let access_token = token::issue_access_token(account_id, None, &self.config)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.config.access_token_lifetime_secs,
        })
    }

    /// Verify an access token presented on a request and return its
    /// claims. Purely stateless.
    pub fn verify_access_token(&self, access_token: &str) -> Result<AccessClaims, AuthError> {
        token::decode_access_token(access_token, &self.config)
    }
}
