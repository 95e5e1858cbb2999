//! SurrealDB implementation of [`AccountRepository`].

use chrono::{DateTime, Utc};
use microauth_core::error::MicroauthResult;
use microauth_core::models::account::{Account, CreateAccount};
use microauth_core::repository::AccountRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::{check_response, DbError};

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct AccountRow {
    first_name: String,
    last_name: String,
    email: String,
    email_verified: bool,
    password_hash: String,
    reset_otp: Option<String>,
    reset_expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct AccountRowWithId {
    record_id: String,
    first_name: String,
    last_name: String,
    email: String,
    email_verified: bool,
    password_hash: String,
    reset_otp: Option<String>,
    reset_expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self, id: Uuid) -> Account {
        Account {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            email_verified: self.email_verified,
            password_hash: self.password_hash,
            reset_otp: self.reset_otp,
            reset_expires_at: self.reset_expires_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl AccountRowWithId {
    fn try_into_account(self) -> Result<Account, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid account UUID: {e}")))?;
        Ok(AccountRow {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            email_verified: self.email_verified,
            password_hash: self.password_hash,
            reset_otp: self.reset_otp,
            reset_expires_at: self.reset_expires_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_account(id))
    }
}

/// SurrealDB implementation of the credential store.
#[derive(Clone)]
pub struct SurrealAccountRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAccountRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AccountRepository for SurrealAccountRepository<C> {
    async fn create(&self, input: CreateAccount) -> MicroauthResult<Account> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('account', $id) SET \
                 first_name = $first_name, last_name = $last_name, \
                 email = $email, email_verified = false, \
                 password_hash = $password_hash, \
                 reset_otp = NONE, reset_expires_at = NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("first_name", input.first_name))
            .bind(("last_name", input.last_name))
            .bind(("email", input.email))
            .bind(("password_hash", input.password_hash))
            .await
            .map_err(DbError::from)?;

        let mut result = check_response("account", result)?;

        let rows: Vec<AccountRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "account".into(),
            id: id_str,
        })?;

        Ok(row.into_account(id))
    }

    async fn get_by_id(&self, id: Uuid) -> MicroauthResult<Account> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('account', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AccountRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "account".into(),
            id: id_str,
        })?;

        Ok(row.into_account(id))
    }

    async fn get_by_email(&self, email: &str) -> MicroauthResult<Account> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM account \
                 WHERE email = $email LIMIT 1",
            )
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AccountRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "account".into(),
            id: format!("email={email}"),
        })?;

        Ok(row.try_into_account()?)
    }
}
