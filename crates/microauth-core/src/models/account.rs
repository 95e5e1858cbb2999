//! Account domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A natural person's credentials and profile.
///
/// `email` identifies at most one account. The password is only ever
/// held as an Argon2id PHC string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub email_verified: bool,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// One-time code for the password-reset flow, if one was issued.
    #[serde(skip_serializing)]
    pub reset_otp: Option<String>,
    pub reset_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to insert a new account. The caller hashes the
/// password before building this.
#[derive(Debug, Clone)]
pub struct CreateAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secrets_are_not_serialized() {
        let now = Utc::now();
        let account = Account {
            id: Uuid::new_v4(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            email_verified: false,
            password_hash: "$argon2id$v=19$secret".into(),
            reset_otp: Some("123456".into()),
            reset_expires_at: None,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&account).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("reset_otp").is_none());
        assert_eq!(json["email"], "ada@example.com");
    }
}
