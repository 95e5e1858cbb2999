//! Session token issuance and verification.
//!
//! Both tokens are HS256 JWTs signed with separate secrets. Access
//! tokens live for a configured duration; refresh tokens expire at
//! local midnight on the first day of the following calendar month.

use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// Claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Account ID (UUID string).
    pub id: String,
    /// Email at login time. Absent on tokens reissued from a refresh
    /// token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

impl AccessClaims {
    pub fn account_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.id).ok()
    }
}

/// Claims embedded in a refresh token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub id: String,
    pub iat: i64,
    pub exp: i64,
}

/// Midnight on the first day of the month after `now`, in `now`'s
/// time zone. `None` only if that instant does not exist locally.
pub fn first_of_next_month<Tz: TimeZone>(now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
    let (year, month) = if now.month() == 12 {
        (now.year() + 1, 1)
    } else {
        (now.year(), now.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)?
        .and_hms_opt(0, 0, 0)?
        .and_local_timezone(now.timezone())
        .earliest()
}

fn sign<T: Serialize>(claims: &T, secret: &str) -> Result<String, AuthError> {
    let key = EncodingKey::from_secret(secret.as_bytes());
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &key)
        .map_err(|e| AuthError::TokenIssuanceFailed(format!("JWT encode: {e}")))
}

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["exp"]);
    validation.leeway = 0;
    validation
}

/// Issue a signed access token for `account_id`.
pub fn issue_access_token(
    account_id: Uuid,
    email: Option<&str>,
    config: &AuthConfig,
) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let exp = i64::try_from(config.access_token_lifetime_secs)
        .ok()
        .and_then(|lifetime| now.checked_add(lifetime))
        .ok_or_else(|| AuthError::TokenIssuanceFailed("access token expiry overflows".into()))?;
    let claims = AccessClaims {
        id: account_id.to_string(),
        email: email.map(str::to_string),
        iat: now,
        exp,
    };
    sign(&claims, &config.access_token_secret)
}

/// Issue a signed refresh token for `account_id`, expiring at the
/// start of the month after `now`.
pub fn issue_refresh_token(
    account_id: Uuid,
    now: DateTime<Local>,
    config: &AuthConfig,
) -> Result<String, AuthError> {
    let expires_at = first_of_next_month(&now).ok_or_else(|| {
        AuthError::TokenIssuanceFailed("refresh expiry does not exist in local time".into())
    })?;
    let claims = RefreshClaims {
        id: account_id.to_string(),
        iat: now.timestamp(),
        exp: expires_at.timestamp(),
    };
    sign(&claims, &config.refresh_token_secret)
}

/// Decode and verify an access token.
///
/// Any failure (signature, expiry, malformed or missing claims) is
/// reported as [`AuthError::InvalidAccessToken`].
pub fn decode_access_token(token: &str, config: &AuthConfig) -> Result<AccessClaims, AuthError> {
    let key = DecodingKey::from_secret(config.access_token_secret.as_bytes());
    let claims = jsonwebtoken::decode::<AccessClaims>(token, &key, &validation())
        .map(|data| data.claims)
        .map_err(|_| AuthError::InvalidAccessToken)?;
    claims.account_id().ok_or(AuthError::InvalidAccessToken)?;
    Ok(claims)
}

/// Decode and verify a refresh token, returning the account it was
/// issued for.
///
/// Every failure is reported uniformly as
/// [`AuthError::InvalidRefreshToken`].
pub fn decode_refresh_token(token: &str, config: &AuthConfig) -> Result<Uuid, AuthError> {
    let key = DecodingKey::from_secret(config.refresh_token_secret.as_bytes());
    let claims = jsonwebtoken::decode::<RefreshClaims>(token, &key, &validation())
        .map(|data| data.claims)
        .map_err(|_| AuthError::InvalidRefreshToken)?;
    Uuid::parse_str(&claims.id).map_err(|_| AuthError::InvalidRefreshToken)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Timelike};

    fn test_config() -> AuthConfig {
        AuthConfig {
            access_token_secret: "access-secret".into(),
            refresh_token_secret: "refresh-secret".into(),
            ..Default::default()
        }
    }

    #[test]
    fn access_token_roundtrip() {
        let config = test_config();
        let account_id = Uuid::new_v4();

        let token = issue_access_token(account_id, Some("a@x.com"), &config).unwrap();
        let claims = decode_access_token(&token, &config).unwrap();

        assert_eq!(claims.account_id(), Some(account_id));
        assert_eq!(claims.email.as_deref(), Some("a@x.com"));
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn access_token_without_email_omits_claim() {
        let config = test_config();
        let token = issue_access_token(Uuid::new_v4(), None, &config).unwrap();
        let claims = decode_access_token(&token, &config).unwrap();
        assert!(claims.email.is_none());
    }

    #[test]
    fn unrepresentable_lifetime_fails_issuance() {
        for lifetime in [u64::MAX, i64::MAX as u64] {
            let config = AuthConfig {
                access_token_lifetime_secs: lifetime,
                ..test_config()
            };
            assert!(matches!(
                issue_access_token(Uuid::new_v4(), None, &config),
                Err(AuthError::TokenIssuanceFailed(_))
            ));
        }
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let config = test_config();
        let refresh = issue_refresh_token(Uuid::new_v4(), Local::now(), &config).unwrap();
        assert!(matches!(
            decode_access_token(&refresh, &config),
            Err(AuthError::InvalidAccessToken)
        ));

        let access = issue_access_token(Uuid::new_v4(), None, &config).unwrap();
        assert!(matches!(
            decode_refresh_token(&access, &config),
            Err(AuthError::InvalidRefreshToken)
        ));
    }

    #[test]
    fn expired_refresh_token_is_rejected() {
        let config = test_config();
        let claims = RefreshClaims {
            id: Uuid::new_v4().to_string(),
            iat: Utc::now().timestamp() - 7200,
            exp: Utc::now().timestamp() - 3600,
        };
        let token = sign(&claims, &config.refresh_token_secret).unwrap();
        assert!(matches!(
            decode_refresh_token(&token, &config),
            Err(AuthError::InvalidRefreshToken)
        ));
    }

    #[test]
    fn refresh_token_without_account_id_is_rejected() {
        let config = test_config();
        let claims = RefreshClaims {
            id: "not-a-uuid".into(),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 3600,
        };
        let token = sign(&claims, &config.refresh_token_secret).unwrap();
        assert!(matches!(
            decode_refresh_token(&token, &config),
            Err(AuthError::InvalidRefreshToken)
        ));
    }

    #[test]
    fn next_month_boundary_mid_year() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2026, 5, 17, 13, 45, 0).unwrap();
        let expiry = first_of_next_month(&now).unwrap();
        assert_eq!((expiry.year(), expiry.month(), expiry.day()), (2026, 6, 1));
        assert_eq!((expiry.hour(), expiry.minute()), (0, 0));
        assert_eq!(expiry.offset(), now.offset());
    }

    #[test]
    fn next_month_boundary_wraps_year() {
        let now = Utc.with_ymd_and_hms(2026, 12, 31, 23, 59, 59).unwrap();
        let expiry = first_of_next_month(&now).unwrap();
        assert_eq!(expiry, Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn last_day_of_month_does_not_skip_a_month() {
        let now = Utc.with_ymd_and_hms(2026, 1, 31, 8, 0, 0).unwrap();
        let expiry = first_of_next_month(&now).unwrap();
        assert_eq!(expiry, Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap());
    }
}
