//! Process configuration from `MICROAUTH_*` environment variables.
//!
//! Read once at startup; the resulting configs are moved into the
//! services and never change afterwards.

use std::str::FromStr;

use anyhow::{Context, Result, bail};
use microauth_auth::AuthConfig;
use microauth_db::DbConfig;
use microauth_membership::InviteConfig;

/// SMTP relay used for invite delivery.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    /// STARTTLS submission port (default: 587).
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Sender address (default: the username).
    pub from: String,
}

/// How invite mail leaves the process.
#[derive(Debug, Clone)]
pub enum MailerConfig {
    Smtp(SmtpConfig),
    /// Development only: mail is logged and dropped.
    Log,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub db: DbConfig,
    pub auth: AuthConfig,
    pub invite: InviteConfig,
    pub mailer: MailerConfig,
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{key} is not a valid value: {raw:?}")),
        None => Ok(default),
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    match lookup(key) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => bail!("{key} must be set"),
    }
}

fn mailer(lookup: &impl Fn(&str) -> Option<String>) -> Result<MailerConfig> {
    if lookup("MICROAUTH_SMTP_HOST").is_some_and(|host| !host.is_empty()) {
        let username = required(lookup, "MICROAUTH_SMTP_USER")?;
        return Ok(MailerConfig::Smtp(SmtpConfig {
            host: required(lookup, "MICROAUTH_SMTP_HOST")?,
            port: parsed(lookup, "MICROAUTH_SMTP_PORT", 587)?,
            password: required(lookup, "MICROAUTH_SMTP_PASSWORD")?,
            from: lookup("MICROAUTH_SMTP_FROM")
                .filter(|from| !from.is_empty())
                .unwrap_or_else(|| username.clone()),
            username,
        }));
    }

    match lookup("MICROAUTH_MAILER").as_deref() {
        Some("log") => Ok(MailerConfig::Log),
        Some(other) => bail!("MICROAUTH_MAILER has unknown value {other:?}; expected \"log\""),
        None => bail!("MICROAUTH_SMTP_HOST must be set (or MICROAUTH_MAILER=log for development)"),
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset keys fall back to the
    /// library defaults, except the two signing secrets and the mail
    /// transport.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let db_defaults = DbConfig::default();
        let db = DbConfig {
            url: lookup("MICROAUTH_DB_URL").unwrap_or(db_defaults.url),
            namespace: lookup("MICROAUTH_DB_NAMESPACE").unwrap_or(db_defaults.namespace),
            database: lookup("MICROAUTH_DB_DATABASE").unwrap_or(db_defaults.database),
            username: lookup("MICROAUTH_DB_USER").unwrap_or(db_defaults.username),
            password: lookup("MICROAUTH_DB_PASSWORD").unwrap_or(db_defaults.password),
        };

        let auth_defaults = AuthConfig::default();
        let auth = AuthConfig {
            access_token_secret: required(&lookup, "MICROAUTH_ACCESS_TOKEN_SECRET")?,
            refresh_token_secret: required(&lookup, "MICROAUTH_REFRESH_TOKEN_SECRET")?,
            access_token_lifetime_secs: parsed(
                &lookup,
                "MICROAUTH_ACCESS_TOKEN_LIFETIME_SECS",
                auth_defaults.access_token_lifetime_secs,
            )?,
            pepper: lookup("MICROAUTH_PASSWORD_PEPPER").filter(|p| !p.is_empty()),
            ..auth_defaults
        };
        auth.validate()?;

        let invite_defaults = InviteConfig::default();
        let invite = InviteConfig {
            redemption_base_url: lookup("MICROAUTH_INVITE_BASE_URL")
                .unwrap_or(invite_defaults.redemption_base_url),
            validity_hours: parsed(
                &lookup,
                "MICROAUTH_INVITE_VALIDITY_HOURS",
                invite_defaults.validity_hours,
            )?,
            ..invite_defaults
        };
        invite.validate()?;

        let mailer = mailer(&lookup)?;

        Ok(Self {
            db,
            auth,
            invite,
            mailer,
        })
    }
}
