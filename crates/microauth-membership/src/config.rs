//! Invitation configuration.

use crate::error::MembershipError;

/// Settings for issuing invites.
#[derive(Debug, Clone)]
pub struct InviteConfig {
    /// Base URL of the front end that hosts the redemption page, e.g.
    /// `https://app.example.com`. A trailing slash is ignored.
    pub redemption_base_url: String,
    /// How long an invite stays redeemable (default: 72 hours).
    pub validity_hours: i64,
    /// Length of the one-time code (default: 6).
    pub code_length: usize,
}

impl Default for InviteConfig {
    fn default() -> Self {
        Self {
            redemption_base_url: "http://localhost:3000".into(),
            validity_hours: 72,
            code_length: 6,
        }
    }
}

impl InviteConfig {
    pub fn validate(&self) -> Result<(), MembershipError> {
        if self.redemption_base_url.trim().is_empty() {
            return Err(MembershipError::Configuration(
                "redemption base URL must not be empty".into(),
            ));
        }
        if self.validity_hours <= 0 {
            return Err(MembershipError::Configuration(
                "invite validity must be positive".into(),
            ));
        }
        if self.code_length == 0 {
            return Err(MembershipError::Configuration(
                "invite code length must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Link sent to the invitee. `new_user` tells the front end to show
    /// the signup form instead of the login form.
    pub fn redemption_link(&self, organization_id: &str, code: &str, new_user: bool) -> String {
        let base = self.redemption_base_url.trim_end_matches('/');
        let mut link = format!("{base}/auth/login?organizationID={organization_id}&otp={code}");
        if new_user {
            link.push_str("&new_user=true");
        }
        link
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = InviteConfig::default();
        assert_eq!(config.validity_hours, 72);
        assert_eq!(config.code_length, 6);
        config.validate().unwrap();
    }

    #[test]
    fn rejects_degenerate_settings() {
        let config = InviteConfig {
            code_length: 0,
            ..InviteConfig::default()
        };
        assert!(config.validate().is_err());

        let config = InviteConfig {
            validity_hours: 0,
            ..InviteConfig::default()
        };
        assert!(config.validate().is_err());

        let config = InviteConfig {
            redemption_base_url: "  ".into(),
            ..InviteConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn link_carries_org_code_and_new_user_flag() {
        let config = InviteConfig {
            redemption_base_url: "https://app.example.com/".into(),
            ..InviteConfig::default()
        };

        assert_eq!(
            config.redemption_link("org-1", "AB12CD", false),
            "https://app.example.com/auth/login?organizationID=org-1&otp=AB12CD"
        );
        assert_eq!(
            config.redemption_link("org-1", "AB12CD", true),
            "https://app.example.com/auth/login?organizationID=org-1&otp=AB12CD&new_user=true"
        );
    }
}
