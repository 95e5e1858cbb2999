//! Pending membership invitation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A time-bounded offer for `email` to join an organization.
///
/// At most one invite exists per `(email, organization_id)`. The
/// one-time code itself is never stored, only its SHA-256 digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberInvite {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub code_hash: String,
    pub organization_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl MemberInvite {
    /// An invite is live only while `now < expires_at`.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// What the issuer of an invite gets back. Carries no code material.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InviteReceipt {
    pub id: Uuid,
    pub email: String,
    pub organization_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl From<MemberInvite> for InviteReceipt {
    fn from(invite: MemberInvite) -> Self {
        Self {
            id: invite.id,
            email: invite.email,
            organization_id: invite.organization_id,
            expires_at: invite.expires_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateMemberInvite {
    pub email: String,
    pub code_hash: String,
    pub organization_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn invite_is_stale_at_expiry() {
        let now = Utc::now();
        let invite = MemberInvite {
            id: Uuid::new_v4(),
            email: "new@x.com".into(),
            code_hash: String::new(),
            organization_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            expires_at: now + Duration::hours(72),
        };
        assert!(invite.is_live_at(now));
        assert!(!invite.is_live_at(invite.expires_at));
        assert!(!invite.is_live_at(now + Duration::hours(73)));

        let json = serde_json::to_value(&invite).unwrap();
        assert!(json.get("code_hash").is_none());
    }

    #[test]
    fn receipt_drops_code_material() {
        let now = Utc::now();
        let invite = MemberInvite {
            id: Uuid::new_v4(),
            email: "new@x.com".into(),
            code_hash: "deadbeef".into(),
            organization_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            expires_at: now + Duration::hours(72),
        };
        let receipt = InviteReceipt::from(invite.clone());
        assert_eq!(receipt.id, invite.id);
        assert_eq!(receipt.email, "new@x.com");
        assert_eq!(receipt.organization_id, invite.organization_id);
        assert_eq!(receipt.expires_at, invite.expires_at);

        let json = serde_json::to_value(&receipt).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 4, "{keys:?}");
        assert!(!json.to_string().contains("deadbeef"));
    }
}
