//! Membership domain model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Organization-level role, ordered by privilege (`Admin` is highest).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
    User,
}

impl Role {
    fn rank(self) -> u8 {
        match self {
            Role::Admin => 2,
            Role::Staff => 1,
            Role::User => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
            Role::User => "user",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "admin" => Some(Role::Admin),
            "staff" => Some(Role::Staff),
            "user" => Some(Role::User),
            _ => None,
        }
    }
}

impl PartialOrd for Role {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Role {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The join of an account to an organization.
///
/// `id` is for reference only. Memberships are always addressed by the
/// `(organization_id, account_id)` pair, which is unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub account_id: Uuid,
    pub role: Role,
    /// Application-specific role label; opaque to microauth.
    pub app_role: String,
}

#[derive(Debug, Clone)]
pub struct CreateMember {
    pub organization_id: Uuid,
    pub account_id: Uuid,
    pub role: Role,
    pub app_role: String,
}
