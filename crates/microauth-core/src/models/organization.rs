//! Organization domain model.
//!
//! Organizations are the tenant boundary: every membership and every
//! pending invite is scoped to exactly one of them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    /// Human-readable name.
    pub name: String,
    /// Domain the organization operates under (e.g. `acme.io`).
    pub domain: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrganization {
    pub name: String,
    pub domain: String,
}

/// Replacement values for an existing organization. Both fields are
/// overwritten and `updated_at` is refreshed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOrganization {
    pub name: String,
    pub domain: String,
}
