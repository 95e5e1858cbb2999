//! SurrealDB implementation of [`OrganizationRepository`].

use chrono::{DateTime, Utc};
use microauth_core::error::MicroauthResult;
use microauth_core::models::organization::{CreateOrganization, Organization, UpdateOrganization};
use microauth_core::repository::OrganizationRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::{check_response, DbError, ORGANIZATION_MISSING};

#[derive(Debug, SurrealValue)]
struct OrganizationRow {
    name: String,
    domain: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct OrganizationRowWithId {
    record_id: String,
    name: String,
    domain: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrganizationRow {
    fn into_organization(self, id: Uuid) -> Organization {
        Organization {
            id,
            name: self.name,
            domain: self.domain,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl OrganizationRowWithId {
    fn try_into_organization(self) -> Result<Organization, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid organization UUID: {e}")))?;
        Ok(Organization {
            id,
            name: self.name,
            domain: self.domain,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn first_row(rows: Vec<OrganizationRow>, id: Uuid) -> Result<Organization, DbError> {
    rows.into_iter()
        .next()
        .map(|row| row.into_organization(id))
        .ok_or_else(|| DbError::NotFound {
            entity: "organization".into(),
            id: id.to_string(),
        })
}

/// SurrealDB implementation of the Organization repository.
#[derive(Clone)]
pub struct SurrealOrganizationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOrganizationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> OrganizationRepository for SurrealOrganizationRepository<C> {
    async fn create(&self, input: CreateOrganization) -> MicroauthResult<Organization> {
        let id = Uuid::new_v4();

        let result = self
            .db
            .query("CREATE type::record('organization', $id) SET name = $name, domain = $domain")
            .bind(("id", id.to_string()))
            .bind(("name", input.name))
            .bind(("domain", input.domain))
            .await
            .map_err(DbError::from)?;

        let mut result = check_response("organization", result)?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_row(rows, id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> MicroauthResult<Organization> {
        let mut result = self
            .db
            .query("SELECT * FROM type::record('organization', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_row(rows, id)?)
    }

    async fn list_by_account(&self, account_id: Uuid) -> MicroauthResult<Vec<Organization>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM organization \
                 WHERE meta::id(id) IN \
                 (SELECT VALUE organization_id FROM member WHERE account_id = $account_id) \
                 ORDER BY created_at ASC",
            )
            .bind(("account_id", account_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_organization())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }

    async fn update(&self, id: Uuid, input: UpdateOrganization) -> MicroauthResult<Organization> {
        // UPDATE on a missing record id would create it; guard with
        // a WHERE clause so a miss yields no rows.
        let result = self
            .db
            .query(
                "UPDATE type::record('organization', $id) SET \
                 name = $name, domain = $domain, updated_at = time::now() \
                 WHERE created_at != NONE",
            )
            .bind(("id", id.to_string()))
            .bind(("name", input.name))
            .bind(("domain", input.domain))
            .await
            .map_err(DbError::from)?;

        let mut result = check_response("organization", result)?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        Ok(first_row(rows, id)?)
    }

    async fn delete(&self, id: Uuid) -> MicroauthResult<()> {
        // Memberships and invites do not outlive their organization. The
        // guard aborts the whole transaction when the organization is gone.
        let query = format!(
            "BEGIN TRANSACTION; \
             LET $found = (SELECT VALUE id FROM type::record('organization', $id)); \
             IF array::len($found) = 0 {{ THROW '{ORGANIZATION_MISSING}' }}; \
             DELETE type::record('organization', $id); \
             DELETE member WHERE organization_id = $id; \
             DELETE member_invite WHERE organization_id = $id; \
             COMMIT TRANSACTION;"
        );

        let result = self
            .db
            .query(query)
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;
        check_response("organization", result).map_err(|e| match e {
            DbError::NotFound { entity, .. } => DbError::NotFound {
                entity,
                id: id.to_string(),
            },
            other => other,
        })?;

        Ok(())
    }
}
