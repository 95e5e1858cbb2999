//! Organization directory: CRUD over organizations with no
//! authorization of its own. Callers gate writes through
//! [`MembershipService`](crate::service::MembershipService).

use microauth_core::error::MicroauthError;
use microauth_core::models::organization::{CreateOrganization, Organization, UpdateOrganization};
use microauth_core::repository::OrganizationRepository;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::MembershipError;

fn classify(err: MicroauthError) -> MembershipError {
    if err.is_not_found() {
        MembershipError::OrganizationNotFound
    } else {
        error!(error = %err, "organization store failure");
        MembershipError::OrganizationPersistenceFailed(err)
    }
}

pub struct OrganizationDirectory<O: OrganizationRepository> {
    organizations: O,
}

impl<O: OrganizationRepository> OrganizationDirectory<O> {
    pub fn new(organizations: O) -> Self {
        Self { organizations }
    }

    pub async fn create(&self, input: CreateOrganization) -> Result<Organization, MembershipError> {
        let organization = self.organizations.create(input).await.map_err(classify)?;
        info!(organization_id = %organization.id, "organization created");
        Ok(organization)
    }

    pub async fn get(&self, id: Uuid) -> Result<Organization, MembershipError> {
        self.organizations.get_by_id(id).await.map_err(classify)
    }

    /// Every organization in which the account holds a membership.
    pub async fn list_by_account(
        &self,
        account_id: Uuid,
    ) -> Result<Vec<Organization>, MembershipError> {
        self.organizations
            .list_by_account(account_id)
            .await
            .map_err(classify)
    }

    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateOrganization,
    ) -> Result<Organization, MembershipError> {
        let organization = self.organizations.update(id, input).await.map_err(classify)?;
        info!(organization_id = %id, "organization updated");
        Ok(organization)
    }

    /// Delete an organization together with its memberships and invites.
    pub async fn delete(&self, id: Uuid) -> Result<(), MembershipError> {
        self.organizations.delete(id).await.map_err(classify)?;
        info!(organization_id = %id, "organization deleted");
        Ok(())
    }
}
