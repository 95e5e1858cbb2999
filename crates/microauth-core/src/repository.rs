//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Implementations must enforce
//! uniqueness of `account.email`, of the `(organization_id, account_id)`
//! membership pair and of the `(email, organization_id)` invite pair
//! store-side; the services never take in-process locks.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::MicroauthResult;
use crate::models::{
    account::{Account, CreateAccount},
    invite::{CreateMemberInvite, MemberInvite},
    member::{CreateMember, Member, Role},
    organization::{CreateOrganization, Organization, UpdateOrganization},
};

// ---------------------------------------------------------------------------
// Credential store
// ---------------------------------------------------------------------------

pub trait AccountRepository: Send + Sync {
    /// Insert a new account. A duplicate email is reported as
    /// `AlreadyExists`.
    fn create(&self, input: CreateAccount) -> impl Future<Output = MicroauthResult<Account>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = MicroauthResult<Account>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = MicroauthResult<Account>> + Send;
}

// ---------------------------------------------------------------------------
// Organizations
// ---------------------------------------------------------------------------

pub trait OrganizationRepository: Send + Sync {
    fn create(
        &self,
        input: CreateOrganization,
    ) -> impl Future<Output = MicroauthResult<Organization>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = MicroauthResult<Organization>> + Send;
    /// Every organization in which `account_id` holds any membership.
    fn list_by_account(
        &self,
        account_id: Uuid,
    ) -> impl Future<Output = MicroauthResult<Vec<Organization>>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateOrganization,
    ) -> impl Future<Output = MicroauthResult<Organization>> + Send;
    /// Reports `NotFound` when no row matched.
    fn delete(&self, id: Uuid) -> impl Future<Output = MicroauthResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Membership store
// ---------------------------------------------------------------------------

pub trait MemberRepository: Send + Sync {
    /// A second row for the same pair is reported as `AlreadyExists`.
    fn create(&self, input: CreateMember) -> impl Future<Output = MicroauthResult<Member>> + Send;
    fn get(
        &self,
        organization_id: Uuid,
        account_id: Uuid,
    ) -> impl Future<Output = MicroauthResult<Member>> + Send;
    fn list_by_organization(
        &self,
        organization_id: Uuid,
    ) -> impl Future<Output = MicroauthResult<Vec<Member>>> + Send;
    fn update(
        &self,
        organization_id: Uuid,
        account_id: Uuid,
        role: Role,
        app_role: String,
    ) -> impl Future<Output = MicroauthResult<Member>> + Send;
    /// Reports `NotFound` when no row matched.
    fn delete(
        &self,
        organization_id: Uuid,
        account_id: Uuid,
    ) -> impl Future<Output = MicroauthResult<()>> + Send;
}

pub trait InviteRepository: Send + Sync {
    /// Insert an invite, atomically replacing any existing invite for
    /// the same `(email, organization_id)` pair.
    fn upsert(
        &self,
        input: CreateMemberInvite,
    ) -> impl Future<Output = MicroauthResult<MemberInvite>> + Send;
    /// Fetch the invite for the pair regardless of expiry. Callers
    /// decide liveness.
    fn get(
        &self,
        email: &str,
        organization_id: Uuid,
    ) -> impl Future<Output = MicroauthResult<MemberInvite>> + Send;
    /// Reports `NotFound` when no row matched.
    fn delete(
        &self,
        email: &str,
        organization_id: Uuid,
    ) -> impl Future<Output = MicroauthResult<()>> + Send;
    /// Create the membership and delete the invite as one atomic unit.
    ///
    /// Inside the same transaction the invite `invite_id` must still
    /// exist for `member.organization_id`, carry `code_hash` and be live
    /// at `now`; otherwise nothing is written and `NotFound` is
    /// returned. A reissue between the caller's lookup and this call
    /// therefore invalidates the redemption.
    fn redeem(
        &self,
        invite_id: Uuid,
        code_hash: &str,
        now: DateTime<Utc>,
        member: CreateMember,
    ) -> impl Future<Output = MicroauthResult<Member>> + Send;
    /// Remove every invite whose expiry is at or before `now`. Returns
    /// the number of rows removed.
    fn delete_expired(
        &self,
        now: DateTime<Utc>,
    ) -> impl Future<Output = MicroauthResult<u64>> + Send;
}
