//! Membership authority: role-gated membership management and the
//! invitation workflow.
//!
//! Every administrative operation runs [`MembershipService::require_admin`]
//! before touching state, so an authorization failure never leaves a
//! partial effect behind.

use std::sync::Arc;

use chrono::{Duration, Utc};
use microauth_auth::{AuthError, IdentityService, SignupInput};
use microauth_core::models::invite::{CreateMemberInvite, InviteReceipt};
use microauth_core::models::member::{CreateMember, Member, Role};
use microauth_core::models::organization::{CreateOrganization, Organization, UpdateOrganization};
use microauth_core::notify::{EmailMessage, Notifier};
use microauth_core::repository::{
    AccountRepository, InviteRepository, MemberRepository, OrganizationRepository,
};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::code;
use crate::config::InviteConfig;
use crate::directory::OrganizationDirectory;
use crate::error::MembershipError;

const INVITE_SUBJECT: &str = "Invitation OTP";

/// Input for redeeming an invite. The name and password are only used
/// when no account exists yet for `email`.
#[derive(Debug)]
pub struct AcceptInvite {
    pub email: String,
    pub code: String,
    pub organization_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
}

/// Membership authority.
///
/// Generic over its stores and the notification channel; the identity
/// service is shared with the login path.
pub struct MembershipService<O, M, I, A, N>
where
    O: OrganizationRepository,
    M: MemberRepository,
    I: InviteRepository,
    A: AccountRepository,
    N: Notifier,
{
    directory: OrganizationDirectory<O>,
    members: M,
    invites: I,
    identity: Arc<IdentityService<A>>,
    notifier: N,
    config: InviteConfig,
}

impl<O, M, I, A, N> MembershipService<O, M, I, A, N>
where
    O: OrganizationRepository,
    M: MemberRepository,
    I: InviteRepository,
    A: AccountRepository,
    N: Notifier,
{
    pub fn new(
        directory: OrganizationDirectory<O>,
        members: M,
        invites: I,
        identity: Arc<IdentityService<A>>,
        notifier: N,
        config: InviteConfig,
    ) -> Self {
        Self {
            directory,
            members,
            invites,
            identity,
            notifier,
            config,
        }
    }

    /// Unguarded read access to organizations.
    pub fn directory(&self) -> &OrganizationDirectory<O> {
        &self.directory
    }

    // -----------------------------------------------------------------------
    // Guard and lookups
    // -----------------------------------------------------------------------

    /// Fetch a membership by its `(organization, account)` pair. No role
    /// gate: any account may look up its own membership.
    pub async fn fetch_member(
        &self,
        organization_id: Uuid,
        account_id: Uuid,
    ) -> Result<Member, MembershipError> {
        self.members
            .get(organization_id, account_id)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    MembershipError::MemberNotFound
                } else {
                    error!(error = %e, "member lookup failed");
                    MembershipError::Store(e)
                }
            })
    }

    /// Succeed only if `account_id` is an Admin of `organization_id`.
    pub async fn require_admin(
        &self,
        organization_id: Uuid,
        account_id: Uuid,
    ) -> Result<Member, MembershipError> {
        let member = self.fetch_member(organization_id, account_id).await?;
        if member.role != Role::Admin {
            warn!(
                organization_id = %organization_id,
                account_id = %account_id,
                role = %member.role,
                "admin permission required"
            );
            return Err(MembershipError::AdminPermissionRequired);
        }
        Ok(member)
    }

    /// Direct insert with no role gate. Only organization creation seeds
    /// members this way; everyone else joins through an invite.
    pub(crate) async fn add_member(
        &self,
        organization_id: Uuid,
        account_id: Uuid,
        role: Role,
        app_role: String,
    ) -> Result<Member, MembershipError> {
        let member = self
            .members
            .create(CreateMember {
                organization_id,
                account_id,
                role,
                app_role,
            })
            .await
            .map_err(|e| {
                error!(error = %e, organization_id = %organization_id, "member insert failed");
                MembershipError::MemberCreationFailed(e)
            })?;

        info!(
            organization_id = %organization_id,
            account_id = %account_id,
            role = %role,
            "member added"
        );
        Ok(member)
    }

    // -----------------------------------------------------------------------
    // Organizations
    // -----------------------------------------------------------------------

    /// Create an organization and make the acting account its first
    /// Admin. If seeding the Admin fails the organization is removed
    /// again.
    pub async fn create_organization(
        &self,
        acting_account_id: Uuid,
        input: CreateOrganization,
        app_role: String,
    ) -> Result<Organization, MembershipError> {
        let organization = self.directory.create(input).await?;

        if let Err(e) = self
            .add_member(organization.id, acting_account_id, Role::Admin, app_role)
            .await
        {
            if let Err(cleanup) = self.directory.delete(organization.id).await {
                error!(
                    organization_id = %organization.id,
                    error = %cleanup,
                    "failed to remove organization without admin"
                );
            }
            return Err(e);
        }

        Ok(organization)
    }

    pub async fn update_organization(
        &self,
        acting_account_id: Uuid,
        organization_id: Uuid,
        input: UpdateOrganization,
    ) -> Result<Organization, MembershipError> {
        self.require_admin(organization_id, acting_account_id).await?;
        self.directory.update(organization_id, input).await
    }

    pub async fn delete_organization(
        &self,
        acting_account_id: Uuid,
        organization_id: Uuid,
    ) -> Result<(), MembershipError> {
        self.require_admin(organization_id, acting_account_id).await?;
        self.directory.delete(organization_id).await
    }

    // -----------------------------------------------------------------------
    // Members
    // -----------------------------------------------------------------------

    pub async fn list_members(
        &self,
        acting_account_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Vec<Member>, MembershipError> {
        self.require_admin(organization_id, acting_account_id).await?;
        self.members
            .list_by_organization(organization_id)
            .await
            .map_err(|e| {
                error!(error = %e, organization_id = %organization_id, "member list failed");
                MembershipError::MemberListFailed(e)
            })
    }

    pub async fn update_member(
        &self,
        acting_account_id: Uuid,
        organization_id: Uuid,
        account_id: Uuid,
        role: Role,
        app_role: String,
    ) -> Result<Member, MembershipError> {
        self.require_admin(organization_id, acting_account_id).await?;

        let member = self
            .members
            .update(organization_id, account_id, role, app_role)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    MembershipError::MemberNotFound
                } else {
                    error!(error = %e, organization_id = %organization_id, "member update failed");
                    MembershipError::MemberUpdateFailed(e)
                }
            })?;

        info!(
            organization_id = %organization_id,
            account_id = %account_id,
            role = %role,
            "member updated"
        );
        Ok(member)
    }

    /// Remove a membership. Admins may remove anyone; any member may
    /// remove itself.
    pub async fn delete_member(
        &self,
        acting_account_id: Uuid,
        organization_id: Uuid,
        account_id: Uuid,
    ) -> Result<(), MembershipError> {
        if acting_account_id != account_id {
            self.require_admin(organization_id, acting_account_id).await?;
        }

        self.members
            .delete(organization_id, account_id)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    MembershipError::MemberNotFound
                } else {
                    error!(error = %e, organization_id = %organization_id, "member delete failed");
                    MembershipError::MemberDeleteFailed(e)
                }
            })?;

        info!(
            organization_id = %organization_id,
            account_id = %account_id,
            "member removed"
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Invitations
    // -----------------------------------------------------------------------

    /// Issue (or reissue) an invite and email the one-time code.
    ///
    /// If delivery fails the persisted invite is kept, so a resend
    /// simply supersedes it. The returned receipt never carries the code
    /// or its digest.
    pub async fn invite_member(
        &self,
        email: &str,
        acting_account_id: Uuid,
        organization_id: Uuid,
    ) -> Result<InviteReceipt, MembershipError> {
        // 1. Probe for an existing account. Any failure means "new user".
        let new_user = match self.identity.find_account_by_email(email).await {
            Ok(_) => false,
            Err(AuthError::AccountNotFound) => true,
            Err(e) => {
                debug!(error = %e, "account probe failed; treating invitee as new");
                true
            }
        };

        // 2. Gate.
        self.require_admin(organization_id, acting_account_id).await?;

        // 3. Code.
        let code = code::generate_code(self.config.code_length);

        // 4. Persist, superseding any prior invite for the pair.
        let invite = self
            .invites
            .upsert(CreateMemberInvite {
                email: email.to_string(),
                code_hash: code::hash_code(&code),
                organization_id,
                expires_at: Utc::now() + Duration::hours(self.config.validity_hours),
            })
            .await
            .map_err(|e| {
                error!(error = %e, organization_id = %organization_id, "invite insert failed");
                MembershipError::InvitePersistenceFailed(e)
            })?;

        // 5. Dispatch.
        let link = self
            .config
            .redemption_link(&organization_id.to_string(), &code, new_user);
        let message = EmailMessage {
            to: email.to_string(),
            subject: INVITE_SUBJECT.to_string(),
            body: format!(
                "Your invitation OTP: {code}\n\n\
                 To accept the invitation, please click the following link:\n{link}"
            ),
        };
        self.notifier.send(message).await.map_err(|e| {
            error!(error = %e, invite_id = %invite.id, "invite delivery failed");
            MembershipError::InviteDispatchFailed(e)
        })?;

        info!(
            invite_id = %invite.id,
            organization_id = %organization_id,
            new_user,
            "invite issued"
        );
        Ok(InviteReceipt::from(invite))
    }

    /// Redeem an invite, creating the account first when the invitee
    /// has none. Membership creation and invite deletion happen in one
    /// store transaction.
    pub async fn accept_invite(&self, input: AcceptInvite) -> Result<Member, MembershipError> {
        // 1. Live invite for the pair.
        let invite = self
            .invites
            .get(&input.email, input.organization_id)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    MembershipError::InviteNotFound
                } else {
                    error!(error = %e, "invite lookup failed");
                    MembershipError::Store(e)
                }
            })?;
        if !invite.is_live_at(Utc::now()) {
            debug!(invite_id = %invite.id, "invite expired");
            return Err(MembershipError::InviteNotFound);
        }

        // 2. Code check. The invite is left untouched on mismatch.
        let supplied_hash = code::hash_code(&input.code);
        if supplied_hash != invite.code_hash {
            warn!(invite_id = %invite.id, "invite code mismatch");
            return Err(MembershipError::InvalidInviteCode);
        }

        // 3. Resolve or create the account.
        let account_id = match self.identity.find_account_by_email(&input.email).await {
            Ok(account) => account.id,
            Err(AuthError::AccountNotFound) => {
                self.identity
                    .create_account(SignupInput {
                        first_name: input.first_name,
                        last_name: input.last_name,
                        email: input.email.clone(),
                        password: input.password,
                    })
                    .await?
            }
            Err(e) => return Err(e.into()),
        };

        // 4 + 5. Membership with the default role, then consume the invite.
        // The store re-checks id, digest and expiry inside the transaction,
        // so a reissue since step 1 makes this fail.
        let member = self
            .invites
            .redeem(
                invite.id,
                &supplied_hash,
                Utc::now(),
                CreateMember {
                    organization_id: input.organization_id,
                    account_id,
                    role: Role::User,
                    app_role: String::new(),
                },
            )
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    MembershipError::InviteNotFound
                } else {
                    error!(error = %e, invite_id = %invite.id, "invite redemption failed");
                    MembershipError::MemberCreationFailed(e)
                }
            })?;

        info!(
            invite_id = %invite.id,
            organization_id = %input.organization_id,
            account_id = %account_id,
            "invite redeemed"
        );
        Ok(member)
    }

    /// Withdraw a pending invite.
    pub async fn revoke_invite(
        &self,
        acting_account_id: Uuid,
        email: &str,
        organization_id: Uuid,
    ) -> Result<(), MembershipError> {
        self.require_admin(organization_id, acting_account_id).await?;

        self.invites
            .delete(email, organization_id)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    MembershipError::InviteNotFound
                } else {
                    error!(error = %e, organization_id = %organization_id, "invite delete failed");
                    MembershipError::InvitePersistenceFailed(e)
                }
            })?;

        info!(organization_id = %organization_id, "invite revoked");
        Ok(())
    }

    /// Delete every invite whose validity window has closed. Returns the
    /// number removed.
    pub async fn purge_expired_invites(&self) -> Result<u64, MembershipError> {
        let purged = self
            .invites
            .delete_expired(Utc::now())
            .await
            .map_err(|e| {
                error!(error = %e, "invite purge failed");
                MembershipError::InvitePersistenceFailed(e)
            })?;

        if purged > 0 {
            info!(purged, "expired invites purged");
        }
        Ok(purged)
    }
}
