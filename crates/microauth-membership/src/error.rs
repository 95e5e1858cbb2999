//! Directory and membership error types.

use microauth_auth::AuthError;
use microauth_core::error::{ErrorKind, MicroauthError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MembershipError {
    #[error("organization not found")]
    OrganizationNotFound,

    #[error("failed to persist organization: {0}")]
    OrganizationPersistenceFailed(#[source] MicroauthError),

    #[error("member not found")]
    MemberNotFound,

    #[error("admin permission required")]
    AdminPermissionRequired,

    #[error("failed to create member: {0}")]
    MemberCreationFailed(#[source] MicroauthError),

    #[error("failed to update member: {0}")]
    MemberUpdateFailed(#[source] MicroauthError),

    #[error("failed to delete member: {0}")]
    MemberDeleteFailed(#[source] MicroauthError),

    #[error("failed to list members: {0}")]
    MemberListFailed(#[source] MicroauthError),

    #[error("failed to persist invite: {0}")]
    InvitePersistenceFailed(#[source] MicroauthError),

    #[error("failed to dispatch invite: {0}")]
    InviteDispatchFailed(#[source] MicroauthError),

    #[error("invite not found")]
    InviteNotFound,

    #[error("invalid invite code")]
    InvalidInviteCode,

    #[error(transparent)]
    Identity(#[from] AuthError),

    #[error("membership store error: {0}")]
    Store(#[source] MicroauthError),

    #[error("invalid invite configuration: {0}")]
    Configuration(String),
}

impl MembershipError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MembershipError::OrganizationNotFound
            | MembershipError::MemberNotFound
            | MembershipError::InviteNotFound => ErrorKind::NotFound,
            MembershipError::AdminPermissionRequired => ErrorKind::PermissionDenied,
            MembershipError::InvalidInviteCode => ErrorKind::ValidationConflict,
            // An existing membership for the pair is a conflict, not an
            // outage.
            MembershipError::MemberCreationFailed(MicroauthError::AlreadyExists { .. }) => {
                ErrorKind::ValidationConflict
            }
            MembershipError::Identity(e) => e.kind(),
            MembershipError::OrganizationPersistenceFailed(_)
            | MembershipError::MemberCreationFailed(_)
            | MembershipError::MemberUpdateFailed(_)
            | MembershipError::MemberDeleteFailed(_)
            | MembershipError::MemberListFailed(_)
            | MembershipError::InvitePersistenceFailed(_)
            | MembershipError::InviteDispatchFailed(_)
            | MembershipError::Store(_)
            | MembershipError::Configuration(_) => ErrorKind::DependencyFailure,
        }
    }
}
