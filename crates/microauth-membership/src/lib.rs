//! microauth Membership: organization directory, role-gated membership
//! management and the invitation workflow.

pub mod code;
pub mod config;
pub mod directory;
pub mod error;
pub mod service;

pub use config::InviteConfig;
pub use directory::OrganizationDirectory;
pub use error::MembershipError;
pub use service::{AcceptInvite, MembershipService};
