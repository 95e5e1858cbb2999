//! SurrealDB repository implementations.

mod account;
mod invite;
mod member;
mod organization;

pub use account::SurrealAccountRepository;
pub use invite::SurrealInviteRepository;
pub use member::SurrealMemberRepository;
pub use organization::SurrealOrganizationRepository;
