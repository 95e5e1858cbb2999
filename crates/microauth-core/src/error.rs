//! Error types shared by every microauth crate.

use thiserror::Error;

/// Coarse classification of a failure, used by callers to pick a wire
/// status and to decide whether the failure is worth an incident log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Account, organization, member or invite absent.
    NotFound,
    /// A role gate failed.
    PermissionDenied,
    /// Caller-supplied data conflicts with stored state (bad code,
    /// duplicate email or membership, wrong credential).
    ValidationConflict,
    /// Store, hashing, signing or delivery failure.
    DependencyFailure,
}

impl ErrorKind {
    /// Only dependency failures are incidents; everything else was
    /// caused by the caller.
    pub fn is_incident(self) -> bool {
        matches!(self, ErrorKind::DependencyFailure)
    }
}

/// Error returned by the persistence and notification collaborators.
#[derive(Debug, Error)]
pub enum MicroauthError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Delivery failed: {0}")]
    Delivery(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MicroauthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MicroauthError::NotFound { .. } => ErrorKind::NotFound,
            MicroauthError::AlreadyExists { .. } => ErrorKind::ValidationConflict,
            MicroauthError::Database(_)
            | MicroauthError::Crypto(_)
            | MicroauthError::Delivery(_)
            | MicroauthError::Internal(_) => ErrorKind::DependencyFailure,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, MicroauthError::NotFound { .. })
    }
}

pub type MicroauthResult<T> = Result<T, MicroauthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_dependency_failures_are_incidents() {
        assert!(ErrorKind::DependencyFailure.is_incident());
        assert!(!ErrorKind::NotFound.is_incident());
        assert!(!ErrorKind::PermissionDenied.is_incident());
        assert!(!ErrorKind::ValidationConflict.is_incident());
    }

    #[test]
    fn duplicate_is_a_validation_conflict() {
        let err = MicroauthError::AlreadyExists {
            entity: "member".into(),
        };
        assert_eq!(err.kind(), ErrorKind::ValidationConflict);
    }
}
