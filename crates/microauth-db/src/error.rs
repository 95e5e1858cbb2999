//! Database-specific error types and conversions.

use microauth_core::error::MicroauthError;

/// Marker raised by `THROW` inside the redeem transaction.
pub(crate) const INVITE_MISSING: &str = "member invite not found";

/// Marker raised by `THROW` inside the organization delete transaction.
pub(crate) const ORGANIZATION_MISSING: &str = "organization not found";

/// Guard markers and the entity each one reports as missing.
const MISSING_MARKERS: [(&str, &str); 2] = [
    (INVITE_MISSING, "member_invite"),
    (ORGANIZATION_MISSING, "organization"),
];

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Statement failed: {0}")]
    Statement(String),

    #[error("Row decode failed: {0}")]
    Decode(String),

    #[error("Unique constraint violated on {entity}")]
    Conflict { entity: String },

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

/// Surface statement errors from a query response.
///
/// Inside a failed transaction every statement reports an error, but
/// only the one that actually failed names the cause, so all of them
/// are inspected before classifying.
pub(crate) fn check_response(
    entity: &str,
    mut response: surrealdb::IndexedResults,
) -> Result<surrealdb::IndexedResults, DbError> {
    let mut errors: Vec<(usize, surrealdb::Error)> = response.take_errors().into_iter().collect();
    if errors.is_empty() {
        return Ok(response);
    }
    errors.sort_by_key(|(index, _)| *index);

    let messages: Vec<String> = errors.iter().map(|(_, e)| e.to_string()).collect();
    if messages.iter().any(|m| m.contains("already contains")) {
        return Err(DbError::Conflict {
            entity: entity.into(),
        });
    }
    for (marker, missing) in MISSING_MARKERS {
        if messages.iter().any(|m| m.contains(marker)) {
            return Err(DbError::NotFound {
                entity: missing.into(),
                id: String::new(),
            });
        }
    }
    Err(DbError::Statement(messages.join("; ")))
}

impl From<DbError> for MicroauthError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => MicroauthError::NotFound { entity, id },
            DbError::Conflict { entity } => MicroauthError::AlreadyExists { entity },
            other => MicroauthError::Database(other.to_string()),
        }
    }
}
