//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode. UUIDs are stored as
//! strings; roles are stored as lowercase strings with an ASSERT
//! constraint. The pair invariants on memberships and invites are
//! UNIQUE indexes so that concurrent writers cannot race past them.

use surrealdb::{Connection, Surreal};
use tracing::{debug, info};

use crate::error::{check_response, DbError};

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Accounts
-- =======================================================================
DEFINE TABLE account SCHEMAFULL;
DEFINE FIELD first_name ON TABLE account TYPE string;
DEFINE FIELD last_name ON TABLE account TYPE string;
DEFINE FIELD email ON TABLE account TYPE string;
DEFINE FIELD email_verified ON TABLE account TYPE bool DEFAULT false;
DEFINE FIELD password_hash ON TABLE account TYPE string;
DEFINE FIELD reset_otp ON TABLE account TYPE option<string>;
DEFINE FIELD reset_expires_at ON TABLE account TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE account TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE account TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_account_email ON TABLE account COLUMNS email UNIQUE;

-- =======================================================================
-- Organizations
-- =======================================================================
DEFINE TABLE organization SCHEMAFULL;
DEFINE FIELD name ON TABLE organization TYPE string;
DEFINE FIELD domain ON TABLE organization TYPE string;
DEFINE FIELD created_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();

-- =======================================================================
-- Memberships (one per organization/account pair)
-- =======================================================================
DEFINE TABLE member SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE member TYPE string;
DEFINE FIELD account_id ON TABLE member TYPE string;
DEFINE FIELD role ON TABLE member TYPE string \
    ASSERT $value IN ['admin', 'staff', 'user'];
DEFINE FIELD app_role ON TABLE member TYPE string DEFAULT '';
DEFINE FIELD created_at ON TABLE member TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_member_org_account ON TABLE member \
    COLUMNS organization_id, account_id UNIQUE;
DEFINE INDEX idx_member_account ON TABLE member COLUMNS account_id;

-- =======================================================================
-- Pending invites (one per email/organization pair)
-- =======================================================================
DEFINE TABLE member_invite SCHEMAFULL;
DEFINE FIELD email ON TABLE member_invite TYPE string;
DEFINE FIELD code_hash ON TABLE member_invite TYPE string;
DEFINE FIELD organization_id ON TABLE member_invite TYPE string;
DEFINE FIELD created_at ON TABLE member_invite TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE member_invite TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD expires_at ON TABLE member_invite TYPE datetime;
DEFINE INDEX idx_invite_email_org ON TABLE member_invite \
    COLUMNS email, organization_id UNIQUE;
DEFINE INDEX idx_invite_expires ON TABLE member_invite COLUMNS expires_at;
";

/// Migrations newer than `applied`, oldest first.
fn pending(applied: u32) -> impl Iterator<Item = &'static Migration> {
    MIGRATIONS.iter().filter(move |m| m.version > applied)
}

/// Highest recorded migration version, or 0 on a fresh database.
async fn applied_version<C: Connection>(db: &Surreal<C>) -> Result<u32, DbError> {
    let mut result = db.query("SELECT VALUE version FROM _migration").await?;
    let versions: Vec<u32> = result.take(0)?;
    Ok(versions.into_iter().max().unwrap_or(0))
}

/// Apply one migration and record it in the same transaction, so a
/// failed migration leaves neither schema changes nor a record behind.
async fn apply<C: Connection>(db: &Surreal<C>, migration: &Migration) -> Result<(), DbError> {
    let statements = format!(
        "BEGIN TRANSACTION;\n{}\nCREATE _migration SET version = $version, name = $name;\nCOMMIT TRANSACTION;",
        migration.sql
    );
    let response = db
        .query(statements)
        .bind(("version", migration.version))
        .bind(("name", migration.name))
        .await?;
    check_response("_migration", response)
        .map_err(|e| DbError::Migration(format!("v{} {}: {e}", migration.version, migration.name)))?;
    Ok(())
}

/// Bring the database schema up to date.
///
/// Safe to call on every start: versions already recorded in
/// `_migration` are skipped.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    let response = db.query(MIGRATION_TABLE_DDL).await?;
    check_response("_migration", response)
        .map_err(|e| DbError::Migration(format!("tracking table: {e}")))?;

    let applied = applied_version(db).await?;
    let mut latest = applied;
    for migration in pending(applied) {
        info!(version = migration.version, name = migration.name, "applying migration");
        apply(db, migration).await?;
        latest = migration.version;
    }

    if latest == applied {
        debug!(version = applied, "schema up to date");
    } else {
        info!(from = applied, to = latest, "schema migrated");
    }
    Ok(())
}

/// Returns the raw schema DDL for version 1.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }

    #[test]
    fn pending_skips_applied_versions() {
        assert_eq!(pending(0).count(), MIGRATIONS.len());
        let newest = MIGRATIONS.last().map(|m| m.version).unwrap_or(0);
        assert_eq!(pending(newest).count(), 0);
    }

    #[test]
    fn pair_invariants_are_unique_indexes() {
        assert!(SCHEMA_V1.contains("COLUMNS organization_id, account_id UNIQUE"));
        assert!(SCHEMA_V1.contains("COLUMNS email, organization_id UNIQUE"));
        assert!(SCHEMA_V1.contains("COLUMNS email UNIQUE"));
    }
}
