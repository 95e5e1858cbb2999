//! SurrealDB implementation of [`InviteRepository`].
//!
//! Superseding an invite and redeeming one are each a single
//! transaction, so the pair invariant and the membership-plus-deletion
//! step never leave a half-applied state behind.

use chrono::{DateTime, Utc};
use microauth_core::error::MicroauthResult;
use microauth_core::models::invite::{CreateMemberInvite, MemberInvite};
use microauth_core::models::member::{CreateMember, Member};
use microauth_core::repository::InviteRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::{check_response, DbError, INVITE_MISSING};
use crate::repository::member::get_member_by_record;

#[derive(Debug, SurrealValue)]
struct InviteRow {
    email: String,
    code_hash: String,
    organization_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct InviteRowWithId {
    record_id: String,
    email: String,
    code_hash: String,
    organization_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl InviteRow {
    fn into_invite(self, id: Uuid) -> Result<MemberInvite, DbError> {
        let organization_id = Uuid::parse_str(&self.organization_id)
            .map_err(|e| DbError::Decode(format!("invalid organization UUID: {e}")))?;
        Ok(MemberInvite {
            id,
            email: self.email,
            code_hash: self.code_hash,
            organization_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            expires_at: self.expires_at,
        })
    }
}

impl InviteRowWithId {
    fn try_into_invite(self) -> Result<MemberInvite, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid invite UUID: {e}")))?;
        InviteRow {
            email: self.email,
            code_hash: self.code_hash,
            organization_id: self.organization_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
            expires_at: self.expires_at,
        }
        .into_invite(id)
    }
}

/// SurrealDB implementation of the pending-invite store.
#[derive(Clone)]
pub struct SurrealInviteRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealInviteRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> InviteRepository for SurrealInviteRepository<C> {
    async fn upsert(&self, input: CreateMemberInvite) -> MicroauthResult<MemberInvite> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 DELETE member_invite \
                 WHERE email = $email AND organization_id = $organization_id; \
                 CREATE type::record('member_invite', $id) SET \
                 email = $email, code_hash = $code_hash, \
                 organization_id = $organization_id, expires_at = $expires_at; \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id_str.clone()))
            .bind(("email", input.email))
            .bind(("code_hash", input.code_hash))
            .bind(("organization_id", input.organization_id.to_string()))
            .bind(("expires_at", input.expires_at))
            .await
            .map_err(DbError::from)?;
        check_response("member_invite", result)?;

        let mut result = self
            .db
            .query("SELECT * FROM type::record('member_invite', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<InviteRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "member_invite".into(),
            id: id_str,
        })?;

        Ok(row.into_invite(id)?)
    }

    async fn get(&self, email: &str, organization_id: Uuid) -> MicroauthResult<MemberInvite> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM member_invite \
                 WHERE email = $email AND organization_id = $organization_id \
                 LIMIT 1",
            )
            .bind(("email", email.to_string()))
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<InviteRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "member_invite".into(),
            id: format!("{email}/{organization_id}"),
        })?;

        Ok(row.try_into_invite()?)
    }

    async fn delete(&self, email: &str, organization_id: Uuid) -> MicroauthResult<()> {
        let mut result = self
            .db
            .query(
                "DELETE member_invite \
                 WHERE email = $email AND organization_id = $organization_id \
                 RETURN BEFORE",
            )
            .bind(("email", email.to_string()))
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<InviteRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "member_invite".into(),
                id: format!("{email}/{organization_id}"),
            }
            .into());
        }

        Ok(())
    }

    async fn redeem(
        &self,
        invite_id: Uuid,
        code_hash: &str,
        now: DateTime<Utc>,
        member: CreateMember,
    ) -> MicroauthResult<Member> {
        let member_id = Uuid::new_v4();

        // The code and expiry are re-checked against the row as it is
        // inside the transaction; a superseded, consumed or stale invite
        // aborts it.
        let query = format!(
            "BEGIN TRANSACTION; \
             LET $pending = (SELECT VALUE id FROM type::record('member_invite', $invite_id) \
             WHERE organization_id = $organization_id AND code_hash = $code_hash \
             AND expires_at > $now); \
             IF array::len($pending) = 0 {{ THROW '{INVITE_MISSING}' }}; \
             CREATE type::record('member', $member_id) SET \
             organization_id = $organization_id, account_id = $account_id, \
             role = $role, app_role = $app_role; \
             DELETE type::record('member_invite', $invite_id); \
             COMMIT TRANSACTION;"
        );

        let result = self
            .db
            .query(query)
            .bind(("member_id", member_id.to_string()))
            .bind(("invite_id", invite_id.to_string()))
            .bind(("code_hash", code_hash.to_string()))
            .bind(("now", now))
            .bind(("organization_id", member.organization_id.to_string()))
            .bind(("account_id", member.account_id.to_string()))
            .bind(("role", member.role.as_str().to_string()))
            .bind(("app_role", member.app_role))
            .await
            .map_err(DbError::from)?;
        check_response("member", result)?;

        Ok(get_member_by_record(&self.db, member_id).await?)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> MicroauthResult<u64> {
        let mut result = self
            .db
            .query("DELETE member_invite WHERE expires_at <= $now RETURN BEFORE")
            .bind(("now", now))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<InviteRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.len() as u64)
    }
}
