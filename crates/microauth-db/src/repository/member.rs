//! SurrealDB implementation of [`MemberRepository`].

use microauth_core::error::MicroauthResult;
use microauth_core::models::member::{CreateMember, Member, Role};
use microauth_core::repository::MemberRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::{check_response, DbError};

#[derive(Debug, SurrealValue)]
pub(crate) struct MemberRow {
    organization_id: String,
    account_id: String,
    role: String,
    app_role: String,
}

#[derive(Debug, SurrealValue)]
struct MemberRowWithId {
    record_id: String,
    organization_id: String,
    account_id: String,
    role: String,
    app_role: String,
}

fn parse_uuid(field: &str, value: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(value).map_err(|e| DbError::Decode(format!("invalid {field} UUID: {e}")))
}

fn parse_role(s: &str) -> Result<Role, DbError> {
    Role::parse(s).ok_or_else(|| DbError::Decode(format!("unknown member role: {s}")))
}

impl MemberRow {
    pub(crate) fn into_member(self, id: Uuid) -> Result<Member, DbError> {
        Ok(Member {
            id,
            organization_id: parse_uuid("organization", &self.organization_id)?,
            account_id: parse_uuid("account", &self.account_id)?,
            role: parse_role(&self.role)?,
            app_role: self.app_role,
        })
    }
}

impl MemberRowWithId {
    fn try_into_member(self) -> Result<Member, DbError> {
        let id = parse_uuid("member", &self.record_id)?;
        MemberRow {
            organization_id: self.organization_id,
            account_id: self.account_id,
            role: self.role,
            app_role: self.app_role,
        }
        .into_member(id)
    }
}

/// Fetch a member row by record id. Shared with the invite repository,
/// which creates memberships inside its redeem transaction.
pub(crate) async fn get_member_by_record<C: Connection>(
    db: &Surreal<C>,
    id: Uuid,
) -> Result<Member, DbError> {
    let mut result = db
        .query("SELECT * FROM type::record('member', $id)")
        .bind(("id", id.to_string()))
        .await?;

    let rows: Vec<MemberRow> = result.take(0)?;
    let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
        entity: "member".into(),
        id: id.to_string(),
    })?;
    row.into_member(id)
}

/// SurrealDB implementation of the membership store.
#[derive(Clone)]
pub struct SurrealMemberRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealMemberRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> MemberRepository for SurrealMemberRepository<C> {
    async fn create(&self, input: CreateMember) -> MicroauthResult<Member> {
        let id = Uuid::new_v4();

        let result = self
            .db
            .query(
                "CREATE type::record('member', $id) SET \
                 organization_id = $organization_id, account_id = $account_id, \
                 role = $role, app_role = $app_role",
            )
            .bind(("id", id.to_string()))
            .bind(("organization_id", input.organization_id.to_string()))
            .bind(("account_id", input.account_id.to_string()))
            .bind(("role", input.role.as_str().to_string()))
            .bind(("app_role", input.app_role))
            .await
            .map_err(DbError::from)?;

        let mut result = check_response("member", result)?;

        let rows: Vec<MemberRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "member".into(),
            id: id.to_string(),
        })?;

        Ok(row.into_member(id)?)
    }

    async fn get(&self, organization_id: Uuid, account_id: Uuid) -> MicroauthResult<Member> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM member \
                 WHERE organization_id = $organization_id AND account_id = $account_id \
                 LIMIT 1",
            )
            .bind(("organization_id", organization_id.to_string()))
            .bind(("account_id", account_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MemberRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "member".into(),
            id: format!("{organization_id}/{account_id}"),
        })?;

        Ok(row.try_into_member()?)
    }

    async fn list_by_organization(&self, organization_id: Uuid) -> MicroauthResult<Vec<Member>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM member \
                 WHERE organization_id = $organization_id \
                 ORDER BY created_at ASC",
            )
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MemberRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_member())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(items)
    }

    async fn update(
        &self,
        organization_id: Uuid,
        account_id: Uuid,
        role: Role,
        app_role: String,
    ) -> MicroauthResult<Member> {
        let result = self
            .db
            .query(
                "UPDATE member SET role = $role, app_role = $app_role \
                 WHERE organization_id = $organization_id AND account_id = $account_id \
                 RETURN meta::id(id) AS record_id, organization_id, account_id, role, app_role",
            )
            .bind(("role", role.as_str().to_string()))
            .bind(("app_role", app_role))
            .bind(("organization_id", organization_id.to_string()))
            .bind(("account_id", account_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = check_response("member", result)?;

        let rows: Vec<MemberRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "member".into(),
            id: format!("{organization_id}/{account_id}"),
        })?;

        Ok(row.try_into_member()?)
    }

    async fn delete(&self, organization_id: Uuid, account_id: Uuid) -> MicroauthResult<()> {
        let mut result = self
            .db
            .query(
                "DELETE member \
                 WHERE organization_id = $organization_id AND account_id = $account_id \
                 RETURN BEFORE",
            )
            .bind(("organization_id", organization_id.to_string()))
            .bind(("account_id", account_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MemberRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "member".into(),
                id: format!("{organization_id}/{account_id}"),
            }
            .into());
        }

        Ok(())
    }
}
