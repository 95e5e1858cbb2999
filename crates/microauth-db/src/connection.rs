//! SurrealDB connection management.

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

use crate::error::DbError;
use crate::repository::{
    SurrealAccountRepository, SurrealInviteRepository, SurrealMemberRepository,
    SurrealOrganizationRepository,
};
use crate::schema::run_migrations;

/// Configuration for connecting to SurrealDB.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// WebSocket address (e.g., `127.0.0.1:8000`).
    pub url: String,
    /// SurrealDB namespace.
    pub namespace: String,
    /// SurrealDB database name.
    pub database: String,
    /// Root username for authentication.
    pub username: String,
    /// Root password for authentication.
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "microauth".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

/// One repository per store, all sharing a single client.
pub struct Repositories<C: surrealdb::Connection> {
    pub accounts: SurrealAccountRepository<C>,
    pub organizations: SurrealOrganizationRepository<C>,
    pub members: SurrealMemberRepository<C>,
    pub invites: SurrealInviteRepository<C>,
}

impl<C: surrealdb::Connection> Repositories<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self {
            accounts: SurrealAccountRepository::new(db.clone()),
            organizations: SurrealOrganizationRepository::new(db.clone()),
            members: SurrealMemberRepository::new(db.clone()),
            invites: SurrealInviteRepository::new(db),
        }
    }
}

/// Manages a connection to SurrealDB.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    /// Connect to SurrealDB, authenticate as root and select the
    /// configured namespace and database.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "Connecting to SurrealDB"
        );

        let db = Surreal::new::<Ws>(&config.url).await?;

        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        info!("Connected to SurrealDB");

        Ok(Self { db })
    }

    /// Bring the schema up to date.
    pub async fn migrate(&self) -> Result<(), DbError> {
        run_migrations(&self.db).await
    }

    /// Repositories bound to this connection.
    pub fn repositories(&self) -> Repositories<Client> {
        Repositories::new(self.db.clone())
    }

    /// Returns a reference to the underlying SurrealDB client.
    pub fn client(&self) -> &Surreal<Client> {
        &self.db
    }
}
