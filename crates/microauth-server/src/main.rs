//! microauth server: application entry point.

mod config;
mod mailer;

use std::sync::Arc;

use anyhow::Context;
use microauth_auth::IdentityService;
use microauth_db::DbManager;
use microauth_membership::{MembershipService, OrganizationDirectory};
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;
use crate::mailer::Mailer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("microauth=info,info")),
        )
        .json()
        .init();

    tracing::info!("Starting microauth server...");

    let config = ServerConfig::from_env().context("invalid configuration")?;

    let db = DbManager::connect(&config.db)
        .await
        .context("failed to connect to SurrealDB")?;
    db.migrate().await.context("failed to apply migrations")?;

    let mailer = Mailer::from_config(&config.mailer).context("failed to set up mail transport")?;

    let repos = db.repositories();
    let identity = Arc::new(IdentityService::new(repos.accounts, config.auth));
    let membership = Arc::new(MembershipService::new(
        OrganizationDirectory::new(repos.organizations),
        repos.members,
        repos.invites,
        Arc::clone(&identity),
        mailer,
        config.invite,
    ));

    let purged = membership
        .purge_expired_invites()
        .await
        .context("failed to purge expired invites")?;
    tracing::info!(purged, "Services ready");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    tracing::info!("microauth server stopped.");
    Ok(())
}
