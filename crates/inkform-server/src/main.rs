//! Inkform server. Hosts the HTTP surface and the maintenance commands.

mod config;
mod handlers;
mod middleware;
mod routes;
mod state;

use anyhow::Context;
use clap::{Parser, Subcommand};
use surrealdb::Surreal;
use surrealdb::engine::remote::ws::Client;
use tracing_subscriber::EnvFilter;

use inkform_access::{CleanupService, InvitationConfig};
use inkform_db::directory::SurrealIdentityDirectory;
use inkform_db::repository::{SurrealInvitationRepository, SurrealProfileRepository};
use inkform_db::{DbManager, run_migrations};

use crate::config::ServerConfig;
use crate::state::AppState;

#[derive(Parser)]
#[command(
    name = "inkform-server",
    about = "Consent form backend for tattoo studios"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server.
    Serve,
    /// Expire and remove abandoned invitations.
    Cleanup {
        /// Age in days after which a pending invitation counts as
        /// abandoned.
        #[arg(long, default_value_t = 7)]
        days: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("inkform=info".parse()?))
        .json()
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::from_env();

    let manager = DbManager::connect(&config.db)
        .await
        .context("database connection failed")?;
    let db = manager.client().clone();
    run_migrations(&db).await.context("migrations failed")?;

    match cli.command {
        Command::Serve => serve(config, db).await,
        Command::Cleanup { days } => cleanup(db, days).await,
    }
}

async fn serve(config: ServerConfig, db: Surreal<Client>) -> anyhow::Result<()> {
    let state = AppState::new(db);
    let router = routes::router(state);

    tracing::info!(addr = %config.bind_addr, "starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .context("could not bind listener")?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

async fn cleanup(db: Surreal<Client>, days: i64) -> anyhow::Result<()> {
    let service = CleanupService::with_config(
        SurrealProfileRepository::new(db.clone()),
        SurrealInvitationRepository::new(db.clone()),
        SurrealIdentityDirectory::new(db),
        InvitationConfig {
            cleanup_threshold_days: days,
            ..Default::default()
        },
    );

    let report = service.cleanup().await?;
    for error in &report.errors {
        tracing::warn!(error = %error, "cleanup failure");
    }
    tracing::info!(
        expired_invitations = report.expired_invitations,
        deleted_profiles = report.deleted_profiles,
        deleted_identities = report.deleted_identities,
        failures = report.errors.len(),
        "cleanup finished"
    );
    Ok(())
}
