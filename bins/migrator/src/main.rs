//! Schema migration runner.
//!
//! Applies the shared schema and the ledger schema to the shared store, then the ledger
//! schema to every tenant store listed in `stores.tenants`. Principals without an active
//! tenant work on the shared store, so it carries the same ledger tables.
//!
//! Usage:
//!   migrator up      - Run all pending migrations
//!   migrator down    - Roll back the last migration of every store
//!   migrator status  - Show migration status
//!   migrator fresh   - Drop all tables and re-run migrations

use anyhow::{Context, bail};
use distinta_db::{SharedMigrator, TenantMigrator, connect};
use distinta_shared::AppConfig;
use sea_orm_migration::MigratorTrait;
use sea_orm_migration::sea_orm::DatabaseConnection;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy)]
enum Command {
    Up,
    Down,
    Status,
    Fresh,
}

impl Command {
    fn parse(arg: Option<&str>) -> anyhow::Result<Self> {
        Ok(match arg.unwrap_or("up") {
            "up" => Self::Up,
            "down" => Self::Down,
            "status" => Self::Status,
            "fresh" => Self::Fresh,
            other => bail!("unknown command '{other}' (expected up, down, status or fresh)"),
        })
    }
}

async fn run<M: MigratorTrait>(conn: &DatabaseConnection, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Up => M::up(conn, None).await?,
        Command::Down => M::down(conn, Some(1)).await?,
        Command::Status => M::status(conn).await?,
        Command::Fresh => M::fresh(conn).await?,
    }
    Ok(())
}

/// Both migrators on the shared store. Ledger tables reference `users`, so they go up after
/// and come down before the shared tables; `fresh` wipes the whole database once.
async fn run_shared(conn: &DatabaseConnection, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Up | Command::Status => {
            run::<SharedMigrator>(conn, command).await?;
            run::<TenantMigrator>(conn, command).await?;
        }
        Command::Down => {
            run::<TenantMigrator>(conn, command).await?;
            run::<SharedMigrator>(conn, command).await?;
        }
        Command::Fresh => {
            SharedMigrator::fresh(conn).await?;
            TenantMigrator::up(conn, None).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "distinta=info,sea_orm_migration=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let arg = std::env::args().nth(1);
    let command = Command::parse(arg.as_deref())?;
    let config = AppConfig::load().context("failed to load configuration")?;

    let shared = connect(&config.stores.shared_url, 1)
        .await
        .context("failed to connect to the shared store")?;
    run_shared(&shared, command).await?;
    info!(store = "shared", ?command, "migration finished");

    let mut keys: Vec<&String> = config.stores.tenants.keys().collect();
    keys.sort();
    for key in keys {
        let url = &config.stores.tenants[key];
        let conn = connect(url, 1)
            .await
            .with_context(|| format!("failed to connect to tenant store '{key}'"))?;
        run::<TenantMigrator>(&conn, command).await?;
        info!(store = %key, ?command, "migration finished");
    }

    Ok(())
}
