//! Operator tasks against the MySQL schema.
//!
//! ```text
//! guri-db migrate
//! guri-db seed --admin-password ... --agent-password ...
//! guri-db prune --yes
//! ```

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use guri_api::auth;
use guri_persist::{fixtures, maintenance, MySqlPersistenceClient};
use guri_types::STORY_TTL_HOURS;

#[derive(Debug, Parser)]
#[command(name = "guri-db", version, about = "Guri database maintenance")]
struct Cli {
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create any missing tables
    Migrate,

    /// Drop every table in the connected schema
    Prune {
        /// Confirm the drop; nothing runs without it
        #[arg(long)]
        yes: bool,
    },

    /// Upsert the demo fixtures
    Seed {
        #[arg(long, env = "GURI_ADMIN_PASSWORD", hide_env_values = true)]
        admin_password: String,

        #[arg(long, env = "GURI_AGENT_PASSWORD", hide_env_values = true)]
        agent_password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    if let Command::Prune { yes: false } = cli.command {
        bail!("prune drops every table in the schema; re-run with --yes to confirm");
    }

    let client = MySqlPersistenceClient::connect(
        &cli.database_url,
        1,
        std::time::Duration::from_secs(10),
        chrono::Duration::hours(STORY_TTL_HOURS),
    )
    .await
    .context("failed to connect to MySQL")?;
    let pool = client.pool();

    match cli.command {
        Command::Migrate => {
            let statements = maintenance::migrate(pool).await?;
            tracing::info!(statements, "migration complete");
        }
        Command::Prune { .. } => {
            let report = maintenance::prune(pool).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.is_clean() {
                bail!(
                    "prune finished with {} failed drop(s); foreign key checks restored: {}",
                    report.failed.len(),
                    report.fk_checks_restored
                );
            }
            tracing::info!(dropped = report.dropped.len(), "prune complete");
        }
        Command::Seed {
            admin_password,
            agent_password,
        } => {
            let accounts = auth::seed_accounts(&admin_password, &agent_password)?;
            let report = maintenance::seed(pool, &fixtures::demo(), &accounts).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
