use clap::Parser;
use std::sync::Arc;

use guri_api::{auth, build_router, config::Config, init_logging, state::AppState};
use guri_persist::{fixtures, MemoryPersistenceClient, PersistClientBuilder, PersistenceClient};

#[derive(Debug, Parser)]
#[command(name = "guri-api", version, about = "Guri marketplace HTTP API")]
struct Args {
    /// Serve from the in-process store instead of MySQL
    #[arg(long)]
    memory: bool,

    /// Load the demo fixtures into the in-process store on startup
    #[arg(long, requires = "memory")]
    seed: bool,

    #[arg(long, env = "GURI_ADMIN_PASSWORD", default_value = "admin12345", hide_env_values = true)]
    admin_password: String,

    #[arg(long, env = "GURI_AGENT_PASSWORD", default_value = "agent12345", hide_env_values = true)]
    agent_password: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let config = Config::load_with(args.memory)
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting Guri API server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    let story_ttl = chrono::Duration::hours(config.stories.ttl_hours);
    let persist: Arc<dyn PersistenceClient> = if config.database.in_memory {
        let store = MemoryPersistenceClient::with_story_ttl(story_ttl);
        if args.seed {
            let accounts = auth::seed_accounts(&args.admin_password, &args.agent_password)?;
            let report = store.seed(&fixtures::demo(), &accounts).await?;
            tracing::info!(?report, "demo fixtures loaded");
        }
        Arc::new(store)
    } else {
        tracing::info!("Connecting to MySQL");
        PersistClientBuilder::new()
            .database_url(&config.database_url)
            .max_connections(config.database.max_connections)
            .acquire_timeout(std::time::Duration::from_millis(config.database.acquire_timeout_ms))
            .story_ttl(story_ttl)
            .build()
            .await?
    };
    persist.ping().await?;
    tracing::info!(backend = persist.backend(), "Store ready");

    let state = Arc::new(AppState::new(config.clone(), persist));
    state.uploads.ensure_dir().await?;

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
