//! Campus Exchange server
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────────┐    ┌──────────┐
//! │ Gateway  │───▶│ Services │───▶│ MarketStore  │───▶│ Postgres │
//! │  (axum)  │    │ (FSMs)   │    │ (pg or mem)  │    │          │
//! └──────────┘    └──────────┘    └──────────────┘    └──────────┘
//!                      ▲
//!                 ┌────┴─────┐
//!                 │  Sweep   │  auto-approves stale pending listings
//!                 └──────────┘
//! ```

use std::sync::Arc;

use anyhow::Context;

use campus_exchange::app::{assemble, seed_memory_store};
use campus_exchange::clock::SystemClock;
use campus_exchange::config::AppConfig;
use campus_exchange::db::Database;
use campus_exchange::moderation::{ImageScorer, ModerationPipeline, SightEngineScorer};
use campus_exchange::notify::mailer_from_config;
use campus_exchange::store::{MarketStore, MemoryStore, PgMarketStore};
use campus_exchange::sweep::start_sweep_worker;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for ctrl-c: {}", e);
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let app_config = AppConfig::load(&env).with_context(|| format!("loading {} config", env))?;
    let _log_guard = campus_exchange::logging::init_logging(&app_config);

    tracing::info!(
        "Starting Campus Exchange ({}) in {} mode",
        env!("GIT_HASH"),
        env
    );

    // Storage: PostgreSQL when configured, otherwise a seeded in-memory store
    let clock = Arc::new(SystemClock);
    let (store, pg_db): (Arc<dyn MarketStore>, Option<Arc<Database>>) = match &app_config.postgres_url {
        Some(url) => {
            let db = Database::connect(url)
                .await
                .context("connecting to PostgreSQL")?;
            db.init_schema().await.context("initializing schema")?;
            tracing::info!("PostgreSQL schema ready");
            let db = Arc::new(db);
            let store = Arc::new(PgMarketStore::new(db.pool().clone())) as Arc<dyn MarketStore>;
            (store, Some(db))
        }
        None => {
            tracing::warn!("No postgres_url configured, using in-memory store");
            let memory = MemoryStore::with_clock(clock.clone());
            seed_memory_store(&memory, &app_config.seed).await?;
            (Arc::new(memory) as Arc<dyn MarketStore>, None)
        }
    };

    // Moderation: keyword screen always, image scoring only with credentials
    let scorer = SightEngineScorer::from_config(&app_config.moderation)
        .context("building image scorer")?
        .map(|s| Arc::new(s) as Arc<dyn ImageScorer>);
    if scorer.is_none() {
        tracing::warn!("SightEngine credentials missing, images will not be scored");
    }
    let pipeline = ModerationPipeline::new(scorer, app_config.moderation.timeout());

    let mailer = mailer_from_config(&app_config.mail).context("building mailer")?;

    let state = assemble(
        &app_config,
        store,
        Arc::from(mailer),
        pipeline,
        clock,
        pg_db,
    );

    let sweep = if app_config.sweep.enabled {
        Some(start_sweep_worker(state.sweep.clone()))
    } else {
        tracing::info!("Sweep worker disabled");
        None
    };

    let port = get_port_override().unwrap_or(app_config.gateway.port);
    let served = campus_exchange::gateway::run_server(
        &app_config.gateway.host,
        port,
        state,
        shutdown_signal(),
    )
    .await;

    if let Some(handle) = sweep {
        handle.shutdown().await;
    }
    served.context("gateway server")?;

    tracing::info!("Campus Exchange stopped");
    Ok(())
}
