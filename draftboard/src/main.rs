// Draft board entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Open database
// 4. Load the player catalog (feed, then cache, then empty)
// 5. Build the session and restore drafted players
// 6. Create mpsc channels
// 7. Spawn the metrics fetch and the app loop
// 8. Run the TUI until quit
// 9. Cleanup on exit

use draftboard::app;
use draftboard::board::session::DraftSession;
use draftboard::config;
use draftboard::db;
use draftboard::metrics;
use draftboard::protocol::UiUpdate;
use draftboard::source;
use draftboard::tui;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("Draft board starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!("Config loaded: players from {}", config.data.players);

    // 3. Open database
    let db_path = config.db_path();
    let db = db::Database::open(&db_path).context("failed to open database")?;
    info!("Database opened at {}", db_path);

    // 4. Load the catalog
    let loaded = source::load_catalog(&config.players_source(), &db).await;
    info!(
        "Catalog ready: {} players ({})",
        loaded.catalog.len(),
        loaded.origin.label()
    );

    // 5. Session + drafted state
    let mut session =
        DraftSession::with_query(loaded.catalog, Box::new(db), config.initial_query());
    let restored = session.rehydrate_from_store();
    if restored > 0 {
        info!("Restored {} drafted players", restored);
    }

    // 6. Channels
    let (cmd_tx, cmd_rx) = mpsc::channel(64);
    let (ui_tx, ui_rx) = mpsc::channel(256);

    let _ = ui_tx
        .send(UiUpdate::Loaded {
            origin: loaded.origin,
            at: loaded.loaded_at,
        })
        .await;

    // 7a. Metrics are optional; failures only reach the log.
    let metrics_handle = config.metrics_source().map(|metrics_source| {
        let tx = ui_tx.clone();
        tokio::spawn(async move {
            match metrics::fetch_metrics(&metrics_source).await {
                Ok(m) => {
                    let _ = tx.send(UiUpdate::Metrics(m.ensemble_rmse())).await;
                }
                Err(e) => debug!("Could not load metrics: {}", e),
            }
        })
    });

    // 7b. App loop
    let app_state = app::AppState::new(session, config.removal_delay());
    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(cmd_rx, ui_tx, app_state).await {
            error!("Application loop error: {}", e);
        }
    });

    // 8. TUI (blocks until the user quits)
    info!("Application ready");
    if let Err(e) = tui::run(ui_rx, cmd_tx).await {
        error!("TUI error: {}", e);
    }

    // 9. Cleanup
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), async {
        let _ = app_handle.await;
    })
    .await;
    if let Some(handle) = metrics_handle {
        handle.abort();
    }

    info!("Draft board shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (not the terminal, which is used by the TUI).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("draftboard.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("draftboard=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
