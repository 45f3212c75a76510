// Draftboard entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Build the FantasyPros ADP source
// 4. Create the application state
// 5. Run the console on stdin/stdout until quit or EOF

use std::io::IsTerminal;
use std::sync::Arc;

use draftboard::adp::source::FantasyProsSource;
use draftboard::app::AppState;
use draftboard::config;
use draftboard::console::Console;
use draftboard::draft::session::SessionId;

use anyhow::Context;
use tokio::io::{self, BufReader};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, not terminal)
    init_tracing()?;
    info!("Draftboard starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: rankings at {}, default platform {}, cache ttl {}s",
        config.rankings.path, config.adp.default_platform, config.adp.cache_ttl_secs
    );

    // 3. Build the ADP source
    let source =
        FantasyProsSource::from_config(&config.adp).context("failed to build ADP source")?;

    // 4. Create the application state
    let app = AppState::new(config, Arc::new(source));
    match app.store().load() {
        Some(order) => info!("Loaded custom order with {} players", order.len()),
        None => info!("No custom order saved; boards start in ADP order"),
    }

    // 5. Run the console
    let color = std::io::stdout().is_terminal();
    let mut console = Console::new(&app, SessionId::new("console")).with_color(color);
    if let Err(e) = console
        .run(BufReader::new(io::stdin()), io::stdout())
        .await
    {
        error!("Console error: {:#}", e);
        return Err(e);
    }

    info!("Draftboard shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (not the terminal, which is used by the console).
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
