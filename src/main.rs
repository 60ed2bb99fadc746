//! UniqueWager — unique-answer wagering web service
//!
//! Entry point. Loads configuration, initialises structured logging,
//! builds the backend gateways, and serves the web app with graceful
//! shutdown.

use anyhow::Result;
use secrecy::Secret;
use std::sync::Arc;
use tracing::info;

use uniquewager::backend::auth::RestAuth;
use uniquewager::backend::rest::RestStore;
use uniquewager::config::AppConfig;
use uniquewager::server;
use uniquewager::server::routes::AppContext;

const BANNER: &str = r#"
 _   _       _                  _    _
| | | |_ __ (_) __ _ _   _  ___| |  | | __ _  __ _  ___ _ __
| | | | '_ \| |/ _` | | | |/ _ \ |/\| |/ _` |/ _` |/ _ \ '__|
| |_| | | | | | (_| | |_| |  __/  /\  | (_| | (_| |  __/ |
 \___/|_| |_|_|\__, |\__,_|\___|\/  \/ \__,_|\__, |\___|_|
                  |_|                        |___/
  One question. One prize pool. Only unique answers win.
  v0.1.0
"#;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    // Load configuration from TOML
    let cfg = AppConfig::load("config.toml")?;

    // Initialise structured logging
    init_logging();

    // Print startup banner
    println!("{BANNER}");
    info!(
        app_name = %cfg.app.name,
        backend_url = %cfg.backend.url,
        currency = %cfg.app.currency,
        port = cfg.server.port,
        "UniqueWager starting up"
    );

    // -- Backend gateways --------------------------------------------------

    let api_key = Secret::new(AppConfig::resolve_env(&cfg.backend.api_key_env)?);

    let store = RestStore::new(&cfg.backend.url, api_key.clone(), cfg.backend.timeout_secs)?;
    let auth = RestAuth::new(&cfg.backend.url, api_key, cfg.backend.timeout_secs)?;

    let state = Arc::new(AppContext {
        store: Arc::new(store),
        auth: Arc::new(auth),
    });

    // -- Serve -------------------------------------------------------------

    server::serve(state, cfg.server.port).await?;

    info!("UniqueWager shut down cleanly.");
    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("uniquewager=info"));

    let json_logging = std::env::var("UNIQUEWAGER_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
