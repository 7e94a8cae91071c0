use std::sync::Arc;
use tokio::sync::watch;

use spa_webserver::config::{AppState, Config};
use spa_webserver::{logger, server};

/// Config file path without extension; `config` loads `config.toml`
const DEFAULT_CONFIG_PATH: &str = "config";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let cfg = Config::load_from(&config_path)?;
    logger::init(&cfg.logging)?;

    // Create Tokio runtime, sizing the worker pool from config
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let backlog = cfg.performance.backlog;

    // Fails fast on an unusable document root
    let state = Arc::new(AppState::new(cfg)?);
    let listener = server::create_listener(addr, backlog)?;

    logger::log_server_start(&listener.local_addr()?, &state.config, &state.responder);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    server::start_signal_handler(shutdown_tx);

    server::start_server_loop(listener, state, shutdown_rx).await?;
    Ok(())
}
