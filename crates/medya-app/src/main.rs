mod cli;
mod config;
mod server;
mod session;

use std::path::Path;
use std::sync::Arc;

use medya_sources::SourceRegistry;
use medya_tabs::TabManager;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let args = cli::parse();

    // stdout is the protocol stream; logs go to stderr.
    let log_directive = args.log_level.as_deref().unwrap_or("medya=info");
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                log_directive
                    .parse()
                    .unwrap_or_else(|_| "medya=info".parse().unwrap()),
            ),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Medya v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => config::load_from_path(Path::new(path)),
        None => config::load_default(),
    }
    .unwrap_or_else(|e| {
        tracing::warn!("Config load failed, using defaults: {e}");
        config::AppConfig::default()
    });

    let registry = Arc::new(SourceRegistry::builtin());
    let manager = TabManager::new(registry, config.engine);

    if !args.no_restore {
        session::restore_session(&manager);
    }

    if let Err(e) = server::run(&manager).await {
        tracing::error!("Command loop error: {e}");
    }

    session::save_session(&manager);
    manager.shutdown();
    tracing::info!("Shutdown complete");
}
