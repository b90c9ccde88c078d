use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};

use fever_chat_backend::config::{Cli, Config};
use fever_chat_backend::generation::fixed_text::FixedTextProvider;
use fever_chat_backend::server::{self, api::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments.
    let cli = Cli::parse();

    // Initialize tracing/logging.
    let filter = if cli.verbose {
        "fever_chat_backend=debug,tower_http=debug"
    } else {
        "fever_chat_backend=info,tower_http=info"
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| filter.into());
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true);
    if cli.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    info!("fever-chat-backend v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration.
    let mut config = Config::load(&cli.config)?;
    config.apply_cli(&cli);
    let config = Arc::new(config);

    let state = Arc::new(AppState::new(
        Arc::new(FixedTextProvider::new()),
        config.clone(),
    ));

    let listen_addr = config.server.listen_addr();
    let listener = TcpListener::bind(&listen_addr).await?;
    info!(
        "Servidor backend ejecutándose en http://{}:{}",
        config.server.host, config.server.port
    );

    server::serve(listener, state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    })
    .await
}
