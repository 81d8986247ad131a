//! chat-relay HTTP server
//!
//! Loads configuration, resolves the provider API key, and serves the relay.

use chat_relay::cli::{Cli, Command, generate_config_template};
use chat_relay::{config::Config, handlers::AppState, server, telemetry};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(Command::Config { output }) = cli.command {
        match output {
            Some(path) => {
                std::fs::write(&path, generate_config_template())?;
                eprintln!("Wrote configuration template to {}", path.display());
            }
            None => print!("{}", generate_config_template()),
        }
        return Ok(());
    }

    // .env is optional; a missing file is not an error
    dotenvy::dotenv().ok();

    let config = Config::load(cli.config.as_deref())?;

    telemetry::init(&config.observability.log_level);

    let addr = config.socket_addr()?;
    let state = AppState::from_config(&config)?;

    tracing::info!(
        model = %state.provider().model(),
        "Starting chat-relay on {}",
        addr
    );

    let app = server::router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
