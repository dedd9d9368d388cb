//! Anonymous room-based chat relay server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin bisik-server
//! cargo run --bin bisik-server -- --host 0.0.0.0 --port 3000 --public-url https://bisik.example
//! ```

use std::time::Duration;

use bisik_server::{
    config::RelayConfig,
    ui::{AppState, Server},
};
use bisik_shared::logger::setup_logger;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "bisik-server")]
#[command(about = "Anonymous room-based chat relay", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "3000")]
    port: u16,

    /// Origin used in shareable room links (defaults to http://<host>:<port>)
    #[arg(long)]
    public_url: Option<String>,

    /// Seconds an empty room is kept before it is deleted
    #[arg(long, default_value = "300")]
    reap_delay_secs: u64,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    let public_url = args
        .public_url
        .unwrap_or_else(|| format!("http://{}:{}", args.host, args.port));
    let config = RelayConfig {
        reap_delay: Duration::from_secs(args.reap_delay_secs),
        ..RelayConfig::default()
    }
    .with_public_url(public_url);
    tracing::info!("Room links point to {}", config.public_url);

    let server = Server::new(AppState::in_memory(config));
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
