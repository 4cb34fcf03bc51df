//! Huddle Server
//!
//! Run with: cargo run -- [--config path] [--port 3000]
//!
//! # Configuration
//!
//! Settings come from a TOML file, then environment variables, then flags:
//! - `PORT`: Port to listen on (default: 3000)
//! - `HUDDLE_HOST`: Host to bind to (default: 0.0.0.0)
//! - `HUDDLE_STATIC_DIR`: Browser client directory (default: public)
//! - `HUDDLE_MAX_CONNECTIONS`: Connection limit (default: 1000)
//! - `HUDDLE_LOG_LEVEL`, `HUDDLE_LOG_FORMAT`: Logging
//! - `RUST_LOG`: Overrides the log filter entirely

use clap::{Parser, Subcommand};
use huddle::api::{serve, AppState};
use huddle::config::{generate_default_config, Config, LoggingConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "huddle")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Real-time chat relay with rooms and presence")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory to serve the browser client from
    #[arg(long)]
    pub static_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the chat server (default)
    Serve,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Config { output }) = &cli.command {
        let content = generate_default_config();
        match output {
            Some(path) => {
                std::fs::write(path, content)?;
                println!("Config written to {}", path.display());
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };

    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(dir) = cli.static_dir {
        config.server.static_dir = dir;
    }

    init_logging(&config.logging);

    tracing::info!("Starting Huddle v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Serving static files from {:?}", config.server.static_dir);
    tracing::info!("Connection limit: {}", config.gateway.max_connections);

    let state = AppState::spawn(
        config.server.clone(),
        config.gateway.clone(),
        config.relay.clone(),
    );

    serve(state).await?;

    tracing::info!("Huddle stopped");
    Ok(())
}

/// Initialize tracing from the logging config
fn init_logging(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("huddle={0},tower_http={0}", config.level).into());

    let registry = tracing_subscriber::registry().with(filter);

    if config.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
