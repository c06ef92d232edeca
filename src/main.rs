use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::{fmt::Debug, path::PathBuf};
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use musicmedia_server::config;
use musicmedia_server::deletion::verify_plans;
use musicmedia_server::media_store::{schema::MEDIA_TABLES, SqliteMediaStore};
use musicmedia_server::server::{metrics, run_server, RequestsLoggingLevel, ServerConfig};

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path '{}': {}", s, msg));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite database file. Created on first start.
    /// Can also be specified in config file.
    #[clap(long, value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// How long a statement waits on a locked database, in milliseconds.
    #[clap(long)]
    pub busy_timeout_ms: Option<u64>,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            db_path: args.db_path.clone(),
            port: args.port,
            metrics_port: args.metrics_port,
            logging_level: args.logging_level.clone(),
            busy_timeout_ms: args.busy_timeout_ms,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  db_path: {:?}", app_config.db_path);
    info!("  port: {}", app_config.port);
    info!("  metrics_port: {}", app_config.metrics_port);
    info!("  busy_timeout: {:?}", app_config.busy_timeout);

    // Every foreign key into an entity must be covered by its plan.
    verify_plans(MEDIA_TABLES)?;

    info!("Initializing metrics...");
    metrics::init_metrics();

    if !app_config.db_path.exists() {
        info!("Creating new database at {:?}", app_config.db_path);
    }
    let store = Arc::new(SqliteMediaStore::with_busy_timeout(
        &app_config.db_path,
        app_config.busy_timeout,
    )?);

    let server_config = ServerConfig {
        requests_logging_level: app_config.logging_level,
        port: app_config.port,
        metrics_port: app_config.metrics_port,
    };

    info!("Ready to serve at port {}!", server_config.port);
    run_server(server_config, store).await
}
