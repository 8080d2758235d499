use anyhow::{Context, Result};
use artist_manager_server::config::{AppConfig, CliConfig, FileConfig, DEFAULT_MAX_IMPORT_BYTES};
use artist_manager_server::store::{FullStore, SqliteStore};
use artist_manager_server::{run_server, RequestsLoggingLevel};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use std::{fmt::Debug, path::PathBuf};
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the SQLite database file. Can also be set in the config file.
    #[clap(value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// Path to a TOML config file, its values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The address to bind to.
    #[clap(long, default_value = "127.0.0.1")]
    pub host: String,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 3001)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Page size of the list views when the request has no `limit`.
    #[clap(long, default_value_t = 1)]
    pub default_page_size: u64,

    /// Count a trailing partial page in the total number of pages.
    #[clap(long)]
    pub round_up_partial_pages: bool,

    /// Disable the self-registration page.
    #[clap(long)]
    pub disable_registration: bool,

    /// Maximum size in bytes of an uploaded CSV file.
    #[clap(long, default_value_t = DEFAULT_MAX_IMPORT_BYTES)]
    pub max_import_bytes: u64,

    /// Number of days a session may stay unused before it's pruned. Set to 0 to disable pruning.
    #[clap(long, default_value_t = 30)]
    pub session_retention_days: u64,

    /// Interval in hours between pruning runs. Only used if session_retention_days > 0.
    #[clap(long, default_value_t = 24)]
    pub prune_interval_hours: u64,

    /// Path to the frontend directory to be statically served.
    #[clap(long)]
    pub frontend_dir_path: Option<String>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            db_path: self.db_path.clone(),
            host: self.host.clone(),
            port: self.port,
            logging_level: self.logging_level.clone(),
            default_page_size: self.default_page_size,
            round_up_partial_pages: self.round_up_partial_pages,
            allow_registration: !self.disable_registration,
            max_import_bytes: self.max_import_bytes,
            session_retention_days: self.session_retention_days,
            prune_interval_hours: self.prune_interval_hours,
            frontend_dir_path: self.frontend_dir_path.clone(),
        }
    }
}

fn spawn_session_pruning(store: Arc<dyn FullStore>, retention_days: u64, interval_hours: u64) {
    info!(
        "Session pruning enabled: retaining {} days, pruning every {} hours",
        retention_days, interval_hours
    );

    tokio::spawn(async move {
        let interval = Duration::from_secs(interval_hours.saturating_mul(60 * 60));
        let mut ticker = tokio::time::interval(interval);

        // Skip the first immediate tick, wait for the first interval
        ticker.tick().await;

        loop {
            ticker.tick().await;

            match store.prune_sessions(retention_days) {
                Ok(count) => {
                    if count > 0 {
                        info!("Pruned {} unused sessions", count);
                    }
                }
                Err(e) => {
                    error!("Failed to prune sessions: {}", e);
                }
            }
        }
    });
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
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}...", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    info!("Opening SQLite database at {:?}...", config.db_path);
    let store: Arc<dyn FullStore> = Arc::new(SqliteStore::new(&config.db_path)?);

    if config.session_retention_days > 0 {
        spawn_session_pruning(
            store.clone(),
            config.session_retention_days,
            config.prune_interval_hours,
        );
    }

    info!("Ready to serve at {}:{}!", config.host, config.port);
    run_server(config.server_config(), &config.host, store).await
}
