use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use music_catalog_api::config::{
    AppConfig, CliConfig, FileConfig, DEFAULT_MAX_UPLOAD_MB, DEFAULT_PORT, DEFAULT_TOKEN_TTL_DAYS,
};
use music_catalog_api::media::MediaManager;
use music_catalog_api::user::TokenService;
use music_catalog_api::{run_server, RequestsLoggingLevel, ServerConfig, ServerState, SqliteCatalogStore};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Directory holding the catalog database.
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// Directory for uploaded media. Defaults to `<db-dir>/media`.
    #[clap(long, value_parser = parse_path)]
    pub media_path: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// TOML file whose values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Secret used to sign tokens. A random one is generated if missing.
    #[clap(long, env = "TOKEN_SECRET", hide_env_values = true)]
    pub token_secret: Option<String>,

    /// How long issued tokens stay valid.
    #[clap(long, default_value_t = DEFAULT_TOKEN_TTL_DAYS)]
    pub token_ttl_days: u64,

    /// Largest accepted upload, in MiB.
    #[clap(long, default_value_t = DEFAULT_MAX_UPLOAD_MB)]
    pub max_upload_mb: usize,
}

impl From<&CliArgs> for CliConfig {
    fn from(args: &CliArgs) -> Self {
        CliConfig {
            db_dir: args.db_dir.clone(),
            media_path: args.media_path.clone(),
            port: args.port,
            logging_level: args.logging_level.clone(),
            token_secret: args.token_secret.clone(),
            token_ttl_days: args.token_ttl_days,
            max_upload_mb: args.max_upload_mb,
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
            info!("Loading config file {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&CliConfig::from(&cli_args), file_config)?;

    info!("Opening catalog database at {:?}...", config.catalog_db_path());
    let store = Arc::new(SqliteCatalogStore::new(config.catalog_db_path())?);
    let media = MediaManager::new(&config.media_path)?;
    let tokens = TokenService::new(config.token_secret.as_bytes(), config.token_ttl);

    let server_config = ServerConfig {
        requests_logging_level: config.logging_level.clone(),
        port: config.port,
        max_upload_bytes: config.max_upload_bytes,
    };
    info!("Ready to serve at port {}!", config.port);
    run_server(ServerState::new(
        server_config,
        store.clone(),
        store,
        media,
        tokens,
    ))
    .await
}
