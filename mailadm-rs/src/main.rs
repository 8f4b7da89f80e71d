use clap::Parser;
use mailadm_rs::api::{ApiServer, AppState};
use mailadm_rs::backend::dkim::FileDkimManager;
use mailadm_rs::backend::sqlite::{SqliteCredentialStore, SqliteMailStorage};
use mailadm_rs::backend::{CredentialStore, DkimManager, MailStorage};
use mailadm_rs::config::Config;
use mailadm_rs::provision::Provisioner;
use mailadm_rs::quota::{QuotaResolver, QuotaStore, UsageAggregator};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "mailadm-rs", about = "Mail server administration service")]
struct Cli {
    /// Path to the configuration file
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// Override the API listen address
    #[arg(long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = if std::path::Path::new(&cli.config).exists() {
        Config::from_file(&cli.config)?
    } else {
        Config::default()
    };
    if let Some(listen) = cli.listen {
        config.api.listen_addr = listen;
    }

    let level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    if config.logging.format == "pretty" {
        tracing_subscriber::fmt().with_max_level(level).pretty().init();
    } else {
        tracing_subscriber::fmt().with_max_level(level).init();
    }

    info!("starting mailadm-rs");
    info!("  listening on: {}", config.api.listen_addr);
    info!("  database: {}", config.storage.database_url);
    info!("  DKIM key dir: {}", config.dkim.key_dir);

    if config.api.admin_user.is_empty() || config.api.admin_password.is_empty() {
        anyhow::bail!("admin_user and admin_password must be set in the [api] config section");
    }

    let connect_opts = SqliteConnectOptions::from_str(&config.storage.database_url)?
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;

    let storage: Arc<dyn MailStorage> = Arc::new(SqliteMailStorage::new(pool.clone()).await?);
    let credentials: Arc<dyn CredentialStore> =
        Arc::new(SqliteCredentialStore::new(pool.clone()).await?);
    let dkim: Arc<dyn DkimManager> = Arc::new(FileDkimManager::new(
        config.dkim.key_dir.clone(),
        config.dkim.selector.clone(),
    ));

    let quota_store = Arc::new(QuotaStore::new(pool).await?);
    let usage = UsageAggregator::new(storage.clone());
    let resolver = QuotaResolver::new(quota_store.clone());
    let provisioner = Provisioner::new(storage.clone());

    let state = AppState {
        credentials,
        dkim,
        quota_store,
        usage,
        resolver,
        provisioner,
        admin_user: config.api.admin_user.clone(),
        admin_password: config.api.admin_password.clone(),
    };

    let server = ApiServer::new(state, config.api.listen_addr.clone());
    server.run().await?;

    Ok(())
}
