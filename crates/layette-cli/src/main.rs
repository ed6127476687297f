use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::db::DbCommands;

mod db;
mod sync;

#[derive(Debug, Parser)]
#[command(name = "layette-cli")]
#[command(about = "Layette catalog and registry command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Import catalog feeds (all sources, or one with --source)
    Sync {
        /// Restrict the import to a single source (cj, impact, silvercross, macro)
        #[arg(long)]
        source: Option<String>,

        /// Preview what would be synced without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Show recent sync runs
    Runs {
        /// Maximum number of runs to show
        #[arg(long, default_value = "20")]
        limit: i64,
    },
    /// Database maintenance commands
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Validate the MacroBaby seed catalog without touching the database
    SeedCheck,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = layette_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Some(Commands::Sync { source, dry_run }) => {
            let pool = connect(&config).await?;
            sync::run_sync(&pool, &config, source.as_deref(), dry_run).await
        }
        Some(Commands::Runs { limit }) => {
            let pool = connect(&config).await?;
            sync::run_runs(&pool, limit).await
        }
        Some(Commands::Db { command }) => {
            let pool = connect(&config).await?;
            db::run_db(&pool, command).await
        }
        Some(Commands::SeedCheck) => sync::run_seed_check(&config),
        None => {
            println!("no command given; see `layette-cli --help`");
            Ok(())
        }
    }
}

async fn connect(config: &layette_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = layette_db::PoolConfig::from_app_config(config);
    let pool = layette_db::connect_pool(&config.database_url, pool_config).await?;
    Ok(pool)
}
