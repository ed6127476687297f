//! Database maintenance command handlers for the CLI.

use clap::Subcommand;

/// Sub-commands available under `db`.
#[derive(Debug, Subcommand)]
pub enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Run pending migrations
    Migrate,
}

/// Dispatch a `db` sub-command.
///
/// # Errors
///
/// Returns an error if the connectivity check or migration run fails.
pub(crate) async fn run_db(pool: &sqlx::PgPool, command: DbCommands) -> anyhow::Result<()> {
    match command {
        DbCommands::Ping => {
            layette_db::ping(pool).await?;
            println!("database connection ok");
            Ok(())
        }
        DbCommands::Migrate => {
            let applied = layette_db::run_migrations(pool).await?;
            if applied == 0 {
                println!("migrations already up to date");
            } else {
                println!("applied {applied} migrations");
            }
            Ok(())
        }
    }
}
