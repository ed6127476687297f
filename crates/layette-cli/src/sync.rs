//! Catalog sync command handlers for the CLI.
//!
//! These are called from `main` after the database pool and config are
//! established. A full sync isolates per-source failures and summarizes
//! them at the end; a single-source sync propagates its failure so the
//! exit code reflects it.

use std::str::FromStr;

use layette_catalog::{
    import_all, import_cj_catalog, import_impact_catalog, import_macrobaby_catalog,
    import_silvercross_catalog, SourceOutcome,
};
use layette_core::{load_seed_catalog, AppConfig, Source};
use layette_feeds::FeedClient;

const TRIGGER: &str = "cli";

/// Format an optional timestamp for display, returning `"—"` when `None`.
fn fmt_time(ts: Option<chrono::DateTime<chrono::Utc>>) -> String {
    ts.map_or_else(
        || "\u{2014}".to_string(),
        |t| t.format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}

/// Import catalog feeds into `catalog_items`.
///
/// With `--source` only that feed is synced and any failure is returned
/// directly. Without it every catalog source runs in order; failures are
/// printed per source and rolled into a single error at the end so one bad
/// feed never blocks the others.
///
/// When `dry_run` is `true` the function prints what would be synced and
/// returns without touching the database.
///
/// # Errors
///
/// Returns an error for an unknown or non-catalog `--source`, a feed client
/// that cannot be built, a failed single-source sync, or any failed source
/// in a full sync.
pub(crate) async fn run_sync(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    source_filter: Option<&str>,
    dry_run: bool,
) -> anyhow::Result<()> {
    if let Some(raw) = source_filter {
        let source = Source::from_str(raw).map_err(|e| anyhow::anyhow!("{e}"))?;

        if dry_run {
            println!("dry-run: would sync source {source}");
            return Ok(());
        }

        let client = FeedClient::new(config.feed_timeout_secs, &config.feed_user_agent)
            .map_err(|e| anyhow::anyhow!("failed to build feed client: {e}"))?;

        let count = import_one(pool, config, &client, source).await?;
        println!("{source}: {count} items processed");
        return Ok(());
    }

    if dry_run {
        let labels: Vec<&str> = Source::CATALOG_SOURCES.iter().map(|s| s.as_str()).collect();
        println!(
            "dry-run: would sync {} sources: [{}]",
            labels.len(),
            labels.join(", ")
        );
        return Ok(());
    }

    let client = FeedClient::new(config.feed_timeout_secs, &config.feed_user_agent)
        .map_err(|e| anyhow::anyhow!("failed to build feed client: {e}"))?;

    let summary = import_all(pool, config, &client, TRIGGER).await;

    for (source, outcome) in &summary.outcomes {
        match outcome {
            SourceOutcome::Imported(count) => {
                println!("{source:<14}{count} items processed");
            }
            SourceOutcome::Failed(message) => {
                println!("{source:<14}failed: {message}");
            }
        }
    }
    println!("total: {} items processed", summary.total_imported());

    let failed = summary.failed_sources();
    if !failed.is_empty() {
        let labels: Vec<&str> = failed.iter().map(|s| s.as_str()).collect();
        anyhow::bail!(
            "{} of {} sources failed: [{}]",
            failed.len(),
            summary.outcomes.len(),
            labels.join(", ")
        );
    }

    Ok(())
}

/// Run a single source's import, rejecting sources that are not catalog feeds.
async fn import_one(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    client: &FeedClient,
    source: Source,
) -> anyhow::Result<i32> {
    let count = match source {
        Source::Cj => import_cj_catalog(pool, config, client, TRIGGER).await?,
        Source::Impact => import_impact_catalog(pool, config, client, TRIGGER).await?,
        Source::Silvercross => import_silvercross_catalog(pool, config, client, TRIGGER).await?,
        Source::Macro => import_macrobaby_catalog(pool, config, TRIGGER).await?,
        other => anyhow::bail!(
            "source '{other}' is not a catalog feed; valid sources are cj, impact, silvercross, macro"
        ),
    };
    Ok(count)
}

/// Show recent sync runs, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_runs(pool: &sqlx::PgPool, limit: i64) -> anyhow::Result<()> {
    let runs = layette_db::list_sync_runs(pool, limit).await?;

    if runs.is_empty() {
        println!("no sync runs recorded; run `layette-cli sync` first");
        return Ok(());
    }

    let header = format!(
        "{:<14}{:<11}{:<9}{:<9}{:<21}ERROR",
        "SOURCE", "STATUS", "TRIGGER", "RECORDS", "COMPLETED"
    );
    println!("{header}");
    for run in &runs {
        let completed = fmt_time(run.completed_at);
        let error = run.error_message.as_deref().unwrap_or("\u{2014}");
        let error_display = if error.chars().count() > 48 {
            format!("{}...", error.chars().take(48).collect::<String>())
        } else {
            error.to_string()
        };
        println!(
            "{:<14}{:<11}{:<9}{:<9}{:<21}{}",
            run.source, run.status, run.trigger_source, run.records_processed, completed,
            error_display
        );
    }

    Ok(())
}

/// Validate the MacroBaby seed catalog file without touching the database.
///
/// # Errors
///
/// Returns an error if the seed file is missing, unparseable, or fails
/// validation (empty titles, duplicate ids, invalid prices).
pub(crate) fn run_seed_check(config: &AppConfig) -> anyhow::Result<()> {
    let seed = load_seed_catalog(&config.seed_path).map_err(|e| {
        anyhow::anyhow!("seed check failed for {}: {e}", config.seed_path.display())
    })?;

    let priced = seed.products.iter().filter(|p| p.price.is_some()).count();
    println!(
        "seed file {} is valid: {} products ({priced} priced)",
        config.seed_path.display(),
        seed.products.len()
    );
    Ok(())
}
