//! Catalog sync jobs, one per feed source.
//!
//! Every import follows the same lifecycle: create a `sync_runs` row, mark it
//! running, fetch and normalize the feed, batch-upsert into `catalog_items`,
//! then complete or fail the run. A source whose credentials are absent from
//! the environment is skipped with a warning and no run row, so partially
//! configured deployments stay quiet instead of accumulating failed runs.

use std::future::Future;
use std::io;

use sqlx::PgPool;

use layette_core::{AppConfig, CatalogProduct, ConfigError, Source};
use layette_db::{
    complete_sync_run, create_sync_run, fail_sync_run, start_sync_run, upsert_catalog_items,
};
use layette_feeds::{
    fetch_cj_catalog, fetch_impact_catalog, fetch_silvercross_catalog, seed_catalog, FeedClient,
    FeedError,
};

use crate::error::CatalogError;

/// Outcome of one source within [`import_all`].
#[derive(Debug, Clone)]
pub enum SourceOutcome {
    /// Items processed for this source; zero covers skipped and empty feeds.
    Imported(i32),
    /// The import failed; the message mirrors the run's `error_message`.
    Failed(String),
}

/// Per-source results of [`import_all`], in sync order.
#[derive(Debug, Clone, Default)]
pub struct SyncSummary {
    pub outcomes: Vec<(Source, SourceOutcome)>,
}

impl SyncSummary {
    /// Sum of items processed across the sources that succeeded.
    #[must_use]
    pub fn total_imported(&self) -> i64 {
        self.outcomes
            .iter()
            .map(|(_, outcome)| match outcome {
                SourceOutcome::Imported(count) => i64::from(*count),
                SourceOutcome::Failed(_) => 0,
            })
            .sum()
    }

    /// Sources whose import failed.
    #[must_use]
    pub fn failed_sources(&self) -> Vec<Source> {
        self.outcomes
            .iter()
            .filter_map(|(source, outcome)| match outcome {
                SourceOutcome::Failed(_) => Some(*source),
                SourceOutcome::Imported(_) => None,
            })
            .collect()
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failed_sources().is_empty()
    }

    fn record(&mut self, source: Source, result: Result<i32, CatalogError>) {
        match result {
            Ok(count) => self.outcomes.push((source, SourceOutcome::Imported(count))),
            Err(e) => {
                tracing::error!(source = %source, error = %e, "catalog sync failed");
                self.outcomes.push((source, SourceOutcome::Failed(e.to_string())));
            }
        }
    }
}

/// Syncs the CJ affiliate XML feed into the catalog.
///
/// Returns the number of items processed. When the CJ API URL or key is not
/// configured, logs a warning and returns 0 without creating a run.
///
/// # Errors
///
/// Returns [`CatalogError`] if the feed request fails (network or non-2xx)
/// or the upsert fails; the sync run is marked failed first.
pub async fn import_cj_catalog(
    pool: &PgPool,
    config: &AppConfig,
    client: &FeedClient,
    trigger: &str,
) -> Result<i32, CatalogError> {
    let Some((api_url, api_key)) = config.cj_feed() else {
        tracing::warn!("cj feed is not configured; skipping sync");
        return Ok(0);
    };

    run_source_sync(
        pool,
        Source::Cj,
        trigger,
        fetch_cj_catalog(client, api_url, api_key),
    )
    .await
}

/// Syncs the Impact JSON catalog into the catalog.
///
/// Returns the number of items processed. When the Impact API URL or key is
/// not configured, logs a warning and returns 0 without creating a run.
///
/// # Errors
///
/// Returns [`CatalogError`] if the feed request fails (network or non-2xx)
/// or the upsert fails; the sync run is marked failed first. A response body
/// that is not JSON at all is treated as an empty feed, not a failure.
pub async fn import_impact_catalog(
    pool: &PgPool,
    config: &AppConfig,
    client: &FeedClient,
    trigger: &str,
) -> Result<i32, CatalogError> {
    let Some((api_url, api_key)) = config.impact_feed() else {
        tracing::warn!("impact feed is not configured; skipping sync");
        return Ok(0);
    };

    run_source_sync(
        pool,
        Source::Impact,
        trigger,
        fetch_impact_catalog(client, api_url, api_key),
    )
    .await
}

/// Syncs the Silver Cross CSV feed into the catalog.
///
/// Returns the number of items processed. When the feed URL is not
/// configured, logs a warning and returns 0 without creating a run.
///
/// # Errors
///
/// Returns [`CatalogError`] if the feed request fails (network or non-2xx)
/// or the upsert fails; the sync run is marked failed first.
pub async fn import_silvercross_catalog(
    pool: &PgPool,
    config: &AppConfig,
    client: &FeedClient,
    trigger: &str,
) -> Result<i32, CatalogError> {
    let Some(feed_url) = config.silvercross_feed_url.as_deref() else {
        tracing::warn!("silver cross feed is not configured; skipping sync");
        return Ok(0);
    };

    run_source_sync(
        pool,
        Source::Silvercross,
        trigger,
        fetch_silvercross_catalog(client, feed_url),
    )
    .await
}

/// Syncs the curated MacroBaby seed catalog into the catalog.
///
/// Reads the YAML seed file at `config.seed_path`. A missing file is treated
/// like missing configuration: warn and return 0 without creating a run. An
/// unreadable or invalid seed file is an error worth surfacing.
///
/// # Errors
///
/// Returns [`CatalogError::Seed`] if the seed file exists but cannot be
/// parsed or validated, or [`CatalogError::Db`] if the upsert fails.
pub async fn import_macrobaby_catalog(
    pool: &PgPool,
    config: &AppConfig,
    trigger: &str,
) -> Result<i32, CatalogError> {
    let seed = match layette_core::load_seed_catalog(&config.seed_path) {
        Ok(seed) => seed,
        Err(ConfigError::SeedFileIo { path, source })
            if source.kind() == io::ErrorKind::NotFound =>
        {
            tracing::warn!(path = %path, "macrobaby seed file not found; skipping sync");
            return Ok(0);
        }
        Err(e) => return Err(e.into()),
    };

    run_source_sync(pool, Source::Macro, trigger, async move {
        Ok::<_, FeedError>(seed_catalog(&seed))
    })
    .await
}

/// Runs every catalog source sync in order, isolating failures per source.
///
/// One failing source never aborts the others; each failure is logged and
/// recorded in the returned [`SyncSummary`] so the caller can decide how
/// loudly to complain.
pub async fn import_all(
    pool: &PgPool,
    config: &AppConfig,
    client: &FeedClient,
    trigger: &str,
) -> SyncSummary {
    let mut summary = SyncSummary::default();

    summary.record(Source::Cj, import_cj_catalog(pool, config, client, trigger).await);
    summary.record(
        Source::Impact,
        import_impact_catalog(pool, config, client, trigger).await,
    );
    summary.record(
        Source::Silvercross,
        import_silvercross_catalog(pool, config, client, trigger).await,
    );
    summary.record(
        Source::Macro,
        import_macrobaby_catalog(pool, config, trigger).await,
    );

    let failed = summary.failed_sources();
    if failed.is_empty() {
        tracing::info!(
            total = summary.total_imported(),
            "catalog sync finished for all sources"
        );
    } else {
        tracing::warn!(
            total = summary.total_imported(),
            failed = failed.len(),
            "catalog sync finished with failing sources"
        );
    }

    summary
}

/// Shared lifecycle for one source: create run, start, fetch, upsert,
/// complete. A whole-payload parse failure counts as an empty feed; every
/// other fetch error fails the run and propagates.
async fn run_source_sync<F>(
    pool: &PgPool,
    source: Source,
    trigger: &str,
    fetch: F,
) -> Result<i32, CatalogError>
where
    F: Future<Output = Result<Vec<CatalogProduct>, FeedError>>,
{
    let run = create_sync_run(pool, source, trigger).await?;
    start_sync_run(pool, run.id).await?;

    let result: Result<i32, CatalogError> = async {
        let products = match fetch.await {
            Ok(products) => products,
            Err(e) if e.is_malformed_payload() => {
                tracing::warn!(
                    source = %source,
                    error = %e,
                    "feed payload was unparseable; treating as an empty feed"
                );
                return Ok(0);
            }
            Err(e) => return Err(CatalogError::from(e)),
        };

        if products.is_empty() {
            tracing::warn!(source = %source, "feed is configured but returned no usable entries");
            return Ok(0);
        }

        let (new_count, updated_count) = upsert_catalog_items(pool, &products).await?;
        tracing::info!(
            source = %source,
            new = new_count,
            updated = updated_count,
            "catalog upsert finished"
        );

        Ok(i32::try_from(new_count + updated_count).unwrap_or(i32::MAX))
    }
    .await;

    match result {
        Ok(records) => {
            if let Err(err) = complete_sync_run(pool, run.id, records).await {
                let message = err.to_string();
                fail_run_best_effort(pool, run.id, source, message).await;
                return Err(err.into());
            }
            Ok(records)
        }
        Err(err) => {
            fail_run_best_effort(pool, run.id, source, err.to_string()).await;
            Err(err)
        }
    }
}

async fn fail_run_best_effort(pool: &PgPool, run_id: i64, source: Source, message: String) {
    if let Err(mark_err) = fail_sync_run(pool, run_id, &message).await {
        tracing::error!(
            run_id,
            source = %source,
            error = %mark_err,
            "failed to mark sync run as failed"
        );
    }
}
