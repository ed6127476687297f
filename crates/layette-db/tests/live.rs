//! Live integration tests for layette-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/layette-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory.

use layette_core::{CatalogProduct, Source};
use layette_db::{
    complete_sync_run, count_catalog_items, create_sync_run, delete_registry_item,
    delete_registry_note, fail_sync_run, get_catalog_item, get_registry_item, get_sync_run,
    latest_note, list_catalog_items, list_registry_items, list_sync_runs, ping, run_migrations,
    start_sync_run, upsert_catalog_items, upsert_registry_items, upsert_registry_note,
    NewRegistryItem,
};
use rust_decimal::Decimal;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn make_product(source: Source, external_id: &str) -> CatalogProduct {
    CatalogProduct {
        external_id: external_id.to_string(),
        title: "Convertible Stroller".to_string(),
        brand: Some("Wave".to_string()),
        category: Some("Strollers & Travel".to_string()),
        image: Some("https://cdn.example.com/stroller.jpg".to_string()),
        url: Some("https://shop.example.com/p/stroller".to_string()),
        affiliate_url: Some("https://shop.example.com/p/stroller?sid=layette".to_string()),
        price: Some(499.0),
        retailer: Some("CJ Network".to_string()),
        source,
    }
}

fn make_registry_item(external_id: &str) -> NewRegistryItem {
    NewRegistryItem {
        external_id: external_id.to_string(),
        title: "Organic Crib Sheets".to_string(),
        brand: Some("Little Fern".to_string()),
        category: Some("nursery bedding".to_string()),
        description: None,
        image: None,
        url: Some("https://shop.example.com/sheets".to_string()),
        affiliate_url: Some("https://shop.example.com/sheets?ref=layette".to_string()),
        price: Some(34.99),
        retailer: Some("Silver Cross".to_string()),
        source: Source::Silvercross,
        imported_from: None,
    }
}

// ---------------------------------------------------------------------------
// Section 1: Sync Run Lifecycle
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn sync_run_lifecycle_queued_to_succeeded(pool: sqlx::PgPool) {
    let run = create_sync_run(&pool, Source::Cj, "cli")
        .await
        .expect("create_sync_run failed");

    assert_eq!(run.status, "queued");
    assert_eq!(run.source, "cj");
    assert!(run.started_at.is_none());
    assert!(run.completed_at.is_none());
    assert_eq!(run.records_processed, 0);

    start_sync_run(&pool, run.id)
        .await
        .expect("start_sync_run failed");

    complete_sync_run(&pool, run.id, 17)
        .await
        .expect("complete_sync_run failed");

    let fetched = get_sync_run(&pool, run.id).await.expect("get_sync_run failed");

    assert_eq!(fetched.status, "succeeded");
    assert!(fetched.started_at.is_some(), "started_at should be set");
    assert!(fetched.completed_at.is_some(), "completed_at should be set");
    assert_eq!(fetched.records_processed, 17);
    assert!(fetched.error_message.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn sync_run_lifecycle_queued_to_failed(pool: sqlx::PgPool) {
    let run = create_sync_run(&pool, Source::Impact, "scheduler")
        .await
        .expect("create_sync_run failed");

    start_sync_run(&pool, run.id)
        .await
        .expect("start_sync_run failed");

    fail_sync_run(&pool, run.id, "upstream returned 502")
        .await
        .expect("fail_sync_run failed");

    let fetched = get_sync_run(&pool, run.id).await.expect("get_sync_run failed");

    assert_eq!(fetched.status, "failed");
    assert!(fetched.started_at.is_some(), "started_at should be set");
    assert!(fetched.completed_at.is_some(), "completed_at should be set");
    assert_eq!(fetched.error_message.as_deref(), Some("upstream returned 502"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn sync_run_cannot_complete_directly_from_queued(pool: sqlx::PgPool) {
    let run = create_sync_run(&pool, Source::Cj, "cli")
        .await
        .expect("create_sync_run failed");

    let err = complete_sync_run(&pool, run.id, 1)
        .await
        .expect_err("completing a queued run should fail");

    assert!(matches!(
        err,
        layette_db::DbError::InvalidSyncRunTransition {
            expected_status: "running",
            ..
        }
    ));
}

#[sqlx::test(migrations = "../../migrations")]
async fn sync_run_start_fails_for_unknown_id(pool: sqlx::PgPool) {
    let err = start_sync_run(&pool, 999_999)
        .await
        .expect_err("starting an unknown run should fail");
    assert!(matches!(
        err,
        layette_db::DbError::InvalidSyncRunTransition {
            expected_status: "queued",
            ..
        }
    ));
}

#[sqlx::test(migrations = "../../migrations")]
async fn sync_run_list_returns_newest_first(pool: sqlx::PgPool) {
    let first = create_sync_run(&pool, Source::Cj, "cli").await.expect("create failed");
    let second = create_sync_run(&pool, Source::Impact, "cli")
        .await
        .expect("create failed");
    let third = create_sync_run(&pool, Source::Macro, "cli")
        .await
        .expect("create failed");

    let runs = list_sync_runs(&pool, 2).await.expect("list failed");

    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].id, third.id);
    assert_eq!(runs[1].id, second.id);
    assert!(runs.iter().all(|r| r.id != first.id));
}

// ---------------------------------------------------------------------------
// Section 2: Catalog Upsert Idempotency
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn catalog_upsert_counts_new_and_updated(pool: sqlx::PgPool) {
    let batch = vec![
        make_product(Source::Cj, "SKU-001"),
        make_product(Source::Cj, "SKU-002"),
    ];

    let (new_count, updated_count) = upsert_catalog_items(&pool, &batch)
        .await
        .expect("first upsert failed");
    assert_eq!((new_count, updated_count), (2, 0));

    let (new_count, updated_count) = upsert_catalog_items(&pool, &batch)
        .await
        .expect("second upsert failed");
    assert_eq!((new_count, updated_count), (0, 2));

    let total = count_catalog_items(&pool, Some(Source::Cj))
        .await
        .expect("count failed");
    assert_eq!(total, 2, "re-importing the same batch must not create rows");
}

#[sqlx::test(migrations = "../../migrations")]
async fn catalog_upsert_tolerates_duplicates_within_batch(pool: sqlx::PgPool) {
    // Three entries, two sharing an external_id: the feed equivalent of a
    // CSV that repeats a SKU. The later entry wins.
    let mut duplicate = make_product(Source::Silvercross, "SC-1");
    duplicate.title = "Pioneer Pram (restock)".to_string();
    let batch = vec![
        make_product(Source::Silvercross, "SC-1"),
        make_product(Source::Silvercross, "SC-2"),
        duplicate,
    ];

    upsert_catalog_items(&pool, &batch).await.expect("first upsert failed");
    upsert_catalog_items(&pool, &batch).await.expect("second upsert failed");

    let total = count_catalog_items(&pool, Some(Source::Silvercross))
        .await
        .expect("count failed");
    assert_eq!(total, 2);

    let row = get_catalog_item(&pool, Source::Silvercross, "SC-1")
        .await
        .expect("get failed");
    assert_eq!(row.title, "Pioneer Pram (restock)");
}

#[sqlx::test(migrations = "../../migrations")]
async fn catalog_upsert_updates_fields_on_conflict(pool: sqlx::PgPool) {
    let mut product = make_product(Source::Impact, "IMP-1");
    upsert_catalog_items(&pool, std::slice::from_ref(&product))
        .await
        .expect("first upsert failed");

    product.title = "Updated Stroller Name".to_string();
    product.price = Some(449.5);
    upsert_catalog_items(&pool, std::slice::from_ref(&product))
        .await
        .expect("second upsert failed");

    let row = get_catalog_item(&pool, Source::Impact, "IMP-1")
        .await
        .expect("get failed");

    assert_eq!(row.title, "Updated Stroller Name");
    assert_eq!(row.price, Some(Decimal::new(44_950, 2)));
}

#[sqlx::test(migrations = "../../migrations")]
async fn catalog_upsert_empty_batch_is_noop(pool: sqlx::PgPool) {
    let (new_count, updated_count) = upsert_catalog_items(&pool, &[])
        .await
        .expect("empty upsert failed");
    assert_eq!((new_count, updated_count), (0, 0));
}

#[sqlx::test(migrations = "../../migrations")]
async fn catalog_sources_do_not_collide(pool: sqlx::PgPool) {
    // Same external_id under two sources must stay two distinct rows.
    let batch = vec![
        make_product(Source::Cj, "SHARED-1"),
        make_product(Source::Impact, "SHARED-1"),
    ];

    let (new_count, _) = upsert_catalog_items(&pool, &batch).await.expect("upsert failed");
    assert_eq!(new_count, 2);

    let cj_row = get_catalog_item(&pool, Source::Cj, "SHARED-1")
        .await
        .expect("cj row missing");
    let impact_row = get_catalog_item(&pool, Source::Impact, "SHARED-1")
        .await
        .expect("impact row missing");
    assert_ne!(cj_row.id, impact_row.id);
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_catalog_items_filters_by_source(pool: sqlx::PgPool) {
    let batch = vec![
        make_product(Source::Cj, "A"),
        make_product(Source::Impact, "B"),
        make_product(Source::Impact, "C"),
    ];
    upsert_catalog_items(&pool, &batch).await.expect("upsert failed");

    let impact_only = list_catalog_items(&pool, Some(Source::Impact), 50)
        .await
        .expect("list failed");
    assert_eq!(impact_only.len(), 2);
    assert!(impact_only.iter().all(|r| r.source == "impact"));

    let all = list_catalog_items(&pool, None, 50).await.expect("list failed");
    assert_eq!(all.len(), 3);
}

// ---------------------------------------------------------------------------
// Section 3: Registry Items
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn registry_reimport_is_idempotent(pool: sqlx::PgPool) {
    let user_id = Uuid::new_v4();
    let batch = vec![make_registry_item("ext-1"), make_registry_item("ext-2")];

    let (new_count, updated_count) = upsert_registry_items(&pool, user_id, &batch)
        .await
        .expect("first upsert failed");
    assert_eq!((new_count, updated_count), (2, 0));

    let (new_count, updated_count) = upsert_registry_items(&pool, user_id, &batch)
        .await
        .expect("second upsert failed");
    assert_eq!((new_count, updated_count), (0, 2));

    let items = list_registry_items(&pool, user_id).await.expect("list failed");
    assert_eq!(items.len(), 2);
}

#[sqlx::test(migrations = "../../migrations")]
async fn registry_items_are_scoped_per_user(pool: sqlx::PgPool) {
    let user_a = Uuid::new_v4();
    let user_b = Uuid::new_v4();
    let batch = vec![make_registry_item("shared-ext")];

    upsert_registry_items(&pool, user_a, &batch)
        .await
        .expect("user_a upsert failed");
    upsert_registry_items(&pool, user_b, &batch)
        .await
        .expect("user_b upsert failed");

    let items_a = list_registry_items(&pool, user_a).await.expect("list failed");
    let items_b = list_registry_items(&pool, user_b).await.expect("list failed");

    assert_eq!(items_a.len(), 1);
    assert_eq!(items_b.len(), 1);
    assert_ne!(items_a[0].id, items_b[0].id);
}

#[sqlx::test(migrations = "../../migrations")]
async fn registry_upsert_replaces_fields(pool: sqlx::PgPool) {
    let user_id = Uuid::new_v4();
    let mut item = make_registry_item("ext-1");
    upsert_registry_items(&pool, user_id, std::slice::from_ref(&item))
        .await
        .expect("first upsert failed");

    item.title = "Organic Crib Sheets (twin pack)".to_string();
    item.price = Some(59.99);
    upsert_registry_items(&pool, user_id, std::slice::from_ref(&item))
        .await
        .expect("second upsert failed");

    let items = list_registry_items(&pool, user_id).await.expect("list failed");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].title, "Organic Crib Sheets (twin pack)");
    assert_eq!(items[0].price, Some(Decimal::new(5_999, 2)));
}

#[sqlx::test(migrations = "../../migrations")]
async fn delete_registry_item_is_scoped_to_owner(pool: sqlx::PgPool) {
    let owner = Uuid::new_v4();
    let stranger = Uuid::new_v4();
    upsert_registry_items(&pool, owner, &[make_registry_item("ext-1")])
        .await
        .expect("upsert failed");
    let item_id = list_registry_items(&pool, owner).await.expect("list failed")[0].id;

    let removed = delete_registry_item(&pool, stranger, item_id)
        .await
        .expect("delete failed");
    assert_eq!(removed, 0, "a different user must not delete the item");

    let removed = delete_registry_item(&pool, owner, item_id)
        .await
        .expect("delete failed");
    assert_eq!(removed, 1);

    let items = list_registry_items(&pool, owner).await.expect("list failed");
    assert!(items.is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn get_registry_item_returns_not_found_for_other_user(pool: sqlx::PgPool) {
    let owner = Uuid::new_v4();
    upsert_registry_items(&pool, owner, &[make_registry_item("ext-1")])
        .await
        .expect("upsert failed");
    let item_id = list_registry_items(&pool, owner).await.expect("list failed")[0].id;

    let err = get_registry_item(&pool, Uuid::new_v4(), item_id)
        .await
        .expect_err("expected NotFound for a different user");
    assert!(matches!(err, layette_db::DbError::NotFound));
}

// ---------------------------------------------------------------------------
// Section 4: Mentor Notes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn note_upsert_replaces_previous_text(pool: sqlx::PgPool) {
    let user_id = Uuid::new_v4();
    let mentor_id = Uuid::new_v4();
    upsert_registry_items(&pool, user_id, &[make_registry_item("ext-1")])
        .await
        .expect("upsert failed");
    let item_id = list_registry_items(&pool, user_id).await.expect("list failed")[0].id;

    let first = upsert_registry_note(&pool, item_id, mentor_id, "great pick")
        .await
        .expect("first note failed");
    let second = upsert_registry_note(&pool, item_id, mentor_id, "even better in grey")
        .await
        .expect("second note failed");

    assert_eq!(first.id, second.id, "editing a note must not create a second row");
    assert_eq!(second.note, "even better in grey");

    let items = list_registry_items(&pool, user_id).await.expect("list failed");
    assert_eq!(items[0].mentor_note.as_deref(), Some("even better in grey"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn latest_note_wins_across_mentors(pool: sqlx::PgPool) {
    let user_id = Uuid::new_v4();
    upsert_registry_items(&pool, user_id, &[make_registry_item("ext-1")])
        .await
        .expect("upsert failed");
    let item_id = list_registry_items(&pool, user_id).await.expect("list failed")[0].id;

    upsert_registry_note(&pool, item_id, Uuid::new_v4(), "first mentor")
        .await
        .expect("first note failed");
    upsert_registry_note(&pool, item_id, Uuid::new_v4(), "second mentor")
        .await
        .expect("second note failed");

    let note = latest_note(&pool, item_id)
        .await
        .expect("latest_note failed")
        .expect("expected a note");
    assert_eq!(note.note, "second mentor");

    let items = list_registry_items(&pool, user_id).await.expect("list failed");
    assert_eq!(items[0].mentor_note.as_deref(), Some("second mentor"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn deleting_note_clears_mentor_note(pool: sqlx::PgPool) {
    let user_id = Uuid::new_v4();
    let mentor_id = Uuid::new_v4();
    upsert_registry_items(&pool, user_id, &[make_registry_item("ext-1")])
        .await
        .expect("upsert failed");
    let item_id = list_registry_items(&pool, user_id).await.expect("list failed")[0].id;

    upsert_registry_note(&pool, item_id, mentor_id, "note to clear")
        .await
        .expect("note failed");

    let removed = delete_registry_note(&pool, item_id, mentor_id)
        .await
        .expect("delete failed");
    assert_eq!(removed, 1);

    let items = list_registry_items(&pool, user_id).await.expect("list failed");
    assert!(items[0].mentor_note.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn notes_cascade_when_item_is_deleted(pool: sqlx::PgPool) {
    let user_id = Uuid::new_v4();
    upsert_registry_items(&pool, user_id, &[make_registry_item("ext-1")])
        .await
        .expect("upsert failed");
    let item_id = list_registry_items(&pool, user_id).await.expect("list failed")[0].id;

    upsert_registry_note(&pool, item_id, Uuid::new_v4(), "soon orphaned")
        .await
        .expect("note failed");

    delete_registry_item(&pool, user_id, item_id)
        .await
        .expect("delete failed");

    let remaining: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM registry_notes WHERE registry_item_id = $1")
            .bind(item_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(remaining, 0, "notes must cascade with their item");
}

// ---------------------------------------------------------------------------
// Section 5: Pool & Migrations
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn ping_succeeds_on_live_pool(pool: sqlx::PgPool) {
    ping(&pool).await.expect("ping failed");
}

#[sqlx::test(migrations = "../../migrations")]
async fn rerunning_migrations_applies_nothing(pool: sqlx::PgPool) {
    // The test harness has already applied every migration, so a second run
    // must be a no-op and report zero newly applied.
    let applied = run_migrations(&pool).await.expect("run_migrations failed");
    assert_eq!(applied, 0);
}
