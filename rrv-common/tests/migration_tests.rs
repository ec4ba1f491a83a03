//! Integration tests for the schema migration ledger
//!
//! Tests cover:
//! - Fresh database bootstrap creates every table and index
//! - Replaying the ledger is a no-op (no error, no duplicate indexes)
//! - Pre-existing tables without their indexes get the indexes on replay
//! - A real failure stops the run and names the failing step

use rrv_common::db::init::init_database;
use rrv_common::db::migrations::{apply_all, apply_steps, MigrationStep, MIGRATIONS};
use rrv_common::Error;
use sqlx::SqlitePool;
use tempfile::TempDir;

const EXPECTED_TABLES: &[&str] = &[
    "users",
    "categories",
    "restaurants",
    "reviews",
    "nlp_results",
    "ratings",
    "admins_logs",
    "favorites",
];

/// Test helper: bare pool on a throwaway file, no migrations applied
async fn bare_pool(dir: &TempDir) -> SqlitePool {
    let path = dir.path().join("bare.db");
    SqlitePool::connect(&format!("sqlite://{}?mode=rwc", path.display()))
        .await
        .expect("Should open test database")
}

async fn table_exists(pool: &SqlitePool, name: &str) -> bool {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?)",
    )
    .bind(name)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn index_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name LIKE 'idx_%'",
    )
    .fetch_one(pool)
    .await
    .unwrap()
}

#[tokio::test]
async fn test_fresh_database_gets_full_schema() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("reviews.db")).await.unwrap();

    for table in EXPECTED_TABLES {
        assert!(table_exists(&pool, table).await, "table {} missing", table);
    }
    assert_eq!(index_count(&pool).await, 17);
}

#[tokio::test]
async fn test_replay_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let pool = bare_pool(&dir).await;

    apply_all(&pool).await.expect("first run");
    let after_first = index_count(&pool).await;

    apply_all(&pool).await.expect("second run");
    apply_all(&pool).await.expect("third run");

    assert_eq!(index_count(&pool).await, after_first);
}

#[tokio::test]
async fn test_reopening_database_keeps_data() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("reviews.db");

    let pool = init_database(&db_path).await.unwrap();
    sqlx::query(
        "INSERT INTO ratings (id, restaurant_id, average_rating, review_count) VALUES ('r1', 'rest-1', 4.5, 2)",
    )
    .execute(&pool)
    .await
    .unwrap();
    pool.close().await;

    let pool = init_database(&db_path).await.expect("reopen should succeed");
    let count: i64 = sqlx::query_scalar("SELECT review_count FROM ratings WHERE restaurant_id = 'rest-1'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn test_existing_table_without_indexes_is_completed() {
    let dir = TempDir::new().unwrap();
    let pool = bare_pool(&dir).await;

    // Simulate a database created before the ratings indexes existed
    sqlx::query(
        "CREATE TABLE ratings (id TEXT PRIMARY KEY, restaurant_id TEXT NOT NULL, average_rating REAL NOT NULL, review_count INTEGER NOT NULL)",
    )
    .execute(&pool)
    .await
    .unwrap();

    apply_all(&pool).await.expect("existing table must be tolerated");

    let has_unique: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'index' AND name = 'idx_ratings_restaurant')",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert!(has_unique);
}

#[tokio::test]
async fn test_failure_names_step_and_stops_run() {
    let dir = TempDir::new().unwrap();
    let pool = bare_pool(&dir).await;

    let steps = [
        MigrationStep {
            version: 1,
            name: "Create alpha",
            statements: &["CREATE TABLE alpha (x INTEGER)"],
        },
        MigrationStep {
            version: 2,
            name: "Broken step",
            statements: &["CREATE TABLEE beta (x INTEGER)"],
        },
        MigrationStep {
            version: 3,
            name: "Create gamma",
            statements: &["CREATE TABLE gamma (x INTEGER)"],
        },
    ];

    let err = apply_steps(&pool, &steps).await.unwrap_err();
    match &err {
        Error::Migration { version, name, .. } => {
            assert_eq!(*version, 2);
            assert_eq!(*name, "Broken step");
        }
        other => panic!("expected migration error, got {:?}", other),
    }
    assert!(err.to_string().contains("migration 2"));

    // No rollback of earlier steps, no continuation past the failure
    assert!(table_exists(&pool, "alpha").await);
    assert!(!table_exists(&pool, "gamma").await);
}

#[tokio::test]
async fn test_steps_run_in_version_order() {
    let dir = TempDir::new().unwrap();
    let pool = bare_pool(&dir).await;

    // Step 2 depends on step 1; declared backwards on purpose
    let steps = [
        MigrationStep {
            version: 2,
            name: "Index alpha",
            statements: &["CREATE INDEX idx_alpha_x ON alpha(x)"],
        },
        MigrationStep {
            version: 1,
            name: "Create alpha",
            statements: &["CREATE TABLE alpha (x INTEGER)"],
        },
    ];

    apply_steps(&pool, &steps).await.expect("ordered by version");
}

#[test]
fn test_static_table_covers_every_table() {
    let names: Vec<&str> = MIGRATIONS.iter().map(|step| step.name).collect();
    for table in EXPECTED_TABLES {
        assert!(
            names.iter().any(|name| name.contains(table)),
            "no migration creates {}",
            table
        );
    }
}
