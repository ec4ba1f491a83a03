//! Database schema migrations
//!
//! Ordered, numbered schema steps applied on every process start.
//!
//! # Idempotence
//!
//! No applied-version table is kept. Every statement is a plain `CREATE TABLE` or
//! `CREATE INDEX` (no `IF NOT EXISTS`), and a statement rejected by SQLite with
//! "already exists" counts as applied. Anything else aborts the run and is returned
//! as [`Error::Migration`] naming the step.
//!
//! # Migration Guidelines
//!
//! 1. **Never modify existing steps** - databases in the field were built from them
//! 2. **Only append** - new schema changes get a new, higher version
//! 3. **Keep steps additive** - a step must be safe to replay against a database that
//!    already contains its tables and indexes

use crate::{Error, Result};
use sqlx::SqlitePool;
use tracing::{debug, info};

/// One numbered schema step
#[derive(Debug, Clone, Copy)]
pub struct MigrationStep {
    /// 1-based version, strictly ascending across the table
    pub version: u32,
    /// Human-readable name used in logs and errors
    pub name: &'static str,
    /// DDL statements executed in order
    pub statements: &'static [&'static str],
}

/// The static step table, in application order
pub static MIGRATIONS: &[MigrationStep] = &[
    MigrationStep {
        version: 1,
        name: "Create users table",
        statements: &[
            r#"
            CREATE TABLE users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL,
                name TEXT NOT NULL DEFAULT '',
                role TEXT NOT NULL DEFAULT 'user',
                password_hash TEXT NOT NULL,
                register_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            "CREATE UNIQUE INDEX idx_users_email ON users(email)",
            "CREATE INDEX idx_users_register_at ON users(register_at)",
        ],
    },
    MigrationStep {
        version: 2,
        name: "Create categories table",
        statements: &[
            r#"
            CREATE TABLE categories (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL
            )
            "#,
            "CREATE UNIQUE INDEX idx_categories_name ON categories(name)",
        ],
    },
    MigrationStep {
        version: 3,
        name: "Create restaurants table",
        statements: &[
            r#"
            CREATE TABLE restaurants (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                category_id TEXT,
                latitude REAL,
                longitude REAL,
                address TEXT NOT NULL DEFAULT ''
            )
            "#,
            "CREATE INDEX idx_restaurants_name ON restaurants(name)",
            "CREATE INDEX idx_restaurants_category ON restaurants(category_id)",
            "CREATE INDEX idx_restaurants_location ON restaurants(latitude, longitude)",
        ],
    },
    MigrationStep {
        version: 4,
        name: "Create reviews table",
        statements: &[
            r#"
            CREATE TABLE reviews (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                restaurant_id TEXT NOT NULL,
                text TEXT NOT NULL,
                rating REAL NOT NULL CHECK (rating >= 0 AND rating <= 5),
                created_at TIMESTAMP NOT NULL
            )
            "#,
            "CREATE INDEX idx_reviews_user_restaurant ON reviews(user_id, restaurant_id)",
            "CREATE INDEX idx_reviews_created_at ON reviews(created_at)",
        ],
    },
    MigrationStep {
        version: 5,
        name: "Create nlp_results table",
        statements: &[
            r#"
            CREATE TABLE nlp_results (
                id TEXT PRIMARY KEY,
                review_id TEXT NOT NULL,
                sentiment TEXT NOT NULL,
                keywords TEXT NOT NULL DEFAULT '[]'
            )
            "#,
            "CREATE UNIQUE INDEX idx_nlp_results_review ON nlp_results(review_id)",
            "CREATE INDEX idx_nlp_results_sentiment ON nlp_results(sentiment)",
        ],
    },
    MigrationStep {
        version: 6,
        name: "Create ratings table",
        statements: &[
            r#"
            CREATE TABLE ratings (
                id TEXT PRIMARY KEY,
                restaurant_id TEXT NOT NULL,
                average_rating REAL NOT NULL,
                review_count INTEGER NOT NULL CHECK (review_count >= 0)
            )
            "#,
            // The aggregate upsert resolves conflicts on this index
            "CREATE UNIQUE INDEX idx_ratings_restaurant ON ratings(restaurant_id)",
            "CREATE INDEX idx_ratings_average ON ratings(average_rating DESC)",
        ],
    },
    MigrationStep {
        version: 7,
        name: "Create admins_logs table",
        statements: &[
            r#"
            CREATE TABLE admins_logs (
                id TEXT PRIMARY KEY,
                admin_id TEXT NOT NULL,
                action_type TEXT NOT NULL,
                details TEXT NOT NULL DEFAULT '',
                created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            "CREATE INDEX idx_admins_logs_admin ON admins_logs(admin_id)",
            "CREATE INDEX idx_admins_logs_action ON admins_logs(action_type)",
            "CREATE INDEX idx_admins_logs_created_at ON admins_logs(created_at)",
        ],
    },
    MigrationStep {
        version: 8,
        name: "Create favorites table",
        statements: &[
            r#"
            CREATE TABLE favorites (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                restaurant_id TEXT NOT NULL,
                added_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
            "CREATE UNIQUE INDEX idx_favorites_user_restaurant ON favorites(user_id, restaurant_id)",
            "CREATE INDEX idx_favorites_added_at ON favorites(added_at)",
        ],
    },
];

/// Apply every step of [`MIGRATIONS`] in version order
pub async fn apply_all(pool: &SqlitePool) -> Result<()> {
    apply_steps(pool, MIGRATIONS).await
}

/// Apply an arbitrary step table in ascending version order
///
/// Stops at the first statement that fails with anything other than "already exists".
/// Steps applied before the failure stay applied.
pub async fn apply_steps(pool: &SqlitePool, steps: &[MigrationStep]) -> Result<()> {
    let mut ordered: Vec<&MigrationStep> = steps.iter().collect();
    ordered.sort_by_key(|step| step.version);

    for step in ordered {
        info!("Applying migration {}: {}", step.version, step.name);

        for statement in step.statements {
            match sqlx::query(statement).execute(pool).await {
                Ok(_) => {}
                Err(e) if is_already_exists(&e) => {
                    debug!("  migration {}: {}", step.version, e);
                }
                Err(source) => {
                    return Err(Error::Migration {
                        version: step.version,
                        name: step.name,
                        source,
                    });
                }
            }
        }

        info!("✓ Migration {} applied", step.version);
    }

    Ok(())
}

/// SQLite reports an existing table or index as a generic SQLITE_ERROR,
/// so the message text is the only discriminator.
fn is_already_exists(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.message().contains("already exists"),
        _ => false,
    }
}
