//! Database module - PostgreSQL connection and migrations

use sqlx::{postgres::PgPoolOptions, PgPool};

/// Create database connection pool
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    // Create tables if not exist
    sqlx::raw_sql(SCHEMA_SQL)
        .execute(pool)
        .await?;

    tracing::info!("Database schema applied successfully");
    Ok(())
}

/// Database schema SQL
const SCHEMA_SQL: &str = r#"
-- Classified readings (append-only)
CREATE TABLE IF NOT EXISTS posture_readings (
    id UUID PRIMARY KEY,
    seq BIGSERIAL,
    source_id VARCHAR(128) NOT NULL,
    "timestamp" TIMESTAMPTZ NOT NULL,
    sensors JSONB,
    pose_data JSONB,
    posture_status VARCHAR(32) NOT NULL,
    recorded_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_posture_readings_source_time ON posture_readings(source_id, "timestamp", seq);
"#;
