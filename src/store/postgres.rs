//! PostgreSQL reading store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

use super::{ReadingStore, StoreError};
use crate::models::{HistoryQuery, PoseData, PostureVerdict, SensorValue, StoredRecord};

#[derive(Clone)]
pub struct PgReadingStore {
    pool: PgPool,
}

impl PgReadingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ReadingRow {
    id: Uuid,
    source_id: String,
    timestamp: DateTime<Utc>,
    sensors: Option<Json<Vec<SensorValue>>>,
    pose_data: Option<Json<PoseData>>,
    posture_status: String,
    recorded_at: DateTime<Utc>,
}

impl TryFrom<ReadingRow> for StoredRecord {
    type Error = StoreError;

    fn try_from(row: ReadingRow) -> Result<Self, Self::Error> {
        let posture_status = row.posture_status
            .parse()
            .map_err(|e: String| StoreError::Corrupt(format!("record {}: {}", row.id, e)))?;

        Ok(StoredRecord {
            id: row.id,
            verdict: PostureVerdict {
                source_id: row.source_id,
                timestamp: row.timestamp,
                sensors: row.sensors.map(|Json(s)| s),
                pose_data: row.pose_data.map(|Json(p)| p),
                posture_status,
            },
            recorded_at: row.recorded_at,
        })
    }
}

#[async_trait]
impl ReadingStore for PgReadingStore {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn append(&self, verdict: PostureVerdict) -> Result<StoredRecord, StoreError> {
        let row = sqlx::query_as::<_, ReadingRow>(
            r#"
            INSERT INTO posture_readings (id, source_id, "timestamp", sensors, pose_data, posture_status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, source_id, "timestamp", sensors, pose_data, posture_status, recorded_at
            "#
        )
        .bind(Uuid::new_v4())
        .bind(&verdict.source_id)
        .bind(verdict.timestamp)
        .bind(verdict.sensors.as_ref().map(Json))
        .bind(verdict.pose_data.as_ref().map(Json))
        .bind(verdict.posture_status.as_str())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn query(&self, query: &HistoryQuery) -> Result<Vec<StoredRecord>, StoreError> {
        // Newest `limit` rows of the window, returned oldest first
        let rows = sqlx::query_as::<_, ReadingRow>(
            r#"
            SELECT id, source_id, "timestamp", sensors, pose_data, posture_status, recorded_at
            FROM (
                SELECT * FROM posture_readings
                WHERE source_id = $1
                  AND ($2::timestamptz IS NULL OR "timestamp" >= $2)
                  AND ($3::timestamptz IS NULL OR "timestamp" <= $3)
                ORDER BY "timestamp" DESC, seq DESC
                LIMIT $4
            ) recent
            ORDER BY "timestamp" ASC, seq ASC
            "#
        )
        .bind(&query.source_id)
        .bind(query.from)
        .bind(query.to)
        .bind(i64::try_from(query.limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(StoredRecord::try_from).collect()
    }
}
