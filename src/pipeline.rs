//! Ingestion Pipeline
//!
//! Validate → classify → append to the store → publish to the hub.
//!
//! A verdict is published only after its append succeeded, so live observers
//! never see a reading that history cannot return. Publish failures
//! ([`PublishError`]) are logged and never undo the write.
//!
//! Submissions for the same source pass through a per-source FIFO lane, so the
//! store sees them in the order they were received. Different sources never
//! wait on each other.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::classifier::{classify_from_keypoints, classify_from_pressure};
use crate::hub::{BroadcastHub, PublishError};
use crate::models::{KeypointSet, PoseData, PostureVerdict, SensorReading, SENSOR_COUNT};
use crate::store::{ReadingStore, StoreError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// Reading rejected before classification; nothing was stored or published
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Append failed; nothing was published. Safe to retry.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl PipelineError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, PipelineError::StorageUnavailable(_))
    }
}

impl From<StoreError> for PipelineError {
    fn from(err: StoreError) -> Self {
        PipelineError::StorageUnavailable(err.to_string())
    }
}

pub struct IngestionPipeline {
    store: Arc<dyn ReadingStore>,
    hub: Arc<BroadcastHub>,
    lanes: SourceLanes,
}

impl IngestionPipeline {
    pub fn new(store: Arc<dyn ReadingStore>, hub: Arc<BroadcastHub>) -> Self {
        Self {
            store,
            hub,
            lanes: SourceLanes::default(),
        }
    }

    /// Classify and record a pressure push from a chair
    pub async fn submit_sensor_reading(&self, reading: SensorReading) -> Result<PostureVerdict, PipelineError> {
        let values = validate_sensor_values(&reading).map_err(|e| {
            tracing::warn!("Rejected reading from {}: {}", reading.source_id, e);
            e
        })?;

        let verdict = PostureVerdict {
            source_id: reading.source_id,
            timestamp: reading.captured_at,
            sensors: Some(reading.sensors),
            pose_data: None,
            posture_status: classify_from_pressure(values),
        };

        self.commit(verdict).await
    }

    /// Classify and record a keypoint push.
    ///
    /// Missing landmarks are not an error: the reading is recorded as
    /// `insufficient_data`.
    pub async fn submit_keypoints(&self, keypoints: KeypointSet) -> Result<PostureVerdict, PipelineError> {
        let posture_status = classify_from_keypoints(&keypoints.keypoints);

        let verdict = PostureVerdict {
            source_id: keypoints.source_id,
            timestamp: keypoints.captured_at,
            sensors: None,
            pose_data: Some(PoseData { keypoints: keypoints.keypoints }),
            posture_status,
        };

        self.commit(verdict).await
    }

    async fn commit(&self, verdict: PostureVerdict) -> Result<PostureVerdict, PipelineError> {
        let _lane = self.lanes.enter(&verdict.source_id).await;

        tracing::debug!(
            "Classified reading from {} as {}",
            verdict.source_id, verdict.posture_status
        );

        let record = self.store.append(verdict).await.map_err(|e| {
            tracing::error!("Failed to store reading ({}): {}", self.store.name(), e);
            PipelineError::from(e)
        })?;

        // Best effort: a failed publish never rolls back the append
        match self.hub.publish(record.verdict.clone()) {
            Ok(reached) => {
                tracing::debug!("Broadcast record {} to {} subscribers", record.id, reached);
            }
            Err(PublishError::NoSubscribers) => {
                tracing::debug!("Record {} stored, no live subscribers", record.id);
            }
        }

        Ok(record.verdict)
    }
}

fn validate_sensor_values(reading: &SensorReading) -> Result<[f64; SENSOR_COUNT], PipelineError> {
    let values = reading.values();

    let values: [f64; SENSOR_COUNT] = values.as_slice().try_into().map_err(|_| {
        PipelineError::InvalidInput(format!(
            "expected {} sensor values, got {}",
            SENSOR_COUNT,
            values.len()
        ))
    })?;

    if values.iter().any(|v| !v.is_finite()) {
        return Err(PipelineError::InvalidInput("sensor values must be finite".to_string()));
    }

    Ok(values)
}

// ============================================================================
// PER-SOURCE LANES
// ============================================================================

/// FIFO locks keyed by source. Idle lanes are removed on exit.
#[derive(Default)]
struct SourceLanes {
    lanes: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl SourceLanes {
    async fn enter(&self, source: &str) -> LaneGuard<'_> {
        let lane = {
            let mut lanes = self.lanes.lock();
            lanes.entry(source.to_string()).or_default().clone()
        };

        LaneGuard {
            lanes: self,
            source: source.to_string(),
            guard: Some(lane.lock_owned().await),
        }
    }

    fn prune(&self, source: &str) {
        let mut lanes = self.lanes.lock();
        // Only the map holds it: nobody inside or queued
        if lanes.get(source).is_some_and(|lane| Arc::strong_count(lane) == 1) {
            lanes.remove(source);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.lanes.lock().len()
    }
}

struct LaneGuard<'a> {
    lanes: &'a SourceLanes,
    source: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for LaneGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        self.lanes.prune(&self.source);
    }
}

// ============================================================================
// TESTS
// ============================================================================
