//! In-process reading store
//!
//! Used with `STORAGE_BACKEND=memory` and by tests. Can be switched into a
//! failing mode to exercise storage outages.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use super::{ReadingStore, StoreError};
use crate::models::{HistoryQuery, PostureVerdict, StoredRecord};

#[derive(Default)]
pub struct MemoryReadingStore {
    /// Insertion order
    records: RwLock<Vec<StoredRecord>>,
    unavailable: AtomicBool,
    append_calls: AtomicUsize,
}

impl MemoryReadingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent append fail with `StoreError::Unavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of append attempts, successful or not
    pub fn append_calls(&self) -> usize {
        self.append_calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ReadingStore for MemoryReadingStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn append(&self, verdict: PostureVerdict) -> Result<StoredRecord, StoreError> {
        self.append_calls.fetch_add(1, Ordering::SeqCst);

        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store offline".to_string()));
        }

        let record = StoredRecord {
            id: Uuid::new_v4(),
            verdict,
            recorded_at: Utc::now(),
        };
        self.records.write().push(record.clone());
        Ok(record)
    }

    async fn query(&self, query: &HistoryQuery) -> Result<Vec<StoredRecord>, StoreError> {
        let mut matching: Vec<StoredRecord> = self.records
            .read()
            .iter()
            .filter(|r| query.contains(r))
            .cloned()
            .collect();

        // Stable sort keeps insertion order for equal timestamps
        matching.sort_by_key(|r| r.verdict.timestamp);

        let skip = matching.len().saturating_sub(query.limit);
        Ok(matching.split_off(skip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration};
    use crate::models::PostureStatus;

    fn verdict(source: &str, timestamp: DateTime<Utc>, status: PostureStatus) -> PostureVerdict {
        PostureVerdict {
            source_id: source.to_string(),
            timestamp,
            sensors: None,
            pose_data: None,
            posture_status: status,
        }
    }

    #[tokio::test]
    async fn test_query_filters_by_source_and_inclusive_window() {
        let store = MemoryReadingStore::new();
        let base = Utc::now();

        for minutes in 0..5 {
            store.append(verdict("CHAIR01", base + Duration::minutes(minutes), PostureStatus::Good)).await.unwrap();
        }
        store.append(verdict("CHAIR02", base + Duration::minutes(2), PostureStatus::Poor)).await.unwrap();

        let query = HistoryQuery {
            from: Some(base + Duration::minutes(1)),
            to: Some(base + Duration::minutes(3)),
            ..HistoryQuery::new("CHAIR01", 100)
        };
        let records = store.query(&query).await.unwrap();

        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.verdict.source_id == "CHAIR01"));
        assert_eq!(records[0].verdict.timestamp, base + Duration::minutes(1));
        assert_eq!(records[2].verdict.timestamp, base + Duration::minutes(3));
    }

    #[tokio::test]
    async fn test_limit_keeps_most_recent_in_ascending_order() {
        let store = MemoryReadingStore::new();
        let base = Utc::now();

        // Appended out of timestamp order
        for minutes in [3, 0, 4, 1, 2] {
            store.append(verdict("CHAIR01", base + Duration::minutes(minutes), PostureStatus::Good)).await.unwrap();
        }

        let records = store.query(&HistoryQuery::new("CHAIR01", 2)).await.unwrap();
        let stamps: Vec<_> = records.iter().map(|r| r.verdict.timestamp).collect();
        assert_eq!(stamps, vec![base + Duration::minutes(3), base + Duration::minutes(4)]);
    }

    #[tokio::test]
    async fn test_equal_timestamps_keep_insertion_order() {
        let store = MemoryReadingStore::new();
        let ts = Utc::now();

        store.append(verdict("CHAIR01", ts, PostureStatus::Good)).await.unwrap();
        store.append(verdict("CHAIR01", ts, PostureStatus::Poor)).await.unwrap();

        let records = store.query(&HistoryQuery::new("CHAIR01", 10)).await.unwrap();
        assert_eq!(records[0].verdict.posture_status, PostureStatus::Good);
        assert_eq!(records[1].verdict.posture_status, PostureStatus::Poor);
    }

    #[tokio::test]
    async fn test_unavailable_store_rejects_append() {
        let store = MemoryReadingStore::new();
        store.set_unavailable(true);

        let result = store.append(verdict("CHAIR01", Utc::now(), PostureStatus::Good)).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert_eq!(store.append_calls(), 1);
        assert!(store.is_empty());
    }
}
