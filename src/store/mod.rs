//! Reading Store
//!
//! Append-only persistence of classified readings. The pipeline only depends
//! on the [`ReadingStore`] trait; backends are picked at start-up.
//!
//! Canonical query order is verdict timestamp ascending, ties broken by
//! insertion order. When `limit` truncates a window, the most recent records
//! are kept.

pub mod memory;
pub mod postgres;

pub use memory::MemoryReadingStore;
pub use postgres::PgReadingStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{HistoryQuery, PostureVerdict, StoredRecord};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Backend unreachable or write rejected. Callers may retry.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A persisted row could not be decoded
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Store contract consumed by the ingestion pipeline and the history service.
///
/// Implementations must be safe to share across tasks. Records are never
/// mutated or deleted through this interface.
#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Short backend name for logging
    fn name(&self) -> &'static str;

    /// Persist a verdict, assigning identity and storage time
    async fn append(&self, verdict: PostureVerdict) -> Result<StoredRecord, StoreError>;

    /// Records for one source within an inclusive time window, in canonical order
    async fn query(&self, query: &HistoryQuery) -> Result<Vec<StoredRecord>, StoreError>;
}
