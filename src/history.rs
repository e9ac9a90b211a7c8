//! History query service
//!
//! Read path over the reading store for a source and time window. The store
//! returns oldest first; the caller picks the presentation order.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::models::{HistoryQuery, SortOrder, StoredRecord};
use crate::store::{ReadingStore, StoreError};

/// Which end of the window a raw bound describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundKind {
    From,
    To,
}

#[derive(Clone)]
pub struct HistoryQueryService {
    store: Arc<dyn ReadingStore>,
    default_limit: usize,
    max_limit: usize,
}

impl HistoryQueryService {
    pub fn new(store: Arc<dyn ReadingStore>, default_limit: usize, max_limit: usize) -> Self {
        Self {
            store,
            default_limit,
            max_limit: max_limit.max(1),
        }
    }

    /// Effective limit: default when absent, capped at the maximum
    pub fn resolve_limit(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default_limit).clamp(1, self.max_limit)
    }

    pub async fn query(
        &self,
        source_id: &str,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
        limit: Option<usize>,
        order: SortOrder,
    ) -> Result<Vec<StoredRecord>, StoreError> {
        let query = HistoryQuery {
            from,
            to,
            ..HistoryQuery::new(source_id, self.resolve_limit(limit))
        };

        let mut records = self.store.query(&query).await?;
        if order == SortOrder::Desc {
            records.reverse();
        }

        tracing::debug!("History for {}: {} records", source_id, records.len());
        Ok(records)
    }
}

/// Parse a window bound given as RFC3339 or as a plain `YYYY-MM-DD` date.
///
/// A plain date covers the whole day: start of day for `From`, last
/// instant of the day for `To`.
pub fn parse_bound(raw: &str, kind: BoundKind) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("invalid time bound '{}'", raw))?;

    let time = match kind {
        BoundKind::From => NaiveTime::from_hms_opt(0, 0, 0),
        BoundKind::To => NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999),
    }
    .ok_or_else(|| "invalid time of day".to_string())?;

    Ok(Utc.from_utc_datetime(&date.and_time(time)))
}
