//! Stored record model

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use super::PostureVerdict;

/// Verdict as persisted by the reading store. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    pub id: Uuid,
    #[serde(flatten)]
    pub verdict: PostureVerdict,
    pub recorded_at: DateTime<Utc>,
}

/// Time-bounded read against the store for a single source
#[derive(Debug, Clone)]
pub struct HistoryQuery {
    pub source_id: String,
    /// Inclusive lower bound on the verdict timestamp
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on the verdict timestamp
    pub to: Option<DateTime<Utc>>,
    pub limit: usize,
}

impl HistoryQuery {
    pub fn new(source_id: impl Into<String>, limit: usize) -> Self {
        Self {
            source_id: source_id.into(),
            from: None,
            to: None,
            limit,
        }
    }

    pub fn contains(&self, record: &StoredRecord) -> bool {
        let ts = record.verdict.timestamp;
        record.verdict.source_id == self.source_id
            && self.from.map_or(true, |from| ts >= from)
            && self.to.map_or(true, |to| ts <= to)
    }
}

/// Presentation order applied by history consumers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("invalid order '{}', expected asc or desc", other)),
        }
    }
}

/// `GET /api/history/:chairId` query string.
///
/// Kept as raw strings so malformed values surface as validation errors.
#[derive(Debug, Deserialize, Default)]
pub struct HistoryFilter {
    pub limit: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub order: Option<String>,
}
