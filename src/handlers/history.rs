//! History handler

use axum::{extract::{Path, Query, State}, Json};

use crate::{AppState, AppError, AppResult};
use crate::history::{parse_bound, BoundKind};
use crate::models::{HistoryFilter, SortOrder, StoredRecord};

/// List past verdicts for a chair, newest first unless `order=asc`
pub async fn list(
    State(state): State<AppState>,
    Path(chair_id): Path<String>,
    Query(filter): Query<HistoryFilter>,
) -> AppResult<Json<Vec<StoredRecord>>> {
    let from = filter.from
        .as_deref()
        .map(|raw| parse_bound(raw, BoundKind::From))
        .transpose()
        .map_err(AppError::ValidationError)?;
    let to = filter.to
        .as_deref()
        .map(|raw| parse_bound(raw, BoundKind::To))
        .transpose()
        .map_err(AppError::ValidationError)?;

    let limit = filter.limit
        .as_deref()
        .map(parse_limit)
        .transpose()?;
    let order = filter.order
        .as_deref()
        .map(str::parse::<SortOrder>)
        .transpose()
        .map_err(AppError::ValidationError)?
        .unwrap_or_default();

    let records = state.history
        .query(&chair_id, from, to, limit, order)
        .await?;

    Ok(Json(records))
}

fn parse_limit(raw: &str) -> AppResult<usize> {
    match raw.trim().parse::<i64>() {
        Ok(n) if n >= 1 => Ok(usize::try_from(n).unwrap_or(usize::MAX)),
        Ok(_) => Err(AppError::ValidationError("limit must be positive".to_string())),
        Err(_) => Err(AppError::ValidationError(format!("invalid limit '{}'", raw))),
    }
}
