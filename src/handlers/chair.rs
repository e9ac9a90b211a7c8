//! Chair sensor push handler

use axum::{extract::State, Json};
use chrono::Utc;
use validator::Validate;

use crate::{AppState, AppError, AppResult};
use crate::models::{ChairPushRequest, PushResponse, SensorReading, source_id};

/// Receive a pressure reading from the chair firmware
pub async fn push(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> AppResult<Json<PushResponse>> {
    let req: ChairPushRequest = serde_json::from_value(body)
        .map_err(|_| AppError::ValidationError("Invalid sensor data format".to_string()))?;
    req.validate()?;

    let sensors = req.sensors
        .ok_or_else(|| AppError::ValidationError("Invalid sensor data format".to_string()))?;

    let reading = SensorReading {
        source_id: source_id(req.id),
        sensors,
        captured_at: req.timestamp.unwrap_or_else(Utc::now),
    };

    tracing::info!("Received chair data from {}", reading.source_id);

    let verdict = state.pipeline.submit_sensor_reading(reading).await?;

    Ok(Json(PushResponse {
        message: "Data received successfully",
        posture_status: verdict.posture_status,
    }))
}
