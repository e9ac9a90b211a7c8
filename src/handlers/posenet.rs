//! Pose keypoint push handler

use axum::{extract::State, Json};
use chrono::Utc;
use validator::Validate;

use crate::{AppState, AppError, AppResult};
use crate::models::{PushResponse, KeypointSet, PosePushRequest, source_id};

/// Receive keypoints from a pose detector
pub async fn push(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> AppResult<Json<PushResponse>> {
    let req: PosePushRequest = serde_json::from_value(body)
        .map_err(|_| AppError::ValidationError("Invalid keypoints data".to_string()))?;

    let keypoints = keypoint_set(req)?;
    tracing::info!("Received PoseNet data from {}", keypoints.source_id);

    let verdict = state.pipeline.submit_keypoints(keypoints).await?;

    Ok(Json(PushResponse {
        message: "PoseNet data received successfully",
        posture_status: verdict.posture_status,
    }))
}

/// Shared by the HTTP route and `poseData` socket frames
pub fn keypoint_set(req: PosePushRequest) -> AppResult<KeypointSet> {
    req.validate()?;

    let keypoints = req.keypoints
        .ok_or_else(|| AppError::ValidationError("Invalid keypoints data".to_string()))?;

    Ok(KeypointSet {
        source_id: source_id(req.chair_id),
        keypoints,
        captured_at: req.timestamp.unwrap_or_else(Utc::now),
    })
}
