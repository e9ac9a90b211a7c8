//! Live WebSocket channel
//!
//! Each connection subscribes to the broadcast hub and receives every verdict
//! published after it connected. Clients may also push `poseData` frames,
//! which are submitted one at a time in arrival order, throttled per session.

use std::fmt::Display;
use std::time::Instant;

use axum::{
    extract::{ws::{Message, WebSocketUpgrade}, State},
    response::Response,
};
use chrono::{DateTime, Utc};
use futures::{Sink, SinkExt, Stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::handlers::posenet::keypoint_set;
use crate::models::{PosePushRequest, PostureStatus, PostureVerdict, SensorValue};
use crate::throttle::SubmitThrottle;

/// Server → client frame
#[derive(Debug, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum LiveEvent<'a> {
    #[serde(rename = "chairData")]
    ChairData {
        #[serde(rename = "chairId")]
        chair_id: &'a str,
        sensors: &'a [SensorValue],
        timestamp: DateTime<Utc>,
        #[serde(rename = "postureStatus")]
        posture_status: PostureStatus,
    },
    #[serde(rename = "postureUpdate")]
    PostureUpdate {
        #[serde(rename = "chairId")]
        chair_id: &'a str,
        #[serde(rename = "postureStatus")]
        posture_status: PostureStatus,
        #[serde(rename = "hasPoseData")]
        has_pose_data: bool,
        timestamp: DateTime<Utc>,
    },
}

impl<'a> From<&'a PostureVerdict> for LiveEvent<'a> {
    fn from(verdict: &'a PostureVerdict) -> Self {
        match &verdict.sensors {
            Some(sensors) if !verdict.has_pose_data() => LiveEvent::ChairData {
                chair_id: &verdict.source_id,
                sensors,
                timestamp: verdict.timestamp,
                posture_status: verdict.posture_status,
            },
            _ => LiveEvent::PostureUpdate {
                chair_id: &verdict.source_id,
                posture_status: verdict.posture_status,
                has_pose_data: verdict.has_pose_data(),
                timestamp: verdict.timestamp,
            },
        }
    }
}

/// Client → server frame
#[derive(Debug, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientFrame {
    #[serde(rename = "poseData")]
    PoseData(PosePushRequest),
}

pub async fn upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| {
        let (outgoing, incoming) = socket.split();
        session(outgoing, incoming, state)
    })
}

/// Drive one live connection until the client leaves or the hub shuts down
async fn session<S, R, E>(mut outgoing: S, mut incoming: R, state: AppState)
where
    S: Sink<Message> + Unpin,
    R: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    let mut subscription = state.hub.subscribe();
    let mut throttle = SubmitThrottle::new(state.config.pose_min_interval);

    tracing::info!(subscriber = subscription.id(), "Client connected");

    loop {
        tokio::select! {
            verdict = subscription.recv() => {
                let Some(verdict) = verdict else { break };
                let frame = match serde_json::to_string(&LiveEvent::from(&verdict)) {
                    Ok(frame) => frame,
                    Err(e) => {
                        tracing::warn!("Failed to encode live event: {}", e);
                        continue;
                    }
                };
                if outgoing.send(Message::Text(frame)).await.is_err() {
                    break;
                }
            }
            frame = incoming.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        handle_frame(&state, &mut throttle, &text).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!("Socket error: {}", e);
                        break;
                    }
                }
            }
        }
    }

    tracing::info!(
        subscriber = subscription.id(),
        throttled = throttle.suppressed(),
        "Client disconnected"
    );
    state.hub.unsubscribe(subscription);
}

async fn handle_frame(state: &AppState, throttle: &mut SubmitThrottle, text: &str) {
    let ClientFrame::PoseData(req) = match serde_json::from_str::<ClientFrame>(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!("Ignoring malformed socket frame: {}", e);
            return;
        }
    };

    if !throttle.allow(Instant::now()) {
        tracing::debug!("Pose frame throttled");
        return;
    }

    let keypoints = match keypoint_set(req) {
        Ok(keypoints) => keypoints,
        Err(e) => {
            tracing::warn!("Invalid keypoints data received via socket: {:?}", e);
            return;
        }
    };

    match state.pipeline.submit_keypoints(keypoints).await {
        Ok(verdict) => tracing::debug!("Socket pose analysis: {}", verdict.posture_status),
        Err(e) => tracing::error!("Error processing socket pose data: {}", e),
    }
}
