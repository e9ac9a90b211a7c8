//! Reading models
//!
//! Raw observations pushed by producers: pressure values from the chair
//! and body keypoints from the pose detector.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use validator::Validate;

/// Number of pressure sensors on the seat.
///
/// Index order is fixed: front-left, front-right, back-left, back-right.
pub const SENSOR_COUNT: usize = 4;

/// Source used when a producer does not identify itself
pub const UNKNOWN_SOURCE: &str = "unknown";

/// Single pressure sensor sample, as sent by the chair firmware
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorValue {
    pub value: f64,
}

/// One sensor push from a chair
#[derive(Debug, Clone)]
pub struct SensorReading {
    pub source_id: String,
    pub sensors: Vec<SensorValue>,
    pub captured_at: DateTime<Utc>,
}

impl SensorReading {
    pub fn new(source_id: impl Into<String>, values: &[f64]) -> Self {
        Self {
            source_id: source_id.into(),
            sensors: values.iter().map(|&value| SensorValue { value }).collect(),
            captured_at: Utc::now(),
        }
    }

    pub fn values(&self) -> Vec<f64> {
        self.sensors.iter().map(|s| s.value).collect()
    }
}

/// Body landmarks reported by the pose detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BodyPart {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    /// Any landmark name this service does not use. Kept so one extra part
    /// never rejects the whole set; stored as `"unknown"`.
    #[serde(other)]
    Unknown,
}

/// Image coordinates; y grows downward
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub part: BodyPart,
    pub position: Position,
    /// Detection confidence in [0, 1]
    pub score: f64,
}

impl Keypoint {
    pub fn new(part: BodyPart, x: f64, y: f64, score: f64) -> Self {
        Self {
            part,
            position: Position { x, y },
            score,
        }
    }
}

/// Keypoints as persisted under `poseData`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseData {
    pub keypoints: Vec<Keypoint>,
}

/// One keypoint push from a pose detector session
#[derive(Debug, Clone)]
pub struct KeypointSet {
    pub source_id: String,
    pub keypoints: Vec<Keypoint>,
    pub captured_at: DateTime<Utc>,
}

impl KeypointSet {
    pub fn new(source_id: impl Into<String>, keypoints: Vec<Keypoint>) -> Self {
        Self {
            source_id: source_id.into(),
            keypoints,
            captured_at: Utc::now(),
        }
    }
}

/// First keypoint reported for `part`, if any
pub(crate) fn find_part(keypoints: &[Keypoint], part: BodyPart) -> Option<&Keypoint> {
    keypoints.iter().find(|kp| kp.part == part)
}

/// Source named by a push, `"unknown"` when absent or empty
pub fn source_id(raw: Option<String>) -> String {
    raw.filter(|id| !id.is_empty())
        .unwrap_or_else(|| UNKNOWN_SOURCE.to_string())
}

// ============================================================================
// WIRE REQUESTS
// ============================================================================

/// `POST /chair` body
#[derive(Debug, Deserialize, Validate)]
pub struct ChairPushRequest {
    #[validate(length(max = 128))]
    pub id: Option<String>,
    pub sensors: Option<Vec<SensorValue>>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Acknowledgement for both push routes
#[derive(Debug, Serialize)]
pub struct PushResponse {
    pub message: &'static str,
    #[serde(rename = "postureStatus")]
    pub posture_status: super::PostureStatus,
}

/// `POST /posenet` body, also the payload of a `poseData` socket frame
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PosePushRequest {
    #[validate(length(max = 128))]
    pub chair_id: Option<String>,
    pub keypoints: Option<Vec<Keypoint>>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keypoint_wire_format() {
        let json = r#"{"part":"leftShoulder","position":{"x":12.5,"y":40.0},"score":0.91}"#;
        let kp: Keypoint = serde_json::from_str(json).unwrap();
        assert_eq!(kp.part, BodyPart::LeftShoulder);
        assert_eq!(kp.position.x, 12.5);
        assert_eq!(kp.score, 0.91);
    }

    #[test]
    fn test_keypoint_lookup_takes_first_match() {
        let keypoints = vec![
            Keypoint::new(BodyPart::Nose, 1.0, 1.0, 0.9),
            Keypoint::new(BodyPart::Nose, 2.0, 2.0, 0.2),
        ];
        assert_eq!(find_part(&keypoints, BodyPart::Nose).unwrap().position.x, 1.0);
        assert!(find_part(&keypoints, BodyPart::LeftEar).is_none());
    }

    #[test]
    fn test_unlisted_part_name_is_unknown() {
        let json = r#"{"part":"left_hip","position":{"x":1,"y":2},"score":0.8}"#;
        let kp: Keypoint = serde_json::from_str(json).unwrap();
        assert_eq!(kp.part, BodyPart::Unknown);
    }

    #[test]
    fn test_source_id_ignores_blank() {
        assert_eq!(source_id(Some("CHAIR01".to_string())), "CHAIR01");
        assert_eq!(source_id(Some(String::new())), UNKNOWN_SOURCE);
        assert_eq!(source_id(None), UNKNOWN_SOURCE);
    }

    #[test]
    fn test_pose_request_accepts_posenet_payload() {
        let json = r#"{"chairId":"CHAIR01","keypoints":[{"part":"nose","position":{"x":1,"y":2},"score":0.5}]}"#;
        let req: PosePushRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.chair_id.as_deref(), Some("CHAIR01"));
        assert_eq!(req.keypoints.unwrap().len(), 1);
    }
}
