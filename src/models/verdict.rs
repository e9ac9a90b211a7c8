//! Posture verdict model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use super::{SensorValue, PoseData};

/// Posture categories produced by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostureStatus {
    Good,
    Poor,
    LeaningForward,
    NotSitting,
    /// Keypoint path only: required landmarks missing or low confidence
    InsufficientData,
    /// Reading shape not supported by the classifier
    InvalidInput,
}

impl PostureStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostureStatus::Good => "good",
            PostureStatus::Poor => "poor",
            PostureStatus::LeaningForward => "leaning_forward",
            PostureStatus::NotSitting => "not_sitting",
            PostureStatus::InsufficientData => "insufficient_data",
            PostureStatus::InvalidInput => "invalid_input",
        }
    }
}

impl std::fmt::Display for PostureStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PostureStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "good" => Ok(PostureStatus::Good),
            "poor" => Ok(PostureStatus::Poor),
            "leaning_forward" => Ok(PostureStatus::LeaningForward),
            "not_sitting" => Ok(PostureStatus::NotSitting),
            "insufficient_data" => Ok(PostureStatus::InsufficientData),
            "invalid_input" => Ok(PostureStatus::InvalidInput),
            other => Err(format!("unknown posture status '{}'", other)),
        }
    }
}

/// Classification result for one reading, carrying the reading that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostureVerdict {
    pub source_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensors: Option<Vec<SensorValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pose_data: Option<PoseData>,
    pub posture_status: PostureStatus,
}

impl PostureVerdict {
    pub fn has_pose_data(&self) -> bool {
        self.pose_data.is_some()
    }
}
