//! Posture Rules & Thresholds
//!
//! Constants and configurable thresholds only. Classification logic lives in
//! `pressure` and `keypoints`.

// ============================================================================
// PRESSURE THRESHOLDS (sensor native units)
// ============================================================================

/// Total seat pressure below this = nobody sitting
pub const MIN_SEATED_TOTAL: f64 = 200.0;

/// Left/right difference above this share of total = poor
pub const LATERAL_IMBALANCE_RATIO: f64 = 0.3;

/// Back weight below this share of front weight = leaning forward
pub const BACK_SUPPORT_RATIO: f64 = 0.8;

// ============================================================================
// KEYPOINT THRESHOLDS (image coordinates, y down)
// ============================================================================

/// Keypoints below this confidence are ignored
pub const MIN_KEYPOINT_CONFIDENCE: f64 = 0.5;

/// Shoulder height difference above this share of shoulder width = poor
pub const SHOULDER_TILT_RATIO: f64 = 0.2;

/// Nose offset from shoulder line (in shoulder widths) below this = leaning forward
pub const HEAD_FORWARD_RATIO: f64 = -0.3;

/// Ear height difference above this share of ear distance = poor
pub const HEAD_TILT_RATIO: f64 = 0.3;

// ============================================================================
// CONFIGURABLE THRESHOLDS
// ============================================================================

#[derive(Debug, Clone)]
pub struct PressureThresholds {
    pub min_seated_total: f64,
    pub lateral_imbalance_ratio: f64,
    pub back_support_ratio: f64,
}

impl Default for PressureThresholds {
    fn default() -> Self {
        Self {
            min_seated_total: MIN_SEATED_TOTAL,
            lateral_imbalance_ratio: LATERAL_IMBALANCE_RATIO,
            back_support_ratio: BACK_SUPPORT_RATIO,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PoseThresholds {
    pub min_confidence: f64,
    pub shoulder_tilt_ratio: f64,
    pub head_forward_ratio: f64,
    pub head_tilt_ratio: f64,
}

impl Default for PoseThresholds {
    fn default() -> Self {
        Self {
            min_confidence: MIN_KEYPOINT_CONFIDENCE,
            shoulder_tilt_ratio: SHOULDER_TILT_RATIO,
            head_forward_ratio: HEAD_FORWARD_RATIO,
            head_tilt_ratio: HEAD_TILT_RATIO,
        }
    }
}
