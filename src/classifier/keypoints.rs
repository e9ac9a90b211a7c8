//! Pose keypoint classification
//!
//! Coordinates follow image convention: y grows downward and the camera faces
//! the subject. A geometric rule whose reference distance is zero is skipped
//! instead of dividing by zero.

use crate::models::{find_part, BodyPart, Keypoint, PostureStatus};
use super::rules::PoseThresholds;

/// Classify a keypoint set with default thresholds
pub fn classify_from_keypoints(keypoints: &[Keypoint]) -> PostureStatus {
    classify_from_keypoints_with_thresholds(keypoints, &PoseThresholds::default())
}

pub fn classify_from_keypoints_with_thresholds(
    keypoints: &[Keypoint],
    thresholds: &PoseThresholds,
) -> PostureStatus {
    let usable = |part| {
        find_part(keypoints, part).filter(|kp| kp.score >= thresholds.min_confidence)
    };

    let (nose, left_shoulder, right_shoulder) = match (
        usable(BodyPart::Nose),
        usable(BodyPart::LeftShoulder),
        usable(BodyPart::RightShoulder),
    ) {
        (Some(n), Some(l), Some(r)) => (n, l, r),
        _ => return PostureStatus::InsufficientData,
    };

    let shoulder_diff = (left_shoulder.position.y - right_shoulder.position.y).abs();
    let shoulder_dist = (left_shoulder.position.x - right_shoulder.position.x).abs();

    if shoulder_dist > 0.0 {
        // 1. Shoulder tilt
        if shoulder_diff > thresholds.shoulder_tilt_ratio * shoulder_dist {
            return PostureStatus::Poor;
        }

        // 2. Head forward of the shoulder line
        let shoulder_center_y = (left_shoulder.position.y + right_shoulder.position.y) / 2.0;
        let head_forward_ratio = (nose.position.y - shoulder_center_y) / shoulder_dist;
        if head_forward_ratio < thresholds.head_forward_ratio {
            return PostureStatus::LeaningForward;
        }
    }

    // 3. Head tilt, only when both ears are visible
    if let (Some(left_ear), Some(right_ear)) = (usable(BodyPart::LeftEar), usable(BodyPart::RightEar)) {
        let ear_diff = (left_ear.position.y - right_ear.position.y).abs();
        let ear_dist = (left_ear.position.x - right_ear.position.x).abs();
        if ear_dist > 0.0 && ear_diff > thresholds.head_tilt_ratio * ear_dist {
            return PostureStatus::Poor;
        }
    }

    PostureStatus::Good
}

// ============================================================================
// TESTS
// ============================================================================
