//! Seat pressure classification
//!
//! Input order is fixed: `[front_left, front_right, back_left, back_right]`.
//! Rules are evaluated in order and the first match wins.

use crate::models::{PostureStatus, SENSOR_COUNT};
use super::rules::PressureThresholds;

/// Classify four pressure values with default thresholds
pub fn classify_from_pressure(values: [f64; SENSOR_COUNT]) -> PostureStatus {
    classify_from_pressure_with_thresholds(values, &PressureThresholds::default())
}

pub fn classify_from_pressure_with_thresholds(
    values: [f64; SENSOR_COUNT],
    thresholds: &PressureThresholds,
) -> PostureStatus {
    let [front_left, front_right, back_left, back_right] = values;
    let total: f64 = values.iter().sum();

    // 1. No meaningful weight on the seat
    if total < thresholds.min_seated_total {
        return PostureStatus::NotSitting;
    }

    // 2. Lateral imbalance
    let left = front_left + back_left;
    let right = front_right + back_right;
    if (left - right).abs() > thresholds.lateral_imbalance_ratio * total {
        return PostureStatus::Poor;
    }

    // 3. Weight carried on the front edge
    let front = front_left + front_right;
    let back = back_left + back_right;
    if back < thresholds.back_support_ratio * front {
        return PostureStatus::LeaningForward;
    }

    PostureStatus::Good
}

// ============================================================================
// TESTS
// ============================================================================
