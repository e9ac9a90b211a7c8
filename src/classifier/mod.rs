//! Posture Classifier
//!
//! Pure rules turning a raw reading into a [`PostureStatus`]. No state, no I/O,
//! safe to call from any task.
//!
//! ## Structure
//! - `rules`: thresholds and constants
//! - `pressure`: seat pressure path (4 sensors)
//! - `keypoints`: pose keypoint path
//!
//! ## Usage
//! ```ignore
//! use crate::classifier::{classify_from_pressure, classify_from_keypoints};
//!
//! let status = classify_from_pressure([120.0, 110.0, 130.0, 125.0]);
//! ```
//!
//! [`PostureStatus`]: crate::models::PostureStatus

pub mod rules;
pub mod pressure;
pub mod keypoints;

pub use rules::{PressureThresholds, PoseThresholds};
pub use pressure::classify_from_pressure;
pub use keypoints::classify_from_keypoints;
