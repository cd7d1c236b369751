//! Frame confidence and quality scoring.
//!
//! # Quality score
//!
//! ```text
//! quality = 0.4 * confidence + 0.3 * completeness + 0.3 * body_size
//! ```
//!
//! - **confidence:** visibility averaged over the present landmarks, with
//!   the critical joints (shoulders, hips, knees, ankles) weighted 1.5x.
//! - **completeness:** present landmarks over the full vocabulary.
//! - **body_size:** how well the body fills the image vertically; 1.0 for a
//!   height ratio in `[0.5, 0.8]`, decaying linearly away from 0.65.
//!
//! The weights are fixed so that scores stay comparable across runs.

use serde::{Deserialize, Serialize};

use formcheck_common::timing::round_to;
use formcheck_pose_model::angles::keys;
use formcheck_pose_model::{AngleSet, LandmarkFrame, LandmarkName, QualityFactors, QualityReport};

/// Weight of a critical joint relative to any other landmark.
pub const CRITICAL_WEIGHT: f64 = 1.5;

pub const CONFIDENCE_WEIGHT: f64 = 0.4;
pub const COMPLETENESS_WEIGHT: f64 = 0.3;
pub const BODY_SIZE_WEIGHT: f64 = 0.3;

/// Body height / image height ratio band that scores 1.0.
pub const IDEAL_BODY_RATIO: (f64, f64) = (0.5, 0.8);

/// Peak of the body-size scoring triangle.
pub const BODY_RATIO_CENTER: f64 = 0.65;

/// Critical-joint weighted visibility in `[0.0, 1.0]`, rounded to 3 dp.
/// An empty frame scores `0.0`.
pub fn confidence_score(frame: &LandmarkFrame) -> f64 {
    let (total, weight) = frame.iter().fold((0.0, 0.0), |(total, weight), lm| {
        let w = if lm.name.is_critical() {
            CRITICAL_WEIGHT
        } else {
            1.0
        };
        (total + lm.visibility * w, weight + w)
    });

    if weight == 0.0 {
        return 0.0;
    }
    round_to((total / weight).clamp(0.0, 1.0), 3)
}

/// Score how usable a frame is for analysis.
///
/// `image_height` is the image height in the frame's coordinate units
/// (`1.0` for normalized coordinates). Without it the body-size factor
/// is zero.
pub fn frame_quality(frame: &LandmarkFrame, image_height: Option<f64>) -> QualityReport {
    if frame.is_empty() {
        return QualityReport::default();
    }

    let confidence = confidence_score(frame);
    let completeness = frame.len() as f64 / LandmarkName::COUNT as f64;
    let body_size = image_height
        .and_then(|h| body_height(frame).map(|b| b / h))
        .filter(|ratio| ratio.is_finite())
        .map_or(0.0, body_size_score);

    let score = CONFIDENCE_WEIGHT * confidence
        + COMPLETENESS_WEIGHT * completeness
        + BODY_SIZE_WEIGHT * body_size;

    QualityReport {
        quality_score: round_to(score.clamp(0.0, 1.0), 3),
        factors: QualityFactors {
            confidence,
            completeness: round_to(completeness, 3),
            body_size: round_to(body_size, 3),
        },
    }
}

fn body_height(frame: &LandmarkFrame) -> Option<f64> {
    let mut ys = frame.iter().map(|lm| lm.y).filter(|y| y.is_finite());
    let first = ys.next()?;
    let (min, max) = ys.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y)));
    Some(max - min)
}

/// Triangular score for a body-height ratio.
pub fn body_size_score(ratio: f64) -> f64 {
    let (lo, hi) = IDEAL_BODY_RATIO;
    if (lo..=hi).contains(&ratio) {
        1.0
    } else {
        (1.0 - (ratio - BODY_RATIO_CENTER).abs() / BODY_RATIO_CENTER).max(0.0)
    }
}

/// A measurement outside its plausible range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeViolation {
    pub name: String,
    pub value: f64,
    pub expected_range: (f64, f64),
}

fn expected_range(key: &str) -> Option<(f64, f64)> {
    match key {
        keys::KNEE_LEFT | keys::KNEE_RIGHT | keys::HIP | keys::HIP_LEFT | keys::HIP_RIGHT => {
            Some((0.0, 180.0))
        }
        keys::ANKLE_LEFT | keys::ANKLE_RIGHT => Some((0.0, 180.0)),
        keys::ELBOW_LEFT | keys::ELBOW_RIGHT | keys::SHOULDER_LEFT | keys::SHOULDER_RIGHT => {
            Some((0.0, 180.0))
        }
        keys::TRUNK_INCLINATION | keys::BACK_ANGLE => Some((0.0, 90.0)),
        keys::KNEE_VALGUS_LEFT_CM | keys::KNEE_VALGUS_RIGHT_CM => Some((0.0, 15.0)),
        keys::PELVIC_TILT => Some((-30.0, 30.0)),
        _ => None,
    }
}

/// Check every known measurement against its plausible range.
///
/// Keys without a known range are ignored. Each violation is logged.
pub fn validate_angle_ranges(angles: &AngleSet) -> Vec<RangeViolation> {
    angles
        .iter()
        .filter_map(|(name, value)| {
            let (min, max) = expected_range(name)?;
            if (min..=max).contains(&value) {
                return None;
            }
            tracing::warn!(
                angle = name,
                value,
                min,
                max,
                "Angle outside expected range"
            );
            Some(RangeViolation {
                name: name.to_string(),
                value,
                expected_range: (min, max),
            })
        })
        .collect()
}
