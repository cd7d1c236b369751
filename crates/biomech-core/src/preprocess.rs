//! Landmark clean-up before measurement.

use formcheck_pose_model::{Landmark, LandmarkFrame, LandmarkName, Side};

/// Default visibility cut-off for [`filter_low_confidence`].
pub const DEFAULT_MIN_VISIBILITY: f64 = 0.5;

/// A copy of `frame` without points whose visibility is below
/// `min_visibility`.
pub fn filter_low_confidence(frame: &LandmarkFrame, min_visibility: f64) -> LandmarkFrame {
    frame.filtered(|lm| {
        let keep = lm.visibility >= min_visibility;
        if !keep {
            tracing::debug!(
                landmark = %lm.name,
                visibility = lm.visibility,
                "Filtered low-visibility landmark"
            );
        }
        keep
    })
}

/// Fill an absent knee with the midpoint of the same-side hip and ankle.
///
/// The synthesized point takes the lower of the two visibilities and is
/// flagged `interpolated`. Sides whose hip or ankle is also absent are left
/// untouched.
pub fn interpolate_missing_knees(frame: &LandmarkFrame) -> LandmarkFrame {
    let mut out = frame.clone();
    for side in Side::BOTH {
        let knee = LandmarkName::knee(side);
        if frame.contains(knee) {
            continue;
        }
        let (Some(hip), Some(ankle)) = (
            frame.get(LandmarkName::hip(side)),
            frame.get(LandmarkName::ankle(side)),
        ) else {
            continue;
        };

        tracing::debug!(landmark = %knee, "Interpolating missing landmark");
        let mut point = Landmark::new(
            knee,
            (hip.x + ankle.x) / 2.0,
            (hip.y + ankle.y) / 2.0,
            (hip.z + ankle.z) / 2.0,
            hip.visibility.min(ankle.visibility),
        );
        point.interpolated = true;
        out.insert(point);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use formcheck_pose_model::CoordinateSpace;

    fn leg(vis_hip: f64, vis_ankle: f64) -> LandmarkFrame {
        LandmarkFrame::from_landmarks(
            CoordinateSpace::Normalized,
            [
                Landmark::new(LandmarkName::LeftHip, 0.6, 0.5, 0.1, vis_hip),
                Landmark::new(LandmarkName::LeftAnkle, 0.6, 0.9, -0.1, vis_ankle),
                Landmark::new(LandmarkName::RightAnkle, 0.4, 0.9, 0.0, 0.9),
            ],
        )
    }

    #[test]
    fn test_filter_drops_low_visibility() {
        let frame = leg(0.9, 0.3);
        let filtered = filter_low_confidence(&frame, DEFAULT_MIN_VISIBILITY);
        assert_eq!(filtered.len(), 2);
        assert!(!filtered.contains(LandmarkName::LeftAnkle));
        assert_eq!(frame.len(), 3);
    }

    #[test]
    fn test_interpolates_knee_from_hip_and_ankle() {
        let frame = interpolate_missing_knees(&leg(0.8, 0.6));
        let knee = frame.get(LandmarkName::LeftKnee).copied().unwrap();

        assert!(knee.interpolated);
        assert!((knee.x - 0.6).abs() < 1e-12);
        assert!((knee.y - 0.7).abs() < 1e-12);
        assert!(knee.z.abs() < 1e-12);
        assert_eq!(knee.visibility, 0.6);
    }

    #[test]
    fn test_side_without_hip_is_left_alone() {
        let frame = interpolate_missing_knees(&leg(0.8, 0.6));
        assert!(!frame.contains(LandmarkName::RightKnee));
    }

    #[test]
    fn test_present_knee_is_not_replaced() {
        let mut frame = leg(0.8, 0.6);
        frame.insert(Landmark::new(LandmarkName::LeftKnee, 0.65, 0.72, 0.0, 0.95));
        let out = interpolate_missing_knees(&frame);
        let knee = out.get(LandmarkName::LeftKnee).unwrap();
        assert!(!knee.interpolated);
        assert_eq!(knee.x, 0.65);
    }
}
