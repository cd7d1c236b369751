//! Per-frame movement phase classification.
//!
//! A threshold rule on the exercise's key angle decides the clear cases
//! (fully extended or fully flexed). Anything in between falls back to the
//! frame's relative position in the batch. Frames are classified
//! independently: nothing here prevents a sequence such as
//! `top, bottom, top` within one repetition, so consumers that need
//! monotonic phases must smooth the sequence themselves.

use formcheck_pose_model::angles::keys;
use formcheck_pose_model::{AngleSet, ExerciseFamily, ExerciseType, Phase};

/// Mean knee angle above which a squat frame is at the top.
pub const SQUAT_TOP_KNEE_DEG: f64 = 150.0;
/// Mean knee angle below which a squat frame is at the bottom.
pub const SQUAT_BOTTOM_KNEE_DEG: f64 = 100.0;
/// Hip angle above which a deadlift frame is at lockout.
pub const DEADLIFT_TOP_HIP_DEG: f64 = 150.0;
/// Hip angle below which a deadlift frame is at the floor.
pub const DEADLIFT_BOTTOM_HIP_DEG: f64 = 90.0;

/// Where a frame sits in its batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePosition {
    /// 1-based frame number.
    pub frame_number: usize,
    pub total_frames: usize,
}

impl FramePosition {
    pub fn new(frame_number: usize, total_frames: usize) -> Self {
        Self {
            frame_number,
            total_frames,
        }
    }

    /// `frame_number / total_frames`, or `None` for an empty batch.
    pub fn relative(&self) -> Option<f64> {
        if self.total_frames == 0 {
            return None;
        }
        Some(self.frame_number as f64 / self.total_frames as f64)
    }
}

/// Classify one frame's phase. Never fails: inputs that cannot be
/// classified yield [`Phase::Unknown`].
pub fn classify_phase(angles: &AngleSet, exercise: &ExerciseType, position: FramePosition) -> Phase {
    let phase = match exercise.family() {
        ExerciseFamily::Squat => squat_phase(angles, position),
        ExerciseFamily::Deadlift => deadlift_phase(angles, position),
        ExerciseFamily::BenchPress | ExerciseFamily::OverheadPress | ExerciseFamily::Generic => {
            generic_phase(position)
        }
    };
    phase.unwrap_or_else(|| {
        tracing::debug!(
            exercise = %exercise,
            frame = position.frame_number,
            total = position.total_frames,
            "Phase could not be classified"
        );
        Phase::Unknown
    })
}

fn squat_phase(angles: &AngleSet, position: FramePosition) -> Option<Phase> {
    let knee = angles.bilateral_mean(keys::KNEE_LEFT, keys::KNEE_RIGHT);
    if !knee.is_finite() {
        return None;
    }
    if knee > SQUAT_TOP_KNEE_DEG {
        return Some(Phase::Top);
    }
    if knee < SQUAT_BOTTOM_KNEE_DEG {
        return Some(Phase::Bottom);
    }

    let relative = position.relative()?;
    Some(if relative < 0.4 {
        Phase::Eccentric
    } else if relative < 0.6 {
        Phase::Bottom
    } else {
        Phase::Concentric
    })
}

/// The position fallback assumes the clip starts at the floor, so the
/// pull occupies the first half of the frames.
fn deadlift_phase(angles: &AngleSet, position: FramePosition) -> Option<Phase> {
    let hip = angles.get_or(keys::HIP, 0.0);
    if !hip.is_finite() {
        return None;
    }
    if hip > DEADLIFT_TOP_HIP_DEG {
        return Some(Phase::Top);
    }
    if hip < DEADLIFT_BOTTOM_HIP_DEG {
        return Some(Phase::Bottom);
    }

    let relative = position.relative()?;
    Some(if relative < 0.5 {
        Phase::Concentric
    } else {
        Phase::Eccentric
    })
}

fn generic_phase(position: FramePosition) -> Option<Phase> {
    let relative = position.relative()?;
    Some(if relative < 0.25 {
        Phase::Eccentric
    } else if relative < 0.5 {
        Phase::Bottom
    } else if relative < 0.75 {
        Phase::Concentric
    } else {
        Phase::Top
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knees(left: f64, right: f64) -> AngleSet {
        AngleSet::builder()
            .with(keys::KNEE_LEFT, left)
            .with(keys::KNEE_RIGHT, right)
            .build()
    }

    fn hip(value: f64) -> AngleSet {
        AngleSet::builder().with(keys::HIP, value).build()
    }

    #[test]
    fn test_squat_thresholds_ignore_position() {
        for frame in 1..=10 {
            let pos = FramePosition::new(frame, 10);
            assert_eq!(classify_phase(&knees(170.0, 168.0), &ExerciseType::Squat, pos), Phase::Top);
            assert_eq!(
                classify_phase(&knees(80.0, 82.0), &ExerciseType::BackSquat, pos),
                Phase::Bottom
            );
        }
    }

    #[test]
    fn test_squat_position_fallback() {
        let angles = knees(120.0, 124.0);
        let at = |n| classify_phase(&angles, &ExerciseType::Squat, FramePosition::new(n, 10));
        assert_eq!(at(3), Phase::Eccentric);
        assert_eq!(at(4), Phase::Bottom);
        assert_eq!(at(5), Phase::Bottom);
        assert_eq!(at(6), Phase::Concentric);
        assert_eq!(at(10), Phase::Concentric);
    }

    #[test]
    fn test_squat_missing_knee_counts_as_zero() {
        // (0 + 170) / 2 = 85, below the bottom threshold.
        let angles = AngleSet::builder().with(keys::KNEE_LEFT, 170.0).build();
        assert_eq!(
            classify_phase(&angles, &ExerciseType::Squat, FramePosition::new(1, 3)),
            Phase::Bottom
        );
    }

    #[test]
    fn test_deadlift_rules() {
        let pos = FramePosition::new(2, 10);
        assert_eq!(classify_phase(&hip(160.0), &ExerciseType::Deadlift, pos), Phase::Top);
        assert_eq!(classify_phase(&hip(85.0), &ExerciseType::Deadlift, pos), Phase::Bottom);
        assert_eq!(classify_phase(&hip(120.0), &ExerciseType::Deadlift, pos), Phase::Concentric);
        assert_eq!(
            classify_phase(&hip(120.0), &ExerciseType::Deadlift, FramePosition::new(5, 10)),
            Phase::Eccentric
        );
    }

    #[test]
    fn test_generic_ignores_angles() {
        let angles = knees(175.0, 175.0);
        let exercise = ExerciseType::parse("lunge");
        let at = |n| classify_phase(&angles, &exercise, FramePosition::new(n, 8));
        assert_eq!(at(1), Phase::Eccentric);
        assert_eq!(at(2), Phase::Bottom);
        assert_eq!(at(4), Phase::Concentric);
        assert_eq!(at(6), Phase::Top);
    }

    #[test]
    fn test_presses_use_position_only() {
        let pos = FramePosition::new(1, 1);
        assert_eq!(classify_phase(&AngleSet::default(), &ExerciseType::BenchPress, pos), Phase::Top);
    }

    #[test]
    fn test_unclassifiable_inputs_are_unknown() {
        let empty_batch = FramePosition::new(1, 0);
        assert_eq!(
            classify_phase(&knees(120.0, 120.0), &ExerciseType::Squat, empty_batch),
            Phase::Unknown
        );
        assert_eq!(
            classify_phase(&hip(f64::NAN), &ExerciseType::Deadlift, FramePosition::new(1, 2)),
            Phase::Unknown
        );
        // Thresholds still decide without a usable position.
        assert_eq!(
            classify_phase(&knees(170.0, 170.0), &ExerciseType::Squat, empty_batch),
            Phase::Top
        );
    }
}
