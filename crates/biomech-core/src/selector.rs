//! Exercise angle selection.
//!
//! Picks the measurements an exercise needs and fills in the documented
//! defaults for anything the frame cannot provide. This is the boundary
//! where engine errors stop: a frame that cannot be measured yields
//! [`default_angles`] and a warning, never an error.

use formcheck_pose_model::angles::keys;
use formcheck_pose_model::{AngleSet, AngleSetBuilder, ExerciseFamily, ExerciseType, LandmarkFrame, Side};

use crate::angles::{AngleEngine, AngleResult, NEUTRAL_ANKLE_DEG};

/// Angles chosen for one frame, plus any non-fatal notices.
#[derive(Debug, Clone, PartialEq)]
pub struct AngleSelection {
    pub angles: AngleSet,
    pub warnings: Vec<String>,
}

/// The fallback set used when a frame cannot be measured at all.
pub fn default_angles() -> AngleSet {
    let mut set = AngleSet::builder();
    set.set(keys::HIP, 0.0)
        .set(keys::TRUNK_INCLINATION, 0.0)
        .set(keys::PELVIC_TILT, 0.0);
    for side in Side::BOTH {
        set.set(keys::knee(side), 0.0)
            .set(keys::ankle(side), NEUTRAL_ANKLE_DEG)
            .set(keys::knee_valgus_cm(side), 0.0)
            .set(keys::elbow(side), 0.0)
            .set(keys::shoulder(side), 0.0);
    }
    set.build()
}

/// Compute the angle subset relevant to `exercise`.
///
/// Unrecognized exercises use the squat set and add a warning.
pub fn select_angles(frame: &LandmarkFrame, exercise: &ExerciseType) -> AngleSelection {
    let mut warnings = Vec::new();

    let family = match exercise.family() {
        ExerciseFamily::Generic => {
            tracing::debug!(exercise = %exercise, "Unknown exercise type, using squat angles");
            warnings.push(format!(
                "Unknown exercise type '{exercise}', using squat angles"
            ));
            ExerciseFamily::Squat
        }
        family => family,
    };

    let engine = AngleEngine::new(frame);
    let angles = match compute(&engine, family) {
        Ok(angles) => angles,
        Err(e) => {
            tracing::warn!(error = %e, "Angle computation failed, using default angles");
            warnings.push(format!("Angle computation failed ({e}), using default angles"));
            default_angles()
        }
    };

    AngleSelection { angles, warnings }
}

fn compute(engine: &AngleEngine<'_>, family: ExerciseFamily) -> AngleResult<AngleSet> {
    let mut set = AngleSet::builder();
    match family {
        ExerciseFamily::Squat | ExerciseFamily::Generic => {
            knees(engine, &mut set)?;
            set.set(keys::HIP, engine.hip()?.unwrap_or(0.0));
            set.set(
                keys::TRUNK_INCLINATION,
                engine.trunk_inclination()?.unwrap_or(0.0),
            );
            for side in Side::BOTH {
                set.set(
                    keys::ankle(side),
                    engine.ankle(side)?.unwrap_or(NEUTRAL_ANKLE_DEG),
                );
            }
            for side in Side::BOTH {
                set.set_opt(
                    keys::knee_valgus_cm(side),
                    engine.knee_valgus_cm(side)?.reported(),
                );
            }
            set.set(keys::PELVIC_TILT, engine.pelvic_tilt()?.unwrap_or(0.0));
        }
        ExerciseFamily::Deadlift => {
            knees(engine, &mut set)?;
            set.set(keys::HIP, engine.hip()?.unwrap_or(0.0));
            let trunk = engine.trunk_inclination()?.unwrap_or(0.0);
            set.set(keys::TRUNK_INCLINATION, trunk);
            set.set(keys::BACK_ANGLE, trunk);
        }
        ExerciseFamily::BenchPress => {
            arms(engine, &mut set)?;
        }
        ExerciseFamily::OverheadPress => {
            arms(engine, &mut set)?;
            set.set(
                keys::TRUNK_INCLINATION,
                engine.trunk_inclination()?.unwrap_or(0.0),
            );
        }
    }
    Ok(set.build())
}

fn knees(engine: &AngleEngine<'_>, set: &mut AngleSetBuilder) -> AngleResult<()> {
    for side in Side::BOTH {
        set.set(keys::knee(side), engine.knee(side)?.unwrap_or(0.0));
    }
    Ok(())
}

fn arms(engine: &AngleEngine<'_>, set: &mut AngleSetBuilder) -> AngleResult<()> {
    for side in Side::BOTH {
        set.set(keys::elbow(side), engine.elbow(side)?.unwrap_or(0.0));
        set.set(keys::shoulder(side), engine.shoulder(side)?.unwrap_or(0.0));
    }
    Ok(())
}
