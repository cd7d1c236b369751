//! Angle extraction engine.
//!
//! Reads one [`LandmarkFrame`] by landmark name and computes joint angles
//! and derived measurements. A measurement whose landmarks are absent is
//! reported as `Ok(None)`; callers decide which default applies. Non-finite
//! coordinates are an error so that a garbage value never reaches an
//! [`AngleSet`].
//!
//! # Calibration
//!
//! Knee valgus is a lateral deviation in normalized image units. The
//! distance between the two hips, assumed to be [`REFERENCE_HIP_WIDTH_CM`],
//! converts it to centimeters. The conversion only holds in a near-frontal
//! view: below [`MIN_HIP_WIDTH_FOR_VALGUS`] the hips overlap on screen and
//! the measurement is suppressed.

use formcheck_common::timing::round_to;
use formcheck_pose_model::angles::keys;
use formcheck_pose_model::{AngleSet, LandmarkFrame, LandmarkName, Side};

use crate::geometry::{angle_at_vertex, angle_between, angle_to_axis, planar_distance, Axis, Vec3};

/// Average adult hip width used as the on-screen ruler.
pub const REFERENCE_HIP_WIDTH_CM: f64 = 35.0;

/// Minimum normalized hip width for a frontal view.
pub const MIN_HIP_WIDTH_FOR_VALGUS: f64 = 0.12;

/// Valgus above this is calibration noise.
pub const MAX_VALGUS_CM: f64 = 15.0;

/// Hip widths at or below this give no calibration factor.
pub const MIN_CALIBRATION_HIP_WIDTH: f64 = 0.001;

/// Reported ankle angle when its landmarks are missing.
pub const NEUTRAL_ANKLE_DEG: f64 = 90.0;

/// A measurement could not be computed from the frame.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AngleError {
    #[error("landmark {landmark} has non-finite coordinates")]
    NonFiniteLandmark { landmark: LandmarkName },

    #[error("measurement {measurement} produced a non-finite value")]
    NonFiniteResult { measurement: &'static str },
}

pub type AngleResult<T> = Result<T, AngleError>;

/// Hip-width ruler derived from the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    /// Distance between the hips on the image plane.
    pub hip_width_norm: f64,
    /// Centimeters per normalized unit, `0.0` when the width is degenerate.
    pub factor: f64,
}

impl Calibration {
    pub fn from_hip_width(hip_width_norm: f64) -> Self {
        let factor = if hip_width_norm > MIN_CALIBRATION_HIP_WIDTH {
            REFERENCE_HIP_WIDTH_CM / hip_width_norm
        } else {
            0.0
        };
        Self {
            hip_width_norm,
            factor,
        }
    }

    /// Whether the subject faces the camera closely enough for lateral
    /// measurements.
    pub fn is_frontal(&self) -> bool {
        self.hip_width_norm >= MIN_HIP_WIDTH_FOR_VALGUS
    }
}

/// Outcome of a knee valgus measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Valgus {
    /// Calibrated medial deviation in centimeters, capped at [`MAX_VALGUS_CM`].
    Measured(f64),
    /// Hip, knee or ankle of that side is absent.
    MissingInputs,
    /// Calibration is unavailable or the view is not frontal.
    Suppressed,
}

impl Valgus {
    /// Value to report: the measurement, `0.0` for missing inputs, or
    /// nothing when suppressed.
    pub fn reported(self) -> Option<f64> {
        match self {
            Valgus::Measured(cm) => Some(cm),
            Valgus::MissingInputs => Some(0.0),
            Valgus::Suppressed => None,
        }
    }
}

/// Computes measurements from one landmark frame.
pub struct AngleEngine<'a> {
    frame: &'a LandmarkFrame,
}

impl<'a> AngleEngine<'a> {
    pub fn new(frame: &'a LandmarkFrame) -> Self {
        Self { frame }
    }

    fn point(&self, name: LandmarkName) -> AngleResult<Option<Vec3>> {
        match self.frame.get(name) {
            None => Ok(None),
            Some(lm) if lm.is_finite() => Ok(Some(Vec3::from_array(lm.position()))),
            Some(_) => Err(AngleError::NonFiniteLandmark { landmark: name }),
        }
    }

    fn points<const N: usize>(&self, names: [LandmarkName; N]) -> AngleResult<Option<[Vec3; N]>> {
        let mut out = [Vec3::default(); N];
        for (slot, name) in out.iter_mut().zip(names) {
            match self.point(name)? {
                Some(p) => *slot = p,
                None => return Ok(None),
            }
        }
        Ok(Some(out))
    }

    fn vertex_angle(
        &self,
        measurement: &'static str,
        a: LandmarkName,
        b: LandmarkName,
        c: LandmarkName,
    ) -> AngleResult<Option<f64>> {
        match self.points([a, b, c])? {
            Some([pa, pb, pc]) => finite(measurement, angle_at_vertex(pa, pb, pc)).map(Some),
            None => Ok(None),
        }
    }

    /// Knee flexion: hip → knee → ankle.
    pub fn knee(&self, side: Side) -> AngleResult<Option<f64>> {
        self.vertex_angle(
            keys::knee(side),
            LandmarkName::hip(side),
            LandmarkName::knee(side),
            LandmarkName::ankle(side),
        )
    }

    /// Hip flexion on one side: shoulder → hip → knee.
    pub fn hip_side(&self, side: Side) -> AngleResult<Option<f64>> {
        self.vertex_angle(
            keys::hip(side),
            LandmarkName::shoulder(side),
            LandmarkName::hip(side),
            LandmarkName::knee(side),
        )
    }

    /// Mean of both hip angles. Both sides must be present.
    pub fn hip(&self) -> AngleResult<Option<f64>> {
        let shoulders = [LandmarkName::LeftShoulder, LandmarkName::RightShoulder];
        let hips = [LandmarkName::LeftHip, LandmarkName::RightHip];
        let knees = [LandmarkName::LeftKnee, LandmarkName::RightKnee];

        let Some([ls, rs]) = self.points(shoulders)? else {
            return Ok(None);
        };
        let Some([lh, rh]) = self.points(hips)? else {
            return Ok(None);
        };
        let Some([lk, rk]) = self.points(knees)? else {
            return Ok(None);
        };

        let left = angle_between(ls.sub(lh), lk.sub(lh));
        let right = angle_between(rs.sub(rh), rk.sub(rh));
        finite(keys::HIP, round_to((left + right) / 2.0, 1)).map(Some)
    }

    /// Trunk inclination from vertical: 0° upright, 90° horizontal.
    pub fn trunk_inclination(&self) -> AngleResult<Option<f64>> {
        let names = [
            LandmarkName::LeftShoulder,
            LandmarkName::RightShoulder,
            LandmarkName::LeftHip,
            LandmarkName::RightHip,
        ];
        let Some([ls, rs, lh, rh]) = self.points(names)? else {
            return Ok(None);
        };
        let shoulder_mid = ls.midpoint(rs);
        let hip_mid = lh.midpoint(rh);
        finite(
            keys::TRUNK_INCLINATION,
            angle_to_axis(hip_mid, shoulder_mid, Axis::Vertical),
        )
        .map(Some)
    }

    /// Tilt of the left→right hip line away from horizontal.
    pub fn pelvic_tilt(&self) -> AngleResult<Option<f64>> {
        let Some([lh, rh]) = self.points([LandmarkName::LeftHip, LandmarkName::RightHip])? else {
            return Ok(None);
        };
        finite(keys::PELVIC_TILT, angle_to_axis(lh, rh, Axis::Horizontal)).map(Some)
    }

    /// Ankle angle: knee → ankle → foot index.
    pub fn ankle(&self, side: Side) -> AngleResult<Option<f64>> {
        self.vertex_angle(
            keys::ankle(side),
            LandmarkName::knee(side),
            LandmarkName::ankle(side),
            LandmarkName::foot_index(side),
        )
    }

    /// Elbow flexion: shoulder → elbow → wrist.
    pub fn elbow(&self, side: Side) -> AngleResult<Option<f64>> {
        self.vertex_angle(
            keys::elbow(side),
            LandmarkName::shoulder(side),
            LandmarkName::elbow(side),
            LandmarkName::wrist(side),
        )
    }

    /// Shoulder flexion: elbow → shoulder → hip.
    pub fn shoulder(&self, side: Side) -> AngleResult<Option<f64>> {
        self.vertex_angle(
            keys::shoulder(side),
            LandmarkName::elbow(side),
            LandmarkName::shoulder(side),
            LandmarkName::hip(side),
        )
    }

    /// Hip-width ruler, recomputed from this frame.
    pub fn calibration(&self) -> AngleResult<Option<Calibration>> {
        let Some([lh, rh]) = self.points([LandmarkName::LeftHip, LandmarkName::RightHip])? else {
            return Ok(None);
        };
        let width = finite(keys::HIP_WIDTH_NORM, planar_distance(lh, rh))?;
        Ok(Some(Calibration::from_hip_width(width)))
    }

    /// Calibrated knee valgus: lateral deviation of the knee from the
    /// hip–ankle midpoint, in centimeters.
    pub fn knee_valgus_cm(&self, side: Side) -> AngleResult<Valgus> {
        let names = [
            LandmarkName::hip(side),
            LandmarkName::knee(side),
            LandmarkName::ankle(side),
        ];
        let Some([hip, knee, ankle]) = self.points(names)? else {
            return Ok(Valgus::MissingInputs);
        };
        let calibration = match self.calibration()? {
            Some(c) if c.is_frontal() => c,
            _ => return Ok(Valgus::Suppressed),
        };

        let expected_x = (hip.x + ankle.x) / 2.0;
        let deviation_norm = (knee.x - expected_x).abs();
        let cm = round_to(
            deviation_norm * (REFERENCE_HIP_WIDTH_CM / calibration.hip_width_norm),
            1,
        );
        let cm = finite(keys::knee_valgus_cm(side), cm)?;
        Ok(Valgus::Measured(cm.min(MAX_VALGUS_CM)))
    }

    /// Vertical shoulder–hip distance, in hundredths of the image height.
    pub fn shoulder_elevation(&self, side: Side) -> AngleResult<Option<f64>> {
        let names = [LandmarkName::shoulder(side), LandmarkName::hip(side)];
        let Some([shoulder, hip]) = self.points(names)? else {
            return Ok(None);
        };
        finite("shoulder_elevation", round_to((shoulder.y - hip.y).abs() * 100.0, 1)).map(Some)
    }

    /// Horizontal elbow–wrist offset, a proxy for wrist deviation.
    pub fn wrist_angle(&self, side: Side) -> AngleResult<Option<f64>> {
        let names = [LandmarkName::elbow(side), LandmarkName::wrist(side)];
        let Some([elbow, wrist]) = self.points(names)? else {
            return Ok(None);
        };
        finite("wrist_angle", round_to((elbow.x - wrist.x).abs() * 100.0, 1)).map(Some)
    }

    /// Unweighted mean visibility over the tracked anatomical points.
    /// Absent points count as zero visibility.
    pub fn mean_visibility(&self) -> f64 {
        let total: f64 = LandmarkName::TRACKED
            .iter()
            .map(|name| self.frame.get(*name).map_or(0.0, |lm| lm.visibility))
            .sum();
        round_to(total / LandmarkName::TRACKED.len() as f64, 3)
    }

    /// Every measurement whose inputs are present and valid.
    ///
    /// Unlike the exercise selection, no defaults are filled in: a missing
    /// or invalid input simply leaves its key out.
    pub fn catalog(&self) -> AngleSet {
        let mut set = AngleSet::builder();

        for side in Side::BOTH {
            set.set_opt(keys::knee(side), self.knee(side).ok().flatten());
        }

        let hip_left = self.hip_side(Side::Left).ok().flatten();
        let hip_right = self.hip_side(Side::Right).ok().flatten();
        set.set_opt(keys::HIP_LEFT, hip_left);
        set.set_opt(keys::HIP_RIGHT, hip_right);
        if let (Some(l), Some(r)) = (hip_left, hip_right) {
            set.set(keys::HIP_AVG, round_to((l + r) / 2.0, 1));
        }

        for side in Side::BOTH {
            set.set_opt(keys::elbow(side), self.elbow(side).ok().flatten());
            set.set_opt(keys::shoulder(side), self.shoulder(side).ok().flatten());

            if let Some(raw) = self.ankle(side).ok().flatten() {
                set.set(keys::ankle_raw(side), raw);
                set.set(
                    keys::ankle_dorsiflexion(side),
                    round_to((NEUTRAL_ANKLE_DEG - raw).max(0.0), 1),
                );
            }
        }

        set.set_opt(
            keys::TRUNK_INCLINATION,
            self.trunk_inclination().ok().flatten(),
        );

        if let Some(calibration) = self.calibration().ok().flatten() {
            set.set(keys::HIP_WIDTH_NORM, round_to(calibration.hip_width_norm, 4));
            set.set(keys::CALIBRATION_FACTOR, round_to(calibration.factor, 2));
        }

        for side in Side::BOTH {
            if let Ok(Valgus::Measured(cm)) = self.knee_valgus_cm(side) {
                set.set(keys::knee_valgus_cm(side), cm);
            }
            set.set_opt(
                keys::shoulder_elevation(side),
                self.shoulder_elevation(side).ok().flatten(),
            );
            set.set_opt(keys::wrist_angle(side), self.wrist_angle(side).ok().flatten());
        }

        set.set(keys::CONFIDENCE, self.mean_visibility());
        set.build()
    }
}

fn finite(measurement: &'static str, value: f64) -> AngleResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AngleError::NonFiniteResult { measurement })
    }
}
