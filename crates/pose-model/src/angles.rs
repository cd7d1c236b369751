//! Angle sets: named biomechanical measurements for one frame.
//!
//! Keys are flat strings. Per-side keys end in `_left`/`_right` and
//! centimeter measurements end in `_cm`. Values are rounded before they
//! are stored (angles to one decimal place).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::landmark::Side;

/// Well-known angle-set keys.
pub mod keys {
    use crate::landmark::Side;

    pub const KNEE_LEFT: &str = "knee_left";
    pub const KNEE_RIGHT: &str = "knee_right";
    pub const HIP: &str = "hip";
    pub const HIP_LEFT: &str = "hip_left";
    pub const HIP_RIGHT: &str = "hip_right";
    pub const HIP_AVG: &str = "hip_avg";
    pub const TRUNK_INCLINATION: &str = "trunk_inclination";
    pub const BACK_ANGLE: &str = "back_angle";
    pub const ANKLE_LEFT: &str = "ankle_left";
    pub const ANKLE_RIGHT: &str = "ankle_right";
    pub const KNEE_VALGUS_LEFT_CM: &str = "knee_valgus_left_cm";
    pub const KNEE_VALGUS_RIGHT_CM: &str = "knee_valgus_right_cm";
    pub const PELVIC_TILT: &str = "pelvic_tilt";
    pub const ELBOW_LEFT: &str = "elbow_left";
    pub const ELBOW_RIGHT: &str = "elbow_right";
    pub const SHOULDER_LEFT: &str = "shoulder_left";
    pub const SHOULDER_RIGHT: &str = "shoulder_right";
    pub const HIP_WIDTH_NORM: &str = "hip_width_norm";
    pub const CALIBRATION_FACTOR: &str = "calibration_factor";
    pub const CONFIDENCE: &str = "confidence";

    pub fn knee(side: Side) -> &'static str {
        match side {
            Side::Left => KNEE_LEFT,
            Side::Right => KNEE_RIGHT,
        }
    }

    pub fn hip(side: Side) -> &'static str {
        match side {
            Side::Left => HIP_LEFT,
            Side::Right => HIP_RIGHT,
        }
    }

    pub fn ankle(side: Side) -> &'static str {
        match side {
            Side::Left => ANKLE_LEFT,
            Side::Right => ANKLE_RIGHT,
        }
    }

    pub fn knee_valgus_cm(side: Side) -> &'static str {
        match side {
            Side::Left => KNEE_VALGUS_LEFT_CM,
            Side::Right => KNEE_VALGUS_RIGHT_CM,
        }
    }

    pub fn elbow(side: Side) -> &'static str {
        match side {
            Side::Left => ELBOW_LEFT,
            Side::Right => ELBOW_RIGHT,
        }
    }

    pub fn shoulder(side: Side) -> &'static str {
        match side {
            Side::Left => SHOULDER_LEFT,
            Side::Right => SHOULDER_RIGHT,
        }
    }

    pub fn ankle_raw(side: Side) -> String {
        format!("ankle_raw_{}", side.as_str())
    }

    pub fn ankle_dorsiflexion(side: Side) -> String {
        format!("ankle_dorsiflexion_{}", side.as_str())
    }

    pub fn shoulder_elevation(side: Side) -> String {
        format!("shoulder_elevation_{}", side.as_str())
    }

    pub fn wrist_angle(side: Side) -> String {
        format!("wrist_angle_{}", side.as_str())
    }
}

/// An immutable mapping from measurement name to value.
///
/// Built once per frame through [`AngleSetBuilder`]; consumers only read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AngleSet {
    values: BTreeMap<String, f64>,
}

impl AngleSet {
    pub fn builder() -> AngleSetBuilder {
        AngleSetBuilder::default()
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }

    /// Value for `key`, or `default` when it is absent.
    pub fn get_or(&self, key: &str, default: f64) -> f64 {
        self.get(key).unwrap_or(default)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether every value is a finite number.
    pub fn is_finite(&self) -> bool {
        self.values.values().all(|v| v.is_finite())
    }

    /// Mean of the left/right values of a per-side measurement, treating
    /// an absent side as `0.0`.
    pub fn bilateral_mean(&self, left: &str, right: &str) -> f64 {
        (self.get_or(left, 0.0) + self.get_or(right, 0.0)) / 2.0
    }

    /// Left/right values for a per-side key pair, if both are present.
    pub fn pair(&self, side_key: impl Fn(Side) -> &'static str) -> Option<(f64, f64)> {
        Some((self.get(side_key(Side::Left))?, self.get(side_key(Side::Right))?))
    }
}

/// Accumulates measurements before freezing them into an [`AngleSet`].
#[derive(Debug, Clone, Default)]
pub struct AngleSetBuilder {
    values: BTreeMap<String, f64>,
}

impl AngleSetBuilder {
    /// Set a value, replacing any earlier value under the same key.
    pub fn set(&mut self, key: impl Into<String>, value: f64) -> &mut Self {
        self.values.insert(key.into(), value);
        self
    }

    /// Set a value only when one was computed.
    pub fn set_opt(&mut self, key: impl Into<String>, value: Option<f64>) -> &mut Self {
        if let Some(value) = value {
            self.values.insert(key.into(), value);
        }
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: f64) -> Self {
        self.set(key, value);
        self
    }

    pub fn build(self) -> AngleSet {
        AngleSet {
            values: self.values,
        }
    }
}
