//! Statistics over sequences of already-computed angles.
//!
//! Everything here is a stateless function of its inputs. Typical use is
//! pulling one key (say `knee_left`) out of a batch's frames and feeding
//! the resulting series in.

use serde::{Deserialize, Serialize};

use formcheck_common::timing::{ms_to_secs, round_to};

/// Default tolerance for [`bilateral_symmetry`], in degrees.
pub const DEFAULT_SYMMETRY_TOLERANCE_DEG: f64 = 5.0;

/// Default z-score threshold for [`detect_outliers`].
pub const DEFAULT_OUTLIER_Z: f64 = 2.0;

/// Default window for [`smooth_angle_sequence`].
pub const DEFAULT_SMOOTHING_WINDOW: usize = 3;

/// Left/right comparison of one measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Symmetry {
    /// Absolute difference, 2 dp.
    pub difference: f64,
    pub is_symmetric: bool,
    /// Difference relative to the mean of both sides, in percent (2 dp).
    pub asymmetry_percentage: f64,
}

pub fn bilateral_symmetry(left: f64, right: f64, tolerance: f64) -> Symmetry {
    let difference = (left - right).abs();
    let mean = (left + right) / 2.0;
    let asymmetry_percentage = if mean > 0.0 {
        difference / mean * 100.0
    } else {
        0.0
    };

    Symmetry {
        difference: round_to(difference, 2),
        is_symmetric: difference <= tolerance,
        asymmetry_percentage: round_to(asymmetry_percentage, 2),
    }
}

/// Indices whose z-score (population standard deviation) exceeds
/// `threshold`. Fewer than three values, or a constant series, yields no
/// outliers.
pub fn detect_outliers(values: &[f64], threshold: f64) -> Vec<usize> {
    if values.len() < 3 {
        return Vec::new();
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();
    if std == 0.0 || !std.is_finite() {
        return Vec::new();
    }

    values
        .iter()
        .enumerate()
        .filter(|(_, v)| ((*v - mean) / std).abs() > threshold)
        .map(|(i, _)| i)
        .collect()
}

/// Centered moving average. The window shrinks at the edges so the output
/// has the same length as the input. Inputs shorter than the window are
/// returned unchanged.
pub fn smooth_angle_sequence(angles: &[f64], window: usize) -> Vec<f64> {
    if window == 0 || angles.len() < window {
        return angles.to_vec();
    }

    (0..angles.len())
        .map(|i| {
            let start = i.saturating_sub(window / 2);
            let end = (i + window / 2 + 1).min(angles.len());
            let slice = &angles[start..end];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

/// Angular speed statistics in degrees per second.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpeedSummary {
    pub avg: f64,
    pub max: f64,
    pub min: f64,
}

/// Speed between consecutive samples. Pairs whose timestamps do not
/// increase are skipped; with no usable pair the summary is all zero.
pub fn movement_speed(angles: &[f64], timestamps_ms: &[f64]) -> SpeedSummary {
    let speeds: Vec<f64> = angles
        .windows(2)
        .zip(timestamps_ms.windows(2))
        .filter_map(|(a, t)| {
            let dt = ms_to_secs(t[1] - t[0]);
            (dt > 0.0).then(|| (a[1] - a[0]).abs() / dt)
        })
        .collect();

    if speeds.is_empty() {
        return SpeedSummary::default();
    }

    let sum: f64 = speeds.iter().sum();
    let max = speeds.iter().copied().fold(f64::MIN, f64::max);
    let min = speeds.iter().copied().fold(f64::MAX, f64::min);

    SpeedSummary {
        avg: round_to(sum / speeds.len() as f64, 2),
        max: round_to(max, 2),
        min: round_to(min, 2),
    }
}
