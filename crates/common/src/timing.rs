//! Timing utilities for request and batch accounting.
//!
//! Processing time is measured against a monotonic clock; the wall-clock
//! start time is kept alongside for reports.

use std::time::Instant;

/// A stopwatch anchored to the moment a request or batch started.
#[derive(Debug, Clone)]
pub struct Stopwatch {
    /// The instant the stopwatch started.
    start: Instant,

    /// Wall-clock time at start (RFC 3339 string).
    started_wall: String,
}

impl Stopwatch {
    /// Start a new stopwatch anchored to now.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
            started_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Whole milliseconds elapsed since start.
    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Seconds elapsed since start.
    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Wall-clock time at start.
    pub fn started_wall(&self) -> &str {
        &self.started_wall
    }
}

/// Convert milliseconds to seconds.
pub fn ms_to_secs(ms: f64) -> f64 {
    ms / 1000.0
}

/// Convert seconds to milliseconds.
pub fn secs_to_ms(secs: f64) -> f64 {
    secs * 1000.0
}

/// Round to a fixed number of decimal places.
///
/// Reported measurements carry fixed precision (angles 1 dp, scores 3 dp)
/// so that downstream consumers can compare values exactly.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopwatch_elapsed() {
        let watch = Stopwatch::start();
        assert!(watch.elapsed_ms() < 1_000);
        assert!(!watch.started_wall().is_empty());
    }

    #[test]
    fn test_ms_secs_conversion() {
        assert!((ms_to_secs(1_500.0) - 1.5).abs() < 1e-12);
        assert!((secs_to_ms(2.0) - 2_000.0).abs() < 1e-12);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(12.345, 1), 12.3);
        assert_eq!(round_to(0.123456, 4), 0.1235);
        assert_eq!(round_to(-3.26, 1), -3.3);
    }
}
