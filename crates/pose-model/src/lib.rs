//! FormCheck Pose Model
//!
//! Defines the data contracts shared by the analysis engine and the
//! batch pipeline:
//! - **Landmarks:** Named body-joint positions produced by a pose detector
//! - **Angle sets:** Per-frame biomechanical measurements keyed by name
//! - **Exercises & phases:** Exercise identifiers and movement-phase tags
//! - **Results:** Per-frame and per-batch output records
//!
//! Everything here is plain data with serde support; computation lives in
//! `formcheck-biomech`.

pub mod angles;
pub mod exercise;
pub mod landmark;
pub mod result;

pub use angles::*;
pub use exercise::*;
pub use landmark::*;
pub use result::*;
