//! FormCheck Biomechanics Engine
//!
//! Turns one frame of body landmarks into biomechanical measurements:
//! - **Geometry:** Vertex angles and angles against a reference axis
//! - **Angle extraction:** Joint flexion, trunk inclination, pelvic tilt,
//!   hip-width calibrated knee valgus
//! - **Exercise selection:** The angle subset relevant to each exercise
//! - **Phase classification:** Coarse movement phase per frame
//! - **Quality:** Visibility-weighted confidence and frame quality scores
//! - **Sequences:** Symmetry, outliers, smoothing, and angular speed
//!
//! This crate is pure computation with no I/O and no detector dependency.

pub mod analyzer;
pub mod angles;
pub mod geometry;
pub mod phase;
pub mod preprocess;
pub mod quality;
pub mod selector;
pub mod sequence;

pub use analyzer::{AnalyzedFrame, AnalyzerOptions, FrameAnalyzer};
pub use angles::{AngleEngine, AngleError};
pub use phase::{classify_phase, FramePosition};
pub use quality::{confidence_score, frame_quality, validate_angle_ranges};
pub use selector::{default_angles, select_angles, AngleSelection};
