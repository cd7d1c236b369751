//! FormCheck Frame Pipeline
//!
//! Turns a batch of frame images into per-frame analyses:
//!
//! 1. **Detector:** [`DetectorBackend`] builds pose-detector contexts
//! 2. **Model:** [`ModelLocator`] resolves the pose-landmarker asset
//! 3. **Frame:** [`process_frame`] runs detection and biomechanical analysis
//! 4. **Batch:** [`BatchProcessor`] tries one accelerated context, falling
//!    back to a [`WorkerPool`] of CPU contexts
//! 5. **Service:** [`analyze_request`] validates a request and assembles
//!    the report with summary statistics
//!
//! Results are always returned in input order.

pub mod batch;
pub mod detector;
pub mod frame;
pub mod model;
pub mod pool;
pub mod replay;
pub mod service;

pub use batch::BatchProcessor;
pub use detector::{DetectError, DetectedPose, DetectorBackend, ModelAsset, PoseDetector};
pub use frame::{process_frame, FrameJob, FrameOutcome};
pub use model::{model_file_name, ModelLocator};
pub use pool::WorkerPool;
pub use replay::{sidecar_path, ReplayBackend, ReplayDetector};
pub use service::{analyze_request, AnalysisReport, AnalysisRequest, FrameRequest, Statistics};
