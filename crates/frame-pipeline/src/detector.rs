//! Pose detector interface.
//!
//! A [`DetectorBackend`] builds detector contexts in two modes: one
//! accelerated context used sequentially, or CPU contexts that each worker
//! owns for its lifetime. Contexts never cross threads: [`PoseDetector`]
//! has no `Send` bound and only the backend is shared.

use std::path::{Path, PathBuf};

use serde::Serialize;

use formcheck_common::{FormcheckResult, ModelVariant};
use formcheck_pose_model::LandmarkFrame;

/// One detected pose.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedPose {
    /// Image landmarks, with the metric world frame attached when the
    /// detector provides one.
    pub landmarks: LandmarkFrame,
}

/// A detector call that did not produce a pose.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DetectError {
    /// This frame could not be read or decoded. Other frames are unaffected.
    #[error("{0}")]
    Frame(String),

    /// The context itself is broken and must not be reused.
    #[error("detector context failed: {0}")]
    Context(String),
}

/// A single detector context.
pub trait PoseDetector {
    /// Detect the pose in the image at `path`. `Ok(None)` means the image
    /// was read but contains no pose.
    fn detect(&mut self, path: &Path) -> Result<Option<DetectedPose>, DetectError>;
}

/// A resolved model asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelAsset {
    pub path: PathBuf,
    pub variant: ModelVariant,
}

/// Builds detector contexts for one detector implementation.
pub trait DetectorBackend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Locate the model asset. Failure is fatal for the whole batch.
    fn resolve_model(&self) -> FormcheckResult<ModelAsset>;

    /// Build the single accelerated context.
    fn accelerated(&self, model: &ModelAsset) -> FormcheckResult<Box<dyn PoseDetector>>;

    /// Build one CPU context. Called once per worker.
    fn cpu(&self, model: &ModelAsset) -> FormcheckResult<Box<dyn PoseDetector>>;
}
