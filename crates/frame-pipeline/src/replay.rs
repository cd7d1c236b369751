//! Replay detector: serves detector output recorded next to each frame.
//!
//! For a frame `clip/frame_001.jpg` the recorded output lives in
//! `clip/frame_001.jpg.landmarks.json`:
//!
//! ```json
//! {
//!   "landmarks": [{"x": 0.51, "y": 0.18, "z": -0.2, "visibility": 0.99}, ...],
//!   "world_landmarks": [...]
//! }
//! ```
//!
//! `landmarks` is `null` when the detector found no pose. Image landmarks
//! are normalized; world landmarks are metric. Other fields are ignored.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use formcheck_common::{DetectorConfig, FormcheckError, FormcheckResult};
use formcheck_pose_model::{CoordinateSpace, DetectorPoint, LandmarkFrame};

use crate::detector::{DetectError, DetectedPose, DetectorBackend, ModelAsset, PoseDetector};
use crate::model::ModelLocator;

/// Suffix appended to a frame path to find its recorded output.
pub const SIDECAR_SUFFIX: &str = ".landmarks.json";

#[derive(Debug, Deserialize)]
struct RecordedOutput {
    landmarks: Option<Vec<DetectorPoint>>,
    #[serde(default)]
    world_landmarks: Option<Vec<DetectorPoint>>,
}

/// Path of the recorded output for `frame`.
pub fn sidecar_path(frame: &Path) -> PathBuf {
    let mut name = frame.as_os_str().to_owned();
    name.push(SIDECAR_SUFFIX);
    PathBuf::from(name)
}

/// Backend whose contexts replay recorded detector output.
///
/// The model asset is still resolved so that a missing asset fails a
/// batch exactly as it would with a live detector.
#[derive(Debug, Clone)]
pub struct ReplayBackend {
    locator: ModelLocator,
    config: DetectorConfig,
}

impl ReplayBackend {
    pub fn new(locator: ModelLocator, config: DetectorConfig) -> Self {
        Self { locator, config }
    }
}

impl DetectorBackend for ReplayBackend {
    fn name(&self) -> &str {
        "replay"
    }

    fn resolve_model(&self) -> FormcheckResult<ModelAsset> {
        self.locator.resolve()
    }

    fn accelerated(&self, model: &ModelAsset) -> FormcheckResult<Box<dyn PoseDetector>> {
        if !self.config.prefer_accelerated {
            return Err(FormcheckError::accelerator_unavailable(
                "accelerated context disabled by configuration",
            ));
        }
        tracing::debug!(model = %model.path.display(), "Creating accelerated replay context");
        Ok(Box::new(ReplayDetector::new(self.config.clone())))
    }

    fn cpu(&self, model: &ModelAsset) -> FormcheckResult<Box<dyn PoseDetector>> {
        tracing::debug!(model = %model.path.display(), "Creating CPU replay context");
        Ok(Box::new(ReplayDetector::new(self.config.clone())))
    }
}

/// One replay context.
#[derive(Debug)]
pub struct ReplayDetector {
    config: DetectorConfig,
}

impl ReplayDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    fn read(&self, frame: &Path) -> Result<RecordedOutput, DetectError> {
        let sidecar = sidecar_path(frame);
        let content = std::fs::read_to_string(&sidecar).map_err(|e| {
            DetectError::Frame(format!(
                "Failed to load image: {} ({})",
                frame.display(),
                e
            ))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            DetectError::Frame(format!(
                "Failed to load image: {} (invalid recorded output: {})",
                frame.display(),
                e
            ))
        })
    }
}

impl PoseDetector for ReplayDetector {
    fn detect(&mut self, path: &Path) -> Result<Option<DetectedPose>, DetectError> {
        let recorded = self.read(path)?;
        let Some(points) = recorded.landmarks.filter(|p| !p.is_empty()) else {
            return Ok(None);
        };

        // The recorded pose passes the same presence gate a live detector
        // applies: mean visibility must reach the configured minimum.
        let presence = points.iter().map(|p| p.visibility).sum::<f64>() / points.len() as f64;
        if presence < self.config.min_presence_confidence {
            tracing::debug!(
                frame = %path.display(),
                presence,
                "Recorded pose below presence threshold"
            );
            return Ok(None);
        }

        let mut landmarks = LandmarkFrame::from_detector_output(CoordinateSpace::Normalized, &points);
        if let Some(world) = recorded.world_landmarks.filter(|w| !w.is_empty()) {
            landmarks = landmarks.with_world(LandmarkFrame::from_detector_output(
                CoordinateSpace::WorldMetric,
                &world,
            ));
        }

        Ok(Some(DetectedPose { landmarks }))
    }
}
