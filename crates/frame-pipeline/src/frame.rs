//! Processing of a single frame through one detector context.

use std::path::{Path, PathBuf};

use formcheck_biomech::phase::FramePosition;
use formcheck_biomech::FrameAnalyzer;
use formcheck_pose_model::{FrameFailure, FrameResult};

use crate::detector::{DetectError, PoseDetector};

/// One unit of work: a frame and its place in the batch.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameJob {
    /// 1-based position in the batch.
    pub index: usize,
    pub path: PathBuf,
    pub timestamp_ms: Option<f64>,
}

impl FrameJob {
    /// Jobs for `paths` in order, without timestamps.
    pub fn from_paths<P: AsRef<Path>>(paths: &[P]) -> Vec<FrameJob> {
        paths
            .iter()
            .enumerate()
            .map(|(i, p)| FrameJob {
                index: i + 1,
                path: p.as_ref().to_path_buf(),
                timestamp_ms: None,
            })
            .collect()
    }

    /// File name used in results.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn fail(&self, failure: FrameFailure) -> FrameResult {
        FrameResult::failed(self.index, self.file_name(), self.timestamp_ms, failure)
    }
}

/// A finished frame plus notices raised while analyzing it.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutcome {
    pub result: FrameResult,
    pub warnings: Vec<String>,
}

impl FrameOutcome {
    pub fn failed(job: &FrameJob, failure: FrameFailure) -> Self {
        Self {
            result: job.fail(failure),
            warnings: Vec::new(),
        }
    }
}

/// Run one frame through `detector` and analyze the pose.
///
/// Missing files, unreadable images and frames without a pose come back as
/// failed results. The only error is [`DetectError::Context`]: the context
/// is broken and the caller must stop using it.
pub fn process_frame(
    detector: &mut dyn PoseDetector,
    analyzer: &FrameAnalyzer,
    job: &FrameJob,
    total_frames: usize,
) -> Result<FrameOutcome, DetectError> {
    if !job.path.exists() {
        tracing::warn!(frame = job.index, path = %job.path.display(), "Frame file not found");
        return Ok(FrameOutcome::failed(
            job,
            FrameFailure::FileNotFound {
                path: job.path.display().to_string(),
            },
        ));
    }

    let pose = match detector.detect(&job.path) {
        Ok(Some(pose)) => pose,
        Ok(None) => {
            tracing::warn!(frame = job.index, "No pose detected");
            return Ok(FrameOutcome::failed(job, FrameFailure::NoPoseDetected));
        }
        Err(DetectError::Frame(message)) => {
            tracing::warn!(frame = job.index, %message, "Failed to read frame");
            return Ok(FrameOutcome::failed(job, FrameFailure::Unreadable { message }));
        }
        Err(e @ DetectError::Context(_)) => return Err(e),
    };

    let analyzed = analyzer.analyze(pose.landmarks, FramePosition::new(job.index, total_frames));
    Ok(FrameOutcome {
        result: FrameResult::processed(
            job.index,
            job.file_name(),
            job.timestamp_ms,
            analyzed.analysis,
        ),
        warnings: analyzed.warnings,
    })
}
