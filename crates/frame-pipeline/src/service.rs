//! Request validation and report assembly for a service layer.
//!
//! A service accepts a list of frames plus an exercise identifier and
//! returns per-frame results with summary statistics. Transport is left to
//! the caller; this module only shapes the request and the report.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use formcheck_common::{round_to, FormcheckError, FormcheckResult, PipelineConfig, Stopwatch};
use formcheck_pose_model::{Device, ExerciseType, FrameResult};

use crate::batch::BatchProcessor;
use crate::frame::FrameJob;

/// Reason reported when a batch ran but no frame produced an analysis.
pub const NO_FRAMES_PROCESSED: &str = "No frames could be processed";

/// One frame of an analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRequest {
    pub path: PathBuf,
    #[serde(default, alias = "timestamp")]
    pub timestamp_ms: Option<f64>,
}

/// An analysis request as received by a service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    #[serde(default)]
    pub frames: Vec<FrameRequest>,
    #[serde(default)]
    pub exercise_type: ExerciseType,
}

impl AnalysisRequest {
    pub fn new(frames: Vec<FrameRequest>, exercise_type: ExerciseType) -> Self {
        Self {
            frames,
            exercise_type,
        }
    }

    /// Request for `paths` in order, without timestamps.
    pub fn from_paths(paths: Vec<PathBuf>, exercise_type: ExerciseType) -> Self {
        let frames = paths
            .into_iter()
            .map(|path| FrameRequest {
                path,
                timestamp_ms: None,
            })
            .collect();
        Self::new(frames, exercise_type)
    }

    /// Reject empty requests and requests above `max_frames`.
    pub fn validate(&self, max_frames: usize) -> FormcheckResult<()> {
        if self.frames.is_empty() {
            return Err(FormcheckError::invalid_request("Missing frames data"));
        }
        if self.frames.len() > max_frames {
            return Err(FormcheckError::TooManyFrames {
                count: self.frames.len(),
                max: max_frames,
            });
        }
        Ok(())
    }

    pub fn jobs(&self) -> Vec<FrameJob> {
        self.frames
            .iter()
            .enumerate()
            .map(|(i, f)| FrameJob {
                index: i + 1,
                path: f.path.clone(),
                timestamp_ms: f.timestamp_ms,
            })
            .collect()
    }

    /// Last minus first timestamp, when both are present.
    pub fn duration_ms(&self) -> Option<f64> {
        let first = self.frames.first()?.timestamp_ms?;
        let last = self.frames.last()?.timestamp_ms?;
        Some(last - first)
    }
}

/// Summary counters of a report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Statistics {
    pub frames_processed: usize,
    pub frames_total: usize,
    /// Processed over total (3 dp).
    pub success_rate: f64,
    /// Mean confidence of processed frames (3 dp).
    pub average_confidence: f64,
}

impl Statistics {
    pub fn from_frames(frames: &[FrameResult]) -> Self {
        let frames_total = frames.len();
        let confidences: Vec<f64> = frames.iter().filter_map(FrameResult::confidence).collect();
        let frames_processed = confidences.len();

        let success_rate = if frames_total == 0 {
            0.0
        } else {
            frames_processed as f64 / frames_total as f64
        };
        let average_confidence = if confidences.is_empty() {
            0.0
        } else {
            confidences.iter().sum::<f64>() / confidences.len() as f64
        };

        Self {
            frames_processed,
            frames_total,
            success_rate: round_to(success_rate, 3),
            average_confidence: round_to(average_confidence, 3),
        }
    }
}

/// Response of an analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<Device>,
    pub exercise: ExerciseType,
    pub frames: Vec<FrameResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
    pub processing_time_ms: u64,
    pub statistics: Statistics,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Validate `request`, run it through `processor` and assemble the report.
///
/// Request validation errors and batch-fatal errors are returned as `Err`.
/// A batch in which every frame failed is a report with `success: false`.
pub fn analyze_request(
    request: &AnalysisRequest,
    processor: &BatchProcessor,
    config: &PipelineConfig,
) -> FormcheckResult<AnalysisReport> {
    request.validate(config.max_frames_per_request)?;
    let stopwatch = Stopwatch::start();

    let batch = processor.process(&request.exercise_type, &request.jobs())?;
    let statistics = Statistics::from_frames(&batch.frames);
    let processing_time_ms = stopwatch.elapsed_ms();

    if config.enable_metrics {
        tracing::info!(
            target: "formcheck::metrics",
            device = batch.device.as_str(),
            frames_total = statistics.frames_total,
            frames_processed = statistics.frames_processed,
            success_rate = statistics.success_rate,
            average_confidence = statistics.average_confidence,
            processing_time_ms,
            "analysis request"
        );
    }

    let success = statistics.frames_processed > 0;
    if !success {
        tracing::warn!(frames = statistics.frames_total, "{}", NO_FRAMES_PROCESSED);
    }

    Ok(AnalysisReport {
        success,
        device: Some(batch.device),
        exercise: batch.exercise,
        frames: batch.frames,
        duration_ms: request.duration_ms(),
        processing_time_ms,
        statistics,
        warnings: batch.warnings,
        error: (!success).then(|| NO_FRAMES_PROCESSED.to_string()),
    })
}
