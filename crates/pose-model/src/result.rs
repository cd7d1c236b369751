//! Per-frame and per-batch output records.

use serde::{Deserialize, Serialize};

use crate::angles::AngleSet;
use crate::exercise::{ExerciseType, Phase};
use crate::landmark::LandmarkFrame;

/// Which processing strategy produced a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Device {
    /// Single accelerated detector context, frames processed sequentially.
    Gpu,
    /// Worker pool of CPU detector contexts.
    Cpu,
}

impl Device {
    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Gpu => "gpu",
            Device::Cpu => "cpu",
        }
    }
}

/// Why a single frame produced no analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrameFailure {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("No pose detected")]
    NoPoseDetected,

    #[error("Failed to load image: {message}")]
    Unreadable { message: String },

    #[error("Detector unavailable: {message}")]
    DetectorUnavailable { message: String },

    #[error("Worker terminated before reporting this frame")]
    WorkerLost,
}

/// Weighted frame-quality score and the factors it was built from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct QualityReport {
    /// Weighted sum of the factors, in `[0.0, 1.0]`.
    pub quality_score: f64,
    pub factors: QualityFactors,
}

/// Inputs of a [`QualityReport`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct QualityFactors {
    /// Critical-joint weighted visibility.
    pub confidence: f64,
    /// Fraction of the landmark vocabulary present.
    pub completeness: f64,
    /// How well the body fills the image vertically.
    pub body_size: f64,
}

/// Measurements derived from one successfully detected frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameAnalysis {
    /// Angles selected for the requested exercise.
    pub angles: AngleSet,

    /// Every measurement whose inputs were present.
    pub catalog: AngleSet,

    /// The same catalog computed on metric world landmarks, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub world_catalog: Option<AngleSet>,

    pub phase: Phase,

    /// Critical-joint weighted visibility in `[0.0, 1.0]` (3 dp).
    pub confidence: f64,

    pub quality: QualityReport,

    pub landmarks: LandmarkFrame,
}

/// Outcome for one input frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameResult {
    /// 1-based position of the frame in the input batch.
    pub frame_index: usize,

    /// File name of the frame.
    pub frame: String,

    /// Capture timestamp supplied by the caller, in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<f64>,

    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<FrameFailure>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<FrameAnalysis>,
}

impl FrameResult {
    pub fn processed(
        frame_index: usize,
        frame: impl Into<String>,
        timestamp_ms: Option<f64>,
        analysis: FrameAnalysis,
    ) -> Self {
        Self {
            frame_index,
            frame: frame.into(),
            timestamp_ms,
            success: true,
            error: None,
            analysis: Some(analysis),
        }
    }

    pub fn failed(
        frame_index: usize,
        frame: impl Into<String>,
        timestamp_ms: Option<f64>,
        failure: FrameFailure,
    ) -> Self {
        Self {
            frame_index,
            frame: frame.into(),
            timestamp_ms,
            success: false,
            error: Some(failure),
            analysis: None,
        }
    }

    /// Confidence of the analysis, if the frame was processed.
    pub fn confidence(&self) -> Option<f64> {
        self.analysis.as_ref().map(|a| a.confidence)
    }
}

/// Outcome for a whole batch, frames in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub success: bool,
    pub device: Device,
    pub exercise: ExerciseType,
    pub frames_total: usize,
    pub frames_processed: usize,
    pub frames: Vec<FrameResult>,

    /// Non-fatal notices, such as an unrecognized exercise identifier.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl BatchResult {
    /// Assemble a batch result, deriving the counters from `frames`.
    pub fn from_frames(
        device: Device,
        exercise: ExerciseType,
        frames: Vec<FrameResult>,
        warnings: Vec<String>,
    ) -> Self {
        let frames_processed = frames.iter().filter(|f| f.success).count();
        Self {
            success: true,
            device,
            exercise,
            frames_total: frames.len(),
            frames_processed,
            frames,
            warnings,
        }
    }

    /// Whether frames are in strictly increasing `frame_index` order.
    pub fn is_in_input_order(&self) -> bool {
        self.frames
            .windows(2)
            .all(|w| w[0].frame_index < w[1].frame_index)
    }

    /// Fraction of frames that produced an analysis.
    pub fn success_rate(&self) -> f64 {
        if self.frames_total == 0 {
            return 0.0;
        }
        self.frames_processed as f64 / self.frames_total as f64
    }
}
