//! Per-frame analysis: one detected pose in, one [`FrameAnalysis`] out.
//!
//! Combines the exercise angle selection, the full measurement catalog,
//! phase classification and quality scoring. The analyzer holds no state
//! between frames and is safe to share across worker threads.

use formcheck_pose_model::{ExerciseType, FrameAnalysis, LandmarkFrame};

use crate::angles::AngleEngine;
use crate::phase::{classify_phase, FramePosition};
use crate::preprocess::{filter_low_confidence, interpolate_missing_knees};
use crate::quality::{confidence_score, frame_quality};
use crate::selector::select_angles;

/// Landmark clean-up applied before measuring.
#[derive(Debug, Clone, Default)]
pub struct AnalyzerOptions {
    /// Drop points below this visibility.
    pub min_visibility: Option<f64>,

    /// Synthesize absent knees from hip and ankle.
    pub interpolate_missing_knees: bool,
}

/// Analysis of one frame plus notices raised while producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedFrame {
    pub analysis: FrameAnalysis,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct FrameAnalyzer {
    exercise: ExerciseType,
    options: AnalyzerOptions,
}

impl FrameAnalyzer {
    pub fn new(exercise: ExerciseType, options: AnalyzerOptions) -> Self {
        if !exercise.is_recognized() {
            tracing::warn!(exercise = %exercise, "Unknown exercise type, using squat angles");
        }
        Self { exercise, options }
    }

    /// Analyzer with no landmark clean-up.
    pub fn with_defaults(exercise: ExerciseType) -> Self {
        Self::new(exercise, AnalyzerOptions::default())
    }

    pub fn exercise(&self) -> &ExerciseType {
        &self.exercise
    }

    /// Analyze one detected frame at `position` in its batch.
    pub fn analyze(&self, landmarks: LandmarkFrame, position: FramePosition) -> AnalyzedFrame {
        let landmarks = self.prepare(landmarks);

        let selection = select_angles(&landmarks, &self.exercise);
        let catalog = AngleEngine::new(&landmarks).catalog();
        let world_catalog = landmarks
            .world()
            .map(|world| AngleEngine::new(world).catalog());
        let phase = classify_phase(&selection.angles, &self.exercise, position);
        let confidence = confidence_score(&landmarks);
        let quality = frame_quality(&landmarks, landmarks.coordinate_space().image_height());

        tracing::debug!(
            frame = position.frame_number,
            phase = %phase,
            confidence,
            quality = quality.quality_score,
            "Frame analyzed"
        );

        AnalyzedFrame {
            analysis: FrameAnalysis {
                angles: selection.angles,
                catalog,
                world_catalog,
                phase,
                confidence,
                quality,
                landmarks,
            },
            warnings: selection.warnings,
        }
    }

    fn prepare(&self, landmarks: LandmarkFrame) -> LandmarkFrame {
        let landmarks = match self.options.min_visibility {
            Some(min) => filter_low_confidence(&landmarks, min),
            None => landmarks,
        };
        if self.options.interpolate_missing_knees {
            interpolate_missing_knees(&landmarks)
        } else {
            landmarks
        }
    }
}
