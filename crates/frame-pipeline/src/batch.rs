//! Batch processing: accelerated path first, worker pool as fallback.
//!
//! # Strategy
//!
//! 1. **Resolve** the model asset once. Failure is fatal for the batch.
//! 2. **Accelerated path:** build one accelerated context and run the first
//!    frame through it as a smoke test. If that works, the remaining frames
//!    go through the same context sequentially.
//! 3. **Fallback:** if the context cannot be built, or breaks at any point,
//!    the partial results are discarded and every frame is submitted to a
//!    [`WorkerPool`] of CPU contexts.
//!
//! Frames always come back in input order. A frame that fails does not fail
//! the batch; only the absence of any working detector does.

use std::sync::Arc;

use formcheck_biomech::{AnalyzerOptions, FrameAnalyzer};
use formcheck_common::{FormcheckError, FormcheckResult};
use formcheck_pose_model::{BatchResult, Device, ExerciseType, FrameFailure};

use crate::detector::{DetectError, DetectorBackend, ModelAsset};
use crate::frame::{process_frame, FrameJob, FrameOutcome};
use crate::pool::WorkerPool;

/// Runs batches of frames against one detector backend.
#[derive(Clone)]
pub struct BatchProcessor {
    backend: Arc<dyn DetectorBackend>,
    workers: usize,
    analyzer_options: AnalyzerOptions,
}

impl BatchProcessor {
    /// `workers` is the CPU pool size used when the accelerated path is
    /// unavailable.
    pub fn new(backend: Arc<dyn DetectorBackend>, workers: usize) -> Self {
        Self {
            backend,
            workers: workers.max(1),
            analyzer_options: AnalyzerOptions::default(),
        }
    }

    pub fn with_analyzer_options(mut self, options: AnalyzerOptions) -> Self {
        self.analyzer_options = options;
        self
    }

    pub fn backend(&self) -> &dyn DetectorBackend {
        self.backend.as_ref()
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Process `jobs` for `exercise`.
    pub fn process(&self, exercise: &ExerciseType, jobs: &[FrameJob]) -> FormcheckResult<BatchResult> {
        if jobs.is_empty() {
            return Err(FormcheckError::invalid_request("No frames to process"));
        }

        let model = self.backend.resolve_model()?;
        tracing::info!(
            backend = self.backend.name(),
            model = %model.path.display(),
            frames = jobs.len(),
            exercise = %exercise,
            "Starting batch"
        );

        let analyzer = FrameAnalyzer::new(exercise.clone(), self.analyzer_options.clone());

        let (device, outcomes) = match self.run_accelerated(&model, &analyzer, jobs) {
            Ok(outcomes) => (Device::Gpu, outcomes),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    workers = self.workers,
                    "Accelerated path unavailable, using CPU worker pool"
                );
                let pool = WorkerPool::new(self.backend.as_ref(), &model, &analyzer, self.workers);
                (Device::Cpu, pool.run(jobs, jobs.len()))
            }
        };

        let no_detector = outcomes.iter().all(|o| {
            matches!(
                o.result.error,
                Some(FrameFailure::DetectorUnavailable { .. })
            )
        });
        if no_detector {
            return Err(FormcheckError::no_processing_path(format!(
                "no detector context could be created for backend '{}'",
                self.backend.name()
            )));
        }

        let mut warnings: Vec<String> = Vec::new();
        let mut frames = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            for warning in outcome.warnings {
                if !warnings.contains(&warning) {
                    warnings.push(warning);
                }
            }
            frames.push(outcome.result);
        }

        let batch = BatchResult::from_frames(device, exercise.clone(), frames, warnings);
        tracing::info!(
            device = device.as_str(),
            processed = batch.frames_processed,
            total = batch.frames_total,
            "Batch finished"
        );
        Ok(batch)
    }

    /// Sequential processing through one accelerated context. Any context
    /// failure abandons the attempt.
    fn run_accelerated(
        &self,
        model: &ModelAsset,
        analyzer: &FrameAnalyzer,
        jobs: &[FrameJob],
    ) -> FormcheckResult<Vec<FrameOutcome>> {
        let mut detector = self.backend.accelerated(model)?;
        let total = jobs.len();
        let mut outcomes = Vec::with_capacity(total);

        for job in jobs {
            match process_frame(detector.as_mut(), analyzer, job, total) {
                Ok(outcome) => outcomes.push(outcome),
                Err(DetectError::Context(message)) | Err(DetectError::Frame(message)) => {
                    return Err(FormcheckError::accelerator_unavailable(format!(
                        "context failed on frame {}: {}",
                        job.index, message
                    )));
                }
            }
            if outcomes.len() == 1 {
                tracing::info!("Accelerated detector context verified on first frame");
            }
        }

        Ok(outcomes)
    }
}
