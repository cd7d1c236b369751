//! Worker pool for the CPU path.
//!
//! Each worker thread pulls the next frame from a shared cursor and owns
//! one detector context, created on its first frame and dropped when the
//! worker exits. Results come back over a channel in completion order and
//! are put back into input order before returning.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;

use formcheck_biomech::FrameAnalyzer;
use formcheck_pose_model::FrameFailure;

use crate::detector::{DetectError, DetectorBackend, ModelAsset, PoseDetector};
use crate::frame::{process_frame, FrameJob, FrameOutcome};

pub struct WorkerPool<'a> {
    backend: &'a dyn DetectorBackend,
    model: &'a ModelAsset,
    analyzer: &'a FrameAnalyzer,
    workers: usize,
}

impl<'a> WorkerPool<'a> {
    pub fn new(
        backend: &'a dyn DetectorBackend,
        model: &'a ModelAsset,
        analyzer: &'a FrameAnalyzer,
        workers: usize,
    ) -> Self {
        Self {
            backend,
            model,
            analyzer,
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Process every job and return one outcome per job, in input order.
    pub fn run(&self, jobs: &[FrameJob], total_frames: usize) -> Vec<FrameOutcome> {
        if jobs.is_empty() {
            return Vec::new();
        }

        let workers = self.workers.min(jobs.len());
        let cursor = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel::<(usize, FrameOutcome)>();

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(|worker_id| {
                    let tx = tx.clone();
                    let cursor = &cursor;
                    scope.spawn(move || self.worker_loop(worker_id, jobs, total_frames, cursor, tx))
                })
                .collect();
            drop(tx);

            for (worker_id, handle) in handles.into_iter().enumerate() {
                if handle.join().is_err() {
                    tracing::error!(worker_id, "Worker panicked; its unfinished frames are lost");
                }
            }
        });

        let mut slots: Vec<Option<FrameOutcome>> = vec![None; jobs.len()];
        for (slot, outcome) in rx.try_iter() {
            slots[slot] = Some(outcome);
        }

        slots
            .into_iter()
            .zip(jobs)
            .map(|(outcome, job)| {
                outcome.unwrap_or_else(|| FrameOutcome::failed(job, FrameFailure::WorkerLost))
            })
            .collect()
    }

    fn worker_loop(
        &self,
        worker_id: usize,
        jobs: &[FrameJob],
        total_frames: usize,
        cursor: &AtomicUsize,
        tx: mpsc::Sender<(usize, FrameOutcome)>,
    ) {
        let mut detector: Option<Box<dyn PoseDetector>> = None;
        let mut handled = 0usize;

        loop {
            let slot = cursor.fetch_add(1, Ordering::Relaxed);
            let Some(job) = jobs.get(slot) else {
                break;
            };

            let outcome = self.process(worker_id, &mut detector, job, total_frames);
            handled += 1;
            if tx.send((slot, outcome)).is_err() {
                break;
            }
        }

        tracing::debug!(worker_id, frames = handled, "Worker finished");
    }

    fn process(
        &self,
        worker_id: usize,
        detector: &mut Option<Box<dyn PoseDetector>>,
        job: &FrameJob,
        total_frames: usize,
    ) -> FrameOutcome {
        if detector.is_none() {
            match self.backend.cpu(self.model) {
                Ok(context) => {
                    tracing::debug!(worker_id, "Worker detector context created");
                    *detector = Some(context);
                }
                Err(e) => {
                    tracing::warn!(worker_id, error = %e, "Failed to create detector context");
                    return FrameOutcome::failed(
                        job,
                        FrameFailure::DetectorUnavailable {
                            message: e.to_string(),
                        },
                    );
                }
            }
        }

        let Some(context) = detector.as_deref_mut() else {
            return FrameOutcome::failed(job, FrameFailure::WorkerLost);
        };

        match process_frame(context, self.analyzer, job, total_frames) {
            Ok(outcome) => outcome,
            Err(DetectError::Context(message)) | Err(DetectError::Frame(message)) => {
                tracing::warn!(
                    worker_id,
                    frame = job.index,
                    %message,
                    "Detector context failed; rebuilding on next frame"
                );
                *detector = None;
                FrameOutcome::failed(job, FrameFailure::DetectorUnavailable { message })
            }
        }
    }
}
