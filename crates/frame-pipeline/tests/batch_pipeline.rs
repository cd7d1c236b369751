use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use formcheck_common::{FormcheckError, FormcheckResult, ModelVariant, PipelineConfig};
use formcheck_pipeline::{
    analyze_request, AnalysisRequest, BatchProcessor, DetectError, DetectedPose, DetectorBackend,
    FrameJob, FrameRequest, ModelAsset, PoseDetector,
};
use formcheck_pose_model::{
    CoordinateSpace, DetectorPoint, Device, ExerciseType, FrameFailure, LandmarkFrame,
};

/// How the mock's accelerated context behaves.
#[derive(Clone, Copy)]
enum Accelerated {
    Works,
    Unavailable,
    BreaksAfter(usize),
}

/// In-memory backend: poses keyed by file name, `None` meaning no pose.
struct MockBackend {
    poses: HashMap<String, Option<LandmarkFrame>>,
    accelerated: Accelerated,
    cpu_available: bool,
    model_present: bool,
    /// File name on which a CPU context breaks.
    cpu_breaks_on: Option<String>,
    cpu_contexts: AtomicUsize,
}

impl MockBackend {
    fn new(poses: HashMap<String, Option<LandmarkFrame>>) -> Self {
        Self {
            poses,
            accelerated: Accelerated::Works,
            cpu_available: true,
            model_present: true,
            cpu_breaks_on: None,
            cpu_contexts: AtomicUsize::new(0),
        }
    }

    fn with_accelerated(mut self, mode: Accelerated) -> Self {
        self.accelerated = mode;
        self
    }
}

struct MockDetector {
    poses: HashMap<String, Option<LandmarkFrame>>,
    breaks_after: Option<usize>,
    breaks_on: Option<String>,
    scramble: bool,
    calls: usize,
}

impl PoseDetector for MockDetector {
    fn detect(&mut self, path: &Path) -> Result<Option<DetectedPose>, DetectError> {
        self.calls += 1;
        if matches!(self.breaks_after, Some(n) if self.calls > n) {
            return Err(DetectError::Context("device lost".to_string()));
        }

        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        if self.breaks_on.as_deref() == Some(name.as_str()) {
            return Err(DetectError::Context("worker context crashed".to_string()));
        }
        if self.scramble {
            // Earlier frames take longer so completion order differs from input order.
            let rank: u64 = name
                .trim_start_matches("frame_")
                .trim_end_matches(".jpg")
                .parse()
                .unwrap();
            std::thread::sleep(Duration::from_millis(40u64.saturating_sub(rank * 5)));
        }

        match self.poses.get(&name) {
            Some(Some(frame)) => Ok(Some(DetectedPose {
                landmarks: frame.clone(),
            })),
            Some(None) => Ok(None),
            None => Err(DetectError::Frame(format!("Failed to load image: {name}"))),
        }
    }
}

impl DetectorBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn resolve_model(&self) -> FormcheckResult<ModelAsset> {
        if !self.model_present {
            return Err(FormcheckError::ModelNotFound {
                searched: vec![PathBuf::from("/models/pose_landmarker_heavy.task")],
            });
        }
        Ok(ModelAsset {
            path: PathBuf::from("/models/pose_landmarker_full.task"),
            variant: ModelVariant::Full,
        })
    }

    fn accelerated(&self, _model: &ModelAsset) -> FormcheckResult<Box<dyn PoseDetector>> {
        let breaks_after = match self.accelerated {
            Accelerated::Works => None,
            Accelerated::Unavailable => {
                return Err(FormcheckError::accelerator_unavailable("no device"))
            }
            Accelerated::BreaksAfter(n) => Some(n),
        };
        Ok(Box::new(MockDetector {
            poses: self.poses.clone(),
            breaks_after,
            breaks_on: None,
            scramble: false,
            calls: 0,
        }))
    }

    fn cpu(&self, _model: &ModelAsset) -> FormcheckResult<Box<dyn PoseDetector>> {
        if !self.cpu_available {
            return Err(FormcheckError::detector("out of memory"));
        }
        self.cpu_contexts.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockDetector {
            poses: self.poses.clone(),
            breaks_after: None,
            breaks_on: self.cpu_breaks_on.clone(),
            scramble: true,
            calls: 0,
        }))
    }
}

/// A standing pose: every landmark visible, stacked down the image.
fn standing_pose() -> LandmarkFrame {
    let points: Vec<DetectorPoint> = (0..33)
        .map(|i| DetectorPoint {
            x: 0.5 + if i % 2 == 0 { 0.05 } else { -0.05 },
            y: 0.1 + i as f64 * 0.025,
            z: 0.0,
            visibility: 0.9,
        })
        .collect();
    LandmarkFrame::from_detector_output(CoordinateSpace::Normalized, &points)
}

/// Create `count` frame files in a fresh directory. Frames listed in
/// `no_pose` have no detectable pose.
fn frame_set(
    name: &str,
    count: usize,
    no_pose: &[usize],
) -> (PathBuf, Vec<FrameJob>, HashMap<String, Option<LandmarkFrame>>) {
    let dir = std::env::temp_dir().join(format!("formcheck_test_pipeline_{name}"));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();

    let mut paths = Vec::new();
    let mut poses = HashMap::new();
    for i in 1..=count {
        let file = format!("frame_{i:03}.jpg");
        let path = dir.join(&file);
        std::fs::write(&path, b"jpg").unwrap();
        let pose = (!no_pose.contains(&i)).then(standing_pose);
        poses.insert(file, pose);
        paths.push(path);
    }
    (dir, FrameJob::from_paths(&paths), poses)
}

fn indices(batch: &formcheck_pose_model::BatchResult) -> Vec<usize> {
    batch.frames.iter().map(|f| f.frame_index).collect()
}

#[test]
fn frame_without_pose_does_not_fail_batch() {
    let (dir, jobs, poses) = frame_set("no_pose", 6, &[3]);
    let backend = MockBackend::new(poses).with_accelerated(Accelerated::Unavailable);
    let processor = BatchProcessor::new(Arc::new(backend), 3);

    let batch = processor.process(&ExerciseType::Squat, &jobs).unwrap();
    assert!(batch.success);
    assert_eq!(batch.device, Device::Cpu);
    assert_eq!(batch.frames_total, 6);
    assert_eq!(batch.frames_processed, 5);
    assert_eq!(indices(&batch), vec![1, 2, 3, 4, 5, 6]);
    assert!(!batch.frames[2].success);
    assert_eq!(batch.frames[2].error, Some(FrameFailure::NoPoseDetected));
    assert_eq!(batch.frames[5].frame, "frame_006.jpg");
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn worker_pool_restores_input_order() {
    let (dir, jobs, poses) = frame_set("order", 8, &[]);
    let backend = Arc::new(MockBackend::new(poses).with_accelerated(Accelerated::Unavailable));
    let processor = BatchProcessor::new(backend.clone(), 4);

    let batch = processor.process(&ExerciseType::Deadlift, &jobs).unwrap();
    assert_eq!(indices(&batch), (1..=8).collect::<Vec<_>>());
    assert!(batch.is_in_input_order());
    assert_eq!(batch.frames_processed, 8);

    // One context per worker, never one per frame.
    let contexts = backend.cpu_contexts.load(Ordering::SeqCst);
    assert!((1..=4).contains(&contexts), "created {contexts} contexts");
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn accelerated_path_is_used_when_available() {
    let (dir, jobs, poses) = frame_set("accelerated", 4, &[]);
    let backend = Arc::new(MockBackend::new(poses));
    let processor = BatchProcessor::new(backend.clone(), 2);

    let batch = processor.process(&ExerciseType::Squat, &jobs).unwrap();
    assert_eq!(batch.device, Device::Gpu);
    assert_eq!(batch.frames_processed, 4);
    assert_eq!(indices(&batch), vec![1, 2, 3, 4]);
    assert_eq!(backend.cpu_contexts.load(Ordering::SeqCst), 0);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn accelerated_failure_mid_batch_reprocesses_on_cpu() {
    let (dir, jobs, poses) = frame_set("mid_batch", 5, &[]);
    let backend = MockBackend::new(poses).with_accelerated(Accelerated::BreaksAfter(2));
    let processor = BatchProcessor::new(Arc::new(backend), 2);

    let batch = processor.process(&ExerciseType::Squat, &jobs).unwrap();
    assert_eq!(batch.device, Device::Cpu);
    assert_eq!(batch.frames_total, 5);
    assert_eq!(batch.frames_processed, 5);
    assert_eq!(indices(&batch), vec![1, 2, 3, 4, 5]);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn accelerated_and_cpu_paths_agree() {
    let (dir, jobs, poses) = frame_set("agree", 4, &[2]);
    let gpu = BatchProcessor::new(Arc::new(MockBackend::new(poses.clone())), 2)
        .process(&ExerciseType::Squat, &jobs)
        .unwrap();
    let cpu = BatchProcessor::new(
        Arc::new(MockBackend::new(poses).with_accelerated(Accelerated::Unavailable)),
        2,
    )
    .process(&ExerciseType::Squat, &jobs)
    .unwrap();

    assert_eq!(gpu.device, Device::Gpu);
    assert_eq!(cpu.device, Device::Cpu);
    assert_eq!(gpu.frames, cpu.frames);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn broken_worker_context_fails_only_its_frame() {
    let (dir, jobs, poses) = frame_set("worker_crash", 6, &[]);
    let mut backend = MockBackend::new(poses).with_accelerated(Accelerated::Unavailable);
    backend.cpu_breaks_on = Some("frame_004.jpg".to_string());
    let processor = BatchProcessor::new(Arc::new(backend), 2);

    let batch = processor.process(&ExerciseType::Squat, &jobs).unwrap();
    assert_eq!(batch.frames_processed, 5);
    assert!(matches!(
        batch.frames[3].error,
        Some(FrameFailure::DetectorUnavailable { .. })
    ));
    assert_eq!(indices(&batch), vec![1, 2, 3, 4, 5, 6]);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_file_is_a_frame_failure() {
    let (dir, mut jobs, poses) = frame_set("missing_file", 3, &[]);
    std::fs::remove_file(&jobs[1].path).unwrap();
    jobs[1].timestamp_ms = Some(33.3);
    let processor = BatchProcessor::new(Arc::new(MockBackend::new(poses)), 1);

    let batch = processor.process(&ExerciseType::Squat, &jobs).unwrap();
    assert_eq!(batch.frames_processed, 2);
    assert!(matches!(
        batch.frames[1].error,
        Some(FrameFailure::FileNotFound { .. })
    ));
    assert_eq!(batch.frames[1].timestamp_ms, Some(33.3));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn missing_model_is_fatal() {
    let (dir, jobs, poses) = frame_set("no_model", 2, &[]);
    let mut backend = MockBackend::new(poses);
    backend.model_present = false;
    let processor = BatchProcessor::new(Arc::new(backend), 1);

    let err = processor.process(&ExerciseType::Squat, &jobs).unwrap_err();
    assert!(matches!(err, FormcheckError::ModelNotFound { .. }));
    assert!(err.is_fatal_for_batch());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn no_detector_context_is_fatal() {
    let (dir, jobs, poses) = frame_set("no_context", 3, &[]);
    let mut backend = MockBackend::new(poses).with_accelerated(Accelerated::Unavailable);
    backend.cpu_available = false;
    let processor = BatchProcessor::new(Arc::new(backend), 2);

    let err = processor.process(&ExerciseType::Squat, &jobs).unwrap_err();
    assert!(matches!(err, FormcheckError::NoProcessingPath { .. }));
    assert!(err.is_fatal_for_batch());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn empty_batch_is_rejected() {
    let processor = BatchProcessor::new(Arc::new(MockBackend::new(HashMap::new())), 1);
    assert!(matches!(
        processor.process(&ExerciseType::Squat, &[]),
        Err(FormcheckError::InvalidRequest { .. })
    ));
}

#[test]
fn request_report_carries_statistics_and_warnings() {
    let (dir, jobs, poses) = frame_set("report", 4, &[4]);
    let frames = jobs
        .iter()
        .map(|j| FrameRequest {
            path: j.path.clone(),
            timestamp_ms: Some(j.index as f64 * 100.0),
        })
        .collect();
    let request = AnalysisRequest::new(frames, ExerciseType::parse("zercher-squat"));
    let processor = BatchProcessor::new(Arc::new(MockBackend::new(poses)), 2);

    let report = analyze_request(&request, &processor, &PipelineConfig::default()).unwrap();
    assert!(report.success);
    assert_eq!(report.device, Some(Device::Gpu));
    assert_eq!(report.duration_ms, Some(300.0));
    assert_eq!(report.statistics.frames_processed, 3);
    assert_eq!(report.statistics.frames_total, 4);
    assert_eq!(report.statistics.success_rate, 0.75);
    assert_eq!(report.statistics.average_confidence, 0.9);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("zercher-squat"));
    assert_eq!(report.error, None);

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["device"], "gpu");
    assert_eq!(json["exercise"], "zercher-squat");
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn request_without_any_pose_reports_failure() {
    let (dir, jobs, poses) = frame_set("all_failed", 2, &[1, 2]);
    let request = AnalysisRequest::from_paths(
        jobs.iter().map(|j| j.path.clone()).collect(),
        ExerciseType::BenchPress,
    );
    let processor = BatchProcessor::new(Arc::new(MockBackend::new(poses)), 1);

    let report = analyze_request(&request, &processor, &PipelineConfig::default()).unwrap();
    assert!(!report.success);
    assert_eq!(report.error.as_deref(), Some("No frames could be processed"));
    assert_eq!(report.frames.len(), 2);
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn request_above_frame_limit_is_rejected() {
    let (dir, jobs, poses) = frame_set("limit", 3, &[]);
    let request = AnalysisRequest::from_paths(
        jobs.iter().map(|j| j.path.clone()).collect(),
        ExerciseType::Squat,
    );
    let processor = BatchProcessor::new(Arc::new(MockBackend::new(poses)), 1);
    let config = PipelineConfig {
        max_frames_per_request: 2,
        ..PipelineConfig::default()
    };

    let err = analyze_request(&request, &processor, &config).unwrap_err();
    assert!(matches!(err, FormcheckError::TooManyFrames { count: 3, max: 2 }));
    let _ = std::fs::remove_dir_all(&dir);
}
