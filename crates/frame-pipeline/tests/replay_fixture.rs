use std::path::PathBuf;
use std::sync::Arc;

use formcheck_common::{DetectorConfig, FormcheckError, ModelVariant, PipelineConfig};
use formcheck_pipeline::{
    analyze_request, AnalysisRequest, BatchProcessor, FrameRequest, ModelLocator, ReplayBackend,
};
use formcheck_pose_model::{Device, ExerciseType, FrameFailure, Phase};

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
}

fn squat_request() -> AnalysisRequest {
    let frames = (1..=7)
        .map(|n| FrameRequest {
            path: fixtures().join("squat-rep").join(format!("frame_{n:03}.jpg")),
            timestamp_ms: Some((n - 1) as f64 * 250.0),
        })
        .collect();
    AnalysisRequest::new(frames, ExerciseType::Squat)
}

fn processor(prefer_accelerated: bool) -> BatchProcessor {
    let config = DetectorConfig {
        prefer_accelerated,
        ..DetectorConfig::default()
    };
    let locator = ModelLocator::new(fixtures().join("models")).prefer(config.model_variant);
    BatchProcessor::new(Arc::new(ReplayBackend::new(locator, config)), 2)
}

#[test]
fn replayed_squat_rep_through_accelerated_path() {
    let report = analyze_request(&squat_request(), &processor(true), &PipelineConfig::default())
        .expect("fixture batch should run");

    assert!(report.success);
    assert_eq!(report.device, Some(Device::Gpu));
    assert_eq!(report.statistics.frames_total, 7);
    assert_eq!(report.statistics.frames_processed, 6);
    assert_eq!(report.statistics.success_rate, 0.857);
    assert_eq!(report.duration_ms, Some(1500.0));

    assert_eq!(report.frames[3].frame, "frame_004.jpg");
    assert_eq!(report.frames[3].error, Some(FrameFailure::NoPoseDetected));

    let phases: Vec<Option<Phase>> = report
        .frames
        .iter()
        .map(|f| f.analysis.as_ref().map(|a| a.phase))
        .collect();
    assert_eq!(
        phases,
        vec![
            Some(Phase::Top),
            Some(Phase::Eccentric),
            Some(Phase::Bottom),
            None,
            Some(Phase::Bottom),
            Some(Phase::Concentric),
            Some(Phase::Top),
        ]
    );

    let bottom = report.frames[2].analysis.as_ref().unwrap();
    assert_eq!(bottom.angles.get("knee_left"), Some(94.8));
    assert!(bottom.world_catalog.is_some());
}

#[test]
fn cpu_pool_matches_accelerated_results() {
    let request = squat_request();
    let config = PipelineConfig::default();
    let gpu = analyze_request(&request, &processor(true), &config).unwrap();
    let cpu = analyze_request(&request, &processor(false), &config).unwrap();

    assert_eq!(cpu.device, Some(Device::Cpu));
    assert_eq!(gpu.frames, cpu.frames);
    assert_eq!(gpu.statistics, cpu.statistics);
}

#[test]
fn missing_model_fails_the_request() {
    let locator = ModelLocator::new(fixtures().join("squat-rep")).prefer(ModelVariant::Heavy);
    let backend = ReplayBackend::new(locator, DetectorConfig::default());
    let processor = BatchProcessor::new(Arc::new(backend), 1);

    let err = analyze_request(&squat_request(), &processor, &PipelineConfig::default())
        .unwrap_err();
    assert!(matches!(err, FormcheckError::ModelNotFound { .. }));
}
