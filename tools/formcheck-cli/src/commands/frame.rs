//! Analyze a single frame.

use std::path::PathBuf;

use anyhow::Context;
use serde::Serialize;

use formcheck_common::AppConfig;
use formcheck_pipeline::FrameJob;
use formcheck_pose_model::{AngleSet, ExerciseType, LandmarkFrame, Phase};

#[derive(Serialize)]
struct FrameReport {
    success: bool,
    frame: String,
    device: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    angles: Option<AngleSet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phase: Option<Phase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    confidence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    landmarks: Option<LandmarkFrame>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

pub async fn run(
    config: AppConfig,
    path: PathBuf,
    exercise: String,
    pretty: bool,
) -> anyhow::Result<()> {
    let exercise = ExerciseType::parse(&exercise);
    let processor = super::processor(&config);
    let jobs = FrameJob::from_paths(&[path]);

    let batch = tokio::task::spawn_blocking(move || processor.process(&exercise, &jobs))
        .await
        .context("analysis task failed")?
        .context("Frame analysis failed")?;

    let Some(result) = batch.frames.into_iter().next() else {
        anyhow::bail!("Frame analysis returned no result");
    };
    let analysis = result.analysis;
    let report = FrameReport {
        success: result.success,
        frame: result.frame,
        device: batch.device.as_str(),
        error: result.error.map(|e| e.to_string()),
        angles: analysis.as_ref().map(|a| a.angles.clone()),
        phase: analysis.as_ref().map(|a| a.phase),
        confidence: analysis.as_ref().map(|a| a.confidence),
        landmarks: analysis.map(|a| a.landmarks),
        warnings: batch.warnings,
    };

    println!("{}", super::to_json(&report, pretty)?);
    Ok(())
}
