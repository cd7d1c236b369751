//! Analyze a batch of frames.

use std::path::{Path, PathBuf};

use anyhow::Context;

use formcheck_common::AppConfig;
use formcheck_pipeline::{analyze_request, AnalysisRequest};
use formcheck_pose_model::ExerciseType;

/// Frame extensions collected from a directory.
const FRAME_EXTENSIONS: [&str; 2] = ["jpg", "png"];

pub async fn run(
    config: AppConfig,
    input: PathBuf,
    exercise: Option<String>,
    pretty: bool,
) -> anyhow::Result<()> {
    let mut request = load_request(&input)?;
    if let Some(id) = exercise {
        request.exercise_type = ExerciseType::parse(&id);
    }

    tracing::info!(
        input = %input.display(),
        frames = request.frames.len(),
        exercise = %request.exercise_type,
        "Analyzing"
    );

    let processor = super::processor(&config);
    let pipeline = config.pipeline.clone();
    let report = tokio::task::spawn_blocking(move || analyze_request(&request, &processor, &pipeline))
        .await
        .context("analysis task failed")?
        .context("Analysis failed")?;

    println!("{}", super::to_json(&report, pretty)?);
    Ok(())
}

/// Build a request from a frames directory or a request file.
fn load_request(input: &Path) -> anyhow::Result<AnalysisRequest> {
    if input.is_dir() {
        let frames = collect_frames(input)?;
        anyhow::ensure!(
            !frames.is_empty(),
            "No *.jpg or *.png frames found in {}",
            input.display()
        );
        return Ok(AnalysisRequest::from_paths(frames, ExerciseType::default()));
    }

    let content = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read request file: {}", input.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid analysis request: {}", input.display()))
}

/// Frame images in `dir`, sorted by file name.
fn collect_frames(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut frames = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read frames directory: {}", dir.display()))?
    {
        let path = entry?.path();
        let is_frame = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| FRAME_EXTENSIONS.iter().any(|f| e.eq_ignore_ascii_case(f)))
            .unwrap_or(false);
        if is_frame && path.is_file() {
            frames.push(path);
        }
    }
    frames.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("formcheck_test_cli_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_collect_frames_sorted_images_only() {
        let dir = temp_dir("collect");
        for name in ["b.png", "a.jpg", "c.JPG", "a.jpg.landmarks.json", "notes.txt"] {
            std::fs::write(dir.join(name), b"").unwrap();
        }

        let names: Vec<String> = collect_frames(&dir)
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.png", "c.JPG"]);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_request_file() {
        let dir = temp_dir("request");
        let path = dir.join("request.json");
        std::fs::write(
            &path,
            r#"{"frames": [{"path": "f1.jpg", "timestamp_ms": 0.0}], "exercise_type": "deadlift"}"#,
        )
        .unwrap();

        let request = load_request(&path).unwrap();
        assert_eq!(request.exercise_type, ExerciseType::Deadlift);
        assert_eq!(request.frames.len(), 1);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_empty_directory_is_an_error() {
        let dir = temp_dir("empty");
        assert!(load_request(&dir).is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
