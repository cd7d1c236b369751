//! Model asset resolution.

use std::path::{Path, PathBuf};

use formcheck_common::{FormcheckError, FormcheckResult, ModelVariant};

use crate::detector::ModelAsset;

/// Search order when no variant is preferred.
pub const DEFAULT_SEARCH_ORDER: [ModelVariant; 3] =
    [ModelVariant::Heavy, ModelVariant::Full, ModelVariant::Lite];

/// File name of a pose-landmarker asset.
pub fn model_file_name(variant: ModelVariant) -> &'static str {
    match variant {
        ModelVariant::Heavy => "pose_landmarker_heavy.task",
        ModelVariant::Full => "pose_landmarker_full.task",
        ModelVariant::Lite => "pose_landmarker_lite.task",
    }
}

/// Finds a pose-landmarker asset in a models directory.
#[derive(Debug, Clone)]
pub struct ModelLocator {
    models_dir: PathBuf,
    preferred: Option<ModelVariant>,
}

impl ModelLocator {
    pub fn new(models_dir: impl Into<PathBuf>) -> Self {
        Self {
            models_dir: models_dir.into(),
            preferred: None,
        }
    }

    /// Try `variant` before the default order.
    pub fn prefer(mut self, variant: ModelVariant) -> Self {
        self.preferred = Some(variant);
        self
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    /// Candidate paths in search order.
    pub fn candidates(&self) -> Vec<(ModelVariant, PathBuf)> {
        let mut order: Vec<ModelVariant> = self.preferred.into_iter().collect();
        order.extend(
            DEFAULT_SEARCH_ORDER
                .iter()
                .copied()
                .filter(|v| Some(*v) != self.preferred),
        );
        order
            .into_iter()
            .map(|v| (v, self.models_dir.join(model_file_name(v))))
            .collect()
    }

    /// First candidate that exists on disk.
    pub fn resolve(&self) -> FormcheckResult<ModelAsset> {
        let candidates = self.candidates();
        for (variant, path) in &candidates {
            if path.is_file() {
                tracing::debug!(path = %path.display(), ?variant, "Resolved model asset");
                return Ok(ModelAsset {
                    path: path.clone(),
                    variant: *variant,
                });
            }
        }
        Err(FormcheckError::ModelNotFound {
            searched: candidates.into_iter().map(|(_, p)| p).collect(),
        })
    }
}
