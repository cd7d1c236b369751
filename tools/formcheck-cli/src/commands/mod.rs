pub mod analyze;
pub mod check;
pub mod config;
pub mod frame;

use std::sync::Arc;

use formcheck_common::AppConfig;
use formcheck_pipeline::{BatchProcessor, ModelLocator, ReplayBackend};

/// Model locator for the configured directory and preferred variant.
pub fn locator(config: &AppConfig) -> ModelLocator {
    ModelLocator::new(&config.models_dir).prefer(config.detector.model_variant)
}

/// Batch processor over the replay backend.
pub fn processor(config: &AppConfig) -> BatchProcessor {
    let backend = ReplayBackend::new(locator(config), config.detector.clone());
    BatchProcessor::new(Arc::new(backend), config.worker_count())
}

/// Serialize `value` as JSON, pretty when asked.
pub fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> anyhow::Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}
