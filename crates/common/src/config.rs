//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable selecting the deployment profile.
pub const PROFILE_ENV_VAR: &str = "FORMCHECK_ENV";

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Deployment profile these settings were derived from.
    pub profile: Profile,

    /// Directory searched for pose-landmarker model assets.
    pub models_dir: PathBuf,

    /// Detector construction parameters.
    pub detector: DetectorConfig,

    /// Batch pipeline limits.
    pub pipeline: PipelineConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Deployment profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    #[default]
    Development,
    Production,
    Testing,
}

/// Pose-landmarker model size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelVariant {
    Heavy,
    Full,
    Lite,
}

/// Parameters handed to every detector context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Preferred model size; other sizes are used when it is missing.
    pub model_variant: ModelVariant,

    /// Minimum pose detection confidence (0.0-1.0).
    pub min_detection_confidence: f64,

    /// Minimum pose presence confidence (0.0-1.0).
    pub min_presence_confidence: f64,

    /// Minimum tracking confidence (0.0-1.0).
    pub min_tracking_confidence: f64,

    /// Try the single-context accelerated path before the worker pool.
    pub prefer_accelerated: bool,
}

/// Batch pipeline limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Maximum number of frames accepted in one analysis request.
    pub max_frames_per_request: usize,

    /// Worker pool size override. `None` uses half the available parallelism.
    pub workers: Option<usize>,

    /// Whether a metrics exporter should be attached by the service layer.
    pub enable_metrics: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "formcheck_pipeline=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Profile {
    /// Read the profile from `FORMCHECK_ENV`, defaulting to development.
    pub fn from_env() -> Self {
        std::env::var(PROFILE_ENV_VAR)
            .ok()
            .and_then(|v| Self::parse(&v))
            .unwrap_or_default()
    }

    /// Parse a profile name. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            "testing" | "test" => Some(Self::Testing),
            _ => None,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::for_profile(Profile::Development)
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_variant: ModelVariant::Full,
            min_detection_confidence: 0.5,
            min_presence_confidence: 0.5,
            min_tracking_confidence: 0.5,
            prefer_accelerated: true,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_frames_per_request: 300,
            workers: None,
            enable_metrics: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Defaults for a deployment profile.
    pub fn for_profile(profile: Profile) -> Self {
        let mut config = Self {
            profile,
            models_dir: default_models_dir(),
            detector: DetectorConfig::default(),
            pipeline: PipelineConfig::default(),
            logging: LoggingConfig::default(),
        };

        match profile {
            Profile::Development => {
                config.logging.level = "debug".to_string();
            }
            Profile::Production => {
                config.pipeline.enable_metrics = true;
            }
            Profile::Testing => {
                config.logging.level = "warn".to_string();
                config.detector.model_variant = ModelVariant::Lite;
                config.pipeline.max_frames_per_request = 5;
            }
        }

        config
    }

    /// Load config from the standard location, falling back to the
    /// defaults of the profile selected by `FORMCHECK_ENV`.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::for_profile(Profile::from_env())
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }

    /// Worker pool size: the configured override, or half the available
    /// parallelism, never below one.
    pub fn worker_count(&self) -> usize {
        match self.pipeline.workers {
            Some(n) => n.max(1),
            None => default_worker_count(),
        }
    }
}

/// `max(1, available_parallelism / 2)`.
pub fn default_worker_count() -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    (cpus / 2).max(1)
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("formcheck").join("config.json")
}

/// Default models directory.
fn default_models_dir() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("formcheck").join("models")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_development_profile() {
        let config = AppConfig::for_profile(Profile::Development);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.detector.model_variant, ModelVariant::Full);
        assert!(!config.pipeline.enable_metrics);
    }

    #[test]
    fn test_production_profile() {
        let config = AppConfig::for_profile(Profile::Production);
        assert_eq!(config.logging.level, "info");
        assert!(config.pipeline.enable_metrics);
    }

    #[test]
    fn test_testing_profile() {
        let config = AppConfig::for_profile(Profile::Testing);
        assert_eq!(config.detector.model_variant, ModelVariant::Lite);
        assert_eq!(config.pipeline.max_frames_per_request, 5);
    }

    #[test]
    fn test_profile_parse() {
        assert_eq!(Profile::parse("PROD"), Some(Profile::Production));
        assert_eq!(Profile::parse(" testing "), Some(Profile::Testing));
        assert_eq!(Profile::parse("staging"), None);
    }

    #[test]
    fn test_worker_count_override_is_at_least_one() {
        let mut config = AppConfig::default();
        config.pipeline.workers = Some(0);
        assert_eq!(config.worker_count(), 1);
        config.pipeline.workers = Some(6);
        assert_eq!(config.worker_count(), 6);
        config.pipeline.workers = None;
        assert!(config.worker_count() >= 1);
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = AppConfig::for_profile(Profile::Testing);
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.profile, Profile::Testing);
        assert_eq!(parsed.pipeline.max_frames_per_request, 5);
    }
}
