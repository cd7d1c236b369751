//! Show the effective configuration.

use serde::Serialize;

use formcheck_common::{config_file_path, AppConfig};

#[derive(Serialize)]
struct ConfigView<'a> {
    config_file: String,
    config_file_exists: bool,
    workers: usize,
    #[serde(flatten)]
    config: &'a AppConfig,
}

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    let path = config_file_path();
    let view = ConfigView {
        config_file: path.display().to_string(),
        config_file_exists: path.exists(),
        workers: config.worker_count(),
        config,
    };
    println!("{}", super::to_json(&view, true)?);
    Ok(())
}
