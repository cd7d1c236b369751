//! Check model assets and processing resources.

use formcheck_common::{AppConfig, FormcheckError};
use formcheck_pipeline::DetectorBackend;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("FormCheck System Check");
    println!("{}", "=".repeat(50));

    println!("[OK] Profile: {:?}", config.profile);
    println!("[OK] Models directory: {}", config.models_dir.display());

    let processor = super::processor(config);
    let model = match processor.backend().resolve_model() {
        Ok(model) => {
            println!(
                "[OK] Model: {} ({:?})",
                model.path.display(),
                model.variant
            );
            Some(model)
        }
        Err(FormcheckError::ModelNotFound { searched }) => {
            println!("[FAIL] Model not found. Searched:");
            for path in &searched {
                println!("     {}", path.display());
            }
            None
        }
        Err(e) => return Err(e.into()),
    };

    println!("[OK] Detector backend: {}", processor.backend().name());
    println!("[OK] Worker pool size: {}", processor.workers());
    if config.detector.prefer_accelerated {
        println!("[OK] Accelerated path: preferred");
    } else {
        println!("[WARN] Accelerated path: disabled, CPU worker pool only");
    }

    println!();
    if model.is_none() {
        anyhow::bail!("No pose-landmarker model available. Place a model in the models directory.");
    }
    println!("FormCheck is ready.");
    Ok(())
}
