//! Infrastructure layer - concrete implementations of domain ports

pub mod generation;
pub mod output;

use std::sync::Arc;

use tracing::debug;

use crate::core::config::Config;
use crate::core::templates::{TemplateEngine, TemplateRegistry};
use crate::generation::{GenerationError, GenerationOrchestrator, TracingJobObserver};

pub use generation::TeraTemplateRenderer;
pub use output::{FileSystemOrganizer, FolderLayout, ZipPackager};

/// Registry named by the configuration: the manifest when one is set,
/// otherwise the built-in catalogue under `templates_dir`
pub async fn load_registry(config: &Config) -> Result<TemplateRegistry, GenerationError> {
    match &config.registry_manifest {
        Some(manifest) => {
            debug!(manifest = %manifest.display(), "Loading template registry from manifest");
            TemplateRegistry::from_manifest(manifest).await
        }
        None => TemplateRegistry::builtin(&config.templates_dir),
    }
}

/// Wire the filesystem, Tera and zip implementations into an orchestrator
pub async fn build_orchestrator(config: &Config) -> Result<GenerationOrchestrator, GenerationError> {
    let registry = Arc::new(load_registry(config).await?);
    let engine = Arc::new(TemplateEngine::new());
    let renderer = TeraTemplateRenderer::new(engine, Arc::clone(&registry));

    let layout = FolderLayout::with_overrides(&config.folder_layout);
    let organizer = FileSystemOrganizer::with_layout(&config.output_dir, layout)?
        .with_protected_dir(&config.archive_dir);

    Ok(GenerationOrchestrator::new(
        registry,
        Arc::new(renderer),
        Arc::new(organizer),
        Arc::new(ZipPackager::new()),
        &config.archive_dir,
    )
    .with_observer(Arc::new(TracingJobObserver)))
}
