//! Generation orchestration - coordinates the generation workflow

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::templates::TemplateRegistry;
use crate::generation::{
    ArchivePackager, ArtifactFamily, ArtifactOrganizer, FormDefinition, GeneratedArtifact,
    GenerationError, GenerationJob, GenerationOptions, JobEvent, JobFailure, JobObserver,
    TemplateModel, TemplateRenderer,
};

/// Everything needed to start one generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub form_id: Uuid,
    pub revision_id: Uuid,
    pub form_version: u32,
    pub definition: FormDefinition,
    pub options: GenerationOptions,
    pub requested_by: String,
}

impl GenerationRequest {
    /// A request for a brand-new form: fresh identifiers, version 1
    pub fn new(
        definition: FormDefinition,
        options: GenerationOptions,
        requested_by: impl Into<String>,
    ) -> Self {
        Self {
            form_id: Uuid::new_v4(),
            revision_id: Uuid::new_v4(),
            form_version: 1,
            definition,
            options,
            requested_by: requested_by.into(),
        }
    }
}

/// Orchestrates the generation workflow
pub struct GenerationOrchestrator {
    registry: Arc<TemplateRegistry>,
    renderer: Arc<dyn TemplateRenderer>,
    organizer: Arc<dyn ArtifactOrganizer>,
    packager: Arc<dyn ArchivePackager>,
    observers: Vec<Arc<dyn JobObserver>>,
    archive_dir: PathBuf,
}

impl GenerationOrchestrator {
    /// Create a new generation orchestrator writing archives to `archive_dir`
    pub fn new(
        registry: Arc<TemplateRegistry>,
        renderer: Arc<dyn TemplateRenderer>,
        organizer: Arc<dyn ArtifactOrganizer>,
        packager: Arc<dyn ArchivePackager>,
        archive_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            registry,
            renderer,
            organizer,
            packager,
            observers: Vec::new(),
            archive_dir: archive_dir.into(),
        }
    }

    /// Register an observer for job lifecycle events
    pub fn with_observer(mut self, observer: Arc<dyn JobObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Run the full pipeline for one request
    pub async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationJob, GenerationError> {
        self.generate_with_cancellation(request, &CancellationToken::new())
            .await
    }

    /// Run the full pipeline, stopping at the next family or template boundary
    /// once `cancel` fires.
    ///
    /// Invalid input is rejected before a job exists. Any later failure is
    /// recorded on the job via `fail` and returned as
    /// [`GenerationError::JobFailed`], which carries that same job.
    pub async fn generate_with_cancellation(
        &self,
        request: GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<GenerationJob, GenerationError> {
        request
            .definition
            .validate()
            .map_err(|e| GenerationError::validation(e.to_string()))?;

        let (mut job, created) = GenerationJob::create(
            request.form_id,
            request.revision_id,
            request.form_version,
            request.options.clone(),
            request.requested_by.clone(),
        )?;
        self.notify(&job, &created);

        let processing = job.mark_processing()?;
        self.notify(&job, &processing);

        match self.run(&mut job, &request, cancel).await {
            Ok(()) => {
                let completed = job.complete()?;
                self.notify(&job, &completed);
                Ok(job)
            }
            Err(error) => {
                match job.fail(&error) {
                    Ok(failed) => self.notify(&job, &failed),
                    Err(state_error) => {
                        warn!(job_id = %job.id(), error = %state_error, "Could not record job failure");
                    }
                }
                Err(GenerationError::JobFailed(Box::new(JobFailure {
                    job_id: job.id(),
                    job,
                    error,
                })))
            }
        }
    }

    async fn run(
        &self,
        job: &mut GenerationJob,
        request: &GenerationRequest,
        cancel: &CancellationToken,
    ) -> Result<(), GenerationError> {
        let model = TemplateModel::build(&request.definition, &request.options, job.requested_at());
        debug!(
            job_id = %job.id(),
            entity = %model.entity_name,
            fields = model.fields.len(),
            "Template model built"
        );

        for family in ArtifactFamily::enabled(&request.options) {
            ensure_not_cancelled(cancel)?;
            debug!(job_id = %job.id(), family = %family, "Rendering artifact family");

            for entry in family.templates() {
                ensure_not_cancelled(cancel)?;

                if entry.optional && !self.registry.exists(entry.name) {
                    debug!(template = %entry.name, "Optional template not available, skipping");
                    continue;
                }

                let template = self.registry.get(entry.name)?;
                let content = self.renderer.render(template, &model).await?;
                let artifact = GeneratedArtifact::new(
                    template.artifact_type,
                    template.output_file_name(&model.entity_name),
                    content,
                )?;
                debug!(
                    template = %template.name,
                    file = %artifact.file_path(),
                    bytes = artifact.size_bytes(),
                    "Artifact rendered"
                );
                job.add_artifact(artifact)?;
            }
        }

        ensure_not_cancelled(cancel)?;
        let organized = self
            .organizer
            .organize(job.artifacts(), &request.options.project_name)
            .await?;

        ensure_not_cancelled(cancel)?;
        let archive = self
            .packager
            .create_archive(&organized.root, &self.archive_dir)
            .await?;
        let archive_size = self.packager.archive_size(&archive).await?;

        info!(
            job_id = %job.id(),
            files = organized.file_count(),
            archive = %archive.display(),
            archive_bytes = archive_size,
            "Generation output packaged"
        );
        job.set_output_paths(organized.root, archive, archive_size)
    }

    fn notify(&self, job: &GenerationJob, event: &JobEvent) {
        for observer in &self.observers {
            observer.on_event(job, event);
        }
    }
}

fn ensure_not_cancelled(cancel: &CancellationToken) -> Result<(), GenerationError> {
    if cancel.is_cancelled() {
        return Err(GenerationError::Cancelled);
    }
    Ok(())
}
