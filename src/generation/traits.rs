//! Port interfaces for the generation domain

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{info, warn};

use crate::core::templates::TemplateMetadata;
use crate::generation::{
    GeneratedArtifact, GenerationError, GenerationJob, JobEvent, OrganizedArtifacts, TemplateModel,
};

/// Renders one registered template against the run's model
#[async_trait]
pub trait TemplateRenderer: Send + Sync {
    async fn render(
        &self,
        template: &TemplateMetadata,
        model: &TemplateModel,
    ) -> Result<String, GenerationError>;
}

/// Writes rendered artifacts into a project folder
#[async_trait]
pub trait ArtifactOrganizer: Send + Sync {
    async fn organize(
        &self,
        artifacts: &[GeneratedArtifact],
        project_name: &str,
    ) -> Result<OrganizedArtifacts, GenerationError>;
}

/// Packs an organized folder into a distributable archive
#[async_trait]
pub trait ArchivePackager: Send + Sync {
    /// Archive the contents of `source` into `destination`, returning the archive path
    async fn create_archive(
        &self,
        source: &Path,
        destination: &Path,
    ) -> Result<PathBuf, GenerationError>;

    async fn archive_size(&self, archive: &Path) -> Result<u64, GenerationError>;
}

/// Receives every job lifecycle event, in order
pub trait JobObserver: Send + Sync {
    fn on_event(&self, job: &GenerationJob, event: &JobEvent);
}

/// Logs job lifecycle events through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingJobObserver;

impl JobObserver for TracingJobObserver {
    fn on_event(&self, job: &GenerationJob, event: &JobEvent) {
        match event {
            JobEvent::Created { job_id, form_id } => {
                info!(job_id = %job_id, form_id = %form_id, requested_by = %job.requested_by(), "Generation job created");
            }
            JobEvent::Processing { job_id } => {
                info!(job_id = %job_id, "Generation job processing");
            }
            JobEvent::Completed {
                job_id,
                artifact_count,
                archive_path,
            } => {
                info!(
                    job_id = %job_id,
                    artifacts = artifact_count,
                    archive = ?archive_path,
                    duration_ms = job.processing_duration().map(|d| d.num_milliseconds()),
                    "Generation job completed"
                );
            }
            JobEvent::Failed { job_id, error } => {
                warn!(job_id = %job_id, error = %error, "Generation job failed");
            }
        }
    }
}
