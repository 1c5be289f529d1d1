//! Generation job - the unit-of-work record for one generation run
//!
//! ```text
//! Pending ──mark_processing──▶ Processing ──complete──▶ Completed
//!                                   │
//!                                   └──────fail───────▶ Failed
//! ```
//!
//! Every transition returns the [`JobEvent`] it produced so callers can
//! forward lifecycle signals without an implicit dispatch mechanism.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::generation::{ArtifactType, GeneratedArtifact, GenerationError, GenerationOptions};

/// Lifecycle state of a generation job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
        };
        f.write_str(name)
    }
}

/// Lifecycle signal produced by a job transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum JobEvent {
    Created {
        job_id: Uuid,
        form_id: Uuid,
    },
    Processing {
        job_id: Uuid,
    },
    Completed {
        job_id: Uuid,
        artifact_count: usize,
        archive_path: Option<PathBuf>,
    },
    Failed {
        job_id: Uuid,
        error: String,
    },
}

impl JobEvent {
    pub fn job_id(&self) -> Uuid {
        match self {
            Self::Created { job_id, .. }
            | Self::Processing { job_id }
            | Self::Completed { job_id, .. }
            | Self::Failed { job_id, .. } => *job_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Created { .. } => "created",
            Self::Processing { .. } => "processing",
            Self::Completed { .. } => "completed",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Tracks one generation request end to end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "JobRecord")]
pub struct GenerationJob {
    id: Uuid,
    form_id: Uuid,
    revision_id: Uuid,
    form_version: u32,
    options: GenerationOptions,
    status: JobStatus,
    artifacts: Vec<GeneratedArtifact>,
    output_folder: Option<PathBuf>,
    archive_path: Option<PathBuf>,
    archive_size_bytes: Option<u64>,
    generated_artifact_count: usize,
    requested_at: DateTime<Utc>,
    requested_by: String,
    completed_at: Option<DateTime<Utc>>,
    error_message: Option<String>,
}

impl GenerationJob {
    /// Create a new job in `Pending`.
    ///
    /// Identifiers must be non-nil, the form version positive, the requester
    /// non-empty and the options valid.
    pub fn create(
        form_id: Uuid,
        revision_id: Uuid,
        form_version: u32,
        options: GenerationOptions,
        requested_by: impl Into<String>,
    ) -> Result<(Self, JobEvent), GenerationError> {
        let requested_by = requested_by.into();
        validate_request(form_id, revision_id, form_version, &options, &requested_by)?;

        let job = Self {
            id: Uuid::new_v4(),
            form_id,
            revision_id,
            form_version,
            options,
            status: JobStatus::Pending,
            artifacts: Vec::new(),
            output_folder: None,
            archive_path: None,
            archive_size_bytes: None,
            generated_artifact_count: 0,
            requested_at: Utc::now(),
            requested_by,
            completed_at: None,
            error_message: None,
        };
        let event = JobEvent::Created {
            job_id: job.id,
            form_id,
        };
        Ok((job, event))
    }

    fn require_processing(&self, operation: &'static str) -> Result<(), GenerationError> {
        if self.status != JobStatus::Processing {
            return Err(GenerationError::InvalidState {
                operation,
                status: self.status,
            });
        }
        Ok(())
    }

    pub fn mark_processing(&mut self) -> Result<JobEvent, GenerationError> {
        if self.status != JobStatus::Pending {
            return Err(GenerationError::InvalidState {
                operation: "start processing",
                status: self.status,
            });
        }
        self.status = JobStatus::Processing;
        Ok(JobEvent::Processing { job_id: self.id })
    }

    pub fn add_artifact(&mut self, artifact: GeneratedArtifact) -> Result<(), GenerationError> {
        self.require_processing("add artifact to")?;
        self.artifacts.push(artifact);
        self.generated_artifact_count = self.artifacts.len();
        Ok(())
    }

    /// Record where the organized folder and the archive were written
    pub fn set_output_paths(
        &mut self,
        output_folder: impl Into<PathBuf>,
        archive_path: impl Into<PathBuf>,
        archive_size_bytes: u64,
    ) -> Result<(), GenerationError> {
        self.require_processing("set output paths on")?;
        let output_folder = output_folder.into();
        let archive_path = archive_path.into();
        if output_folder.as_os_str().is_empty() {
            return Err(GenerationError::validation("Output folder is required"));
        }
        if archive_path.as_os_str().is_empty() {
            return Err(GenerationError::validation("Archive path is required"));
        }
        if archive_size_bytes == 0 {
            return Err(GenerationError::validation("Archive size must be positive"));
        }

        self.output_folder = Some(output_folder);
        self.archive_path = Some(archive_path);
        self.archive_size_bytes = Some(archive_size_bytes);
        Ok(())
    }

    pub fn complete(&mut self) -> Result<JobEvent, GenerationError> {
        self.require_processing("complete")?;
        self.status = JobStatus::Completed;
        self.completed_at = Some(Utc::now());
        Ok(JobEvent::Completed {
            job_id: self.id,
            artifact_count: self.generated_artifact_count,
            archive_path: self.archive_path.clone(),
        })
    }

    pub fn fail(&mut self, error: impl fmt::Display) -> Result<JobEvent, GenerationError> {
        self.require_processing("fail")?;
        let message = error.to_string();
        self.status = JobStatus::Failed;
        self.completed_at = Some(Utc::now());
        self.error_message = Some(message.clone());
        Ok(JobEvent::Failed {
            job_id: self.id,
            error: message,
        })
    }

    /// Sum of all artifact sizes in bytes
    pub fn total_size_bytes(&self) -> u64 {
        self.artifacts.iter().map(|a| a.size_bytes()).sum()
    }

    pub fn artifacts_of_type(&self, artifact_type: ArtifactType) -> Vec<&GeneratedArtifact> {
        self.artifacts
            .iter()
            .filter(|a| a.artifact_type() == artifact_type)
            .collect()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn form_id(&self) -> Uuid {
        self.form_id
    }

    pub fn revision_id(&self) -> Uuid {
        self.revision_id
    }

    pub fn form_version(&self) -> u32 {
        self.form_version
    }

    pub fn options(&self) -> &GenerationOptions {
        &self.options
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn artifacts(&self) -> &[GeneratedArtifact] {
        &self.artifacts
    }

    pub fn generated_artifact_count(&self) -> usize {
        self.generated_artifact_count
    }

    pub fn output_folder(&self) -> Option<&Path> {
        self.output_folder.as_deref()
    }

    pub fn archive_path(&self) -> Option<&Path> {
        self.archive_path.as_deref()
    }

    pub fn archive_size_bytes(&self) -> Option<u64> {
        self.archive_size_bytes
    }

    pub fn requested_at(&self) -> DateTime<Utc> {
        self.requested_at
    }

    pub fn requested_by(&self) -> &str {
        &self.requested_by
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// `completed_at - requested_at` once the job is terminal
    pub fn processing_duration(&self) -> Option<TimeDelta> {
        self.completed_at.map(|done| done - self.requested_at)
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}

fn validate_request(
    form_id: Uuid,
    revision_id: Uuid,
    form_version: u32,
    options: &GenerationOptions,
    requested_by: &str,
) -> Result<(), GenerationError> {
    if form_id.is_nil() {
        return Err(GenerationError::validation("Form id is required"));
    }
    if revision_id.is_nil() {
        return Err(GenerationError::validation("Revision id is required"));
    }
    if form_version == 0 {
        return Err(GenerationError::validation("Form version must be positive"));
    }
    if requested_by.trim().is_empty() {
        return Err(GenerationError::validation("Requester is required"));
    }
    options.validate()
}

/// Persisted shape of a [`GenerationJob`]. Converting it back checks
/// everything the transition methods would have enforced.
#[derive(Deserialize)]
struct JobRecord {
    id: Uuid,
    form_id: Uuid,
    revision_id: Uuid,
    form_version: u32,
    options: GenerationOptions,
    status: JobStatus,
    artifacts: Vec<GeneratedArtifact>,
    output_folder: Option<PathBuf>,
    archive_path: Option<PathBuf>,
    archive_size_bytes: Option<u64>,
    generated_artifact_count: usize,
    requested_at: DateTime<Utc>,
    requested_by: String,
    completed_at: Option<DateTime<Utc>>,
    error_message: Option<String>,
}

impl TryFrom<JobRecord> for GenerationJob {
    type Error = GenerationError;

    fn try_from(record: JobRecord) -> Result<Self, Self::Error> {
        if record.id.is_nil() {
            return Err(GenerationError::validation("Job id is required"));
        }
        validate_request(
            record.form_id,
            record.revision_id,
            record.form_version,
            &record.options,
            &record.requested_by,
        )?;

        if record.generated_artifact_count != record.artifacts.len() {
            return Err(GenerationError::validation(format!(
                "Artifact count {} does not match {} stored artifacts",
                record.generated_artifact_count,
                record.artifacts.len()
            )));
        }
        if record.status == JobStatus::Pending && !record.artifacts.is_empty() {
            return Err(GenerationError::validation("Pending job cannot hold artifacts"));
        }

        match (record.status.is_terminal(), record.completed_at) {
            (true, None) => {
                return Err(GenerationError::validation(format!(
                    "{} job has no completion time",
                    record.status
                )));
            }
            (false, Some(_)) => {
                return Err(GenerationError::validation(format!(
                    "{} job cannot have a completion time",
                    record.status
                )));
            }
            (true, Some(done)) if done < record.requested_at => {
                return Err(GenerationError::validation(
                    "Job completed before it was requested",
                ));
            }
            _ => {}
        }

        if (record.status == JobStatus::Failed) != record.error_message.is_some() {
            return Err(GenerationError::validation(
                "Only failed jobs carry an error message, and every failed job does",
            ));
        }

        match (
            &record.output_folder,
            &record.archive_path,
            record.archive_size_bytes,
        ) {
            (None, None, None) => {}
            (Some(folder), Some(archive), Some(size))
                if record.status != JobStatus::Pending
                    && !folder.as_os_str().is_empty()
                    && !archive.as_os_str().is_empty()
                    && size > 0 => {}
            _ => {
                return Err(GenerationError::validation(
                    "Output folder, archive path and archive size must be set together",
                ));
            }
        }

        Ok(Self {
            id: record.id,
            form_id: record.form_id,
            revision_id: record.revision_id,
            form_version: record.form_version,
            options: record.options,
            status: record.status,
            artifacts: record.artifacts,
            output_folder: record.output_folder,
            archive_path: record.archive_path,
            archive_size_bytes: record.archive_size_bytes,
            generated_artifact_count: record.generated_artifact_count,
            requested_at: record.requested_at,
            requested_by: record.requested_by,
            completed_at: record.completed_at,
            error_message: record.error_message,
        })
    }
}
