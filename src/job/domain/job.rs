//! Generation job aggregate and its lifecycle status.

use super::{AccessToken, JobDomainError, JobId, ParseJobStatusError};
use crate::artifact::domain::ArtifactPath;
use crate::catalog::domain::{PromptId, RoomId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Job lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// The job was accepted and has not resolved yet.
    Processing,
    /// A result was stored and an access token assigned.
    Completed,
    /// Processing failed; the job is never retried.
    Error,
}

impl JobStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }

    /// Returns whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    /// Returns whether `self -> target` is a permitted transition.
    #[must_use]
    pub const fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Processing, Self::Completed | Self::Error)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for JobStatus {
    type Error = ParseJobStatusError;

    fn try_from(value: &str) -> Result<Self, ParseJobStatusError> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "error" => Ok(Self::Error),
            _ => Err(ParseJobStatusError(value.to_owned())),
        }
    }
}

/// Parameter object describing a job that has not been stored yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewGenerationJob {
    /// Prompt applied to the photo.
    pub prompt_id: PromptId,
    /// Room that owns the job.
    pub room_id: RoomId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl NewGenerationJob {
    /// Creates a processing job description stamped with the clock time.
    #[must_use]
    pub fn new(prompt_id: PromptId, room_id: RoomId, clock: &impl Clock) -> Self {
        Self {
            prompt_id,
            room_id,
            created_at: clock.utc(),
        }
    }
}

/// Generation job aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationJob {
    id: JobId,
    prompt_id: PromptId,
    room_id: RoomId,
    status: JobStatus,
    access_token: Option<AccessToken>,
    source_path: Option<ArtifactPath>,
    result_path: Option<ArtifactPath>,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedJobData {
    /// Persisted identifier.
    pub id: JobId,
    /// Persisted prompt reference.
    pub prompt_id: PromptId,
    /// Persisted room reference.
    pub room_id: RoomId,
    /// Persisted status.
    pub status: JobStatus,
    /// Persisted access token, if assigned.
    pub access_token: Option<AccessToken>,
    /// Persisted source location, if still held.
    pub source_path: Option<ArtifactPath>,
    /// Persisted result location, if completed.
    pub result_path: Option<ArtifactPath>,
    /// Persisted failure description, if failed.
    pub error_message: Option<String>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl GenerationJob {
    /// Creates a freshly inserted processing job.
    #[must_use]
    pub fn from_new(id: JobId, new_job: NewGenerationJob) -> Self {
        Self {
            id,
            prompt_id: new_job.prompt_id,
            room_id: new_job.room_id,
            status: JobStatus::Processing,
            access_token: None,
            source_path: None,
            result_path: None,
            error_message: None,
            created_at: new_job.created_at,
            updated_at: new_job.created_at,
        }
    }

    /// Reconstructs a job from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedJobData) -> Self {
        Self {
            id: data.id,
            prompt_id: data.prompt_id,
            room_id: data.room_id,
            status: data.status,
            access_token: data.access_token,
            source_path: data.source_path,
            result_path: data.result_path,
            error_message: data.error_message,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the job identifier.
    #[must_use]
    pub const fn id(&self) -> JobId {
        self.id
    }

    /// Returns the prompt reference.
    #[must_use]
    pub const fn prompt_id(&self) -> PromptId {
        self.prompt_id
    }

    /// Returns the owning room.
    #[must_use]
    pub const fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> JobStatus {
        self.status
    }

    /// Returns the access token, assigned on completion.
    #[must_use]
    pub const fn access_token(&self) -> Option<&AccessToken> {
        self.access_token.as_ref()
    }

    /// Returns the source photo location while it is still held.
    #[must_use]
    pub const fn source_path(&self) -> Option<&ArtifactPath> {
        self.source_path.as_ref()
    }

    /// Returns the result location of a completed job.
    #[must_use]
    pub const fn result_path(&self) -> Option<&ArtifactPath> {
        self.result_path.as_ref()
    }

    /// Returns the failure description of a failed job.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns whether the job completed with a stored result.
    #[must_use]
    pub const fn has_result(&self) -> bool {
        matches!(self.status, JobStatus::Completed) && self.result_path.is_some()
    }

    /// Records the stored source photo.
    ///
    /// # Errors
    ///
    /// Returns [`JobDomainError::SourceNotAccepted`] once the job is
    /// terminal.
    pub fn attach_source(
        &mut self,
        path: ArtifactPath,
        clock: &impl Clock,
    ) -> Result<(), JobDomainError> {
        if self.status.is_terminal() {
            return Err(JobDomainError::SourceNotAccepted(self.id));
        }
        self.source_path = Some(path);
        self.touch(clock);
        Ok(())
    }

    /// Completes the job with a stored result.
    ///
    /// `token` is only used when no token has been assigned yet; an
    /// existing token is never replaced.
    ///
    /// # Errors
    ///
    /// Returns [`JobDomainError::InvalidTransition`] unless the job is
    /// processing.
    pub fn complete(
        &mut self,
        result_path: ArtifactPath,
        token: AccessToken,
        clock: &impl Clock,
    ) -> Result<(), JobDomainError> {
        self.ensure_transition(JobStatus::Completed)?;
        self.status = JobStatus::Completed;
        self.result_path = Some(result_path);
        self.access_token.get_or_insert(token);
        self.error_message = None;
        self.touch(clock);
        Ok(())
    }

    /// Fails the job with a description of the cause.
    ///
    /// # Errors
    ///
    /// Returns [`JobDomainError::InvalidTransition`] unless the job is
    /// processing.
    pub fn fail(
        &mut self,
        message: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), JobDomainError> {
        self.ensure_transition(JobStatus::Error)?;
        self.status = JobStatus::Error;
        self.error_message = Some(message.into());
        self.touch(clock);
        Ok(())
    }

    /// Clears the source location and returns it for deletion.
    pub fn release_source(&mut self, clock: &impl Clock) -> Option<ArtifactPath> {
        let released = self.source_path.take();
        if released.is_some() {
            self.touch(clock);
        }
        released
    }

    fn ensure_transition(&self, target: JobStatus) -> Result<(), JobDomainError> {
        if self.status.can_transition_to(target) {
            return Ok(());
        }
        Err(JobDomainError::InvalidTransition {
            job_id: self.id,
            from: self.status,
            to: target,
        })
    }

    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
