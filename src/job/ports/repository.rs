//! Repository port for generation job persistence and lookup.

use crate::job::domain::{AccessToken, GenerationJob, JobId, NewGenerationJob};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for job repository operations.
pub type JobRepositoryResult<T> = Result<T, JobRepositoryError>;

/// Generation job persistence contract.
///
/// Each job row is written only by the execution unit that owns it, so
/// implementations need no locking beyond their own commit semantics.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Inserts a processing job and returns it with its assigned identifier.
    async fn create(&self, job: &NewGenerationJob) -> JobRepositoryResult<GenerationJob>;

    /// Replaces the stored state of an existing job.
    ///
    /// # Errors
    ///
    /// Returns [`JobRepositoryError::NotFound`] when the job does not exist
    /// and [`JobRepositoryError::DuplicateAccessToken`] when its token is
    /// already held by another job.
    async fn update(&self, job: &GenerationJob) -> JobRepositoryResult<()>;

    /// Finds a job by identifier.
    async fn find_by_id(&self, id: JobId) -> JobRepositoryResult<Option<GenerationJob>>;

    /// Finds the job holding an access token.
    async fn find_by_access_token(
        &self,
        token: &AccessToken,
    ) -> JobRepositoryResult<Option<GenerationJob>>;
}

/// Errors returned by job repository implementations.
#[derive(Debug, Clone, Error)]
pub enum JobRepositoryError {
    /// The job does not exist.
    #[error("job not found: {0}")]
    NotFound(JobId),

    /// Another job already holds the access token.
    #[error("duplicate access token: {0}")]
    DuplicateAccessToken(AccessToken),

    /// The referenced prompt or room does not exist.
    #[error("job references a missing prompt or room")]
    MissingReference,

    /// Generic persistence failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl JobRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Wraps an already boxed persistence error.
    #[must_use]
    pub fn from_boxed(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::Persistence(Arc::from(err))
    }
}
