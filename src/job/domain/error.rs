//! Error types for job lifecycle validation and parsing.

use super::{JobId, JobStatus};
use thiserror::Error;

/// Errors returned by job lifecycle transitions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JobDomainError {
    /// The requested lifecycle transition is not permitted.
    #[error("job {job_id} cannot move from {from} to {to}")]
    InvalidTransition {
        /// Job being transitioned.
        job_id: JobId,
        /// Current status.
        from: JobStatus,
        /// Requested status.
        to: JobStatus,
    },

    /// A source photo can only be attached while the job is processing.
    #[error("job {0} is no longer accepting a source photo")]
    SourceNotAccepted(JobId),
}

/// Error returned while parsing job statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown job status: {0}")]
pub struct ParseJobStatusError(pub String);
