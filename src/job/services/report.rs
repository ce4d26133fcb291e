//! Client-facing views of jobs and results.

use crate::job::domain::{GenerationJob, JobId, JobStatus};
use serde::Serialize;

/// Acknowledgement returned when a submission is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JobCreated {
    /// Identifier to poll.
    pub id: JobId,
    /// Always [`JobStatus::Processing`] at acceptance time.
    pub status: JobStatus,
}

impl From<&GenerationJob> for JobCreated {
    fn from(job: &GenerationJob) -> Self {
        Self {
            id: job.id(),
            status: job.status(),
        }
    }
}

/// Poll response for a job.
///
/// URLs are only present once the job has completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobStatusReport {
    /// Job identifier.
    pub id: JobId,
    /// Current status.
    pub status: JobStatus,
    /// Where the result can be viewed.
    pub result_url: Option<String>,
    /// Where the result can be downloaded.
    pub download_url: Option<String>,
    /// Where the QR code image linking to the result is served.
    pub qr_url: Option<String>,
    /// Failure description for failed jobs.
    pub error_message: Option<String>,
}

/// Result bytes fetched through an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultDownload {
    /// Suggested download file name.
    pub filename: String,
    /// Media type guessed from the file name.
    pub media_type: String,
    /// Stored result bytes.
    pub bytes: Vec<u8>,
}
