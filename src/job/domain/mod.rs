//! Domain model for generation jobs.
//!
//! A job moves from `processing` to exactly one terminal state. Its source
//! photo is single-use and its access token is assigned once, when the job
//! first completes.

mod error;
mod ids;
mod job;
mod token;

pub use error::{JobDomainError, ParseJobStatusError};
pub use ids::JobId;
pub use job::{GenerationJob, JobStatus, NewGenerationJob, PersistedJobData};
pub use token::AccessToken;
