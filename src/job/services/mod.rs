//! Orchestration services for generation jobs.

mod dispatcher;
mod generation;
mod qr;
mod report;

pub use dispatcher::{DispatchedJob, GenerationDispatcher};
pub use generation::{
    GenerationService, GenerationServiceError, GenerationServiceResult, GenerationSettings,
    PROMPT_NOT_FOUND_MESSAGE,
};
pub use qr::QrRenderError;
pub use report::{JobCreated, JobStatusReport, ResultDownload};
