//! Port contracts for job persistence and the external transform.

mod repository;
mod transformer;

pub use repository::{JobRepository, JobRepositoryError, JobRepositoryResult};
pub use transformer::{ImageTransformError, ImageTransformer};
