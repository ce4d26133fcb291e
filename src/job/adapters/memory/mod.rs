//! In-memory job adapters.

mod job;
mod transformer;

pub use job::InMemoryJobRepository;
pub use transformer::{ScriptedImageTransformer, TransformCall};
