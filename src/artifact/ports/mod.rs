//! Port contracts for artifact storage.

mod store;

pub use store::{ArtifactStore, ArtifactStoreError, ArtifactStoreResult};
