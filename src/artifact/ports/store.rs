//! Storage port for source photos and generated results.

use crate::artifact::domain::{ArtifactPath, GalleryImage, OutputFormat, PruneReport};
use crate::catalog::domain::RoomSlug;
use crate::job::domain::JobId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for artifact store operations.
pub type ArtifactStoreResult<T> = Result<T, ArtifactStoreError>;

/// Artifact storage contract.
///
/// Paths handed out by the store are relative to its root and are the only
/// values persisted on job records.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Stores a job's uploaded photo, replacing any previous one.
    async fn write_source(&self, job_id: JobId, bytes: Vec<u8>)
    -> ArtifactStoreResult<ArtifactPath>;

    /// Reads a stored source photo.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactStoreError::NotFound`] when the file is absent.
    async fn read_source(&self, path: &ArtifactPath) -> ArtifactStoreResult<Vec<u8>>;

    /// Deletes a stored source photo. A missing file is not an error.
    async fn delete_source(&self, path: &ArtifactPath) -> ArtifactStoreResult<()>;

    /// Stores a generated image under the room's result directory.
    async fn write_result(
        &self,
        room: &RoomSlug,
        job_id: JobId,
        bytes: Vec<u8>,
        format: OutputFormat,
    ) -> ArtifactStoreResult<ArtifactPath>;

    /// Reads a stored result.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactStoreError::NotFound`] when the file is absent,
    /// for example after retention removed it.
    async fn read_result(&self, path: &ArtifactPath) -> ArtifactStoreResult<Vec<u8>>;

    /// Deletes a stored result. A missing file is not an error.
    async fn delete_result(&self, path: &ArtifactPath) -> ArtifactStoreResult<()>;

    /// Removes every result older than the retention window at `now`.
    ///
    /// Individual removal failures are reported in the returned
    /// [`PruneReport`] rather than aborting the sweep.
    async fn prune_results(&self, now: DateTime<Utc>) -> ArtifactStoreResult<PruneReport>;

    /// Lists a room's result images, newest first.
    ///
    /// A room without a result directory yields an empty list.
    async fn list_gallery_images(&self, room: &RoomSlug) -> ArtifactStoreResult<Vec<GalleryImage>>;
}

/// Errors returned by artifact store implementations.
#[derive(Debug, Clone, Error)]
pub enum ArtifactStoreError {
    /// The requested artifact does not exist.
    #[error("artifact not found: {0}")]
    NotFound(ArtifactPath),

    /// A filesystem operation failed.
    #[error("artifact storage failed at {path}: {source}")]
    Io {
        /// Storage-root-relative location being accessed.
        path: String,
        /// Underlying I/O error.
        source: Arc<std::io::Error>,
    },
}

impl ArtifactStoreError {
    /// Wraps an I/O error raised while accessing `path`.
    ///
    /// [`std::io::ErrorKind::NotFound`] is preserved as
    /// [`ArtifactStoreError::NotFound`].
    #[must_use]
    pub fn io(path: &ArtifactPath, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            return Self::NotFound(path.clone());
        }
        Self::at(path.as_str(), err)
    }

    /// Wraps an I/O error raised while accessing a directory or other
    /// location that is not an artifact.
    #[must_use]
    pub fn at(path: impl Into<String>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source: Arc::new(err),
        }
    }
}
