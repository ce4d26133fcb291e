//! Room-scoped gallery listing.

use crate::artifact::{
    domain::GalleryImage,
    ports::{ArtifactStore, ArtifactStoreError},
};
use crate::catalog::{
    ports::CatalogRepository,
    services::{CatalogService, CatalogServiceError},
};
use std::sync::Arc;
use thiserror::Error;

/// Errors returned while listing a gallery.
#[derive(Debug, Error)]
pub enum GalleryServiceError {
    /// Room resolution failed, including unknown or inactive rooms.
    #[error(transparent)]
    Catalog(#[from] CatalogServiceError),
    /// The artifact store could not be read.
    #[error(transparent)]
    Storage(#[from] ArtifactStoreError),
}

/// Result type for gallery operations.
pub type GalleryServiceResult<T> = Result<T, GalleryServiceError>;

/// Lists result images for public rooms.
pub struct GalleryService<R, A>
where
    R: CatalogRepository,
    A: ArtifactStore,
{
    catalog: CatalogService<R>,
    artifacts: Arc<A>,
}

impl<R, A> GalleryService<R, A>
where
    R: CatalogRepository,
    A: ArtifactStore,
{
    /// Creates a gallery service.
    #[must_use]
    pub const fn new(catalog: CatalogService<R>, artifacts: Arc<A>) -> Self {
        Self { catalog, artifacts }
    }

    /// Lists an active room's result images, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogServiceError::RoomNotFound`] (wrapped) for unknown
    /// or inactive rooms, and storage errors from the artifact store.
    pub async fn list(&self, room_slug: &str) -> GalleryServiceResult<Vec<GalleryImage>> {
        let room = self.catalog.require_active_room(room_slug).await?;
        Ok(self.artifacts.list_gallery_images(room.slug()).await?)
    }
}
