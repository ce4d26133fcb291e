//! Repository port for rooms, prompts and the legacy model setting.

use crate::catalog::domain::{
    ModelSetting, NewPrompt, NewRoom, Prompt, PromptId, Room, RoomId, RoomSlug,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for catalog repository operations.
pub type CatalogRepositoryResult<T> = Result<T, CatalogRepositoryError>;

/// Catalog persistence contract.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Stores a new room and returns it with its assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogRepositoryError::DuplicateSlug`] when another room
    /// already uses the slug.
    async fn create_room(&self, room: &NewRoom) -> CatalogRepositoryResult<Room>;

    /// Finds a room by identifier regardless of its active flag.
    async fn find_room_by_id(&self, id: RoomId) -> CatalogRepositoryResult<Option<Room>>;

    /// Finds a room by slug regardless of its active flag.
    async fn find_room_by_slug(&self, slug: &RoomSlug) -> CatalogRepositoryResult<Option<Room>>;

    /// Returns every room ordered by identifier.
    async fn list_rooms(&self) -> CatalogRepositoryResult<Vec<Room>>;

    /// Stores a new prompt and returns it with its assigned identifier.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogRepositoryError::RoomNotFound`] when the owning room
    /// does not exist.
    async fn create_prompt(&self, prompt: &NewPrompt) -> CatalogRepositoryResult<Prompt>;

    /// Finds a prompt by identifier.
    async fn find_prompt_by_id(&self, id: PromptId) -> CatalogRepositoryResult<Option<Prompt>>;

    /// Returns the prompts of a room ordered by identifier.
    async fn list_prompts_for_room(&self, room_id: RoomId) -> CatalogRepositoryResult<Vec<Prompt>>;

    /// Returns the deployment-wide model setting, if one was ever stored.
    async fn legacy_model_setting(&self) -> CatalogRepositoryResult<Option<ModelSetting>>;
}

/// Errors returned by catalog repository implementations.
#[derive(Debug, Clone, Error)]
pub enum CatalogRepositoryError {
    /// A room with the same slug already exists.
    #[error("room slug already exists: {0}")]
    DuplicateSlug(RoomSlug),

    /// The referenced room does not exist.
    #[error("room not found: {0}")]
    RoomNotFound(RoomId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl CatalogRepositoryError {
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
