//! Service layer for room resolution and prompt listing.

use crate::catalog::{
    domain::{
        CURRENT_DEFAULT_MODEL, CatalogDomainError, NewPrompt, NewRoom, Prompt, PromptText, Room,
        RoomId, RoomSlug,
    },
    ports::{CatalogRepository, CatalogRepositoryError},
};
use std::sync::Arc;
use thiserror::Error;

/// Display name given to an auto-created default room.
const DEFAULT_ROOM_NAME: &str = "Main";

/// Request payload for registering a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterRoomRequest {
    slug: String,
    name: String,
    model_name: String,
    is_active: bool,
}

impl RegisterRoomRequest {
    /// Creates a request for an active room.
    #[must_use]
    pub fn new(
        slug: impl Into<String>,
        name: impl Into<String>,
        model_name: impl Into<String>,
    ) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            model_name: model_name.into(),
            is_active: true,
        }
    }

    /// Registers the room as inactive.
    #[must_use]
    pub const fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

/// Request payload for adding a prompt to a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddPromptRequest {
    name: String,
    prompt: String,
    description: String,
    preview_image_url: String,
    icon_image_url: String,
}

impl AddPromptRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(name: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prompt: prompt.into(),
            description: String::new(),
            preview_image_url: String::new(),
            icon_image_url: String::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets preview and icon image references.
    #[must_use]
    pub fn with_images(
        mut self,
        preview_image_url: impl Into<String>,
        icon_image_url: impl Into<String>,
    ) -> Self {
        self.preview_image_url = preview_image_url.into();
        self.icon_image_url = icon_image_url.into();
        self
    }
}

/// Service-level errors for catalog operations.
#[derive(Debug, Error)]
pub enum CatalogServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] CatalogDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] CatalogRepositoryError),
    /// No active room has the requested slug.
    #[error("room not found: {0}")]
    RoomNotFound(String),
}

/// Result type for catalog service operations.
pub type CatalogServiceResult<T> = Result<T, CatalogServiceError>;

/// Room and prompt lookup service.
pub struct CatalogService<R>
where
    R: CatalogRepository,
{
    repository: Arc<R>,
    default_slug: RoomSlug,
}

impl<R> Clone for CatalogService<R>
where
    R: CatalogRepository,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            default_slug: self.default_slug.clone(),
        }
    }
}

impl<R> CatalogService<R>
where
    R: CatalogRepository,
{
    /// Creates a catalog service whose default room uses `default_slug`.
    #[must_use]
    pub const fn new(repository: Arc<R>, default_slug: RoomSlug) -> Self {
        Self {
            repository,
            default_slug,
        }
    }

    /// Returns the underlying repository.
    #[must_use]
    pub const fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// Returns the default room, creating it on first access.
    ///
    /// A new default room is seeded from the legacy model setting when one
    /// is stored, otherwise from the current default model. Losing a creation
    /// race to another caller is resolved by reading the winner's row.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogServiceError::Repository`] when persistence fails.
    pub async fn default_room(&self) -> CatalogServiceResult<Room> {
        if let Some(room) = self.repository.find_room_by_slug(&self.default_slug).await? {
            return Ok(room);
        }

        let seed_model = self
            .repository
            .legacy_model_setting()
            .await?
            .map_or_else(
                || CURRENT_DEFAULT_MODEL.to_owned(),
                |setting| setting.seed_model().to_owned(),
            );
        let new_room = NewRoom::new(self.default_slug.clone(), DEFAULT_ROOM_NAME, seed_model)?;
        match self.repository.create_room(&new_room).await {
            Ok(room) => {
                tracing::info!(room = %room.slug(), "created default room");
                Ok(room)
            }
            Err(CatalogRepositoryError::DuplicateSlug(slug)) => self
                .repository
                .find_room_by_slug(&slug)
                .await?
                .ok_or_else(|| CatalogServiceError::RoomNotFound(slug.to_string())),
            Err(err) => Err(err.into()),
        }
    }

    /// Finds an active room by slug.
    ///
    /// Returns `Ok(None)` for unknown, inactive or malformed slugs.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogServiceError::Repository`] when persistence fails.
    pub async fn find_active_room(&self, slug: &str) -> CatalogServiceResult<Option<Room>> {
        let Ok(valid_slug) = RoomSlug::new(slug) else {
            return Ok(None);
        };
        let room = self.repository.find_room_by_slug(&valid_slug).await?;
        Ok(room.filter(Room::is_active))
    }

    /// Finds an active room by slug, failing when it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogServiceError::RoomNotFound`] when no active room has
    /// the slug, or repository errors.
    pub async fn require_active_room(&self, slug: &str) -> CatalogServiceResult<Room> {
        self.find_active_room(slug)
            .await?
            .ok_or_else(|| CatalogServiceError::RoomNotFound(slug.to_owned()))
    }

    /// Finds a room by identifier regardless of its active flag.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogServiceError::Repository`] when persistence fails.
    pub async fn find_room(&self, id: RoomId) -> CatalogServiceResult<Option<Room>> {
        Ok(self.repository.find_room_by_id(id).await?)
    }

    /// Lists active rooms ordered by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogServiceError::Repository`] when persistence fails.
    pub async fn list_public_rooms(&self) -> CatalogServiceResult<Vec<Room>> {
        let rooms = self.repository.list_rooms().await?;
        Ok(rooms.into_iter().filter(Room::is_active).collect())
    }

    /// Lists the prompts of an active room ordered by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogServiceError::RoomNotFound`] when no active room has
    /// the slug, or repository errors.
    pub async fn room_prompts(&self, slug: &str) -> CatalogServiceResult<Vec<Prompt>> {
        let room = self.require_active_room(slug).await?;
        Ok(self.repository.list_prompts_for_room(room.id()).await?)
    }

    /// Registers a new room.
    ///
    /// # Errors
    ///
    /// Returns domain errors for an invalid slug or blank name, and
    /// [`CatalogRepositoryError::DuplicateSlug`] (wrapped) when the slug is
    /// taken.
    pub async fn register_room(&self, request: RegisterRoomRequest) -> CatalogServiceResult<Room> {
        let slug = RoomSlug::new(request.slug)?;
        let new_room =
            NewRoom::new(slug, request.name, request.model_name)?.with_active(request.is_active);
        Ok(self.repository.create_room(&new_room).await?)
    }

    /// Adds a prompt to an existing room.
    ///
    /// # Errors
    ///
    /// Returns domain errors for blank fields and
    /// [`CatalogRepositoryError::RoomNotFound`] (wrapped) when the room does
    /// not exist.
    pub async fn add_prompt(
        &self,
        room_id: RoomId,
        request: AddPromptRequest,
    ) -> CatalogServiceResult<Prompt> {
        let text = PromptText::new(request.name, request.prompt)?
            .with_description(request.description)
            .with_images(request.preview_image_url, request.icon_image_url);
        let new_prompt = NewPrompt { room_id, text };
        Ok(self.repository.create_prompt(&new_prompt).await?)
    }
}
