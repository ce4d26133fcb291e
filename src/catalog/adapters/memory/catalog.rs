//! In-memory catalog repository for tests and local runs.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::catalog::{
    domain::{ModelSetting, NewPrompt, NewRoom, Prompt, PromptId, Room, RoomId, RoomSlug},
    ports::{CatalogRepository, CatalogRepositoryError, CatalogRepositoryResult},
};

/// Thread-safe in-memory catalog repository.
///
/// Identifiers are assigned from per-table counters starting at 1, matching
/// `BIGSERIAL` columns.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogRepository {
    state: Arc<RwLock<InMemoryCatalogState>>,
}

#[derive(Debug, Default)]
struct InMemoryCatalogState {
    rooms: BTreeMap<RoomId, Room>,
    prompts: BTreeMap<PromptId, Prompt>,
    model_setting: Option<ModelSetting>,
    last_room_id: i64,
    last_prompt_id: i64,
}

impl InMemoryCatalogRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository whose legacy model setting is already stored.
    #[must_use]
    pub fn with_legacy_model_setting(setting: ModelSetting) -> Self {
        let state = InMemoryCatalogState {
            model_setting: Some(setting),
            ..InMemoryCatalogState::default()
        };
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Removes a prompt, returning whether it existed.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when lock acquisition fails.
    pub fn remove_prompt(&self, id: PromptId) -> CatalogRepositoryResult<bool> {
        let mut state = self.state.write().map_err(lock_error)?;
        Ok(state.prompts.remove(&id).is_some())
    }
}

fn lock_error(err: impl std::fmt::Display) -> CatalogRepositoryError {
    CatalogRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn create_room(&self, room: &NewRoom) -> CatalogRepositoryResult<Room> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.rooms.values().any(|existing| existing.slug() == &room.slug) {
            return Err(CatalogRepositoryError::DuplicateSlug(room.slug.clone()));
        }
        state.last_room_id += 1;
        let stored = Room::from_new(RoomId::new(state.last_room_id), room.clone());
        state.rooms.insert(stored.id(), stored.clone());
        Ok(stored)
    }

    async fn find_room_by_id(&self, id: RoomId) -> CatalogRepositoryResult<Option<Room>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.rooms.get(&id).cloned())
    }

    async fn find_room_by_slug(&self, slug: &RoomSlug) -> CatalogRepositoryResult<Option<Room>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.rooms.values().find(|room| room.slug() == slug).cloned())
    }

    async fn list_rooms(&self) -> CatalogRepositoryResult<Vec<Room>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.rooms.values().cloned().collect())
    }

    async fn create_prompt(&self, prompt: &NewPrompt) -> CatalogRepositoryResult<Prompt> {
        let mut state = self.state.write().map_err(lock_error)?;
        if !state.rooms.contains_key(&prompt.room_id) {
            return Err(CatalogRepositoryError::RoomNotFound(prompt.room_id));
        }
        state.last_prompt_id += 1;
        let stored = Prompt::from_new(PromptId::new(state.last_prompt_id), prompt.clone());
        state.prompts.insert(stored.id(), stored.clone());
        Ok(stored)
    }

    async fn find_prompt_by_id(&self, id: PromptId) -> CatalogRepositoryResult<Option<Prompt>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.prompts.get(&id).cloned())
    }

    async fn list_prompts_for_room(&self, room_id: RoomId) -> CatalogRepositoryResult<Vec<Prompt>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .prompts
            .values()
            .filter(|prompt| prompt.belongs_to(room_id))
            .cloned()
            .collect())
    }

    async fn legacy_model_setting(&self) -> CatalogRepositoryResult<Option<ModelSetting>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.model_setting.clone())
    }
}
