//! Style prompts offered by a room.

use super::{CatalogDomainError, PromptId, RoomId};
use serde::{Deserialize, Serialize};

/// Validated prompt content shared by new and persisted prompts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptText {
    /// Short style name shown on the kiosk.
    pub name: String,
    /// Longer description shown on the kiosk.
    pub description: String,
    /// Instruction sent to the provider model.
    pub prompt: String,
    /// Preview image shown when the style is selected.
    pub preview_image_url: String,
    /// Icon shown in the style list.
    pub icon_image_url: String,
}

impl PromptText {
    /// Creates validated prompt content with empty image references.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogDomainError::EmptyPromptName`] or
    /// [`CatalogDomainError::EmptyPromptText`] when the respective value is
    /// blank.
    pub fn new(
        name: impl Into<String>,
        prompt: impl Into<String>,
    ) -> Result<Self, CatalogDomainError> {
        let raw_name = name.into();
        let raw_prompt = prompt.into();
        if raw_name.trim().is_empty() {
            return Err(CatalogDomainError::EmptyPromptName);
        }
        if raw_prompt.trim().is_empty() {
            return Err(CatalogDomainError::EmptyPromptText);
        }
        Ok(Self {
            name: raw_name.trim().to_owned(),
            description: String::new(),
            prompt: raw_prompt,
            preview_image_url: String::new(),
            icon_image_url: String::new(),
        })
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the preview and icon image references.
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

/// Parameter object describing a prompt that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPrompt {
    /// Owning room.
    pub room_id: RoomId,
    /// Prompt content.
    pub text: PromptText,
}

/// Persisted prompt, always scoped to exactly one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    id: PromptId,
    room_id: RoomId,
    text: PromptText,
}

impl Prompt {
    /// Builds a prompt from its stored description and assigned identifier.
    #[must_use]
    pub fn from_new(id: PromptId, new_prompt: NewPrompt) -> Self {
        Self {
            id,
            room_id: new_prompt.room_id,
            text: new_prompt.text,
        }
    }

    /// Returns the prompt identifier.
    #[must_use]
    pub const fn id(&self) -> PromptId {
        self.id
    }

    /// Returns the owning room.
    #[must_use]
    pub const fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// Returns the style name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.text.name
    }

    /// Returns the instruction sent to the provider.
    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.text.prompt
    }

    /// Returns the full prompt content.
    #[must_use]
    pub const fn text(&self) -> &PromptText {
        &self.text
    }

    /// Returns whether the prompt belongs to the given room.
    #[must_use]
    pub fn belongs_to(&self, room_id: RoomId) -> bool {
        self.room_id == room_id
    }
}
