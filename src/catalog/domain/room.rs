//! Room aggregate and its validated slug.

use super::{CatalogDomainError, RoomId, resolve_effective_model};
use serde::{Deserialize, Serialize};
use std::fmt;

/// URL-safe unique room identifier used in paths and result directories.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomSlug(String);

impl RoomSlug {
    /// Longest slug accepted by the `rooms.slug` column.
    const MAX_LENGTH: usize = 120;

    /// Creates a validated slug.
    ///
    /// Surrounding whitespace is trimmed before validation.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogDomainError::InvalidRoomSlug`] when the value is
    /// empty, longer than 120 characters or contains anything other than
    /// lowercase ASCII letters, digits and `-`.
    pub fn new(value: impl Into<String>) -> Result<Self, CatalogDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        let is_valid = !normalized.is_empty()
            && normalized.len() <= Self::MAX_LENGTH
            && normalized
                .chars()
                .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-');
        if !is_valid {
            return Err(CatalogDomainError::InvalidRoomSlug(raw));
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the slug as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for RoomSlug {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for RoomSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parameter object describing a room that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRoom {
    /// Unique slug.
    pub slug: RoomSlug,
    /// Display name.
    pub name: String,
    /// Configured provider model.
    pub model_name: String,
    /// Whether the room is publicly reachable.
    pub is_active: bool,
}

impl NewRoom {
    /// Creates a validated active room description.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogDomainError::EmptyRoomName`] when the name is blank.
    pub fn new(
        slug: RoomSlug,
        name: impl Into<String>,
        model_name: impl Into<String>,
    ) -> Result<Self, CatalogDomainError> {
        let raw_name = name.into();
        let trimmed = raw_name.trim();
        if trimmed.is_empty() {
            return Err(CatalogDomainError::EmptyRoomName);
        }
        Ok(Self {
            slug,
            name: trimmed.to_owned(),
            model_name: model_name.into().trim().to_owned(),
            is_active: true,
        })
    }

    /// Sets whether the room starts active.
    #[must_use]
    pub const fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }
}

/// Persisted room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    id: RoomId,
    slug: RoomSlug,
    name: String,
    model_name: String,
    is_active: bool,
}

impl Room {
    /// Builds a room from its stored description and assigned identifier.
    #[must_use]
    pub fn from_new(id: RoomId, new_room: NewRoom) -> Self {
        Self {
            id,
            slug: new_room.slug,
            name: new_room.name,
            model_name: new_room.model_name,
            is_active: new_room.is_active,
        }
    }

    /// Returns the room identifier.
    #[must_use]
    pub const fn id(&self) -> RoomId {
        self.id
    }

    /// Returns the room slug.
    #[must_use]
    pub const fn slug(&self) -> &RoomSlug {
        &self.slug
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the configured model exactly as stored.
    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Returns whether the room is publicly reachable.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns the provider model that transforms for this room use.
    #[must_use]
    pub fn effective_model(&self) -> &str {
        resolve_effective_model(&self.model_name)
    }
}
