//! Domain model for rooms, prompts and model resolution.
//!
//! Identifiers are assigned by persistence, so new rooms and prompts are
//! described by parameter objects and only become [`Room`] and [`Prompt`]
//! values once stored.

mod error;
mod ids;
mod model;
mod prompt;
mod room;

pub use error::CatalogDomainError;
pub use ids::{PromptId, RoomId};
pub use model::{
    CURRENT_DEFAULT_MODEL, LEGACY_MODELS, ModelSetting, resolve_effective_model,
};
pub use prompt::{NewPrompt, Prompt, PromptText};
pub use room::{NewRoom, Room, RoomSlug};
