//! Provider model selection with fallback for retired identifiers.
//!
//! Rooms keep their configured model indefinitely while the upstream catalog
//! moves on, so a retired or blank value resolves to the current default
//! instead of breaking a dormant room.

use serde::{Deserialize, Serialize};

/// Model used when a room has no usable configured model.
pub const CURRENT_DEFAULT_MODEL: &str = "openai/gpt-5-image";

/// Model identifiers that are no longer served upstream.
pub const LEGACY_MODELS: [&str; 3] = [
    "google/gemini-2.5-flash-image-preview",
    "openai/gpt-image-1",
    "openai/gpt-5-image-mini",
];

/// Returns the provider model to call for a configured model value.
///
/// The configured value is returned trimmed unless it is blank or one of
/// [`LEGACY_MODELS`], in which case [`CURRENT_DEFAULT_MODEL`] is returned.
#[must_use]
pub fn resolve_effective_model(configured: &str) -> &str {
    let candidate = configured.trim();
    if candidate.is_empty() || LEGACY_MODELS.contains(&candidate) {
        return CURRENT_DEFAULT_MODEL;
    }
    candidate
}

/// Deployment-wide model setting kept from before rooms carried their own
/// model.
///
/// Only consulted when seeding the default room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSetting {
    model_name: String,
}

impl ModelSetting {
    /// Creates a setting holding the given model identifier.
    #[must_use]
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: model_name.into(),
        }
    }

    /// Returns the stored model identifier as written.
    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Returns the model a newly seeded room should be configured with.
    #[must_use]
    pub fn seed_model(&self) -> &str {
        resolve_effective_model(&self.model_name)
    }
}
