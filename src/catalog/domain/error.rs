//! Error types for catalog domain validation.

use thiserror::Error;

/// Errors returned while constructing catalog domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogDomainError {
    /// The room slug is empty, too long or contains characters outside
    /// `[a-z0-9-]`.
    #[error("invalid room slug '{0}', expected 1-120 characters of [a-z0-9-]")]
    InvalidRoomSlug(String),

    /// The room display name is empty after trimming.
    #[error("room name must not be empty")]
    EmptyRoomName,

    /// The prompt name is empty after trimming.
    #[error("prompt name must not be empty")]
    EmptyPromptName,

    /// The prompt text is empty after trimming.
    #[error("prompt text must not be empty")]
    EmptyPromptText,
}
