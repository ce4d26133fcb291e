//! Port for the external image transformation capability.

use async_trait::async_trait;
use thiserror::Error;

/// Transforms a photo according to a prompt using a named model.
///
/// Implementations make at most one upstream call per invocation; callers
/// never retry.
#[async_trait]
pub trait ImageTransformer: Send + Sync {
    /// Returns the transformed image bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ImageTransformError`] when the upstream call fails or
    /// returns no usable image.
    async fn transform(
        &self,
        model: &str,
        prompt: &str,
        image: Vec<u8>,
    ) -> Result<Vec<u8>, ImageTransformError>;
}

/// Errors returned by image transformers.
///
/// The display text is stored verbatim as a failed job's error message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ImageTransformError {
    /// The upstream service reported a failure.
    #[error("{0}")]
    Upstream(String),

    /// The upstream response did not contain an image.
    #[error("upstream response did not contain an image")]
    EmptyResponse,

    /// Local image processing around the upstream call failed.
    #[error("image processing failed: {0}")]
    Processing(String),
}
