//! Scripted image transformer for tests and offline runs.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::job::ports::{ImageTransformError, ImageTransformer};

/// One recorded transform invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformCall {
    /// Model the caller resolved.
    pub model: String,
    /// Prompt text sent upstream.
    pub prompt: String,
    /// Source bytes sent upstream.
    pub image: Vec<u8>,
}

#[derive(Debug, Clone)]
enum Script {
    Succeed(Vec<u8>),
    Fail(ImageTransformError),
}

/// Transformer that returns a fixed outcome and records every call.
#[derive(Debug, Clone)]
pub struct ScriptedImageTransformer {
    script: Script,
    calls: Arc<Mutex<Vec<TransformCall>>>,
}

impl ScriptedImageTransformer {
    /// Creates a transformer that always returns `output`.
    #[must_use]
    pub fn succeeding(output: impl Into<Vec<u8>>) -> Self {
        Self::with_script(Script::Succeed(output.into()))
    }

    /// Creates a transformer that always fails with `error`.
    #[must_use]
    pub fn failing(error: ImageTransformError) -> Self {
        Self::with_script(Script::Fail(error))
    }

    fn with_script(script: Script) -> Self {
        Self {
            script,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns the calls recorded so far.
    ///
    /// # Errors
    ///
    /// Returns [`ImageTransformError::Processing`] when the call log lock is
    /// poisoned.
    pub fn calls(&self) -> Result<Vec<TransformCall>, ImageTransformError> {
        let calls = self
            .calls
            .lock()
            .map_err(|err| ImageTransformError::Processing(err.to_string()))?;
        Ok(calls.clone())
    }
}

#[async_trait]
impl ImageTransformer for ScriptedImageTransformer {
    async fn transform(
        &self,
        model: &str,
        prompt: &str,
        image: Vec<u8>,
    ) -> Result<Vec<u8>, ImageTransformError> {
        self.calls
            .lock()
            .map_err(|err| ImageTransformError::Processing(err.to_string()))?
            .push(TransformCall {
                model: model.to_owned(),
                prompt: prompt.to_owned(),
                image,
            });
        match &self.script {
            Script::Succeed(output) => Ok(output.clone()),
            Script::Fail(error) => Err(error.clone()),
        }
    }
}
