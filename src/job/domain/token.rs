//! Public access tokens for completed results.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Short opaque token that grants credential-free access to one result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Number of hex characters in a generated token.
    pub const LENGTH: usize = 16;

    /// Generates a token from the leading 64 bits of a random UUID.
    #[must_use]
    pub fn generate() -> Self {
        let token = Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(Self::LENGTH)
            .collect();
        Self(token)
    }

    /// Wraps a token read back from persistence or received from a client.
    #[must_use]
    pub fn from_persisted(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the token as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
