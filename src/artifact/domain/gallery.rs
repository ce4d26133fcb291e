//! Gallery entries derived from a room's stored results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One result image visible in a room gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryImage {
    /// File name within the room's result directory.
    pub name: String,
    /// Public URL under the media prefix.
    pub url: String,
    /// Last modification time of the file.
    pub modified_at: DateTime<Utc>,
}
