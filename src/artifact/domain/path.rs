//! Storage-root-relative artifact locations.

use crate::catalog::domain::RoomSlug;
use crate::job::domain::JobId;
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Directory holding uploaded source photos.
pub(crate) const SOURCE_DIR: &str = "source";

/// Directory holding per-room result subdirectories.
pub(crate) const RESULTS_DIR: &str = "results";

/// Location of an artifact relative to the storage root.
///
/// Job records persist this value; it never contains `..` components
/// because every constructor derives it from validated identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactPath(Utf8PathBuf);

impl ArtifactPath {
    /// Returns the location of a job's uploaded photo.
    #[must_use]
    pub fn source(job_id: JobId) -> Self {
        Self(Utf8Path::new(SOURCE_DIR).join(job_file_name(job_id, ".jpg")))
    }

    /// Returns the location of a job's generated image within a room.
    #[must_use]
    pub fn result(room: &RoomSlug, job_id: JobId, suffix: &str) -> Self {
        Self(room_results_dir(room).join(job_file_name(job_id, suffix)))
    }

    /// Wraps a location read back from persistence.
    #[must_use]
    pub fn from_persisted(value: impl Into<Utf8PathBuf>) -> Self {
        Self(value.into())
    }

    /// Returns the relative path.
    #[must_use]
    pub fn as_path(&self) -> &Utf8Path {
        &self.0
    }

    /// Returns the relative path as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the file name component.
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.0.file_name()
    }

    /// Returns the file suffix including the leading dot, if any.
    #[must_use]
    pub fn suffix(&self) -> Option<String> {
        self.0.extension().map(|extension| format!(".{extension}"))
    }
}

impl fmt::Display for ArtifactPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// Returns the results subdirectory owned by a room.
pub(crate) fn room_results_dir(room: &RoomSlug) -> Utf8PathBuf {
    Utf8Path::new(RESULTS_DIR).join(format!("room-{room}"))
}

fn job_file_name(job_id: JobId, suffix: &str) -> String {
    format!("job-{job_id}{suffix}")
}
