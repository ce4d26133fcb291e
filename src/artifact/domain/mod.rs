//! Domain model for stored artifacts and their retention.

mod format;
mod gallery;
mod path;
mod retention;

pub use format::{OutputFormat, ParseOutputFormatError};
pub use gallery::GalleryImage;
pub use path::ArtifactPath;
pub(crate) use path::{RESULTS_DIR, SOURCE_DIR, room_results_dir};
pub use retention::{PruneReport, RetentionPolicy};
