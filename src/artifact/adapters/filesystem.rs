//! Capability-scoped filesystem artifact store.
//!
//! Every access goes through a [`Dir`] handle opened once on the storage
//! root, so relative artifact paths cannot escape it. Blocking filesystem
//! work runs on tokio's blocking thread pool.

use crate::artifact::{
    domain::{
        ArtifactPath, GalleryImage, OutputFormat, PruneReport, RESULTS_DIR, RetentionPolicy,
        SOURCE_DIR, room_results_dir,
    },
    ports::{ArtifactStore, ArtifactStoreError, ArtifactStoreResult},
};
use crate::catalog::domain::RoomSlug;
use crate::job::domain::JobId;
use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use chrono::{DateTime, Utc};
use std::io::Read;
use std::sync::Arc;

/// Bytes inspected when a file's extension does not identify an image.
const SNIFF_LEN: u64 = 32;
const STAGING_SUFFIX: &str = ".partial";

/// Artifact store rooted at a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FilesystemArtifactStore {
    root: Arc<Dir>,
    retention: RetentionPolicy,
    media_url_prefix: String,
}

impl FilesystemArtifactStore {
    /// Opens (creating when needed) the storage root and its `source/` and
    /// `results/` areas.
    ///
    /// Gallery URLs are formed as
    /// `<media_url_prefix>/results/room-<slug>/<file>`.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactStoreError::Io`] when the directories cannot be
    /// created or opened.
    pub fn open(
        root: &Utf8Path,
        retention: RetentionPolicy,
        media_url_prefix: impl Into<String>,
    ) -> ArtifactStoreResult<Self> {
        Dir::create_ambient_dir_all(root, ambient_authority())
            .map_err(|err| ArtifactStoreError::at(root.as_str(), err))?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())
            .map_err(|err| ArtifactStoreError::at(root.as_str(), err))?;
        for area in [SOURCE_DIR, RESULTS_DIR] {
            dir.create_dir_all(area)
                .map_err(|err| ArtifactStoreError::at(area, err))?;
        }
        let prefix = media_url_prefix.into().trim_end_matches('/').to_owned();
        Ok(Self {
            root: Arc::new(dir),
            retention,
            media_url_prefix: prefix,
        })
    }

    /// Returns the retention policy applied by [`ArtifactStore::prune_results`].
    #[must_use]
    pub const fn retention(&self) -> RetentionPolicy {
        self.retention
    }

    async fn blocking<T, F>(&self, f: F) -> ArtifactStoreResult<T>
    where
        F: FnOnce(&Dir) -> ArtifactStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let root = Arc::clone(&self.root);
        tokio::task::spawn_blocking(move || f(&root))
            .await
            .map_err(|err| ArtifactStoreError::at(".", std::io::Error::other(err)))?
    }

    fn gallery_url(&self, room: &RoomSlug, name: &str) -> String {
        format!("{}/{}/{name}", self.media_url_prefix, room_results_dir(room))
    }
}

#[async_trait]
impl ArtifactStore for FilesystemArtifactStore {
    async fn write_source(
        &self,
        job_id: JobId,
        bytes: Vec<u8>,
    ) -> ArtifactStoreResult<ArtifactPath> {
        let path = ArtifactPath::source(job_id);
        self.blocking(move |root| {
            write_replacing(root, &path, &bytes)?;
            Ok(path)
        })
        .await
    }

    async fn read_source(&self, path: &ArtifactPath) -> ArtifactStoreResult<Vec<u8>> {
        let target = path.clone();
        self.blocking(move |root| {
            root.read(target.as_path())
                .map_err(|err| ArtifactStoreError::io(&target, err))
        })
        .await
    }

    async fn delete_source(&self, path: &ArtifactPath) -> ArtifactStoreResult<()> {
        let target = path.clone();
        self.blocking(move |root| remove_if_present(root, &target))
            .await
    }

    async fn write_result(
        &self,
        room: &RoomSlug,
        job_id: JobId,
        bytes: Vec<u8>,
        format: OutputFormat,
    ) -> ArtifactStoreResult<ArtifactPath> {
        let path = ArtifactPath::result(room, job_id, format.suffix());
        self.blocking(move |root| {
            write_replacing(root, &path, &bytes)?;
            Ok(path)
        })
        .await
    }

    async fn read_result(&self, path: &ArtifactPath) -> ArtifactStoreResult<Vec<u8>> {
        let target = path.clone();
        self.blocking(move |root| {
            root.read(target.as_path())
                .map_err(|err| ArtifactStoreError::io(&target, err))
        })
        .await
    }

    async fn delete_result(&self, path: &ArtifactPath) -> ArtifactStoreResult<()> {
        let target = path.clone();
        self.blocking(move |root| remove_if_present(root, &target))
            .await
    }

    async fn prune_results(&self, now: DateTime<Utc>) -> ArtifactStoreResult<PruneReport> {
        let retention = self.retention;
        self.blocking(move |root| prune_tree(root, retention, now))
            .await
    }

    async fn list_gallery_images(
        &self,
        room: &RoomSlug,
    ) -> ArtifactStoreResult<Vec<GalleryImage>> {
        let room_dir = room_results_dir(room);
        let entries = self
            .blocking(move |root| list_image_files(root, &room_dir))
            .await?;
        let mut images: Vec<GalleryImage> = entries
            .into_iter()
            .map(|(name, modified_at)| GalleryImage {
                url: self.gallery_url(room, &name),
                name,
                modified_at,
            })
            .collect();
        images.sort_by(|left, right| {
            right
                .modified_at
                .cmp(&left.modified_at)
                .then_with(|| left.name.cmp(&right.name))
        });
        Ok(images)
    }
}

/// Writes `bytes` to a sibling temporary file and renames it into place so
/// readers never observe a partially written artifact.
fn write_replacing(root: &Dir, path: &ArtifactPath, bytes: &[u8]) -> ArtifactStoreResult<()> {
    let target = path.as_path();
    if let Some(parent) = target.parent() {
        root.create_dir_all(parent)
            .map_err(|err| ArtifactStoreError::at(parent.as_str(), err))?;
    }
    let staging = Utf8PathBuf::from(format!("{target}{STAGING_SUFFIX}"));
    root.write(&staging, bytes)
        .map_err(|err| ArtifactStoreError::at(staging.as_str(), err))?;
    root.rename(&staging, root, target)
        .map_err(|err| ArtifactStoreError::io(path, err))
}

fn remove_if_present(root: &Dir, path: &ArtifactPath) -> ArtifactStoreResult<()> {
    match root.remove_file(path.as_path()) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(ArtifactStoreError::io(path, err)),
    }
}

fn prune_tree(
    root: &Dir,
    retention: RetentionPolicy,
    now: DateTime<Utc>,
) -> ArtifactStoreResult<PruneReport> {
    let mut report = PruneReport::default();
    let mut pending = vec![Utf8PathBuf::from(RESULTS_DIR)];
    let mut is_top_level = true;

    while let Some(dir_path) = pending.pop() {
        let entries = match root.read_dir(&dir_path) {
            Ok(entries) => entries,
            Err(err) if is_top_level => {
                return Err(ArtifactStoreError::at(dir_path.as_str(), err));
            }
            Err(err) => {
                tracing::warn!(path = %dir_path, error = %err, "skipping unreadable results directory");
                continue;
            }
        };
        is_top_level = false;

        for entry in entries {
            let outcome = entry.and_then(|item| {
                let name = item.file_name()?;
                let file_type = item.file_type()?;
                let modified = if file_type.is_file() {
                    Some(modified_at(&item.metadata()?)?)
                } else {
                    None
                };
                Ok((dir_path.join(name), file_type.is_dir(), modified))
            });
            match outcome {
                Ok((child, true, _)) => pending.push(child),
                Ok((child, false, Some(modified))) => {
                    if !retention.is_expired(modified, now) {
                        report.retained += 1;
                        continue;
                    }
                    match root.remove_file(&child) {
                        Ok(()) => {
                            tracing::debug!(path = %child, "pruned expired result");
                            report.removed += 1;
                        }
                        Err(err) => {
                            tracing::warn!(path = %child, error = %err, "failed to prune expired result");
                            report.failed += 1;
                        }
                    }
                }
                Ok((_, false, None)) => {}
                Err(err) => {
                    tracing::warn!(path = %dir_path, error = %err, "skipping unreadable results entry");
                }
            }
        }
    }

    Ok(report)
}

fn list_image_files(
    root: &Dir,
    room_dir: &Utf8Path,
) -> ArtifactStoreResult<Vec<(String, DateTime<Utc>)>> {
    let entries = match root.read_dir(room_dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(ArtifactStoreError::at(room_dir.as_str(), err)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let listed = entry.and_then(|item| item.file_name()).and_then(|name| {
            if name.ends_with(STAGING_SUFFIX) {
                return Ok(None);
            }
            gallery_entry(root, room_dir, name)
        });
        match listed {
            Ok(Some(file)) => files.push(file),
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(path = %room_dir, error = %err, "skipping unreadable gallery entry");
            }
        }
    }
    Ok(files)
}

/// Stats one directory entry by name, yielding `None` for non-images and
/// for entries removed since the directory was read.
fn gallery_entry(
    root: &Dir,
    room_dir: &Utf8Path,
    name: String,
) -> std::io::Result<Option<(String, DateTime<Utc>)>> {
    let relative = room_dir.join(&name);
    let metadata = match root.metadata(&relative) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err),
    };
    if !metadata.is_file() || !is_image(root, &relative) {
        return Ok(None);
    }
    Ok(Some((name, modified_at(&metadata)?)))
}

/// Classifies a file as an image by extension, falling back to sniffing its
/// leading bytes.
fn is_image(root: &Dir, relative: &Utf8Path) -> bool {
    let by_extension = mime_guess::from_path(relative)
        .first()
        .is_some_and(|mime| mime.type_() == mime_guess::mime::IMAGE);
    if by_extension {
        return true;
    }
    let Ok(file) = root.open(relative) else {
        return false;
    };
    let mut header = Vec::new();
    if file.take(SNIFF_LEN).read_to_end(&mut header).is_err() {
        return false;
    }
    image::guess_format(&header).is_ok()
}

fn modified_at(metadata: &cap_std::fs::Metadata) -> std::io::Result<DateTime<Utc>> {
    let modified = metadata.modified()?.into_std();
    Ok(DateTime::<Utc>::from(modified))
}
