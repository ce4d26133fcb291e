//! Shared fixtures for end-to-end photoframe tests.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use filetime::FileTime;
use mockable::DefaultClock;
use photoframe::{
    artifact::{adapters::FilesystemArtifactStore, services::GalleryService},
    catalog::{
        adapters::memory::InMemoryCatalogRepository,
        domain::{Prompt, Room},
        services::{AddPromptRequest, CatalogService, RegisterRoomRequest},
    },
    config::PhotoframeConfig,
    job::{
        adapters::memory::{InMemoryJobRepository, ScriptedImageTransformer},
        ports::ImageTransformer,
        services::{GenerationDispatcher, GenerationService},
    },
};
use tempfile::TempDir;

/// Generation service wired to in-memory repositories and a temporary
/// storage root.
pub type BoothService<T> = GenerationService<
    InMemoryJobRepository,
    InMemoryCatalogRepository,
    FilesystemArtifactStore,
    T,
    DefaultClock,
>;

/// A fully wired booth deployment.
pub struct Booth<T = ScriptedImageTransformer>
where
    T: ImageTransformer,
{
    _dir: TempDir,
    /// Storage root.
    pub root: Utf8PathBuf,
    /// Shared artifact store.
    pub store: Arc<FilesystemArtifactStore>,
    /// Generation service.
    pub service: Arc<BoothService<T>>,
    /// Background dispatcher.
    pub dispatcher: GenerationDispatcher<
        InMemoryJobRepository,
        InMemoryCatalogRepository,
        FilesystemArtifactStore,
        T,
        DefaultClock,
    >,
    /// Gallery lister.
    pub gallery: GalleryService<InMemoryCatalogRepository, FilesystemArtifactStore>,
    /// Catalog repository, for removing prompts mid-flight.
    pub catalog_repository: Arc<InMemoryCatalogRepository>,
}

impl<T> Booth<T>
where
    T: ImageTransformer + 'static,
{
    /// Builds a booth from variables given as key/value pairs.
    ///
    /// # Errors
    ///
    /// Returns an error when configuration or storage set-up fails.
    pub fn build(transformer: T, vars: &[(&str, &str)]) -> eyre::Result<Self> {
        let dir = TempDir::new()?;
        let root = Utf8Path::from_path(dir.path())
            .ok_or_else(|| eyre::eyre!("temporary path is not UTF-8"))?
            .join("storage");
        let root_value = root.to_string();
        let config = PhotoframeConfig::from_lookup(|key| {
            if key == "STORAGE_ROOT" {
                return Some(root_value.clone());
            }
            vars.iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value).to_owned())
        })?;

        let store = Arc::new(FilesystemArtifactStore::open(
            &config.storage.root,
            config.storage.retention,
            config.storage.media_url_prefix.clone(),
        )?);
        let catalog_repository = Arc::new(InMemoryCatalogRepository::new());
        let catalog = CatalogService::new(
            Arc::clone(&catalog_repository),
            config.default_room_slug.clone(),
        );
        let service = Arc::new(GenerationService::new(
            Arc::new(InMemoryJobRepository::new()),
            catalog.clone(),
            Arc::clone(&store),
            Arc::new(transformer),
            Arc::new(DefaultClock),
            config.generation_settings(),
        ));
        Ok(Self {
            _dir: dir,
            root,
            store: Arc::clone(&store),
            dispatcher: GenerationDispatcher::new(Arc::clone(&service)),
            service,
            gallery: GalleryService::new(catalog, store),
            catalog_repository,
        })
    }

    /// Returns the catalog service.
    pub fn catalog(&self) -> &CatalogService<InMemoryCatalogRepository> {
        self.service.catalog()
    }

    /// Registers an active room with one prompt.
    ///
    /// # Errors
    ///
    /// Returns an error when the room or prompt cannot be stored.
    pub async fn room_with_prompt(&self, slug: &str) -> eyre::Result<(Room, Prompt)> {
        let room = self
            .catalog()
            .register_room(RegisterRoomRequest::new(slug, slug, "vendor/booth-model"))
            .await?;
        let prompt = self
            .catalog()
            .add_prompt(room.id(), AddPromptRequest::new("Comic", "Draw it as a comic"))
            .await?;
        Ok((room, prompt))
    }

    /// Resolves a storage-root-relative path.
    pub fn path(&self, relative: impl AsRef<Utf8Path>) -> Utf8PathBuf {
        self.root.join(relative)
    }

    /// Writes a file under the storage root with the given modification time.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be written or re-dated.
    pub fn seed_file(
        &self,
        relative: &str,
        bytes: &[u8],
        modified_at: DateTime<Utc>,
    ) -> eyre::Result<Utf8PathBuf> {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, bytes)?;
        set_modified(&path, modified_at)?;
        Ok(path)
    }
}

/// Sets a file's modification time.
///
/// # Errors
///
/// Returns an error when the timestamp cannot be applied.
pub fn set_modified(path: &Utf8Path, modified_at: DateTime<Utc>) -> eyre::Result<()> {
    let time = FileTime::from_system_time(std::time::SystemTime::from(modified_at));
    filetime::set_file_mtime(path, time)?;
    Ok(())
}
