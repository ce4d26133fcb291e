//! Generation job orchestration: submission, execution and lookup.
//!
//! [`GenerationService::run_generation`] drives one job from `processing` to
//! a terminal state. Whatever the outcome, the job's source photo is
//! released and deleted before the final state is persisted in a single
//! update.

use super::qr::{self, QrRenderError};
use super::report::{JobCreated, JobStatusReport, ResultDownload};
use crate::artifact::{
    domain::{ArtifactPath, OutputFormat},
    ports::{ArtifactStore, ArtifactStoreError},
};
use crate::catalog::{
    domain::{Prompt, PromptId, Room, RoomId},
    ports::{CatalogRepository, CatalogRepositoryError},
    services::{CatalogService, CatalogServiceError},
};
use crate::job::{
    domain::{AccessToken, GenerationJob, JobDomainError, JobId, JobStatus, NewGenerationJob},
    ports::{ImageTransformError, ImageTransformer, JobRepository, JobRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Error message recorded when a job's prompt disappeared before execution.
pub const PROMPT_NOT_FOUND_MESSAGE: &str = "prompt not found";

/// Candidate tokens checked against existing jobs before one is persisted.
const TOKEN_ATTEMPTS: usize = 3;

/// Settings the orchestrator needs from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationSettings {
    /// Encoding of stored results.
    pub output_format: OutputFormat,
    /// Absolute prefix for result URLs; relative URLs are used when unset.
    pub public_base_url: Option<String>,
}

/// Service-level errors for generation jobs.
#[derive(Debug, Error)]
pub enum GenerationServiceError {
    /// Domain lifecycle validation failed.
    #[error(transparent)]
    Domain(#[from] JobDomainError),
    /// Job repository operation failed.
    #[error(transparent)]
    Repository(#[from] JobRepositoryError),
    /// Catalog lookup failed.
    #[error(transparent)]
    Catalog(CatalogServiceError),
    /// Artifact storage failed.
    #[error(transparent)]
    Storage(#[from] ArtifactStoreError),
    /// External transform failed.
    #[error(transparent)]
    Transform(#[from] ImageTransformError),
    /// No active room has the slug.
    #[error("room not found: {0}")]
    RoomNotFound(String),
    /// The room referenced by a job no longer exists.
    #[error("room not found: {0}")]
    OwningRoomMissing(RoomId),
    /// The prompt does not exist.
    #[error("prompt not found: {0}")]
    PromptNotFound(PromptId),
    /// The prompt belongs to a different room.
    #[error("prompt {prompt_id} does not belong to room {room_id}")]
    PromptRoomMismatch {
        /// Requested prompt.
        prompt_id: PromptId,
        /// Room the submission targeted.
        room_id: RoomId,
    },
    /// The job does not exist or is not visible from the requested room.
    #[error("job not found: {0}")]
    JobNotFound(JobId),
    /// No job holds the access token within the requested room.
    #[error("job not found for token: {0}")]
    TokenNotFound(String),
    /// The job was already resolved and cannot run again.
    #[error("job {0} has already been processed")]
    AlreadyProcessed(JobId),
    /// The job is completed but has no access token yet.
    #[error("job {0} access token is not ready")]
    TokenNotReady(JobId),
    /// No completed result is available for the token.
    #[error("result not found")]
    ResultNotFound,
    /// The result link could not be rendered as a QR code.
    #[error(transparent)]
    QrCode(#[from] QrRenderError),
}

impl From<CatalogServiceError> for GenerationServiceError {
    fn from(err: CatalogServiceError) -> Self {
        match err {
            CatalogServiceError::RoomNotFound(slug) => Self::RoomNotFound(slug),
            other => Self::Catalog(other),
        }
    }
}

impl From<CatalogRepositoryError> for GenerationServiceError {
    fn from(err: CatalogRepositoryError) -> Self {
        Self::Catalog(CatalogServiceError::Repository(err))
    }
}

/// Result type for generation service operations.
pub type GenerationServiceResult<T> = Result<T, GenerationServiceError>;

/// Generation job orchestration service.
pub struct GenerationService<J, R, A, T, C>
where
    J: JobRepository,
    R: CatalogRepository,
    A: ArtifactStore,
    T: ImageTransformer,
    C: Clock + Send + Sync,
{
    jobs: Arc<J>,
    catalog: CatalogService<R>,
    artifacts: Arc<A>,
    transformer: Arc<T>,
    clock: Arc<C>,
    settings: GenerationSettings,
}

impl<J, R, A, T, C> Clone for GenerationService<J, R, A, T, C>
where
    J: JobRepository,
    R: CatalogRepository,
    A: ArtifactStore,
    T: ImageTransformer,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            jobs: Arc::clone(&self.jobs),
            catalog: self.catalog.clone(),
            artifacts: Arc::clone(&self.artifacts),
            transformer: Arc::clone(&self.transformer),
            clock: Arc::clone(&self.clock),
            settings: self.settings.clone(),
        }
    }
}

impl<J, R, A, T, C> GenerationService<J, R, A, T, C>
where
    J: JobRepository,
    R: CatalogRepository,
    A: ArtifactStore,
    T: ImageTransformer,
    C: Clock + Send + Sync,
{
    /// Creates a generation service.
    #[must_use]
    pub const fn new(
        jobs: Arc<J>,
        catalog: CatalogService<R>,
        artifacts: Arc<A>,
        transformer: Arc<T>,
        clock: Arc<C>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            jobs,
            catalog,
            artifacts,
            transformer,
            clock,
            settings,
        }
    }

    /// Returns the catalog service used for room resolution.
    #[must_use]
    pub const fn catalog(&self) -> &CatalogService<R> {
        &self.catalog
    }

    /// Inserts a processing job and stores its source photo.
    ///
    /// The row is inserted first so the source file can be named after the
    /// persisted identifier. When the source cannot be written the job is
    /// marked as failed before the storage error is returned.
    ///
    /// # Errors
    ///
    /// Returns repository errors, or [`GenerationServiceError::Storage`]
    /// when the source cannot be written.
    pub async fn create_processing_job(
        &self,
        prompt_id: PromptId,
        room_id: RoomId,
        source: Vec<u8>,
    ) -> GenerationServiceResult<GenerationJob> {
        let new_job = NewGenerationJob::new(prompt_id, room_id, &*self.clock);
        let mut job = self.jobs.create(&new_job).await?;

        match self.artifacts.write_source(job.id(), source).await {
            Ok(path) => {
                job.attach_source(path, &*self.clock)?;
                self.jobs.update(&job).await?;
            }
            Err(err) => {
                job.fail(err.to_string(), &*self.clock)?;
                self.jobs.update(&job).await?;
                return Err(err.into());
            }
        }

        tracing::info!(
            job_id = %job.id(),
            room_id = %room_id,
            prompt_id = %prompt_id,
            "generation job created"
        );
        Ok(job)
    }

    /// Validates a room-scoped submission and creates its job.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationServiceError::RoomNotFound`] for unknown or
    /// inactive rooms, [`GenerationServiceError::PromptNotFound`],
    /// [`GenerationServiceError::PromptRoomMismatch`], or any error from
    /// [`Self::create_processing_job`].
    pub async fn submit(
        &self,
        room_slug: &str,
        prompt_id: PromptId,
        source: Vec<u8>,
    ) -> GenerationServiceResult<JobCreated> {
        let room = self.catalog.require_active_room(room_slug).await?;
        self.submit_to(&room, prompt_id, source).await
    }

    /// Creates a job in the default room, creating that room if needed.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Self::submit`].
    pub async fn submit_to_default_room(
        &self,
        prompt_id: PromptId,
        source: Vec<u8>,
    ) -> GenerationServiceResult<JobCreated> {
        let room = self.catalog.default_room().await?;
        self.submit_to(&room, prompt_id, source).await
    }

    async fn submit_to(
        &self,
        room: &Room,
        prompt_id: PromptId,
        source: Vec<u8>,
    ) -> GenerationServiceResult<JobCreated> {
        let prompt = self
            .catalog
            .repository()
            .find_prompt_by_id(prompt_id)
            .await?
            .ok_or(GenerationServiceError::PromptNotFound(prompt_id))?;
        if !prompt.belongs_to(room.id()) {
            return Err(GenerationServiceError::PromptRoomMismatch {
                prompt_id,
                room_id: room.id(),
            });
        }
        let job = self
            .create_processing_job(prompt_id, room.id(), source)
            .await?;
        Ok(JobCreated::from(&job))
    }

    /// Runs a processing job to its terminal state.
    ///
    /// Transform, storage and room-resolution failures are recorded on the
    /// job rather than returned. The source photo is released and deleted on
    /// every path, and the final state is written once.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationServiceError::JobNotFound`] when the job does not
    /// exist, [`GenerationServiceError::AlreadyProcessed`] when it is
    /// terminal, and repository errors raised while loading the prompt or
    /// persisting the final state, including
    /// [`JobRepositoryError::DuplicateAccessToken`].
    pub async fn run_generation(&self, job_id: JobId) -> GenerationServiceResult<GenerationJob> {
        let mut job = self
            .jobs
            .find_by_id(job_id)
            .await?
            .ok_or(GenerationServiceError::JobNotFound(job_id))?;
        if job.status().is_terminal() {
            return Err(GenerationServiceError::AlreadyProcessed(job_id));
        }

        let prompt = self
            .catalog
            .repository()
            .find_prompt_by_id(job.prompt_id())
            .await?;
        let outcome = match prompt {
            Some(found) => self
                .generate(&job, &found)
                .await
                .map_err(|err| err.to_string()),
            None => Err(PROMPT_NOT_FOUND_MESSAGE.to_owned()),
        };

        match outcome {
            Ok((result_path, token)) => job.complete(result_path, token, &*self.clock)?,
            Err(message) => {
                tracing::warn!(job_id = %job_id, error = %message, "generation job failed");
                job.fail(message, &*self.clock)?;
            }
        }

        if let Some(source) = job.release_source(&*self.clock) {
            if let Err(err) = self.artifacts.delete_source(&source).await {
                tracing::warn!(
                    job_id = %job_id,
                    path = %source,
                    error = %err,
                    "failed to delete source image"
                );
            }
        }

        self.jobs.update(&job).await?;
        Ok(job)
    }

    async fn generate(
        &self,
        job: &GenerationJob,
        prompt: &Prompt,
    ) -> GenerationServiceResult<(ArtifactPath, AccessToken)> {
        let source = match job.source_path() {
            Some(path) => self.artifacts.read_source(path).await?,
            None => Vec::new(),
        };
        let room = self
            .catalog
            .find_room(job.room_id())
            .await?
            .ok_or(GenerationServiceError::OwningRoomMissing(job.room_id()))?;
        let model = room.effective_model();

        tracing::info!(job_id = %job.id(), room = %room.slug(), model, "transform started");
        let started = Instant::now();
        let output = self
            .transformer
            .transform(model, prompt.prompt(), source)
            .await;
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let generated = match output {
            Ok(bytes) => {
                tracing::info!(job_id = %job.id(), model, elapsed_ms, "transform succeeded");
                bytes
            }
            Err(err) => {
                tracing::warn!(job_id = %job.id(), model, elapsed_ms, error = %err, "transform failed");
                return Err(err.into());
            }
        };

        let result_path = self
            .artifacts
            .write_result(room.slug(), job.id(), generated, self.settings.output_format)
            .await?;
        match self.finish_result(job.id()).await {
            Ok(token) => Ok((result_path, token)),
            Err(err) => {
                self.discard_result(job.id(), &result_path).await;
                Err(err)
            }
        }
    }

    /// Sweeps expired results and picks the job's access token.
    async fn finish_result(&self, job_id: JobId) -> GenerationServiceResult<AccessToken> {
        let report = self.artifacts.prune_results(self.clock.utc()).await?;
        tracing::info!(
            job_id = %job_id,
            pruned = report.removed,
            retained = report.retained,
            failed = report.failed,
            "pruned expired results"
        );
        self.allocate_token().await
    }

    /// Best-effort removal of a result whose job is about to fail, so the
    /// gallery never shows output of an errored job.
    async fn discard_result(&self, job_id: JobId, path: &ArtifactPath) {
        if let Err(err) = self.artifacts.delete_result(path).await {
            tracing::warn!(
                job_id = %job_id,
                path = %path,
                error = %err,
                "failed to delete result of failed job"
            );
        }
    }

    /// Picks a token not held by any stored job.
    ///
    /// After the last attempt a fresh candidate is returned unchecked; the
    /// repository's uniqueness constraint is the final arbiter.
    async fn allocate_token(&self) -> GenerationServiceResult<AccessToken> {
        for _ in 0..TOKEN_ATTEMPTS {
            let candidate = AccessToken::generate();
            if self.jobs.find_by_access_token(&candidate).await?.is_none() {
                return Ok(candidate);
            }
            tracing::warn!("access token collision, generating another");
        }
        Ok(AccessToken::generate())
    }

    /// Finds a job by identifier.
    ///
    /// # Errors
    ///
    /// Returns repository errors.
    pub async fn get_job(&self, id: JobId) -> GenerationServiceResult<Option<GenerationJob>> {
        Ok(self.jobs.find_by_id(id).await?)
    }

    /// Finds a job that completed with a stored result.
    ///
    /// # Errors
    ///
    /// Returns repository errors.
    pub async fn get_completed_job(
        &self,
        id: JobId,
    ) -> GenerationServiceResult<Option<GenerationJob>> {
        let job = self.jobs.find_by_id(id).await?;
        Ok(job.filter(GenerationJob::has_result))
    }

    /// Finds a job by access token.
    ///
    /// # Errors
    ///
    /// Returns repository errors.
    pub async fn get_job_by_token(
        &self,
        token: &str,
    ) -> GenerationServiceResult<Option<GenerationJob>> {
        let lookup = AccessToken::from_persisted(token);
        Ok(self.jobs.find_by_access_token(&lookup).await?)
    }

    /// Finds a completed job with a stored result by access token.
    ///
    /// # Errors
    ///
    /// Returns repository errors.
    pub async fn get_completed_job_by_token(
        &self,
        token: &str,
    ) -> GenerationServiceResult<Option<GenerationJob>> {
        let job = self.get_job_by_token(token).await?;
        Ok(job.filter(GenerationJob::has_result))
    }

    /// Reports a job's status as seen from an active room.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationServiceError::RoomNotFound`],
    /// [`GenerationServiceError::JobNotFound`] when the job is absent or
    /// owned by another room, and
    /// [`GenerationServiceError::TokenNotReady`].
    pub async fn status(
        &self,
        room_slug: &str,
        job_id: JobId,
    ) -> GenerationServiceResult<JobStatusReport> {
        let room = self.catalog.require_active_room(room_slug).await?;
        let job = self
            .jobs
            .find_by_id(job_id)
            .await?
            .filter(|found| found.room_id() == room.id())
            .ok_or(GenerationServiceError::JobNotFound(job_id))?;
        self.report(&job)
    }

    /// Reports the status of the job holding `token` within an active room.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationServiceError::RoomNotFound`] and
    /// [`GenerationServiceError::TokenNotFound`] when no job in the room
    /// holds the token.
    pub async fn status_by_token(
        &self,
        room_slug: &str,
        token: &str,
    ) -> GenerationServiceResult<JobStatusReport> {
        let room = self.catalog.require_active_room(room_slug).await?;
        let job = self
            .get_job_by_token(token)
            .await?
            .filter(|found| found.room_id() == room.id())
            .ok_or_else(|| GenerationServiceError::TokenNotFound(token.to_owned()))?;
        self.report(&job)
    }

    /// Reports a default-room job's status.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Self::status`].
    pub async fn default_room_status(
        &self,
        job_id: JobId,
    ) -> GenerationServiceResult<JobStatusReport> {
        let room = self.catalog.default_room().await?;
        self.status(room.slug().as_str(), job_id).await
    }

    fn report(&self, job: &GenerationJob) -> GenerationServiceResult<JobStatusReport> {
        let links = match job.status() {
            JobStatus::Completed => {
                let token = job
                    .access_token()
                    .ok_or(GenerationServiceError::TokenNotReady(job.id()))?;
                Some((self.result_url(token), self.qr_url(job.id())))
            }
            JobStatus::Processing | JobStatus::Error => None,
        };
        let (url, qr_url) = links.unzip();
        Ok(JobStatusReport {
            id: job.id(),
            status: job.status(),
            result_url: url.clone(),
            download_url: url,
            qr_url,
            error_message: job.error_message().map(str::to_owned),
        })
    }

    fn public_url(&self, path: &str) -> String {
        let base = self
            .settings
            .public_base_url
            .as_deref()
            .unwrap_or_default()
            .trim_end_matches('/');
        format!("{base}{path}")
    }

    /// Returns the public fetch URL for a token.
    #[must_use]
    pub fn result_url(&self, token: &AccessToken) -> String {
        self.public_url(&format!("/qr/{token}"))
    }

    /// Returns the URL serving a job's QR code image.
    #[must_use]
    pub fn qr_url(&self, job_id: JobId) -> String {
        self.public_url(&format!("/api/jobs/{job_id}/qr"))
    }

    /// Renders the fetch URL of a completed job in an active room as a PNG
    /// QR code.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationServiceError::RoomNotFound`],
    /// [`GenerationServiceError::JobNotFound`] when the job is absent, owned
    /// by another room or not completed,
    /// [`GenerationServiceError::TokenNotReady`] when the completed job has
    /// no token yet, and [`GenerationServiceError::QrCode`] when rendering
    /// fails.
    pub async fn qr_code(&self, room_slug: &str, job_id: JobId) -> GenerationServiceResult<Vec<u8>> {
        let room = self.catalog.require_active_room(room_slug).await?;
        let job = self
            .get_completed_job(job_id)
            .await?
            .filter(|found| found.room_id() == room.id())
            .ok_or(GenerationServiceError::JobNotFound(job_id))?;
        let token = job
            .access_token()
            .ok_or(GenerationServiceError::TokenNotReady(job_id))?;
        Ok(qr::render_png(&self.result_url(token))?)
    }

    /// Renders a default-room job's QR code.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Self::qr_code`].
    pub async fn default_room_qr_code(&self, job_id: JobId) -> GenerationServiceResult<Vec<u8>> {
        let room = self.catalog.default_room().await?;
        self.qr_code(room.slug().as_str(), job_id).await
    }

    /// Fetches the stored result of the completed job holding `token`.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationServiceError::ResultNotFound`] when the token is
    /// unknown, the job is not completed, or the file is gone, and storage
    /// errors for other read failures.
    pub async fn fetch_result(&self, token: &str) -> GenerationServiceResult<ResultDownload> {
        let job = self
            .get_completed_job_by_token(token)
            .await?
            .ok_or(GenerationServiceError::ResultNotFound)?;
        let path = job
            .result_path()
            .ok_or(GenerationServiceError::ResultNotFound)?;
        let bytes = match self.artifacts.read_result(path).await {
            Ok(bytes) => bytes,
            Err(ArtifactStoreError::NotFound(_)) => {
                return Err(GenerationServiceError::ResultNotFound);
            }
            Err(err) => return Err(err.into()),
        };
        let suffix = path
            .suffix()
            .unwrap_or_else(|| self.settings.output_format.suffix().to_owned());
        let filename = format!("photoframe-{}{suffix}", job.id());
        let media_type = mime_guess::from_path(&filename)
            .first_or_octet_stream()
            .essence_str()
            .to_owned();
        Ok(ResultDownload {
            filename,
            media_type,
            bytes,
        })
    }
}
