//! Detached execution of generation jobs.

use super::generation::{GenerationService, GenerationServiceResult};
use super::report::JobCreated;
use crate::artifact::ports::ArtifactStore;
use crate::catalog::{domain::PromptId, ports::CatalogRepository};
use crate::job::{
    domain::JobId,
    ports::{ImageTransformer, JobRepository},
};
use mockable::Clock;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// A submission that was accepted and handed to a background task.
#[derive(Debug)]
pub struct DispatchedJob {
    /// Acknowledgement for the caller.
    pub created: JobCreated,
    /// Handle of the background execution. Dropping it does not cancel the
    /// job.
    pub handle: JoinHandle<()>,
}

/// Runs each accepted job on its own tokio task.
///
/// Execution is fire-and-forget: failures that escape the orchestrator are
/// logged and the job keeps the last state that was persisted.
pub struct GenerationDispatcher<J, R, A, T, C>
where
    J: JobRepository,
    R: CatalogRepository,
    A: ArtifactStore,
    T: ImageTransformer,
    C: Clock + Send + Sync,
{
    service: Arc<GenerationService<J, R, A, T, C>>,
}

impl<J, R, A, T, C> Clone for GenerationDispatcher<J, R, A, T, C>
where
    J: JobRepository,
    R: CatalogRepository,
    A: ArtifactStore,
    T: ImageTransformer,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
        }
    }
}

impl<J, R, A, T, C> GenerationDispatcher<J, R, A, T, C>
where
    J: JobRepository + 'static,
    R: CatalogRepository + 'static,
    A: ArtifactStore + 'static,
    T: ImageTransformer + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a dispatcher over a shared service.
    #[must_use]
    pub const fn new(service: Arc<GenerationService<J, R, A, T, C>>) -> Self {
        Self { service }
    }

    /// Returns the shared service.
    #[must_use]
    pub const fn service(&self) -> &Arc<GenerationService<J, R, A, T, C>> {
        &self.service
    }

    /// Starts executing a job in the background.
    #[must_use = "the handle can be awaited or dropped to detach"]
    pub fn dispatch(&self, job_id: JobId) -> JoinHandle<()> {
        let service = Arc::clone(&self.service);
        tokio::spawn(async move {
            match service.run_generation(job_id).await {
                Ok(job) => {
                    tracing::info!(job_id = %job_id, status = %job.status(), "generation job finished");
                }
                Err(err) => {
                    tracing::error!(job_id = %job_id, error = %err, "background generation crashed");
                }
            }
        })
    }

    /// Accepts a room-scoped submission and starts executing it.
    ///
    /// # Errors
    ///
    /// Returns the validation and persistence errors of
    /// [`GenerationService::submit`]; nothing is dispatched in that case.
    pub async fn submit(
        &self,
        room_slug: &str,
        prompt_id: PromptId,
        source: Vec<u8>,
    ) -> GenerationServiceResult<DispatchedJob> {
        let created = self.service.submit(room_slug, prompt_id, source).await?;
        let handle = self.dispatch(created.id);
        Ok(DispatchedJob { created, handle })
    }

    /// Accepts a default-room submission and starts executing it.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`GenerationService::submit_to_default_room`].
    pub async fn submit_to_default_room(
        &self,
        prompt_id: PromptId,
        source: Vec<u8>,
    ) -> GenerationServiceResult<DispatchedJob> {
        let created = self
            .service
            .submit_to_default_room(prompt_id, source)
            .await?;
        let handle = self.dispatch(created.id);
        Ok(DispatchedJob { created, handle })
    }
}
