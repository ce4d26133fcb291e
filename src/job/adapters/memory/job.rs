//! In-memory generation job repository for tests and local runs.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock};

use crate::job::{
    domain::{AccessToken, GenerationJob, JobId, NewGenerationJob},
    ports::{JobRepository, JobRepositoryError, JobRepositoryResult},
};

/// Thread-safe in-memory job repository.
///
/// Access tokens are indexed so that a duplicate surfaces as
/// [`JobRepositoryError::DuplicateAccessToken`], as the unique column does
/// in `PostgreSQL`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryJobRepository {
    state: Arc<RwLock<InMemoryJobState>>,
}

#[derive(Debug, Default)]
struct InMemoryJobState {
    jobs: BTreeMap<JobId, GenerationJob>,
    token_index: HashMap<AccessToken, JobId>,
    last_id: i64,
}

impl InMemoryJobRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every stored job ordered by identifier.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when lock acquisition fails.
    pub fn all(&self) -> JobRepositoryResult<Vec<GenerationJob>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.jobs.values().cloned().collect())
    }
}

fn lock_error(err: impl std::fmt::Display) -> JobRepositoryError {
    JobRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn create(&self, job: &NewGenerationJob) -> JobRepositoryResult<GenerationJob> {
        let mut state = self.state.write().map_err(lock_error)?;
        state.last_id += 1;
        let stored = GenerationJob::from_new(JobId::new(state.last_id), *job);
        state.jobs.insert(stored.id(), stored.clone());
        Ok(stored)
    }

    async fn update(&self, job: &GenerationJob) -> JobRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if !state.jobs.contains_key(&job.id()) {
            return Err(JobRepositoryError::NotFound(job.id()));
        }

        if let Some(token) = job.access_token() {
            match state.token_index.get(token) {
                Some(owner) if *owner != job.id() => {
                    return Err(JobRepositoryError::DuplicateAccessToken(token.clone()));
                }
                Some(_) => {}
                None => {
                    state.token_index.insert(token.clone(), job.id());
                }
            }
        }

        state.jobs.insert(job.id(), job.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: JobId) -> JobRepositoryResult<Option<GenerationJob>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.jobs.get(&id).cloned())
    }

    async fn find_by_access_token(
        &self,
        token: &AccessToken,
    ) -> JobRepositoryResult<Option<GenerationJob>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state
            .token_index
            .get(token)
            .and_then(|id| state.jobs.get(id))
            .cloned())
    }
}
