//! `PostgreSQL` repository implementation for generation jobs.

use super::{
    models::{JobChangeset, JobRow, NewJobRow},
    schema::generation_jobs,
};
use crate::artifact::domain::ArtifactPath;
use crate::catalog::domain::{PromptId, RoomId};
use crate::job::{
    domain::{
        AccessToken, GenerationJob, JobId, JobStatus, NewGenerationJob, PersistedJobData,
    },
    ports::{JobRepository, JobRepositoryError, JobRepositoryResult},
};
use crate::persistence::{PgPool, run_blocking};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL`-backed generation job repository.
#[derive(Debug, Clone)]
pub struct PostgresJobRepository {
    pool: PgPool,
}

impl PostgresJobRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn with_connection<F, T>(&self, f: F) -> JobRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> JobRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        run_blocking(&self.pool, JobRepositoryError::from_boxed, f).await
    }
}

#[async_trait]
impl JobRepository for PostgresJobRepository {
    async fn create(&self, job: &NewGenerationJob) -> JobRepositoryResult<GenerationJob> {
        let new_row = NewJobRow {
            prompt_id: job.prompt_id.value(),
            room_id: job.room_id.value(),
            status: JobStatus::Processing.as_str().to_owned(),
            created_at: job.created_at,
            updated_at: job.created_at,
        };
        self.with_connection(move |connection| {
            let row = diesel::insert_into(generation_jobs::table)
                .values(&new_row)
                .returning(JobRow::as_returning())
                .get_result::<JobRow>(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        JobRepositoryError::MissingReference
                    }
                    _ => JobRepositoryError::persistence(err),
                })?;
            row_to_job(row)
        })
        .await
    }

    async fn update(&self, job: &GenerationJob) -> JobRepositoryResult<()> {
        let job_id = job.id();
        let token = job.access_token().cloned();
        let changeset = JobChangeset {
            status: job.status().as_str().to_owned(),
            qr_hash: token.as_ref().map(|value| value.as_str().to_owned()),
            source_path: job.source_path().map(|path| path.as_str().to_owned()),
            result_path: job.result_path().map(|path| path.as_str().to_owned()),
            error_message: job.error_message().map(str::to_owned),
            updated_at: job.updated_at(),
        };
        self.with_connection(move |connection| {
            let updated = diesel::update(generation_jobs::table.find(job_id.value()))
                .set(&changeset)
                .execute(connection)
                .map_err(|err| match (err, token) {
                    (
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _),
                        Some(duplicate),
                    ) => JobRepositoryError::DuplicateAccessToken(duplicate),
                    (other, _) => JobRepositoryError::persistence(other),
                })?;
            if updated == 0 {
                return Err(JobRepositoryError::NotFound(job_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: JobId) -> JobRepositoryResult<Option<GenerationJob>> {
        self.with_connection(move |connection| {
            let row = generation_jobs::table
                .find(id.value())
                .select(JobRow::as_select())
                .first::<JobRow>(connection)
                .optional()
                .map_err(JobRepositoryError::persistence)?;
            row.map(row_to_job).transpose()
        })
        .await
    }

    async fn find_by_access_token(
        &self,
        token: &AccessToken,
    ) -> JobRepositoryResult<Option<GenerationJob>> {
        let lookup = token.as_str().to_owned();
        self.with_connection(move |connection| {
            let row = generation_jobs::table
                .filter(generation_jobs::qr_hash.eq(lookup))
                .select(JobRow::as_select())
                .first::<JobRow>(connection)
                .optional()
                .map_err(JobRepositoryError::persistence)?;
            row.map(row_to_job).transpose()
        })
        .await
    }
}

fn row_to_job(row: JobRow) -> JobRepositoryResult<GenerationJob> {
    let status = JobStatus::try_from(row.status.as_str()).map_err(JobRepositoryError::persistence)?;
    Ok(GenerationJob::from_persisted(PersistedJobData {
        id: JobId::new(row.id),
        prompt_id: PromptId::new(row.prompt_id),
        room_id: RoomId::new(row.room_id),
        status,
        access_token: row.qr_hash.map(AccessToken::from_persisted),
        source_path: row.source_path.map(ArtifactPath::from_persisted),
        result_path: row.result_path.map(ArtifactPath::from_persisted),
        error_message: row.error_message,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

#[cfg(test)]
mod tests {
    //! Unit tests for job row conversion.

    use super::{JobRow, row_to_job};
    use crate::job::domain::{AccessToken, JobStatus};
    use crate::job::ports::JobRepositoryError;
    use chrono::Utc;
    use rstest::rstest;

    fn row(status: &str) -> JobRow {
        let now = Utc::now();
        JobRow {
            id: 7,
            prompt_id: 2,
            room_id: 1,
            status: status.to_owned(),
            qr_hash: Some("0123456789abcdef".to_owned()),
            source_path: None,
            result_path: Some("results/room-main/job-7.jpg".to_owned()),
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn completed_row_maps_to_job() {
        let job = row_to_job(row("completed")).expect("valid row");

        assert_eq!(job.id().value(), 7);
        assert_eq!(job.status(), JobStatus::Completed);
        assert_eq!(
            job.access_token().map(AccessToken::as_str),
            Some("0123456789abcdef")
        );
        assert!(job.has_result());
    }

    #[rstest]
    fn unknown_status_is_a_persistence_error() {
        let result = row_to_job(row("queued"));

        assert!(matches!(result, Err(JobRepositoryError::Persistence(_))));
    }
}
