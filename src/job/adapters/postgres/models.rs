//! Diesel row models for generation job persistence.

use super::schema::generation_jobs;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for generation jobs.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = generation_jobs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct JobRow {
    /// Job identifier.
    pub id: i64,
    /// Applied prompt.
    pub prompt_id: i64,
    /// Owning room.
    pub room_id: i64,
    /// Lifecycle status.
    pub status: String,
    /// Access token.
    pub qr_hash: Option<String>,
    /// Source location.
    pub source_path: Option<String>,
    /// Result location.
    pub result_path: Option<String>,
    /// Failure description.
    pub error_message: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for generation jobs.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = generation_jobs)]
pub struct NewJobRow {
    /// Applied prompt.
    pub prompt_id: i64,
    /// Owning room.
    pub room_id: i64,
    /// Initial status.
    pub status: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Initial update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Changeset replacing every mutable column of a job.
///
/// `None` values are written as `NULL` so cleared fields stay cleared.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = generation_jobs)]
#[diesel(treat_none_as_null = true)]
pub struct JobChangeset {
    /// Lifecycle status.
    pub status: String,
    /// Access token.
    pub qr_hash: Option<String>,
    /// Source location.
    pub source_path: Option<String>,
    /// Result location.
    pub result_path: Option<String>,
    /// Failure description.
    pub error_message: Option<String>,
    /// Latest update timestamp.
    pub updated_at: DateTime<Utc>,
}
