//! Diesel schema for generation job persistence.

diesel::table! {
    /// One row per submitted generation job.
    generation_jobs (id) {
        /// Job identifier.
        id -> Int8,
        /// Applied prompt.
        prompt_id -> Int8,
        /// Owning room.
        room_id -> Int8,
        /// Lifecycle status.
        #[max_length = 20]
        status -> Varchar,
        /// Unique public access token.
        #[max_length = 32]
        qr_hash -> Nullable<Varchar>,
        /// Source photo location while held.
        #[max_length = 500]
        source_path -> Nullable<Varchar>,
        /// Result location once completed.
        #[max_length = 500]
        result_path -> Nullable<Varchar>,
        /// Failure description.
        error_message -> Nullable<Text>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Latest update timestamp.
        updated_at -> Timestamptz,
    }
}
