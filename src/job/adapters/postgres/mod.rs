//! `PostgreSQL` adapter for generation jobs.

mod models;
mod repository;
mod schema;

pub use repository::PostgresJobRepository;
