//! Port contracts for the room and prompt catalog.
//!
//! Ports define infrastructure-agnostic interfaces used by catalog services.

pub mod repository;

pub use repository::{CatalogRepository, CatalogRepositoryError, CatalogRepositoryResult};
