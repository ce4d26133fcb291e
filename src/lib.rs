//! Photoframe: photo booth generation jobs.
//!
//! A booth submits a photo and a chosen style prompt for one of its rooms.
//! The crate tracks each submission as a generation job, runs it once
//! against an external image transform, stores the result under the room and
//! hands out a short access token for fetching it. Stored results are swept
//! by age, and each job's uploaded photo is deleted as soon as the job
//! resolves.
//!
//! # Architecture
//!
//! Photoframe follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, filesystem,
//!   image codecs)
//!
//! # Modules
//!
//! - [`catalog`]: Rooms, style prompts and model resolution
//! - [`artifact`]: Source and result storage, retention and galleries
//! - [`job`]: Generation job lifecycle and orchestration
//! - [`config`]: Environment-driven configuration
//! - [`telemetry`]: Structured logging set-up

pub mod artifact;
pub mod catalog;
pub mod config;
pub mod job;
pub mod persistence;
pub mod telemetry;
