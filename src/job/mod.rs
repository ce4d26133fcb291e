//! Generation job lifecycle.
//!
//! A submission creates a job in `processing` with its source photo stored,
//! then a background task runs the orchestrator once: it calls the external
//! transform, stores the result, sweeps expired results, assigns an access
//! token and finally deletes the source photo. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
