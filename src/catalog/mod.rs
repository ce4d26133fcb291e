//! Rooms, prompts and model selection for photo booth kiosks.
//!
//! A room is the tenant boundary of a deployment: it owns its prompts, its
//! result gallery and the provider model used to transform photos. The module
//! follows hexagonal architecture:
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
