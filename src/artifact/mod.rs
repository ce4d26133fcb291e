//! Durable storage for source photos and generated results.
//!
//! Two areas live under one storage root: `source/` holds each submission's
//! uploaded photo until its single processing attempt finishes, and
//! `results/room-<slug>/` holds generated images until the retention sweep
//! removes them. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Read-side services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
