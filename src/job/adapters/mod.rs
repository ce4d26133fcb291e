//! Adapter implementations of the job ports.

pub mod memory;
pub mod normalizing;
pub mod postgres;
