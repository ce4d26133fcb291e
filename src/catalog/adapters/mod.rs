//! Adapter implementations for the catalog repository port.

pub mod memory;
pub mod postgres;
