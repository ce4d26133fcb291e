//! Adapter implementations of the artifact store port.

pub mod filesystem;

pub use filesystem::FilesystemArtifactStore;
