//! Read-side services over stored artifacts.

mod gallery;

pub use gallery::{GalleryService, GalleryServiceError, GalleryServiceResult};
