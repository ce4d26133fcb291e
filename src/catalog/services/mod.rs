//! Application services for room and prompt lookup.

mod catalog;

pub use catalog::{
    AddPromptRequest, CatalogService, CatalogServiceError, CatalogServiceResult,
    RegisterRoomRequest,
};
