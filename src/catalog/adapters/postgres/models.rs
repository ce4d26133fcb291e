//! Diesel row models for catalog persistence.

use super::schema::{model_settings, prompts, rooms};
use diesel::prelude::*;

/// Query result row for rooms.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = rooms)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RoomRow {
    /// Room identifier.
    pub id: i64,
    /// Unique slug.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Configured provider model.
    pub model_name: String,
    /// Active flag.
    pub is_active: bool,
}

/// Insert model for rooms.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = rooms)]
pub struct NewRoomRow {
    /// Unique slug.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Configured provider model.
    pub model_name: String,
    /// Active flag.
    pub is_active: bool,
}

/// Query result row for prompts.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = prompts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PromptRow {
    /// Prompt identifier.
    pub id: i64,
    /// Owning room.
    pub room_id: i64,
    /// Style name.
    pub name: String,
    /// Style description.
    pub description: String,
    /// Instruction sent to the provider.
    pub prompt: String,
    /// Preview image reference.
    pub preview_image_url: String,
    /// Icon image reference.
    pub icon_image_url: String,
}

/// Insert model for prompts.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = prompts)]
pub struct NewPromptRow {
    /// Owning room.
    pub room_id: i64,
    /// Style name.
    pub name: String,
    /// Style description.
    pub description: String,
    /// Instruction sent to the provider.
    pub prompt: String,
    /// Preview image reference.
    pub preview_image_url: String,
    /// Icon image reference.
    pub icon_image_url: String,
}

/// Query result row for the legacy model setting.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = model_settings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ModelSettingRow {
    /// Fixed identifier.
    pub id: i32,
    /// Stored model identifier.
    pub model_name: String,
}
