//! Diesel schema for catalog persistence.

diesel::table! {
    /// Booth rooms, the tenant boundary of a deployment.
    rooms (id) {
        /// Room identifier.
        id -> Int8,
        /// Unique URL-safe slug.
        #[max_length = 120]
        slug -> Varchar,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
        /// Configured provider model.
        #[max_length = 255]
        model_name -> Varchar,
        /// Whether the room is publicly reachable.
        is_active -> Bool,
    }
}

diesel::table! {
    /// Style prompts scoped to a room.
    prompts (id) {
        /// Prompt identifier.
        id -> Int8,
        /// Owning room.
        room_id -> Int8,
        /// Style name.
        #[max_length = 120]
        name -> Varchar,
        /// Style description.
        #[max_length = 500]
        description -> Varchar,
        /// Instruction sent to the provider.
        prompt -> Text,
        /// Preview image reference.
        #[max_length = 500]
        preview_image_url -> Varchar,
        /// Icon image reference.
        #[max_length = 500]
        icon_image_url -> Varchar,
    }
}

diesel::table! {
    /// Single-row deployment model setting kept for older deployments.
    model_settings (id) {
        /// Fixed identifier, always 1.
        id -> Int4,
        /// Stored model identifier.
        #[max_length = 255]
        model_name -> Varchar,
    }
}

diesel::joinable!(prompts -> rooms (room_id));
diesel::allow_tables_to_appear_in_same_query!(rooms, prompts);
