//! `PostgreSQL` repository implementation for the catalog.

use super::{
    models::{ModelSettingRow, NewPromptRow, NewRoomRow, PromptRow, RoomRow},
    schema::{model_settings, prompts, rooms},
};
use crate::catalog::{
    domain::{
        ModelSetting, NewPrompt, NewRoom, Prompt, PromptId, PromptText, Room, RoomId, RoomSlug,
    },
    ports::{CatalogRepository, CatalogRepositoryError, CatalogRepositoryResult},
};
use crate::persistence::{PgPool, run_blocking};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// Identifier of the single `model_settings` row.
const MODEL_SETTING_ROW_ID: i32 = 1;

/// `PostgreSQL`-backed catalog repository.
#[derive(Debug, Clone)]
pub struct PostgresCatalogRepository {
    pool: PgPool,
}

impl PostgresCatalogRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn with_connection<F, T>(&self, f: F) -> CatalogRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> CatalogRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        run_blocking(&self.pool, CatalogRepositoryError::from_boxed, f).await
    }
}

#[async_trait]
impl CatalogRepository for PostgresCatalogRepository {
    async fn create_room(&self, room: &NewRoom) -> CatalogRepositoryResult<Room> {
        let slug = room.slug.clone();
        let new_row = NewRoomRow {
            slug: room.slug.as_str().to_owned(),
            name: room.name.clone(),
            model_name: room.model_name.clone(),
            is_active: room.is_active,
        };
        self.with_connection(move |connection| {
            let row = diesel::insert_into(rooms::table)
                .values(&new_row)
                .returning(RoomRow::as_returning())
                .get_result::<RoomRow>(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        CatalogRepositoryError::DuplicateSlug(slug.clone())
                    }
                    _ => CatalogRepositoryError::persistence(err),
                })?;
            row_to_room(row)
        })
        .await
    }

    async fn find_room_by_id(&self, id: RoomId) -> CatalogRepositoryResult<Option<Room>> {
        self.with_connection(move |connection| {
            let row = rooms::table
                .find(id.value())
                .select(RoomRow::as_select())
                .first::<RoomRow>(connection)
                .optional()
                .map_err(CatalogRepositoryError::persistence)?;
            row.map(row_to_room).transpose()
        })
        .await
    }

    async fn find_room_by_slug(&self, slug: &RoomSlug) -> CatalogRepositoryResult<Option<Room>> {
        let lookup = slug.as_str().to_owned();
        self.with_connection(move |connection| {
            let row = rooms::table
                .filter(rooms::slug.eq(lookup))
                .select(RoomRow::as_select())
                .first::<RoomRow>(connection)
                .optional()
                .map_err(CatalogRepositoryError::persistence)?;
            row.map(row_to_room).transpose()
        })
        .await
    }

    async fn list_rooms(&self) -> CatalogRepositoryResult<Vec<Room>> {
        self.with_connection(|connection| {
            let rows = rooms::table
                .order(rooms::id.asc())
                .select(RoomRow::as_select())
                .load::<RoomRow>(connection)
                .map_err(CatalogRepositoryError::persistence)?;
            rows.into_iter().map(row_to_room).collect()
        })
        .await
    }

    async fn create_prompt(&self, prompt: &NewPrompt) -> CatalogRepositoryResult<Prompt> {
        let room_id = prompt.room_id;
        let new_row = NewPromptRow {
            room_id: room_id.value(),
            name: prompt.text.name.clone(),
            description: prompt.text.description.clone(),
            prompt: prompt.text.prompt.clone(),
            preview_image_url: prompt.text.preview_image_url.clone(),
            icon_image_url: prompt.text.icon_image_url.clone(),
        };
        self.with_connection(move |connection| {
            let row = diesel::insert_into(prompts::table)
                .values(&new_row)
                .returning(PromptRow::as_returning())
                .get_result::<PromptRow>(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                        CatalogRepositoryError::RoomNotFound(room_id)
                    }
                    _ => CatalogRepositoryError::persistence(err),
                })?;
            Ok(row_to_prompt(row))
        })
        .await
    }

    async fn find_prompt_by_id(&self, id: PromptId) -> CatalogRepositoryResult<Option<Prompt>> {
        self.with_connection(move |connection| {
            let row = prompts::table
                .find(id.value())
                .select(PromptRow::as_select())
                .first::<PromptRow>(connection)
                .optional()
                .map_err(CatalogRepositoryError::persistence)?;
            Ok(row.map(row_to_prompt))
        })
        .await
    }

    async fn list_prompts_for_room(&self, room_id: RoomId) -> CatalogRepositoryResult<Vec<Prompt>> {
        self.with_connection(move |connection| {
            let rows = prompts::table
                .filter(prompts::room_id.eq(room_id.value()))
                .order(prompts::id.asc())
                .select(PromptRow::as_select())
                .load::<PromptRow>(connection)
                .map_err(CatalogRepositoryError::persistence)?;
            Ok(rows.into_iter().map(row_to_prompt).collect())
        })
        .await
    }

    async fn legacy_model_setting(&self) -> CatalogRepositoryResult<Option<ModelSetting>> {
        self.with_connection(|connection| {
            let row = model_settings::table
                .find(MODEL_SETTING_ROW_ID)
                .select(ModelSettingRow::as_select())
                .first::<ModelSettingRow>(connection)
                .optional()
                .map_err(CatalogRepositoryError::persistence)?;
            Ok(row.map(|setting| ModelSetting::new(setting.model_name)))
        })
        .await
    }
}

pub(super) fn row_to_room(row: RoomRow) -> CatalogRepositoryResult<Room> {
    let RoomRow {
        id,
        slug: persisted_slug,
        name,
        model_name,
        is_active,
    } = row;
    let slug = RoomSlug::new(persisted_slug).map_err(CatalogRepositoryError::persistence)?;
    let new_room = NewRoom {
        slug,
        name,
        model_name,
        is_active,
    };
    Ok(Room::from_new(RoomId::new(id), new_room))
}

pub(super) fn row_to_prompt(row: PromptRow) -> Prompt {
    let text = PromptText {
        name: row.name,
        description: row.description,
        prompt: row.prompt,
        preview_image_url: row.preview_image_url,
        icon_image_url: row.icon_image_url,
    };
    let new_prompt = NewPrompt {
        room_id: RoomId::new(row.room_id),
        text,
    };
    Prompt::from_new(PromptId::new(row.id), new_prompt)
}
