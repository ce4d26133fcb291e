//! Service tests for room resolution and prompt listing.

use std::sync::Arc;

use crate::catalog::{
    adapters::memory::InMemoryCatalogRepository,
    domain::{CURRENT_DEFAULT_MODEL, ModelSetting, RoomId, RoomSlug},
    ports::CatalogRepositoryError,
    services::{AddPromptRequest, CatalogService, CatalogServiceError, RegisterRoomRequest},
};
use rstest::{fixture, rstest};

type TestService = CatalogService<InMemoryCatalogRepository>;

fn build_service(repository: InMemoryCatalogRepository) -> TestService {
    CatalogService::new(
        Arc::new(repository),
        RoomSlug::new("main").expect("valid slug"),
    )
}

#[fixture]
fn service() -> TestService {
    build_service(InMemoryCatalogRepository::new())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn default_room_is_created_once(service: TestService) {
    let first = service.default_room().await.expect("default room");
    let second = service.default_room().await.expect("default room");

    assert_eq!(first, second);
    assert_eq!(first.slug().as_str(), "main");
    assert_eq!(first.model_name(), CURRENT_DEFAULT_MODEL);
    assert!(first.is_active());
    assert_eq!(service.list_public_rooms().await.expect("list").len(), 1);
}

#[rstest]
#[case("vendor/custom-model", "vendor/custom-model")]
#[case("openai/gpt-image-1", CURRENT_DEFAULT_MODEL)]
#[tokio::test(flavor = "multi_thread")]
async fn default_room_is_seeded_from_legacy_setting(
    #[case] stored: &str,
    #[case] expected: &str,
) {
    let service = build_service(InMemoryCatalogRepository::with_legacy_model_setting(
        ModelSetting::new(stored),
    ));

    let room = service.default_room().await.expect("default room");

    assert_eq!(room.model_name(), expected);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn inactive_rooms_are_hidden(service: TestService) {
    service
        .register_room(RegisterRoomRequest::new("room-a", "Room A", CURRENT_DEFAULT_MODEL))
        .await
        .expect("room a");
    service
        .register_room(
            RegisterRoomRequest::new("room-b", "Room B", CURRENT_DEFAULT_MODEL).inactive(),
        )
        .await
        .expect("room b");

    let public: Vec<String> = service
        .list_public_rooms()
        .await
        .expect("list")
        .iter()
        .map(|room| room.slug().to_string())
        .collect();

    assert_eq!(public, vec!["room-a".to_owned()]);
    assert!(service.find_active_room("room-b").await.expect("lookup").is_none());
    assert!(service.find_active_room("Not Valid").await.expect("lookup").is_none());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_slug_is_rejected(service: TestService) {
    service
        .register_room(RegisterRoomRequest::new("room-a", "Room A", CURRENT_DEFAULT_MODEL))
        .await
        .expect("first registration");

    let result = service
        .register_room(RegisterRoomRequest::new("room-a", "Again", CURRENT_DEFAULT_MODEL))
        .await;

    assert!(matches!(
        result,
        Err(CatalogServiceError::Repository(
            CatalogRepositoryError::DuplicateSlug(_)
        ))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn room_prompts_are_scoped_and_ordered(service: TestService) {
    let room_a = service
        .register_room(RegisterRoomRequest::new("room-a", "Room A", CURRENT_DEFAULT_MODEL))
        .await
        .expect("room a");
    let room_b = service
        .register_room(RegisterRoomRequest::new("room-b", "Room B", CURRENT_DEFAULT_MODEL))
        .await
        .expect("room b");
    let first = service
        .add_prompt(room_a.id(), AddPromptRequest::new("Anime", "Soft anime shading"))
        .await
        .expect("prompt");
    service
        .add_prompt(room_b.id(), AddPromptRequest::new("Comic", "Bold comic ink"))
        .await
        .expect("prompt");
    let second = service
        .add_prompt(room_a.id(), AddPromptRequest::new("Oil", "Oil painting"))
        .await
        .expect("prompt");

    let prompts = service.room_prompts("room-a").await.expect("prompts");

    assert_eq!(prompts, vec![first, second]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn room_prompts_for_unknown_room_is_not_found(service: TestService) {
    let result = service.room_prompts("missing").await;

    assert!(matches!(result, Err(CatalogServiceError::RoomNotFound(slug)) if slug == "missing"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn add_prompt_requires_existing_room(service: TestService) {
    let result = service
        .add_prompt(RoomId::new(99), AddPromptRequest::new("Anime", "Soft anime shading"))
        .await;

    assert!(matches!(
        result,
        Err(CatalogServiceError::Repository(
            CatalogRepositoryError::RoomNotFound(_)
        ))
    ));
}
