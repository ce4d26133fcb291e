//! Room gallery listings over stored results.

use super::helpers::Booth;
use chrono::{TimeDelta, Utc};
use eyre::ensure;
use photoframe::{
    artifact::services::GalleryServiceError,
    catalog::services::{CatalogServiceError, RegisterRoomRequest},
    job::adapters::memory::ScriptedImageTransformer,
};
use rstest::rstest;

fn booth() -> eyre::Result<Booth> {
    Booth::build(
        ScriptedImageTransformer::succeeding(b"\xFF\xD8\xFFgenerated".to_vec()),
        &[("MEDIA_URL_PREFIX", "/media/")],
    )
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn gallery_lists_only_images_newest_first() -> eyre::Result<()> {
    let booth = booth()?;
    booth.room_with_prompt("lobby").await?;
    let now = Utc::now();
    booth.seed_file("results/room-lobby/job-1.jpg", b"jpeg", now - TimeDelta::hours(3))?;
    booth.seed_file("results/room-lobby/job-2.png", b"png", now - TimeDelta::hours(1))?;
    booth.seed_file("results/room-lobby/job-3.webp", b"webp", now - TimeDelta::hours(2))?;
    booth.seed_file("results/room-lobby/readme.txt", b"notes", now)?;
    booth.seed_file("results/room-lobby/job-4.json", b"{}", now)?;
    booth.seed_file("results/room-lobby/job-6.jpg.partial", b"\xFF\xD8\xFF\xE0", now)?;
    booth.seed_file("results/room-terrace/job-5.jpg", b"jpeg", now)?;

    let images = booth.gallery.list("lobby").await?;

    let names: Vec<&str> = images.iter().map(|image| image.name.as_str()).collect();
    ensure!(names == ["job-2.png", "job-3.webp", "job-1.jpg"], "got {names:?}");
    ensure!(
        images.first().map(|image| image.url.as_str())
            == Some("/media/results/room-lobby/job-2.png")
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn gallery_of_room_without_results_is_empty() -> eyre::Result<()> {
    let booth = booth()?;
    booth.room_with_prompt("lobby").await?;

    let images = booth.gallery.list("lobby").await?;

    ensure!(images.is_empty());
    ensure!(!booth.path("results/room-lobby").exists());
    Ok(())
}

#[rstest]
#[case::unknown("atrium")]
#[case::inactive("cellar")]
#[tokio::test(flavor = "multi_thread")]
async fn gallery_requires_an_active_room(#[case] slug: &str) -> eyre::Result<()> {
    let booth = booth()?;
    booth
        .catalog()
        .register_room(RegisterRoomRequest::new("cellar", "Cellar", "vendor/booth-model").inactive())
        .await?;
    booth.seed_file("results/room-cellar/job-1.jpg", b"jpeg", Utc::now())?;

    let listed = booth.gallery.list(slug).await;

    ensure!(matches!(
        listed,
        Err(GalleryServiceError::Catalog(CatalogServiceError::RoomNotFound(_)))
    ));
    Ok(())
}
