//! Submission-to-fetch scenarios across the public API.

use super::helpers::Booth;
use eyre::ensure;
use image::{DynamicImage, ImageFormat, RgbImage};
use photoframe::job::{
    adapters::{
        memory::ScriptedImageTransformer,
        normalizing::{NormalizationSettings, NormalizingTransformer},
    },
    domain::JobStatus,
    ports::ImageTransformError,
    services::{GenerationServiceError, PROMPT_NOT_FOUND_MESSAGE},
};
use rstest::rstest;
use std::io::Cursor;

const RESULT: &[u8] = b"\xFF\xD8\xFFgenerated";
const SOURCE: &[u8] = b"photo-bytes";

fn scripted_booth(transformer: &ScriptedImageTransformer) -> eyre::Result<Booth> {
    Booth::build(
        transformer.clone(),
        &[
            ("PUBLIC_BASE_URL", "https://booth.example"),
            ("RESULT_FORMAT", "jpeg"),
        ],
    )
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn completed_job_serves_result_and_drops_source() -> eyre::Result<()> {
    let transformer = ScriptedImageTransformer::succeeding(RESULT);
    let booth = scripted_booth(&transformer)?;
    let (room, prompt) = booth.room_with_prompt("lobby").await?;

    let created = booth
        .service
        .submit("lobby", prompt.id(), SOURCE.to_vec())
        .await?;
    ensure!(created.status == JobStatus::Processing);
    let source_file = booth.path(format!("source/job-{}.jpg", created.id));
    ensure!(source_file.exists(), "source photo should be stored");

    let job = booth.service.run_generation(created.id).await?;
    ensure!(job.status() == JobStatus::Completed);
    ensure!(job.source_path().is_none());
    ensure!(!source_file.exists(), "source photo should be deleted");
    ensure!(booth
        .path(format!("results/room-lobby/job-{}.jpg", created.id))
        .exists());

    let calls = transformer.calls()?;
    ensure!(calls.len() == 1);
    ensure!(calls.first().map(|call| call.image.as_slice()) == Some(SOURCE));
    ensure!(calls.first().map(|call| call.model.as_str()) == Some(room.effective_model()));

    let token = job
        .access_token()
        .ok_or_else(|| eyre::eyre!("completed job must carry a token"))?;
    let report = booth.service.status("lobby", created.id).await?;
    let expected_url = format!("https://booth.example/qr/{token}");
    ensure!(report.result_url.as_deref() == Some(expected_url.as_str()));
    ensure!(report.download_url == report.result_url);
    let expected_qr = format!("https://booth.example/api/jobs/{}/qr", created.id);
    ensure!(report.qr_url.as_deref() == Some(expected_qr.as_str()));
    let qr = booth.service.qr_code("lobby", created.id).await?;
    ensure!(image::guess_format(&qr)? == ImageFormat::Png);

    let download = booth.service.fetch_result(token.as_str()).await?;
    ensure!(download.bytes == RESULT);
    ensure!(download.media_type == "image/jpeg");
    ensure!(download.filename == format!("photoframe-{}.jpg", created.id));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn upstream_failure_is_recorded_verbatim() -> eyre::Result<()> {
    let transformer =
        ScriptedImageTransformer::failing(ImageTransformError::Upstream("quota exceeded".into()));
    let booth = scripted_booth(&transformer)?;
    let (_, prompt) = booth.room_with_prompt("lobby").await?;
    let created = booth
        .service
        .submit("lobby", prompt.id(), SOURCE.to_vec())
        .await?;

    let job = booth.service.run_generation(created.id).await?;

    ensure!(job.status() == JobStatus::Error);
    ensure!(job.error_message() == Some("quota exceeded"));
    ensure!(job.access_token().is_none());
    ensure!(!booth
        .path(format!("source/job-{}.jpg", created.id))
        .exists());
    let report = booth.service.status("lobby", created.id).await?;
    ensure!(report.result_url.is_none());
    ensure!(report.error_message.as_deref() == Some("quota exceeded"));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn prompt_removed_before_execution_fails_without_transform() -> eyre::Result<()> {
    let transformer = ScriptedImageTransformer::succeeding(RESULT);
    let booth = scripted_booth(&transformer)?;
    let (_, prompt) = booth.room_with_prompt("lobby").await?;
    let created = booth
        .service
        .submit("lobby", prompt.id(), SOURCE.to_vec())
        .await?;
    ensure!(booth.catalog_repository.remove_prompt(prompt.id())?);

    let job = booth.service.run_generation(created.id).await?;

    ensure!(job.status() == JobStatus::Error);
    ensure!(job.error_message() == Some(PROMPT_NOT_FOUND_MESSAGE));
    ensure!(transformer.calls()?.is_empty());
    ensure!(!booth
        .path(format!("source/job-{}.jpg", created.id))
        .exists());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn fetch_rejects_unknown_token() -> eyre::Result<()> {
    let transformer = ScriptedImageTransformer::succeeding(RESULT);
    let booth = scripted_booth(&transformer)?;
    let (_, prompt) = booth.room_with_prompt("lobby").await?;
    let created = booth
        .service
        .submit("lobby", prompt.id(), SOURCE.to_vec())
        .await?;
    ensure!(booth.service.get_completed_job(created.id).await?.is_none());

    let unknown = booth.service.fetch_result("0123456789abcdef").await;

    ensure!(matches!(unknown, Err(GenerationServiceError::ResultNotFound)));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn fetch_after_result_swept_is_not_found() -> eyre::Result<()> {
    let transformer = ScriptedImageTransformer::succeeding(RESULT);
    let booth = scripted_booth(&transformer)?;
    let (_, prompt) = booth.room_with_prompt("lobby").await?;
    let created = booth
        .service
        .submit("lobby", prompt.id(), SOURCE.to_vec())
        .await?;
    let job = booth.service.run_generation(created.id).await?;
    let token = job
        .access_token()
        .ok_or_else(|| eyre::eyre!("completed job must carry a token"))?;
    std::fs::remove_file(booth.path(format!("results/room-lobby/job-{}.jpg", created.id)))?;

    let fetched = booth.service.fetch_result(token.as_str()).await;

    ensure!(matches!(fetched, Err(GenerationServiceError::ResultNotFound)));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn default_room_is_created_on_first_submission() -> eyre::Result<()> {
    let transformer = ScriptedImageTransformer::succeeding(RESULT);
    let booth = scripted_booth(&transformer)?;
    let room = booth.catalog().default_room().await?;
    let prompt = booth
        .catalog()
        .add_prompt(
            room.id(),
            photoframe::catalog::services::AddPromptRequest::new("Noir", "Make it noir"),
        )
        .await?;

    let dispatched = booth
        .dispatcher
        .submit_to_default_room(prompt.id(), SOURCE.to_vec())
        .await?;
    dispatched.handle.await?;

    let report = booth.service.default_room_status(dispatched.created.id).await?;
    ensure!(report.status == JobStatus::Completed);
    ensure!(booth
        .path(format!(
            "results/room-{}/job-{}.jpg",
            room.slug().as_str(),
            dispatched.created.id
        ))
        .exists());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn oversized_source_is_downscaled_before_upload() -> eyre::Result<()> {
    let scripted = ScriptedImageTransformer::succeeding(RESULT);
    let transformer =
        NormalizingTransformer::new(scripted.clone(), NormalizationSettings::default());
    let booth = Booth::build(transformer, &[])?;
    let (_, prompt) = booth.room_with_prompt("lobby").await?;
    let mut source = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(RgbImage::new(2400, 1200)).write_to(&mut source, ImageFormat::Png)?;

    let created = booth
        .service
        .submit("lobby", prompt.id(), source.into_inner())
        .await?;
    let job = booth.service.run_generation(created.id).await?;

    ensure!(job.status() == JobStatus::Completed);
    let calls = scripted.calls()?;
    let sent = calls
        .first()
        .ok_or_else(|| eyre::eyre!("transformer was not called"))?;
    ensure!(image::guess_format(&sent.image)? == ImageFormat::Jpeg);
    let uploaded = image::load_from_memory(&sent.image)?;
    ensure!(uploaded.width() == 1280 && uploaded.height() == 640);
    Ok(())
}
