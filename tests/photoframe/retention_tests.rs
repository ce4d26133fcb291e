//! Result retention sweeps triggered by successful generations.

use super::helpers::Booth;
use chrono::{TimeDelta, Utc};
use eyre::ensure;
use photoframe::{
    artifact::ports::ArtifactStore,
    job::{
        adapters::memory::ScriptedImageTransformer,
        domain::JobStatus,
        ports::ImageTransformError,
    },
};
use rstest::rstest;

const RESULT: &[u8] = b"\xFF\xD8\xFFgenerated";

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn success_sweeps_expired_results_in_every_room() -> eyre::Result<()> {
    let booth = Booth::build(
        ScriptedImageTransformer::succeeding(RESULT),
        &[("RESULT_RETENTION_DAYS", "3")],
    )?;
    let (_, prompt) = booth.room_with_prompt("lobby").await?;
    let now = Utc::now();
    let stale = booth.seed_file("results/room-lobby/job-1.jpg", RESULT, now - TimeDelta::days(4))?;
    let foreign = booth.seed_file("results/room-terrace/job-2.jpg", RESULT, now - TimeDelta::days(10))?;
    let fresh = booth.seed_file("results/room-terrace/job-3.jpg", RESULT, now - TimeDelta::days(2))?;
    let old_source = booth.seed_file("source/job-99.jpg", b"raw", now - TimeDelta::days(30))?;

    let created = booth
        .service
        .submit("lobby", prompt.id(), b"photo".to_vec())
        .await?;
    let job = booth.service.run_generation(created.id).await?;

    ensure!(job.status() == JobStatus::Completed);
    ensure!(!stale.exists(), "expired lobby result should be swept");
    ensure!(!foreign.exists(), "expired results in other rooms should be swept");
    ensure!(fresh.exists());
    ensure!(old_source.exists(), "sweeps only cover results");
    ensure!(booth
        .path(format!("results/room-lobby/job-{}.jpg", created.id))
        .exists());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_generation_leaves_results_untouched() -> eyre::Result<()> {
    let booth = Booth::build(
        ScriptedImageTransformer::failing(ImageTransformError::EmptyResponse),
        &[],
    )?;
    let (_, prompt) = booth.room_with_prompt("lobby").await?;
    let stale = booth.seed_file(
        "results/room-lobby/job-1.jpg",
        RESULT,
        Utc::now() - TimeDelta::days(40),
    )?;

    let created = booth
        .service
        .submit("lobby", prompt.id(), b"photo".to_vec())
        .await?;
    let job = booth.service.run_generation(created.id).await?;

    ensure!(job.status() == JobStatus::Error);
    ensure!(stale.exists(), "only successful generations trigger a sweep");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn direct_prune_reports_counts() -> eyre::Result<()> {
    let booth = Booth::build(ScriptedImageTransformer::succeeding(RESULT), &[])?;
    let now = Utc::now();
    booth.seed_file("results/room-a/job-1.jpg", RESULT, now - TimeDelta::days(8))?;
    booth.seed_file("results/room-b/job-2.png", RESULT, now - TimeDelta::days(9))?;
    booth.seed_file("results/room-b/job-3.png", RESULT, now - TimeDelta::hours(1))?;

    let report = booth.store.prune_results(now).await?;

    ensure!(report.removed == 2);
    ensure!(report.retained == 1);
    ensure!(report.failed == 0);
    Ok(())
}
