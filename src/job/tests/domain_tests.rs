//! Tests for job lifecycle transitions and access tokens.

use crate::artifact::domain::ArtifactPath;
use crate::catalog::domain::{PromptId, RoomId};
use crate::job::domain::{
    AccessToken, GenerationJob, JobDomainError, JobId, JobStatus, NewGenerationJob,
    PersistedJobData,
};
use chrono::Utc;
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use std::collections::HashSet;

#[fixture]
fn clock() -> DefaultClock {
    DefaultClock
}

#[fixture]
fn job(clock: DefaultClock) -> GenerationJob {
    let new_job = NewGenerationJob::new(PromptId::new(2), RoomId::new(1), &clock);
    GenerationJob::from_new(JobId::new(5), new_job)
}

fn result_path() -> ArtifactPath {
    ArtifactPath::from_persisted("results/room-main/job-5.jpg")
}

#[rstest]
#[case(JobStatus::Processing, JobStatus::Completed, true)]
#[case(JobStatus::Processing, JobStatus::Error, true)]
#[case(JobStatus::Processing, JobStatus::Processing, false)]
#[case(JobStatus::Completed, JobStatus::Error, false)]
#[case(JobStatus::Error, JobStatus::Completed, false)]
#[case(JobStatus::Error, JobStatus::Processing, false)]
fn status_transitions(#[case] from: JobStatus, #[case] to: JobStatus, #[case] allowed: bool) {
    assert_eq!(from.can_transition_to(to), allowed);
}

#[rstest]
#[case("processing", JobStatus::Processing)]
#[case("Completed", JobStatus::Completed)]
#[case(" error ", JobStatus::Error)]
fn status_parses_storage_values(#[case] raw: &str, #[case] expected: JobStatus) {
    assert_eq!(JobStatus::try_from(raw).expect("known status"), expected);
    assert_eq!(expected.as_str(), raw.trim().to_ascii_lowercase());
}

#[rstest]
fn generated_tokens_are_sixteen_lowercase_hex_characters() {
    let tokens: HashSet<AccessToken> = (0..256).map(|_| AccessToken::generate()).collect();

    assert_eq!(tokens.len(), 256);
    assert!(tokens.iter().all(|token| {
        token.as_str().len() == AccessToken::LENGTH
            && token
                .as_str()
                .chars()
                .all(|ch| ch.is_ascii_digit() || ('a'..='f').contains(&ch))
    }));
}

#[rstest]
fn new_job_is_processing_without_artifacts(job: GenerationJob) {
    assert_eq!(job.status(), JobStatus::Processing);
    assert!(job.access_token().is_none());
    assert!(job.source_path().is_none());
    assert!(job.result_path().is_none());
    assert!(job.error_message().is_none());
    assert_eq!(job.created_at(), job.updated_at());
}

#[rstest]
fn complete_sets_result_and_token(mut job: GenerationJob, clock: DefaultClock) {
    job.attach_source(ArtifactPath::source(job.id()), &clock)
        .expect("attach source");
    let token = AccessToken::from_persisted("0123456789abcdef");

    job.complete(result_path(), token.clone(), &clock)
        .expect("complete");

    assert_eq!(job.status(), JobStatus::Completed);
    assert_eq!(job.access_token(), Some(&token));
    assert_eq!(job.result_path(), Some(&result_path()));
    assert!(job.has_result());
    assert!(job.error_message().is_none());
}

#[rstest]
fn existing_token_is_never_replaced(clock: DefaultClock) {
    let mut job = GenerationJob::from_persisted(PersistedJobData {
        id: JobId::new(9),
        prompt_id: PromptId::new(1),
        room_id: RoomId::new(1),
        status: JobStatus::Processing,
        access_token: Some(AccessToken::from_persisted("aaaaaaaaaaaaaaaa")),
        source_path: None,
        result_path: None,
        error_message: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    });

    job.complete(
        result_path(),
        AccessToken::from_persisted("bbbbbbbbbbbbbbbb"),
        &clock,
    )
    .expect("complete");

    assert_eq!(
        job.access_token().map(AccessToken::as_str),
        Some("aaaaaaaaaaaaaaaa")
    );
}

#[rstest]
fn fail_records_message(mut job: GenerationJob, clock: DefaultClock) {
    job.fail("quota exceeded", &clock).expect("fail");

    assert_eq!(job.status(), JobStatus::Error);
    assert_eq!(job.error_message(), Some("quota exceeded"));
    assert!(job.result_path().is_none());
    assert!(job.access_token().is_none());
    assert!(!job.has_result());
}

#[rstest]
fn terminal_jobs_reject_further_transitions(mut job: GenerationJob, clock: DefaultClock) {
    job.fail("boom", &clock).expect("fail");

    let complete = job.complete(result_path(), AccessToken::generate(), &clock);
    let fail_again = job.fail("again", &clock);
    let attach = job.attach_source(ArtifactPath::source(job.id()), &clock);

    assert_eq!(
        complete,
        Err(JobDomainError::InvalidTransition {
            job_id: job.id(),
            from: JobStatus::Error,
            to: JobStatus::Completed,
        })
    );
    assert!(matches!(
        fail_again,
        Err(JobDomainError::InvalidTransition { .. })
    ));
    assert_eq!(attach, Err(JobDomainError::SourceNotAccepted(job.id())));
    assert_eq!(job.error_message(), Some("boom"));
}

#[rstest]
fn source_is_released_once(mut job: GenerationJob, clock: DefaultClock) {
    let source = ArtifactPath::source(job.id());
    job.attach_source(source.clone(), &clock).expect("attach");

    assert_eq!(job.release_source(&clock), Some(source));
    assert_eq!(job.release_source(&clock), None);
    assert!(job.source_path().is_none());
}
