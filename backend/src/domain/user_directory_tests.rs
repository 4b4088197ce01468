//! Tests for the user directory service.

use std::sync::Arc;

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::MockUserRepository;
use crate::domain::{AddressDraft, ErrorCode, UserDraft};

fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 2, 24, 10, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

fn clock_at(utc_now: DateTime<Utc>) -> Arc<dyn Clock> {
    Arc::new(FixtureClock { utc_now })
}

fn make_service(repo: MockUserRepository) -> UserDirectoryService<MockUserRepository> {
    UserDirectoryService::new(Arc::new(repo), clock_at(fixture_timestamp()))
}

fn details_named(first_name: &str) -> UserDetails {
    UserDetails::try_from_draft(UserDraft {
        user_type: Some(1),
        first_name: Some(first_name.to_owned()),
        last_name: Some("Kennedy".to_owned()),
        email: Some("bill@ardanlabs.com".to_owned()),
        company: None,
        addresses: vec![AddressDraft {
            address_type: Some(1),
            city: Some("Miami".to_owned()),
            state: Some("FL".to_owned()),
            zipcode: Some("33172".to_owned()),
            ..AddressDraft::default()
        }],
    })
    .expect("valid details")
}

#[fixture]
fn trace_id() -> TraceId {
    TraceId::generate()
}

#[fixture]
fn stored_user() -> User {
    User::register(
        UserId::random(),
        details_named("Bill"),
        fixture_timestamp() - Duration::days(1),
    )
}

#[rstest]
#[tokio::test]
async fn create_assigns_id_and_timestamps(trace_id: TraceId) {
    let mut repo = MockUserRepository::new();
    repo.expect_insert()
        .withf(|user| user.first_name().as_ref() == "Bill")
        .times(1)
        .return_once(|_| Ok(()));

    let service = make_service(repo);
    let user = service
        .create(&trace_id, details_named("Bill"))
        .await
        .expect("user created");

    assert_eq!(user.timestamps().created, fixture_timestamp());
    assert_eq!(user.timestamps().modified, fixture_timestamp());
    assert_eq!(user.details(), details_named("Bill"));
}

#[rstest]
#[tokio::test]
async fn timestamps_are_truncated_to_microseconds(trace_id: TraceId, stored_user: User) {
    let precise = fixture_timestamp() + Duration::nanoseconds(123_456_789);
    let expected = fixture_timestamp() + Duration::microseconds(123_456);
    let mut repo = MockUserRepository::new();
    repo.expect_insert().times(1).return_once(|_| Ok(()));
    let existing = stored_user.clone();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(existing)));
    repo.expect_replace().times(1).return_once(|_| Ok(true));
    let service = UserDirectoryService::new(Arc::new(repo), clock_at(precise));

    let created = service
        .create(&trace_id, details_named("Bill"))
        .await
        .expect("user created");
    let revised = service
        .update(&trace_id, stored_user.id(), details_named("William"))
        .await
        .expect("user updated");

    assert_eq!(created.timestamps().created, expected);
    assert_eq!(created.addresses()[0].timestamps().created, expected);
    assert_eq!(revised.timestamps().modified, expected);
    assert_eq!(revised.addresses()[0].timestamps().modified, expected);
}

#[rstest]
#[tokio::test]
async fn create_maps_persistence_failure_to_internal(trace_id: TraceId) {
    let mut repo = MockUserRepository::new();
    repo.expect_insert()
        .times(1)
        .return_once(|_| Err(UserPersistenceError::connection("refused")));

    let service = make_service(repo);
    let error = service
        .create(&trace_id, details_named("Bill"))
        .await
        .expect_err("insert fails");

    assert_eq!(error.code(), ErrorCode::InternalError);
}

#[rstest]
#[tokio::test]
async fn list_returns_repository_order(trace_id: TraceId, stored_user: User) {
    let expected = vec![stored_user.clone()];
    let mut repo = MockUserRepository::new();
    repo.expect_list()
        .times(1)
        .return_once(move || Ok(vec![stored_user]));

    let service = make_service(repo);
    let users = service.list(&trace_id).await.expect("list succeeds");

    assert_eq!(users, expected);
}

#[rstest]
#[tokio::test]
async fn list_maps_query_failure_to_internal(trace_id: TraceId) {
    let mut repo = MockUserRepository::new();
    repo.expect_list()
        .times(1)
        .return_once(|| Err(UserPersistenceError::query("syntax error")));

    let service = make_service(repo);
    let error = service.list(&trace_id).await.expect_err("list fails");

    assert_eq!(error.code(), ErrorCode::InternalError);
}

#[rstest]
#[tokio::test]
async fn retrieve_reports_missing_user_as_not_found(trace_id: TraceId) {
    let id = UserId::random();
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(|_| Ok(None));

    let service = make_service(repo);
    let error = service
        .retrieve(&trace_id, &id)
        .await
        .expect_err("missing user");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(
        error.details(),
        Some(&serde_json::json!({ "userId": id.to_string() }))
    );
}

#[rstest]
#[tokio::test]
async fn update_keeps_creation_time(trace_id: TraceId, stored_user: User) {
    let id = *stored_user.id();
    let created = stored_user.timestamps().created;
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .withf(move |candidate| *candidate == id)
        .times(1)
        .return_once(move |_| Ok(Some(stored_user)));
    repo.expect_replace()
        .withf(|user| user.first_name().as_ref() == "William")
        .times(1)
        .return_once(|_| Ok(true));

    let service = make_service(repo);
    let user = service
        .update(&trace_id, &id, details_named("William"))
        .await
        .expect("update succeeds");

    assert_eq!(user.id(), &id);
    assert_eq!(user.timestamps().created, created);
    assert_eq!(user.timestamps().modified, fixture_timestamp());
}

#[rstest]
#[tokio::test]
async fn update_of_unknown_user_never_writes(trace_id: TraceId) {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(|_| Ok(None));
    repo.expect_replace().never();

    let service = make_service(repo);
    let error = service
        .update(&trace_id, &UserId::random(), details_named("William"))
        .await
        .expect_err("unknown user");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn update_reports_concurrent_removal_as_not_found(trace_id: TraceId, stored_user: User) {
    let id = *stored_user.id();
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(stored_user)));
    repo.expect_replace().times(1).return_once(|_| Ok(false));

    let service = make_service(repo);
    let error = service
        .update(&trace_id, &id, details_named("William"))
        .await
        .expect_err("record vanished");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn delete_returns_prior_record(trace_id: TraceId, stored_user: User) {
    let id = *stored_user.id();
    let expected = stored_user.clone();
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(stored_user)));
    repo.expect_delete()
        .withf(move |candidate| *candidate == id)
        .times(1)
        .return_once(|_| Ok(true));

    let service = make_service(repo);
    let removed = service.delete(&trace_id, &id).await.expect("delete succeeds");

    assert_eq!(removed, expected);
}

#[rstest]
#[tokio::test]
async fn delete_reports_concurrent_removal_as_not_found(trace_id: TraceId, stored_user: User) {
    let id = *stored_user.id();
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(stored_user)));
    repo.expect_delete().times(1).return_once(|_| Ok(false));

    let service = make_service(repo);
    let error = service
        .delete(&trace_id, &id)
        .await
        .expect_err("record vanished");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn delete_maps_removal_failure_to_internal(trace_id: TraceId, stored_user: User) {
    let id = *stored_user.id();
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(stored_user)));
    repo.expect_delete()
        .times(1)
        .return_once(|_| Err(UserPersistenceError::query("lock timeout")));

    let service = make_service(repo);
    let error = service
        .delete(&trace_id, &id)
        .await
        .expect_err("removal fails");

    assert_eq!(error.code(), ErrorCode::InternalError);
}
