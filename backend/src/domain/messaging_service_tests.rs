//! Tests for the messaging service.

use std::sync::Mutex as StdMutex;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::MockMessageRepository;
use crate::domain::{ErrorCode, MessageTable};
use crate::test_support::MutableClock;

#[derive(Default)]
struct InMemoryMessages(StdMutex<MessageTable>);

impl InMemoryMessages {
    fn snapshot(&self) -> MessageTable {
        self.0.lock().expect("messages lock").clone()
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessages {
    async fn load(&self) -> Result<MessageTable, MessageRepositoryError> {
        Ok(self.snapshot())
    }

    async fn save(&self, table: &MessageTable) -> Result<(), MessageRepositoryError> {
        *self.0.lock().expect("messages lock") = table.clone();
        Ok(())
    }
}

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .expect("valid start time")
}

fn user(id: &str) -> UserId {
    UserId::new(id).expect("valid id")
}

struct Harness {
    repo: Arc<InMemoryMessages>,
    clock: Arc<MutableClock>,
    service: MessagingService<InMemoryMessages>,
}

#[fixture]
fn harness() -> Harness {
    let repo = Arc::new(InMemoryMessages::default());
    let clock = Arc::new(MutableClock::new(start()));
    let service = MessagingService::new(Arc::clone(&repo), clock.clone());
    Harness {
        repo,
        clock,
        service,
    }
}

#[rstest]
#[tokio::test]
async fn append_then_history_round_trips(harness: Harness) {
    let (alice, bob) = (user("alice"), user("bob"));
    let sent = harness
        .service
        .append(&alice, &bob, "hi")
        .await
        .expect("append succeeds");

    assert_eq!(sent.sender_id(), &alice);
    assert_eq!(sent.receiver_id(), &bob);
    assert_eq!(sent.text().as_ref(), "hi");
    assert_eq!(sent.timestamp().as_millis(), start().timestamp_millis());

    let history = harness.service.history(&bob, &alice).await.expect("history");
    assert_eq!(history.last(), Some(&sent));
    assert_eq!(history.len(), 1);
}

#[rstest]
#[tokio::test]
async fn history_keeps_append_order(harness: Harness) {
    let (alice, bob) = (user("alice"), user("bob"));
    let mut sent = Vec::new();
    for (index, text) in ["one", "two", "three", "four"].into_iter().enumerate() {
        let (from, to) = if index % 2 == 0 { (&alice, &bob) } else { (&bob, &alice) };
        sent.push(harness.service.append(from, to, text).await.expect("append"));
        harness.clock.advance(Duration::from_millis(5));
    }

    let history = harness.service.history(&alice, &bob).await.expect("history");
    assert_eq!(history, sent);
}

#[rstest]
#[tokio::test]
async fn timestamps_never_go_backwards(harness: Harness) {
    let (alice, bob) = (user("alice"), user("bob"));
    let first = harness.service.append(&alice, &bob, "first").await.expect("append");

    harness.clock.set(start() - chrono::TimeDelta::seconds(30));
    let second = harness.service.append(&bob, &alice, "second").await.expect("append");

    assert_eq!(second.timestamp(), first.timestamp());
}

#[rstest]
#[tokio::test]
async fn unknown_conversation_has_empty_history(harness: Harness) {
    let history = harness
        .service
        .history(&user("alice"), &user("carol"))
        .await
        .expect("history");
    assert!(history.is_empty());
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("\n\t")]
#[tokio::test]
async fn blank_text_is_rejected_without_writing(harness: Harness, #[case] text: &str) {
    let err = harness
        .service
        .append(&user("alice"), &user("bob"), text)
        .await
        .expect_err("blank text");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert!(harness.repo.snapshot().is_empty());
}

#[tokio::test]
async fn storage_failures_surface_as_unavailable() {
    let mut repo = MockMessageRepository::new();
    repo.expect_load()
        .times(1)
        .return_once(|| Ok(MessageTable::new()));
    repo.expect_save()
        .times(1)
        .return_once(|_| Err(MessageRepositoryError::storage("read-only")));

    let service = MessagingService::new(Arc::new(repo), Arc::new(MutableClock::new(start())));
    let err = service
        .append(&user("alice"), &user("bob"), "hi")
        .await
        .expect_err("save fails");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn blank_text_never_touches_storage_or_clock() {
    let mut repo = MockMessageRepository::new();
    repo.expect_load().never();
    repo.expect_save().never();
    let mut clock = mockable::MockClock::new();
    clock.expect_utc().never();
    let service = MessagingService::new(Arc::new(repo), Arc::new(clock));

    let err = service
        .append(&user("alice"), &user("bob"), "\t")
        .await
        .expect_err("blank text");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}
