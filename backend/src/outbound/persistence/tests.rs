//! Regression coverage for the table adapters.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    KeyValueStore, KeyValueStoreError, MessageRepository, MessageRepositoryError,
    MockKeyValueStore, SessionStore, UserRepository, UserRepositoryError,
};
use crate::domain::{
    Avatar, Email, MessageDraft, MessageId, MessageTable, MessageText, PasswordCheck, ServerTag,
    Session, Timestamp, User, UserDraft, UserId, Username,
};
use crate::domain::Message;
use crate::outbound::storage::InMemoryKeyValueStore;

fn user(name: &str) -> User {
    let username = Username::new(name).expect("valid username");
    User::new(UserDraft {
        id: UserId::new(format!("{name}-id")).expect("valid id"),
        server_tag: ServerTag::new("2048").expect("valid tag"),
        avatar: Avatar::placeholder(&username),
        email: Email::new(format!("{name}@x.com")).expect("valid email"),
        username,
        password_check: PasswordCheck::derive("secret1"),
    })
}

#[fixture]
fn store() -> Arc<InMemoryKeyValueStore> {
    Arc::new(InMemoryKeyValueStore::new())
}

#[rstest]
#[tokio::test]
async fn users_round_trip_in_order(store: Arc<InMemoryKeyValueStore>) {
    let repo = KeyValueUserRepository::new(Arc::clone(&store));
    assert!(repo.load_all().await.expect("load").is_empty());

    let users = vec![user("bob"), user("alice")];
    repo.save_all(&users).await.expect("save");

    assert_eq!(repo.load_all().await.expect("load"), users);
    let raw = store.get(USERS_KEY).await.expect("get").expect("stored");
    assert!(raw.starts_with('['));
    assert!(raw.contains("\"passwordHash\""));
}

#[rstest]
#[case(USERS_KEY, "{not json")]
#[case(USERS_KEY, "{\"an\":\"object\"}")]
#[case(MESSAGES_KEY, "[1,2,3]")]
#[case(SESSION_KEY, "null-ish")]
#[tokio::test]
async fn corrupt_documents_load_empty_and_are_discarded(
    store: Arc<InMemoryKeyValueStore>,
    #[case] key: &str,
    #[case] corrupt: &str,
) {
    store.set(key, corrupt.to_owned()).await.expect("seed corrupt");

    let users = KeyValueUserRepository::new(Arc::clone(&store));
    let messages = KeyValueMessageRepository::new(Arc::clone(&store));
    let sessions = KeyValueSessionStore::new(Arc::clone(&store));
    assert!(users.load_all().await.expect("users load").is_empty());
    assert!(messages.load().await.expect("messages load").is_empty());
    assert_eq!(sessions.load().await.expect("session load"), None);

    assert_eq!(store.get(key).await.expect("get"), None);
}

#[rstest]
#[tokio::test]
async fn messages_round_trip(store: Arc<InMemoryKeyValueStore>) {
    let repo = KeyValueMessageRepository::new(Arc::clone(&store));
    let mut table = MessageTable::new();
    table.append(Message::new(MessageDraft {
        id: MessageId::new("m1").expect("valid id"),
        sender_id: UserId::new("alice").expect("valid id"),
        receiver_id: UserId::new("bob").expect("valid id"),
        text: MessageText::new("hi").expect("valid text"),
        timestamp: Timestamp::from_millis(10),
    }));

    repo.save(&table).await.expect("save");
    assert_eq!(repo.load().await.expect("load"), table);
    let raw = store.get(MESSAGES_KEY).await.expect("get").expect("stored");
    assert!(raw.starts_with("{\"alice__CHAT_WITH__bob\":["));
}

#[rstest]
#[tokio::test]
async fn session_is_saved_as_bare_user_and_cleared(store: Arc<InMemoryKeyValueStore>) {
    let sessions = KeyValueSessionStore::new(Arc::clone(&store));
    let session = Session::new(user("alice"));

    sessions.save(&session).await.expect("save");
    let raw = store.get(SESSION_KEY).await.expect("get").expect("stored");
    let stored: User = serde_json::from_str(&raw).expect("user document");
    assert_eq!(&stored, session.user());
    assert_eq!(sessions.load().await.expect("load"), Some(session));

    sessions.clear().await.expect("clear");
    assert_eq!(sessions.load().await.expect("load"), None);
}

#[tokio::test]
async fn store_failures_map_to_storage_errors() {
    let mut store = MockKeyValueStore::new();
    store
        .expect_get()
        .returning(|_| Err(KeyValueStoreError::unavailable("offline")));
    let store = Arc::new(store);

    let users = KeyValueUserRepository::new(Arc::clone(&store));
    assert!(matches!(
        users.load_all().await,
        Err(UserRepositoryError::Storage { .. })
    ));
    let messages = KeyValueMessageRepository::new(store);
    assert!(matches!(
        messages.load().await,
        Err(MessageRepositoryError::Storage { .. })
    ));
}
