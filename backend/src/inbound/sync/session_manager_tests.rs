//! Tests for the session manager.

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    KeyValueStore, MockAccountCommand, MockLoginService, MockSessionStore, UsersQuery,
};
use crate::domain::{AccountService, ErrorCode};
use crate::outbound::persistence::{KeyValueSessionStore, KeyValueUserRepository, SESSION_KEY};
use crate::outbound::storage::InMemoryKeyValueStore;

type Accounts = AccountService<KeyValueUserRepository<InMemoryKeyValueStore>>;

struct Harness {
    store: Arc<InMemoryKeyValueStore>,
    accounts: Arc<Accounts>,
    manager: SessionManager,
}

#[fixture]
fn harness() -> Harness {
    let store = Arc::new(InMemoryKeyValueStore::new());
    let accounts = Arc::new(AccountService::new(Arc::new(KeyValueUserRepository::new(
        Arc::clone(&store),
    ))));
    let manager = SessionManager::new(
        accounts.clone(),
        accounts.clone(),
        Arc::new(KeyValueSessionStore::new(Arc::clone(&store))),
    );
    Harness {
        store,
        accounts,
        manager,
    }
}

const PNG: &str = "data:image/png;base64,iVBORw0KGgo=";

#[rstest]
#[tokio::test]
async fn register_persists_and_restores_session(harness: Harness) {
    let session = harness
        .manager
        .register("alice", "alice@x.com", "secret1")
        .await
        .expect("register");

    let restored = harness.manager.restore().await.expect("restore");
    assert_eq!(restored, Some(session));
}

#[rstest]
#[tokio::test]
async fn login_replaces_stored_session(harness: Harness) {
    harness
        .manager
        .register("alice", "alice@x.com", "secret1")
        .await
        .expect("register alice");
    let bob = harness
        .manager
        .register("bob", "bob@x.com", "secret2")
        .await
        .expect("register bob");
    let alice = harness
        .manager
        .login("alice@x.com", "secret1")
        .await
        .expect("login");

    assert_ne!(alice, bob);
    assert_eq!(harness.manager.restore().await.expect("restore"), Some(alice));
}

#[rstest]
#[case("", "secret1", ErrorCode::InvalidRequest)]
#[case("alice@x.com", "wrong", ErrorCode::InvalidCredentials)]
#[case("nouser@x.com", "anything", ErrorCode::InvalidCredentials)]
#[tokio::test]
async fn failed_login_leaves_no_session(
    harness: Harness,
    #[case] email: &str,
    #[case] password: &str,
    #[case] expected: ErrorCode,
) {
    harness
        .manager
        .register("alice", "alice@x.com", "secret1")
        .await
        .expect("register");
    harness.store.remove(SESSION_KEY).await.expect("forget session");

    let err = harness
        .manager
        .login(email, password)
        .await
        .expect_err("login must fail");
    assert_eq!(err.code(), expected);
    assert_eq!(harness.manager.restore().await.expect("restore"), None);
}

#[rstest]
#[tokio::test]
async fn register_rejects_short_passwords(harness: Harness) {
    let err = harness
        .manager
        .register("alice", "alice@x.com", "12345")
        .await
        .expect_err("short password");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn logout_clears_stored_session(harness: Harness) {
    let session = harness
        .manager
        .register("alice", "alice@x.com", "secret1")
        .await
        .expect("register");
    harness.manager.logout(session).await.expect("logout");
    assert_eq!(harness.manager.restore().await.expect("restore"), None);
}

#[rstest]
#[tokio::test]
async fn corrupt_session_is_discarded_on_restore(harness: Harness) {
    harness
        .store
        .set(SESSION_KEY, "{\"id\":".to_owned())
        .await
        .expect("seed corrupt session");

    assert_eq!(harness.manager.restore().await.expect("restore"), None);
    assert_eq!(harness.store.get(SESSION_KEY).await.expect("get"), None);
}

#[rstest]
#[tokio::test]
async fn rename_trims_and_updates_store_and_session(harness: Harness) {
    let session = harness
        .manager
        .register("alice", "alice@x.com", "secret1")
        .await
        .expect("register");

    let renamed = harness
        .manager
        .rename(&session, "  alicia ")
        .await
        .expect("rename");

    assert_eq!(renamed.user().username().as_ref(), "alicia");
    assert_eq!(renamed.user_id(), session.user_id());
    let stored = harness
        .accounts
        .find_by_id(session.user_id())
        .await
        .expect("stored user");
    assert_eq!(&stored, renamed.user());
    assert_eq!(
        harness.manager.restore().await.expect("restore"),
        Some(renamed)
    );
}

#[rstest]
#[case("   ")]
#[case("alice")]
#[case(" alice ")]
#[tokio::test]
async fn rename_ignores_blank_and_unchanged_names(#[case] name: &str) {
    let store = Arc::new(InMemoryKeyValueStore::new());
    let accounts = AccountService::new(Arc::new(KeyValueUserRepository::new(Arc::clone(&store))));
    let user = accounts
        .register(
            &Registration::try_from_parts("alice", "alice@x.com", "secret1").expect("valid"),
        )
        .await
        .expect("register");
    let session = Session::new(user);

    let mut command = MockAccountCommand::new();
    command.expect_update().never();
    let mut login = MockLoginService::new();
    login.expect_login().never();
    let mut sessions = MockSessionStore::new();
    sessions.expect_save().never();
    sessions.expect_clear().never();
    let manager = SessionManager::new(Arc::new(command), Arc::new(login), Arc::new(sessions));

    let unchanged = manager.rename(&session, name).await.expect("rename");
    assert_eq!(unchanged, session);
}

#[rstest]
#[tokio::test]
async fn change_avatar_accepts_only_images(harness: Harness) {
    let session = harness
        .manager
        .register("alice", "alice@x.com", "secret1")
        .await
        .expect("register");

    let err = harness
        .manager
        .change_avatar(&session, "data:application/pdf;base64,AAAA")
        .await
        .expect_err("not an image");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);

    let updated = harness
        .manager
        .change_avatar(&session, PNG)
        .await
        .expect("image accepted");
    assert_eq!(updated.user().avatar().as_ref(), PNG);
    let stored = harness
        .accounts
        .find_by_id(session.user_id())
        .await
        .expect("stored user");
    assert_eq!(stored.avatar().as_ref(), PNG);
}
