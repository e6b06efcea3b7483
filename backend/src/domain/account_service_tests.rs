//! Tests for the account service.

use std::sync::Mutex as StdMutex;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::MockUserRepository;

#[derive(Default)]
struct InMemoryUsers(StdMutex<Vec<User>>);

impl InMemoryUsers {
    fn snapshot(&self) -> Vec<User> {
        self.0.lock().expect("users lock").clone()
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn load_all(&self) -> Result<Vec<User>, UserRepositoryError> {
        Ok(self.snapshot())
    }

    async fn save_all(&self, users: &[User]) -> Result<(), UserRepositoryError> {
        *self.0.lock().expect("users lock") = users.to_vec();
        Ok(())
    }
}

fn registration(username: &str, email: &str, password: &str) -> Registration {
    Registration::try_from_parts(username, email, password).expect("valid registration")
}

fn credentials(email: &str, password: &str) -> LoginCredentials {
    LoginCredentials::try_from_parts(email, password).expect("credential shape")
}

#[fixture]
fn repo() -> Arc<InMemoryUsers> {
    Arc::new(InMemoryUsers::default())
}

async fn seeded(repo: &Arc<InMemoryUsers>) -> (AccountService<InMemoryUsers>, User, User) {
    let service = AccountService::new(Arc::clone(repo));
    let alice = service
        .register(&registration("alice", "alice@x.com", "secret1"))
        .await
        .expect("alice registers");
    let bob = service
        .register(&registration("bob", "bob@x.com", "secret2"))
        .await
        .expect("bob registers");
    (service, alice, bob)
}

#[rstest]
#[tokio::test]
async fn register_assigns_identity_and_defaults(repo: Arc<InMemoryUsers>) {
    let service = AccountService::new(Arc::clone(&repo));
    let user = service
        .register(&registration("alice", "alice@x.com", "secret1"))
        .await
        .expect("registration succeeds");

    assert_eq!(user.username().as_ref(), "alice");
    assert_eq!(user.avatar().as_ref(), "https://picsum.photos/seed/alice/200");
    assert_eq!(user.server_tag().as_ref().len(), 4);
    assert!(user.password_check().matches("secret1"));
    assert_eq!(repo.snapshot(), vec![user]);
}

#[rstest]
#[case("alice", "alice@x.com")]
#[case("ALICE", "other@x.com")]
#[case("someone", "alice@x.com")]
#[tokio::test]
async fn register_rejects_duplicates_without_writing(
    repo: Arc<InMemoryUsers>,
    #[case] username: &str,
    #[case] email: &str,
) {
    let (service, _, _) = seeded(&repo).await;
    let before = repo.snapshot();

    let err = service
        .register(&registration(username, email, "secret9"))
        .await
        .expect_err("duplicate must conflict");

    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(repo.snapshot(), before);
}

#[tokio::test]
async fn conflict_never_saves() {
    let existing = {
        let repo = Arc::new(InMemoryUsers::default());
        let (_, alice, _) = seeded(&repo).await;
        alice
    };
    let mut repo = MockUserRepository::new();
    repo.expect_load_all()
        .times(1)
        .return_once(move || Ok(vec![existing]));
    repo.expect_save_all().never();

    let service = AccountService::new(Arc::new(repo));
    let err = service
        .register(&registration("Alice", "new@x.com", "secret1"))
        .await
        .expect_err("conflict");
    assert_eq!(err.code(), ErrorCode::Conflict);
}

#[rstest]
#[case("alice@x.com", "secret1", true)]
#[case("alice@x.com", "wrong", false)]
#[case("nouser@x.com", "anything", false)]
#[case("ALICE@x.com", "secret1", false)]
#[tokio::test]
async fn login_requires_exact_email_and_password(
    repo: Arc<InMemoryUsers>,
    #[case] email: &str,
    #[case] password: &str,
    #[case] should_succeed: bool,
) {
    let (service, alice, _) = seeded(&repo).await;
    let result = service.login(&credentials(email, password)).await;
    match (should_succeed, result) {
        (true, Ok(user)) => assert_eq!(user, alice),
        (false, Err(err)) => {
            assert_eq!(err.code(), ErrorCode::InvalidCredentials);
            assert_eq!(err, Error::invalid_credentials());
        }
        (true, Err(err)) => panic!("expected success, got {err:?}"),
        (false, Ok(user)) => panic!("expected failure, got {}", user.id()),
    }
}

#[rstest]
#[tokio::test]
async fn search_matches_username_id_and_tag(repo: Arc<InMemoryUsers>) {
    let (service, alice, bob) = seeded(&repo).await;

    let by_name = service
        .find_by_query("BO", alice.id())
        .await
        .expect("search");
    assert_eq!(by_name, vec![bob.clone()]);

    let by_tag = service
        .find_by_query(bob.server_tag().as_ref(), alice.id())
        .await
        .expect("search");
    assert!(by_tag.contains(&bob));

    let id_fragment = &bob.id().as_str()[..8];
    let by_id = service
        .find_by_query(id_fragment, alice.id())
        .await
        .expect("search");
    assert!(by_id.contains(&bob));
}

#[rstest]
#[tokio::test]
async fn search_excludes_caller_and_keeps_registration_order(repo: Arc<InMemoryUsers>) {
    let (service, alice, bob) = seeded(&repo).await;
    let carol = service
        .register(&registration("carol", "carol@x.com", "secret3"))
        .await
        .expect("carol registers");

    let found = service
        .find_by_query("o", alice.id())
        .await
        .expect("search");
    assert_eq!(found, vec![bob, carol]);

    let blank = service
        .find_by_query("   ", alice.id())
        .await
        .expect("search");
    assert!(blank.is_empty());
}

#[rstest]
#[tokio::test]
async fn find_by_id_reports_missing_users(repo: Arc<InMemoryUsers>) {
    let (service, alice, _) = seeded(&repo).await;
    assert_eq!(service.find_by_id(alice.id()).await.expect("found"), alice);

    let missing = UserId::new("ghost").expect("valid id");
    let err = service.find_by_id(&missing).await.expect_err("missing");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn update_replaces_record_without_uniqueness_check(repo: Arc<InMemoryUsers>) {
    let (service, alice, bob) = seeded(&repo).await;
    let renamed = bob
        .clone()
        .with_username(alice.username().clone());

    service.update(&renamed).await.expect("update succeeds");

    assert_eq!(repo.snapshot(), vec![alice, renamed]);
}

#[rstest]
#[tokio::test]
async fn update_of_unknown_user_is_not_found(repo: Arc<InMemoryUsers>) {
    let (service, alice, _) = seeded(&repo).await;
    let stranger = User::new(UserDraft {
        id: UserId::new("stranger").expect("valid id"),
        server_tag: alice.server_tag().clone(),
        username: alice.username().clone(),
        email: alice.email().clone(),
        password_check: alice.password_check().clone(),
        avatar: alice.avatar().clone(),
    });
    let err = service.update(&stranger).await.expect_err("unknown id");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(repo.snapshot().len(), 2);
}

#[rstest]
#[case(UserRepositoryError::storage("disk gone"), ErrorCode::ServiceUnavailable)]
#[case(UserRepositoryError::encoding("bad table"), ErrorCode::InternalError)]
#[tokio::test]
async fn repository_errors_are_mapped(
    #[case] failure: UserRepositoryError,
    #[case] expected: ErrorCode,
) {
    let mut repo = MockUserRepository::new();
    repo.expect_load_all().return_once(move || Err(failure));

    let service = AccountService::new(Arc::new(repo));
    let err = service
        .login(&credentials("alice@x.com", "secret1"))
        .await
        .expect_err("load fails");
    assert_eq!(err.code(), expected);
}
