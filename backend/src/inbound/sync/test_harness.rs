//! Shared wiring for the polling view tests.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};

use super::{PollIntervals, SyncPorts};
use crate::domain::ports::AccountCommand;
use crate::domain::{
    AccountService, ChatListService, MessagingService, Registration, Session,
};
use crate::outbound::persistence::{KeyValueMessageRepository, KeyValueUserRepository};
use crate::outbound::storage::InMemoryKeyValueStore;
use crate::test_support::{ManualScheduler, MutableClock};

pub(super) const THREAD: Duration = Duration::from_millis(1000);
pub(super) const CHAT_LIST: Duration = Duration::from_millis(3000);

type Users = KeyValueUserRepository<InMemoryKeyValueStore>;
type Messages = KeyValueMessageRepository<InMemoryKeyValueStore>;

pub(super) struct Harness {
    pub scheduler: Arc<ManualScheduler>,
    pub clock: Arc<MutableClock>,
    pub accounts: Arc<AccountService<Users>>,
    pub messaging: Arc<MessagingService<Messages>>,
    pub ports: SyncPorts,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryKeyValueStore::new());
        let users = Arc::new(KeyValueUserRepository::new(Arc::clone(&store)));
        let messages = Arc::new(KeyValueMessageRepository::new(Arc::clone(&store)));
        let start = Utc
            .with_ymd_and_hms(2024, 5, 1, 9, 0, 0)
            .single()
            .expect("valid start");
        let clock = Arc::new(MutableClock::new(start));
        let scheduler = Arc::new(ManualScheduler::new());
        let accounts = Arc::new(AccountService::new(Arc::clone(&users)));
        let messaging = Arc::new(MessagingService::new(Arc::clone(&messages), clock.clone()));
        let chats = Arc::new(ChatListService::new(users, messages));
        let ports = SyncPorts {
            messages: messaging.clone(),
            sender: messaging.clone(),
            chats,
            scheduler: scheduler.clone(),
            intervals: PollIntervals {
                thread: THREAD,
                chat_list: CHAT_LIST,
            },
        };
        Self {
            scheduler,
            clock,
            accounts,
            messaging,
            ports,
        }
    }

    pub async fn register(&self, name: &str) -> Session {
        let registration =
            Registration::try_from_parts(name, &format!("{name}@x.com"), "secret1")
                .expect("valid registration");
        let user = self
            .accounts
            .register(&registration)
            .await
            .expect("registration succeeds");
        Session::new(user)
    }

    /// Advance both logical clocks together.
    pub async fn advance(&self, by: Duration) {
        self.clock.advance(by);
        self.scheduler.advance(by).await;
    }
}
