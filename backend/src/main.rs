//! Command-line client: drives the chat backend against a local data
//! directory.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::sync::Arc;

use chat_backend::config::ChatSettings;
use chat_backend::domain::ports::{ChatsQuery, MessageCommand, MessageQuery, UsersQuery};
use chat_backend::domain::{
    AccountService, Chat, ChatListService, Message, MessagingService, Session, User, UserId,
};
use chat_backend::inbound::sync::{
    ChatListView, ConversationView, SessionManager, SyncPorts, TokioScheduler,
};
use chat_backend::outbound::persistence::{
    KeyValueMessageRepository, KeyValueSessionStore, KeyValueUserRepository,
};
use chat_backend::outbound::storage::DirectoryKeyValueStore;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{WrapErr, eyre};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

type Users = KeyValueUserRepository<DirectoryKeyValueStore>;
type Messages = KeyValueMessageRepository<DirectoryKeyValueStore>;

/// `chat-backend` command arguments.
#[derive(Debug, Parser)]
#[command(name = "chat-backend", about = "Local chat accounts and messages", version)]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create an account and sign in as it.
    Register {
        username: String,
        email: String,
        password: String,
    },
    /// Sign in with email and password.
    Login { email: String, password: String },
    /// Forget the stored session.
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Find other users by name, id, or server tag.
    Search { query: String },
    /// Send a message to a user id.
    Send { to: String, text: String },
    /// Print the conversation with a user id.
    History { with: String },
    /// Print the signed-in user's conversations, newest first.
    Chats,
    /// Change the signed-in user's display name.
    Rename { username: String },
    /// Change the signed-in user's profile picture.
    Avatar {
        /// Image data URL, for example `data:image/png;base64,...`.
        #[arg(value_name = "data-url")]
        data_url: String,
    },
    /// Follow the chat list, or one conversation, until interrupted.
    Watch {
        /// User id of the conversation to follow.
        #[arg(long = "with", value_name = "user-id")]
        with: Option<String>,
    },
}

struct App {
    settings: ChatSettings,
    accounts: Arc<AccountService<Users>>,
    messaging: Arc<MessagingService<Messages>>,
    chats: Arc<ChatListService<Users, Messages>>,
    sessions: SessionManager,
}

impl App {
    fn open(settings: ChatSettings) -> color_eyre::Result<Self> {
        let data_dir = settings.data_dir();
        let store = Arc::new(
            DirectoryKeyValueStore::open(&data_dir)
                .wrap_err_with(|| format!("open data directory '{}'", data_dir.display()))?,
        );
        let users = Arc::new(KeyValueUserRepository::new(Arc::clone(&store)));
        let messages = Arc::new(KeyValueMessageRepository::new(Arc::clone(&store)));
        let accounts = Arc::new(AccountService::new(Arc::clone(&users)));
        let messaging = Arc::new(MessagingService::new(
            Arc::clone(&messages),
            Arc::new(DefaultClock),
        ));
        let chats = Arc::new(ChatListService::new(users, messages));
        let sessions = SessionManager::new(
            accounts.clone(),
            accounts.clone(),
            Arc::new(KeyValueSessionStore::new(store)),
        );
        Ok(Self {
            settings,
            accounts,
            messaging,
            chats,
            sessions,
        })
    }

    async fn session(&self) -> color_eyre::Result<Session> {
        self.sessions
            .restore()
            .await?
            .ok_or_else(|| eyre!("not signed in; run `login` or `register` first"))
    }

    fn sync_ports(&self) -> SyncPorts {
        SyncPorts {
            messages: self.messaging.clone(),
            sender: self.messaging.clone(),
            chats: self.chats.clone(),
            scheduler: Arc::new(TokioScheduler::current()),
            intervals: self.settings.poll_intervals(),
        }
    }

    async fn run(&self, command: Command) -> color_eyre::Result<()> {
        match command {
            Command::Register {
                username,
                email,
                password,
            } => {
                let session = self.sessions.register(&username, &email, &password).await?;
                print_user(session.user());
            }
            Command::Login { email, password } => {
                let session = self.sessions.login(&email, &password).await?;
                print_user(session.user());
            }
            Command::Logout => {
                if let Some(session) = self.sessions.restore().await? {
                    self.sessions.logout(session).await?;
                }
            }
            Command::Whoami => print_user(self.session().await?.user()),
            Command::Search { query } => {
                let session = self.session().await?;
                for user in self
                    .accounts
                    .find_by_query(&query, session.user_id())
                    .await?
                {
                    print_user(&user);
                }
            }
            Command::Send { to, text } => {
                let session = self.session().await?;
                let contact = self.contact(&to).await?;
                let message = self
                    .messaging
                    .append(session.user_id(), contact.id(), &text)
                    .await?;
                print_message(&message, &session);
            }
            Command::History { with } => {
                let session = self.session().await?;
                let contact = self.contact(&with).await?;
                for message in self
                    .messaging
                    .history(session.user_id(), contact.id())
                    .await?
                {
                    print_message(&message, &session);
                }
            }
            Command::Chats => {
                let session = self.session().await?;
                for chat in self.chats.chats_for(session.user_id()).await? {
                    print_chat(&chat);
                }
            }
            Command::Rename { username } => {
                let session = self.session().await?;
                let session = self.sessions.rename(&session, &username).await?;
                print_user(session.user());
            }
            Command::Avatar { data_url } => {
                let session = self.session().await?;
                let session = self.sessions.change_avatar(&session, &data_url).await?;
                print_user(session.user());
            }
            Command::Watch { with } => {
                let session = self.session().await?;
                match with {
                    Some(id) => {
                        let contact = self.contact(&id).await?;
                        self.watch_conversation(&session, contact).await?;
                    }
                    None => self.watch_chats(&session).await?,
                }
            }
        }
        Ok(())
    }

    async fn contact(&self, raw: &str) -> color_eyre::Result<User> {
        let id = UserId::new(raw).wrap_err_with(|| format!("invalid user id '{raw}'"))?;
        Ok(self.accounts.find_by_id(&id).await?)
    }

    async fn watch_conversation(&self, session: &Session, contact: User) -> color_eyre::Result<()> {
        let view = ConversationView::open(&self.sync_ports(), session, contact, None).await;
        let mut shown = 0;
        let mut ticks = tokio::time::interval(self.settings.poll_intervals().thread);
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticks.tick() => {
                    let messages = view.messages();
                    for message in messages.iter().skip(shown) {
                        print_message(message, session);
                    }
                    shown = messages.len();
                }
            }
        }
        view.close();
        Ok(())
    }

    async fn watch_chats(&self, session: &Session) -> color_eyre::Result<()> {
        let view = ChatListView::open(&self.sync_ports(), session).await;
        let mut shown: Option<Vec<Chat>> = None;
        let mut ticks = tokio::time::interval(self.settings.poll_intervals().chat_list);
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticks.tick() => {
                    let chats = view.chats();
                    if shown.as_ref() != Some(&chats) {
                        println!("--");
                        chats.iter().for_each(print_chat);
                        shown = Some(chats);
                    }
                }
            }
        }
        view.close();
        Ok(())
    }
}

fn print_user(user: &User) {
    println!(
        "{} {} <{}> [{}]",
        user.id(),
        user.username().as_ref(),
        user.email().as_ref(),
        user.handle()
    );
}

fn print_message(message: &Message, session: &Session) {
    let direction = if message.sender_id() == session.user_id() {
        ">"
    } else {
        "<"
    };
    println!(
        "{} {direction} {}",
        message.timestamp().as_millis(),
        message.text()
    );
}

fn print_chat(chat: &Chat) {
    let preview = chat
        .last_message()
        .map(|message| message.text().to_string())
        .unwrap_or_default();
    println!(
        "{} {}: {preview}",
        chat.contact().id(),
        chat.contact().username().as_ref()
    );
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(std::io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();
    let settings = ChatSettings::load_from_iter([OsString::from("chat-backend")])
        .map_err(|error| eyre!("load configuration: {error}"))?;
    info!(data_dir = %settings.data_dir().display(), "starting");
    let app = App::open(settings)?;
    app.run(args.command).await
}
