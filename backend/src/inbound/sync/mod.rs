//! Session and polling layer.
//!
//! Writes go straight to the stores; reads come back on a timer. Local view
//! state is reconciled with each fetched snapshot using simple replace
//! rules rather than diffs:
//!
//! - [`ConversationView`] takes a fetched history only when it is at least
//!   as long as what it already shows, so a slow poll never hides a message
//!   that was just sent. A shorter authoritative history is never applied.
//! - [`ChatListView`] takes a polled list only when the count changes or the
//!   first entry's newest message changes. Same-length edits go unnoticed
//!   until a forced refresh.
//!
//! Every schedule is owned by a [`PollHandle`]; closing or dropping a view
//! cancels it, and a closed view ignores fetches that finish afterwards.

mod chat_list;
mod conversation;
mod ports;
mod scheduler;
mod session_manager;
#[cfg(test)]
mod test_harness;

pub use chat_list::{ChatListRefresher, ChatListView};
pub use conversation::ConversationView;
pub use ports::{PollIntervals, SyncPorts};
pub use scheduler::{PollHandle, PollTask, Scheduler, TokioScheduler};
pub use session_manager::SessionManager;
