//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **storage**: key/value stores (in-memory, capability-scoped directory)
//! - **persistence**: users, messages, and session tables serialised as JSON
//!   documents inside a key/value store
//!
//! Adapters are thin translators that convert between domain types and
//! stored representations. They contain no business logic.

pub mod persistence;
pub mod storage;
