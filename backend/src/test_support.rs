//! Test utilities for the backend crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled for tests and when the `test-support` feature is enabled.

mod clock;
mod scheduler;

pub use clock::MutableClock;
pub use scheduler::ManualScheduler;
