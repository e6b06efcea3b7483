//! Chat backend library modules.
//!
//! The crate is a hexagonal modular monolith: `domain` owns the value types,
//! services, and ports; `outbound` holds driven adapters (key/value stores
//! and table serialisation); `inbound` holds the session and polling layer
//! that drives the domain on behalf of a client.

pub mod config;
pub mod domain;
pub mod inbound;
pub mod outbound;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
