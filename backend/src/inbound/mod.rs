//! Inbound adapters that drive the domain on behalf of a client.
//!
//! There is no network transport: [`sync`] is the client-side session and
//! polling layer that keeps local view state close to the stores.

pub mod sync;
