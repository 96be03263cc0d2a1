//! Periodic maintenance for provisioned rooms.
//!
//! A fixed-interval task probes every registered room at the platform, feeds
//! the results into the registry's reap pass, and deletes the removal set
//! with audit reasons. The loop runs under a `CancellationToken` so the host
//! process controls cadence and shutdown.

pub mod service;

pub use service::Reaper;
