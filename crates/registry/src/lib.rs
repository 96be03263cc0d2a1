//! In-memory registry of ephemeral voice rooms.
//!
//! Tracks which user owns which provisioned room and when a room should be
//! auto-removed. Nothing in this crate touches the platform: timestamps and
//! occupancy probes are passed in by the caller, which keeps the reap pass
//! pure and unit-testable without a live gateway.

pub mod error;
pub mod registry;
pub mod types;

pub use {
    error::{Error, Result},
    registry::{SharedRegistry, TempChannelRegistry},
    types::{ChannelId, GuildId, TempChannel, UserId},
};
