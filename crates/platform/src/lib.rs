//! Collaborator contract for the chat platform.
//!
//! The registry and dispatcher only ever talk to the platform through the
//! [`VoiceGateway`] trait; the concrete client lives in its own crate so the
//! room logic can be exercised against a mock.

pub mod error;
pub mod gateway;

pub use {
    error::{Error, Result},
    gateway::{ChannelProbe, CreateRoom, Principal, RoleId, SetupOutcome, VoiceGateway},
};
