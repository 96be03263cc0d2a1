//! The command dispatcher for room owners.
//!
//! Resolves the acting user's room through the registry, routes each
//! recognized operation into a registry mutation plus a gateway call, and
//! hosts the join-to-create provisioning path driven by presence events.
//! Replies and errors are values; the platform layer renders them.

pub mod command;
pub mod error;
pub mod service;

pub use {
    command::{Command, Reply},
    error::{Error, Result},
    service::{CommandService, ProvisionOutcome, SetupNames},
};
