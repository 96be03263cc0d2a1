//! Discord integration for tempvox.
//!
//! Implements the serenity `EventHandler` to receive ready, voice-state, and
//! interaction events, and backs the `VoiceGateway` trait with serenity's
//! HTTP client and cache.

pub mod bot;
pub mod commands;
pub mod gateway;
pub mod handler;

pub use {bot::run_bot, gateway::SerenityGateway, handler::VoxHandler};
