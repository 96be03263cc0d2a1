//! Configuration schema and loading for tempvox.
//!
//! Config files: `tempvox.toml`, `tempvox.yaml`, or `tempvox.json`, searched
//! in `./` then `~/.config/tempvox/`. String values support `${VAR}`
//! environment substitution so secrets stay out of the file.

pub mod env_subst;
pub mod loader;
pub mod schema;

pub use {
    loader::{discover_and_load, load_config},
    schema::{DiscordConfig, ReaperConfig, ServerConfig, TempvoxConfig},
};
