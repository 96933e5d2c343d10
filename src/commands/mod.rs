//! # Command System
//!
//! Slash command (/) handling for Discord interactions.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

pub mod context;
pub mod slash;
pub mod vps;

pub use context::CommandContext;
pub use slash::{
    create_slash_commands, get_integer_option, get_string_option, register_global_commands,
    register_guild_commands,
};
pub use vps::VpsHandler;
