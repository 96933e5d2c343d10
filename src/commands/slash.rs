//! # Slash Commands (/)
//!
//! Definition and registration of the `/vps` command group, plus option
//! extraction helpers.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

use anyhow::Result;
use log::info;
use serenity::builder::CreateApplicationCommand;
use serenity::model::application::command::{Command, CommandOptionType};
use serenity::model::application::interaction::application_command::CommandDataOption;
use serenity::model::id::GuildId;
use serenity::prelude::Context;

/// Longest accepted renewal period, in days (100 years).
pub const MAX_CONTRACT_DAYS: i64 = 36_500;

/// Largest accepted deadline shift in either direction, in days.
pub const MAX_OFFSET_DAYS: i64 = 36_500;

/// Creates all slash command definitions
pub fn create_slash_commands() -> Vec<CreateApplicationCommand> {
    vec![create_vps_command()]
}

/// Creates the /vps command group: set, show, del, update
fn create_vps_command() -> CreateApplicationCommand {
    CreateApplicationCommand::default()
        .name("vps")
        .description("Manage your VPS renewal reminder")
        .create_option(|option| {
            option
                .name("set")
                .description("Create or replace your renewal reminder")
                .kind(CommandOptionType::SubCommand)
                .create_sub_option(|sub| {
                    sub.name("contract_days")
                        .description("Renewal period in days")
                        .kind(CommandOptionType::Integer)
                        .min_int_value(1)
                        .max_int_value(MAX_CONTRACT_DAYS as u64)
                        .required(true)
                })
                .create_sub_option(|sub| {
                    sub.name("offset")
                        .description("Shift the computed renewal date by this many days")
                        .kind(CommandOptionType::Integer)
                        .required(false)
                })
                .create_sub_option(|sub| {
                    sub.name("next_deadline")
                        .description("Set the next renewal date directly (yyyy-MM-dd)")
                        .kind(CommandOptionType::String)
                        .required(false)
                })
        })
        .create_option(|option| {
            option
                .name("show")
                .description("Show your configured renewal reminder")
                .kind(CommandOptionType::SubCommand)
        })
        .create_option(|option| {
            option
                .name("del")
                .description("Delete your renewal reminder")
                .kind(CommandOptionType::SubCommand)
        })
        .create_option(|option| {
            option
                .name("update")
                .description("Record a manual renewal and extend the deadline")
                .kind(CommandOptionType::SubCommand)
        })
        .to_owned()
}

/// Registers all slash commands globally (production; may take up to an
/// hour to propagate)
pub async fn register_global_commands(ctx: &Context) -> Result<()> {
    let slash_commands = create_slash_commands();
    let count = slash_commands.len();

    Command::set_global_application_commands(&ctx.http, |commands| {
        for command in slash_commands {
            commands.add_application_command(command);
        }
        commands
    })
    .await?;

    info!("Global slash commands registered successfully ({count} commands)");
    Ok(())
}

/// Registers all slash commands for a specific guild (development; instant)
pub async fn register_guild_commands(ctx: &Context, guild_id: GuildId) -> Result<()> {
    let slash_commands = create_slash_commands();
    let count = slash_commands.len();

    guild_id
        .set_application_commands(&ctx.http, |commands| {
            for command in slash_commands {
                commands.add_application_command(command);
            }
            commands
        })
        .await?;

    info!("Guild slash commands registered for guild {guild_id} ({count} commands)");
    Ok(())
}

/// Utility function to get string option from slash command
pub fn get_string_option(options: &[CommandDataOption], name: &str) -> Option<String> {
    options
        .iter()
        .find(|opt| opt.name == name)
        .and_then(|opt| opt.value.as_ref())
        .and_then(|val| val.as_str())
        .map(|s| s.to_string())
}

/// Utility function to get integer option from slash command
pub fn get_integer_option(options: &[CommandDataOption], name: &str) -> Option<i64> {
    options
        .iter()
        .find(|opt| opt.name == name)
        .and_then(|opt| opt.value.as_ref())
        .and_then(|val| val.as_i64())
}
