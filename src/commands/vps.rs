//! /vps command handler
//!
//! The command facade over the reminder lifecycle engine. Handles:
//! `/vps set`, `/vps show`, `/vps del`, `/vps update`.

use anyhow::{anyhow, Result};
use chrono::{NaiveDate, Utc};
use log::info;
use serenity::model::application::interaction::application_command::{
    ApplicationCommandInteraction, CommandDataOption,
};
use serenity::model::application::interaction::InteractionResponseType;
use serenity::prelude::Context;

use super::context::CommandContext;
use super::slash::{get_integer_option, get_string_option, MAX_CONTRACT_DAYS, MAX_OFFSET_DAYS};
use crate::features::reminders::model::initial_deadline;

/// Handler for the /vps command group
pub struct VpsHandler;

impl VpsHandler {
    /// Dispatch a /vps interaction to its subcommand handler.
    pub async fn handle(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let sub = command
            .data
            .options
            .first()
            .ok_or_else(|| anyhow!("missing /vps subcommand"))?;

        match sub.name.as_str() {
            "set" => self.handle_set(ctx, serenity_ctx, command, sub).await,
            "show" => self.handle_show(ctx, serenity_ctx, command).await,
            "del" => self.handle_del(ctx, serenity_ctx, command).await,
            "update" => self.handle_update(ctx, serenity_ctx, command).await,
            other => Err(anyhow!("unknown /vps subcommand '{other}'")),
        }
    }

    /// /vps set - create or fully overwrite the caller's reminder
    async fn handle_set(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
        sub: &CommandDataOption,
    ) -> Result<()> {
        let user_id = command.user.id.to_string();
        let channel_id = command.channel_id.to_string();

        let contract_days = get_integer_option(&sub.options, "contract_days")
            .ok_or_else(|| anyhow!("missing contract_days parameter"))?;
        let offset = get_integer_option(&sub.options, "offset").unwrap_or(0);
        let next_deadline = get_string_option(&sub.options, "next_deadline");

        // Validation happens before any state is touched. Discord enforces
        // the bounds on contract_days, but the values are re-checked here
        // so the service never sees a period it cannot add to a date.
        if !(1..=MAX_CONTRACT_DAYS).contains(&contract_days) {
            return respond(
                serenity_ctx,
                command,
                &format!("⚠️ `contract_days` must be between 1 and {MAX_CONTRACT_DAYS}."),
            )
            .await;
        }
        if offset.abs() > MAX_OFFSET_DAYS {
            return respond(
                serenity_ctx,
                command,
                &format!("⚠️ `offset` must be between -{MAX_OFFSET_DAYS} and {MAX_OFFSET_DAYS}."),
            )
            .await;
        }

        let deadline_date = match next_deadline {
            Some(raw) => match raw.parse::<NaiveDate>() {
                Ok(date) => date,
                Err(_) => {
                    return respond(
                        serenity_ctx,
                        command,
                        "⚠️ Invalid date. Please use the yyyy-MM-dd format.",
                    )
                    .await;
                }
            },
            None => match initial_deadline(Utc::now().date_naive(), contract_days, offset) {
                Some(date) => date,
                None => {
                    return respond(
                        serenity_ctx,
                        command,
                        "⚠️ The computed renewal date is out of range.",
                    )
                    .await;
                }
            },
        };

        let reminder = ctx
            .service
            .create(&user_id, Some(channel_id), contract_days, deadline_date)
            .await?;

        info!(
            "Reminder set for user {user_id}: every {contract_days} day(s), next deadline {}",
            reminder.deadline_date
        );

        respond(
            serenity_ctx,
            command,
            &format!(
                "Reminder set.\n**Next renewal date** {}",
                reminder.deadline_date
            ),
        )
        .await
    }

    /// /vps show - display the caller's reminder
    async fn handle_show(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let user_id = command.user.id.to_string();

        match ctx.service.get(&user_id).await {
            Some(reminder) => {
                respond(
                    serenity_ctx,
                    command,
                    &format!(
                        "**Next renewal date** {}\n**Renewal period** {} day(s)",
                        reminder.deadline_date, reminder.contract_days
                    ),
                )
                .await
            }
            None => respond(serenity_ctx, command, "No reminder is configured.").await,
        }
    }

    /// /vps del - remove the caller's reminder
    async fn handle_del(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let user_id = command.user.id.to_string();

        if ctx.service.delete(&user_id).await? {
            info!("Reminder deleted for user {user_id}");
            respond(serenity_ctx, command, "Reminder deleted.").await
        } else {
            respond(serenity_ctx, command, "No reminder is configured.").await
        }
    }

    /// /vps update - manual renewal without reacting to a notification
    async fn handle_update(
        &self,
        ctx: &CommandContext,
        serenity_ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let user_id = command.user.id.to_string();

        match ctx.service.advance(&user_id).await? {
            Some(new_deadline) => {
                info!("Manual renewal recorded for user {user_id}, next deadline {new_deadline}");
                respond(
                    serenity_ctx,
                    command,
                    &format!("Renewal recorded.\n**Next renewal date** {new_deadline}"),
                )
                .await
            }
            None => respond(serenity_ctx, command, "No reminder is configured.").await,
        }
    }
}

/// Reply to the interaction with a plain message.
async fn respond(
    serenity_ctx: &Context,
    command: &ApplicationCommandInteraction,
    content: &str,
) -> Result<()> {
    command
        .create_interaction_response(&serenity_ctx.http, |response| {
            response
                .kind(InteractionResponseType::ChannelMessageWithSource)
                .interaction_response_data(|msg| msg.content(content))
        })
        .await?;
    Ok(())
}
