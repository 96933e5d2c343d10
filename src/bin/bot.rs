use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info, warn};
use serenity::async_trait;
use serenity::model::application::interaction::Interaction;
use serenity::model::channel::Reaction;
use serenity::model::gateway::Ready;
use serenity::model::id::GuildId;
use serenity::prelude::*;
use std::sync::Arc;

use renewbot::commands::{
    register_global_commands, register_guild_commands, CommandContext, VpsHandler,
};
use renewbot::core::Config;
use renewbot::features::reminders::{
    Acknowledged, JsonReminderStore, ReminderScheduler, ReminderService, ReminderStore,
};

struct Handler {
    command_context: Arc<CommandContext>,
    vps_handler: VpsHandler,
    service: Arc<ReminderService>,
    guild_id: Option<GuildId>,
}

impl Handler {
    fn new(
        command_context: Arc<CommandContext>,
        service: Arc<ReminderService>,
        guild_id: Option<GuildId>,
    ) -> Self {
        Handler {
            command_context,
            vps_handler: VpsHandler,
            service,
            guild_id,
        }
    }

    /// Best-effort confirmation on the acknowledged notification. The
    /// deadline extension is already committed; an edit failure only costs
    /// the user the visual confirmation.
    async fn annotate_acknowledged(&self, ctx: &Context, reaction: &Reaction, ack: &Acknowledged) {
        let mut message = match reaction.message(&ctx.http).await {
            Ok(message) => message,
            Err(e) => {
                warn!(
                    "Could not fetch acknowledged reminder message {}: {e}",
                    reaction.message_id
                );
                return;
            }
        };

        let confirmation = format!(
            "\n✅ Renewal confirmed. **Next renewal date** {}",
            ack.new_deadline
        );
        if message.content.contains("Renewal confirmed") {
            return;
        }

        let updated = format!("{}{confirmation}", message.content);
        if let Err(e) = message.edit(&ctx, |m| m.content(updated)).await {
            warn!(
                "Could not annotate acknowledged reminder message {}: {e}",
                reaction.message_id
            );
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("🤖 Bot ID: {}", ready.user.id);
        info!("📡 Connected to {} guilds", ready.guilds.len());

        // Guild commands for development (instant), global for production
        if let Some(guild_id) = self.guild_id {
            info!("🔧 Development mode: Registering commands for guild {guild_id}");
            if let Err(e) = register_guild_commands(&ctx, guild_id).await {
                error!("❌ Failed to register guild slash commands: {e}");
            }
        } else {
            info!("🌍 Production mode: Registering commands globally");
            if let Err(e) = register_global_commands(&ctx).await {
                error!("❌ Failed to register global slash commands: {e}");
            }
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::ApplicationCommand(command) = interaction {
            if command.data.name != "vps" {
                return;
            }

            if let Err(e) = self
                .vps_handler
                .handle(&self.command_context, &ctx, &command)
                .await
            {
                error!("Error handling /vps command: {e:#}");
                let _ = command
                    .create_interaction_response(&ctx.http, |response| {
                        response
                            .kind(serenity::model::application::interaction::InteractionResponseType::ChannelMessageWithSource)
                            .interaction_response_data(|message| {
                                message.content(
                                    "❌ Sorry, I encountered an error processing your command. Please try again.",
                                )
                            })
                    })
                    .await;
            }
        }
    }

    async fn reaction_add(&self, ctx: Context, reaction: Reaction) {
        let Some(user_id) = reaction.user_id else {
            return;
        };

        // The bot's own reactions never acknowledge anything
        if user_id == ctx.cache.current_user_id() {
            return;
        }

        let message_id = reaction.message_id.to_string();
        match self
            .service
            .acknowledge(&user_id.to_string(), &message_id)
            .await
        {
            Ok(Some(ack)) => {
                info!(
                    "User {user_id} acknowledged reminder message {message_id}, next deadline {}",
                    ack.new_deadline
                );
                self.annotate_acknowledged(&ctx, &reaction, &ack).await;
            }
            // Unrelated reactions are expected and ignored
            Ok(None) => {}
            Err(e) => {
                error!("Failed to process acknowledgment from user {user_id}: {e:#}");
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting renewal reminder bot...");

    let store = JsonReminderStore::new(&config.data_file);

    // Distinguish first run (no file) from unreadable data before anything
    // overwrites it
    if let Err(e) = store.load().await {
        error!("Reminder data file {} is unreadable: {e:#}", config.data_file);
        error!("Continuing with an empty reminder set; the file will be overwritten on the next save");
    }

    let service = Arc::new(ReminderService::new(Arc::new(store)));
    let command_context = Arc::new(CommandContext::new(service.clone()));

    // Parse guild ID if provided for development mode
    let guild_id = config
        .discord_guild_id
        .as_ref()
        .and_then(|id| id.parse::<u64>().ok())
        .map(GuildId);

    let handler = Handler::new(command_context, service.clone(), guild_id);

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::DIRECT_MESSAGE_REACTIONS;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    info!("Bot configured successfully. Connecting to Discord gateway...");

    // Start the hourly reminder sweep
    let scheduler = ReminderScheduler::new(service, config.reminder_days_before);
    let http = client.cache_and_http.http.clone();
    tokio::spawn(async move {
        scheduler.run(http).await;
    });

    if let Err(why) = client.start().await {
        error!("Gateway connection failed: {why:?}");
        return Err(anyhow::anyhow!(
            "Failed to establish gateway connection: {}",
            why
        ));
    }

    Ok(())
}
