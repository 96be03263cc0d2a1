//! Discord event handler for serenity.
//!
//! Three events drive the whole bot: `ready` registers the slash commands
//! and starts the reaper, `voice_state_update` provisions rooms, and
//! `interaction_create` routes owner commands.

use std::sync::{
    Arc, OnceLock,
    atomic::{AtomicBool, Ordering},
};

use {
    serenity::{
        all::{
            Context, CreateInteractionResponse, CreateInteractionResponseFollowup,
            CreateInteractionResponseMessage, EventHandler, GatewayIntents, Interaction, Ready,
            VoiceState,
        },
        async_trait,
    },
    tokio_util::sync::CancellationToken,
    tracing::{debug, error, info, warn},
};

use {
    tempvox_commands::{Command, CommandService, SetupNames},
    tempvox_config::{DiscordConfig, ReaperConfig},
    tempvox_reaper::Reaper,
    tempvox_registry::SharedRegistry,
};

use crate::{commands, gateway::SerenityGateway};

/// Handler for Discord gateway events.
pub struct VoxHandler {
    registry: SharedRegistry,
    config: DiscordConfig,
    reaper: ReaperConfig,
    shutdown: CancellationToken,
    /// Built on first event, once the connection's http/cache handles exist.
    service: OnceLock<Arc<CommandService>>,
    reaper_started: AtomicBool,
}

impl VoxHandler {
    pub fn new(
        registry: SharedRegistry,
        config: DiscordConfig,
        reaper: ReaperConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            registry,
            config,
            reaper,
            shutdown,
            service: OnceLock::new(),
            reaper_started: AtomicBool::new(false),
        }
    }

    /// Required gateway intents for the bot.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MEMBERS | GatewayIntents::GUILD_VOICE_STATES
    }

    fn service(&self, ctx: &Context) -> Arc<CommandService> {
        Arc::clone(self.service.get_or_init(|| {
            let gateway = Arc::new(SerenityGateway::new(ctx.http.clone(), ctx.cache.clone()));
            Arc::new(
                CommandService::new(Arc::clone(&self.registry), gateway, SetupNames {
                    category_name: self.config.category_name.clone(),
                    join_channel_name: self.config.join_channel_name.clone(),
                })
                .with_max_expiry_minutes(self.reaper.max_expiry_minutes),
            )
        }))
    }
}

#[async_trait]
impl EventHandler for VoxHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(
            bot_name = %ready.user.name,
            guilds = ready.guilds.len(),
            "discord bot ready"
        );
        let _ = self.service(&ctx);

        match commands::register_global(&ctx.http).await {
            Ok(count) => info!(count, "slash commands registered"),
            Err(e) => error!(error = %e, "failed to register slash commands"),
        }

        // Ready fires again on reconnect; only one reaper loop per process.
        if !self.reaper_started.swap(true, Ordering::SeqCst) {
            let gateway = Arc::new(SerenityGateway::new(ctx.http.clone(), ctx.cache.clone()));
            let reaper = Reaper::new(
                Arc::clone(&self.registry),
                gateway,
                std::time::Duration::from_secs(self.reaper.interval_secs),
                self.shutdown.child_token(),
            );
            reaper.spawn();
        }
    }

    async fn voice_state_update(&self, ctx: Context, _old: Option<VoiceState>, new: VoiceState) {
        let Some(guild_id) = new.guild_id else { return };
        let Some(channel_id) = new.channel_id else {
            return;
        };

        // Cache reads stay in this block; the guard must not cross an await.
        let joined = {
            let guild = ctx.cache.guild(guild_id);
            guild.and_then(|g| {
                g.channels
                    .get(&channel_id)
                    .map(|ch| (ch.name == self.config.join_channel_name, ch.parent_id))
            })
        };
        let Some((is_join_channel, category)) = joined else {
            return;
        };
        if !is_join_channel {
            return;
        }

        let display_name = new
            .member
            .as_ref()
            .map(|m| m.display_name().to_string())
            .unwrap_or_else(|| "member".to_string());

        let service = self.service(&ctx);
        let owner = tempvox_registry::UserId(new.user_id.get());
        let outcome = service
            .provision_on_join(
                tempvox_registry::GuildId(guild_id.get()),
                owner,
                &display_name,
                category.map(|c| tempvox_registry::ChannelId(c.get())),
            )
            .await;

        match outcome {
            Ok(outcome) => {
                debug!(%owner, channel = %outcome.channel(), ?outcome, "join-to-create handled");
            },
            Err(err) => warn!(%owner, error = %err, "failed to provision room"),
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let Interaction::Command(command) = interaction else {
            return;
        };
        let Some(parsed) = commands::parse(&command) else {
            debug!(name = %command.data.name, "unrecognized command");
            return;
        };

        let service = self.service(&ctx);
        let actor = tempvox_registry::UserId(command.user.id.get());

        // Purging can take a moment; acknowledge first, follow up after.
        if matches!(parsed, Command::Purge { .. }) {
            if let Err(e) = command.defer_ephemeral(&ctx.http).await {
                warn!(error = %e, "failed to defer interaction");
                return;
            }
            let content = match service.dispatch(actor, parsed).await {
                Ok(reply) => commands::render_reply(&reply),
                Err(err) => {
                    debug!(%actor, error = %err, "command refused");
                    err.to_string()
                },
            };
            let followup = CreateInteractionResponseFollowup::new()
                .content(content)
                .ephemeral(true);
            if let Err(e) = command.create_followup(&ctx.http, followup).await {
                warn!(error = %e, "failed to send followup");
            }
            return;
        }

        let content = match service.dispatch(actor, parsed).await {
            Ok(reply) => commands::render_reply(&reply),
            Err(err) => {
                debug!(%actor, error = %err, "command refused");
                err.to_string()
            },
        };
        let response = CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .content(content)
                .ephemeral(true),
        );
        if let Err(e) = command.create_response(&ctx.http, response).await {
            warn!(error = %e, "failed to respond to interaction");
        }
    }
}
