//! Client bootstrap: token, intents, handler wiring, shutdown.

use {
    secrecy::ExposeSecret,
    serenity::all::Client,
    tokio_util::sync::CancellationToken,
    tracing::info,
};

use {
    tempvox_config::{DiscordConfig, ReaperConfig},
    tempvox_registry::SharedRegistry,
};

use crate::handler::VoxHandler;

/// Connect to Discord and run the event loop.
///
/// Returns when the connection ends or the shutdown token is cancelled; on
/// cancellation the shards are told to drain first.
pub async fn run_bot(
    config: DiscordConfig,
    reaper: ReaperConfig,
    registry: SharedRegistry,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let token = config.token.expose_secret().clone();
    let handler = VoxHandler::new(registry, config, reaper, shutdown.clone());

    let mut client = Client::builder(&token, VoxHandler::intents())
        .event_handler(handler)
        .await?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        shutdown.cancelled().await;
        info!("shutting down discord shards");
        shard_manager.shutdown_all().await;
    });

    client.start().await?;
    Ok(())
}
