use std::{path::PathBuf, sync::Arc};

use {
    clap::Parser,
    secrecy::Secret,
    tokio_util::sync::CancellationToken,
    tracing::{error, info},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    tempvox_discord::run_bot,
    tempvox_registry::TempChannelRegistry,
    tempvox_web::AppState,
};

#[derive(Parser)]
#[command(name = "tempvox", about = "tempvox — ephemeral voice rooms for Discord")]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, default_value_t = false)]
    json_logs: bool,

    /// Path to a config file (overrides discovery).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to bind the keep-alive responder to (overrides config).
    #[arg(long)]
    bind: Option<String>,

    /// Port for the keep-alive responder (overrides config).
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Bot token (overrides config).
    #[arg(long, env = "DISCORD_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli);

    let mut config = match &cli.config {
        Some(path) => tempvox_config::load_config(path)?,
        None => tempvox_config::discover_and_load(),
    };
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(token) = cli.token {
        config.discord.token = Secret::new(token);
    }
    if !config.discord.has_token() {
        anyhow::bail!("no bot token configured: set DISCORD_TOKEN or discord.token in tempvox.toml");
    }

    let registry = TempChannelRegistry::shared();
    let shutdown = CancellationToken::new();

    // Keep-alive responder for the process supervisor.
    let web_state = AppState::new(Arc::clone(&registry));
    let web_cancel = shutdown.clone();
    let (bind, port) = (config.server.bind.clone(), config.server.port);
    let web = tokio::spawn(async move {
        if let Err(e) = tempvox_web::serve(&bind, port, web_state, web_cancel).await {
            error!(error = %e, "keep-alive responder failed");
        }
    });

    let mut bot = tokio::spawn(run_bot(
        config.discord,
        config.reaper,
        registry,
        shutdown.clone(),
    ));

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received, stopping");
        },
        result = &mut bot => {
            // The connection ended on its own (startup auth failure or a
            // terminal gateway error); surface it.
            shutdown.cancel();
            let _ = web.await;
            return match result {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(e),
                Err(e) => Err(e.into()),
            };
        },
    }

    shutdown.cancel();
    let _ = bot.await;
    let _ = web.await;
    Ok(())
}

fn init_tracing(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
