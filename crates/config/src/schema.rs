//! Config schema types (server, discord, reaper).

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TempvoxConfig {
    pub server: ServerConfig,
    pub discord: DiscordConfig,
    pub reaper: ReaperConfig,
}

/// Keep-alive HTTP responder configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind: String,
    /// Port to listen on. The `PORT` environment variable (via the CLI)
    /// takes precedence, matching how process supervisors pass it.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".into(),
            port: 8080,
        }
    }
}

/// Discord bot configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Bot token. Usually written as `${DISCORD_TOKEN}` and substituted from
    /// the environment at load time.
    #[serde(serialize_with = "serialize_secret")]
    pub token: Secret<String>,

    /// Category that holds the join channel and the provisioned rooms.
    pub category_name: String,

    /// Voice channel members join to get a room of their own.
    pub join_channel_name: String,
}

impl DiscordConfig {
    /// Whether a token was configured at all.
    pub fn has_token(&self) -> bool {
        !self.token.expose_secret().is_empty()
    }
}

impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("token", &"[REDACTED]")
            .field("category_name", &self.category_name)
            .field("join_channel_name", &self.join_channel_name)
            .finish()
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: Secret::new(String::new()),
            category_name: "Voice Channels".into(),
            join_channel_name: "Join to Create".into(),
        }
    }
}

fn serialize_secret<S: serde::Serializer>(
    secret: &Secret<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// Room maintenance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaperConfig {
    /// Seconds between maintenance passes.
    pub interval_secs: u64,
    /// Upper bound for `/vc expire` minute counts.
    pub max_expiry_minutes: i64,
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            max_expiry_minutes: 1440,
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = TempvoxConfig::default();
        assert_eq!(cfg.server.bind, "0.0.0.0");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.discord.category_name, "Voice Channels");
        assert_eq!(cfg.discord.join_channel_name, "Join to Create");
        assert_eq!(cfg.reaper.interval_secs, 30);
        assert_eq!(cfg.reaper.max_expiry_minutes, 1440);
        assert!(!cfg.discord.has_token());
    }

    #[test]
    fn deserialize_partial_toml() {
        let cfg: TempvoxConfig = toml::from_str(
            r#"
            [discord]
            token = "abc.def"

            [reaper]
            interval_secs = 10
            "#,
        )
        .unwrap();
        assert!(cfg.discord.has_token());
        assert_eq!(cfg.discord.token.expose_secret(), "abc.def");
        assert_eq!(cfg.reaper.interval_secs, 10);
        // Unspecified sections keep their defaults.
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.reaper.max_expiry_minutes, 1440);
    }

    #[test]
    fn debug_never_prints_the_token() {
        let cfg: TempvoxConfig = toml::from_str("[discord]\ntoken = \"super-secret\"").unwrap();
        let rendered = format!("{:?}", cfg.discord);
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("super-secret"));
    }

    #[test]
    fn serialize_roundtrip() {
        let cfg = TempvoxConfig::default();
        let toml_str = toml::to_string(&cfg).unwrap();
        let back: TempvoxConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(back.discord.category_name, cfg.discord.category_name);
        assert_eq!(back.server.port, cfg.server.port);
    }
}
