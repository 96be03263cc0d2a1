use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::TempvoxConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &["tempvox.toml", "tempvox.yaml", "tempvox.yml", "tempvox.json"];

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<TempvoxConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./tempvox.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/tempvox/tempvox.{toml,yaml,yml,json}` (user-global)
///
/// Returns `TempvoxConfig::default()` if no config file is found.
pub fn discover_and_load() -> TempvoxConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    TempvoxConfig::default()
}

/// Find the first config file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    if let Some(dirs) = directories::ProjectDirs::from("", "", "tempvox") {
        let config_dir = dirs.config_dir();
        for name in CONFIG_FILENAMES {
            let p = config_dir.join(name);
            if p.exists() {
                return Some(p);
            }
        }
    }

    None
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<TempvoxConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn parses_toml() {
        let cfg = parse_config(
            "[server]\nport = 9000\n",
            Path::new("tempvox.toml"),
        )
        .unwrap();
        assert_eq!(cfg.server.port, 9000);
    }

    #[test]
    fn parses_yaml() {
        let cfg = parse_config(
            "discord:\n  join_channel_name: Lobby\n",
            Path::new("tempvox.yaml"),
        )
        .unwrap();
        assert_eq!(cfg.discord.join_channel_name, "Lobby");
    }

    #[test]
    fn parses_json() {
        let cfg = parse_config(
            r#"{"reaper": {"interval_secs": 5}}"#,
            Path::new("tempvox.json"),
        )
        .unwrap();
        assert_eq!(cfg.reaper.interval_secs, 5);
    }

    #[test]
    fn rejects_unknown_extension() {
        assert!(parse_config("", Path::new("tempvox.ini")).is_err());
    }

    #[test]
    fn unresolved_placeholder_survives_as_literal() {
        let raw = substitute_env("[discord]\ntoken = \"${TEMPVOX_UNSET_VAR_XYZ}\"");
        let cfg = parse_config(&raw, Path::new("tempvox.toml")).unwrap();
        assert_eq!(
            cfg.discord.token.expose_secret(),
            "${TEMPVOX_UNSET_VAR_XYZ}"
        );
    }
}
