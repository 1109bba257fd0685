//! Configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level mnemotree configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MnemotreeConfig {
    /// Where the knowledge tree snapshot lives. `${VAR}` references are expanded.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,
    /// Days covered by `calendar` when `--days` is not given.
    #[serde(default = "default_horizon_days")]
    pub default_horizon_days: u32,
    /// Local hour before which activity counts towards the previous day. 0 disables it.
    #[serde(default = "default_cutoff_hour")]
    pub late_night_cutoff_hour: u32,
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("mnemotree.json")
}
fn default_horizon_days() -> u32 {
    14
}
fn default_cutoff_hour() -> u32 {
    3
}

impl Default for MnemotreeConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            default_horizon_days: default_horizon_days(),
            late_night_cutoff_hour: default_cutoff_hour(),
        }
    }
}

/// Expand `${VAR_NAME}` references in a string.
///
/// Each reference is expanded once, left to right; substituted values are
/// not scanned again. Unset variables expand to nothing and an unterminated
/// `${` is kept as written.
fn resolve_env_vars(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                out.push_str(&std::env::var(&after[..end]).unwrap_or_default());
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `mnemotree.toml` in the current directory
/// 2. `~/.config/mnemotree/config.toml`
///
/// Environment variable overrides: `MNEMOTREE_SNAPSHOT`, `MNEMOTREE_HORIZON_DAYS`.
pub fn load_config_from(path: Option<&Path>) -> Result<MnemotreeConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("mnemotree.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("using config {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<MnemotreeConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => MnemotreeConfig::default(),
    };

    // Apply env var overrides
    if let Ok(snapshot) = std::env::var("MNEMOTREE_SNAPSHOT") {
        config.snapshot_path = PathBuf::from(snapshot);
    }
    if let Ok(days) = std::env::var("MNEMOTREE_HORIZON_DAYS") {
        config.default_horizon_days = days
            .parse()
            .with_context(|| format!("invalid MNEMOTREE_HORIZON_DAYS: {days}"))?;
    }

    config.snapshot_path = PathBuf::from(resolve_env_vars(&config.snapshot_path.to_string_lossy()));

    if config.late_night_cutoff_hour > 23 {
        anyhow::bail!(
            "late_night_cutoff_hour must be between 0 and 23, got {}",
            config.late_night_cutoff_hour
        );
    }

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("mnemotree"))
}

pub const SAMPLE_CONFIG: &str = r#"# mnemotree configuration

# Where the knowledge tree is stored.
snapshot_path = "mnemotree.json"

# Days shown by `mnemotree calendar`.
default_horizon_days = 14

# Reviews before this local hour count towards the previous day (0 = off).
late_night_cutoff_hour = 3
"#;
