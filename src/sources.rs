//! Where the command line gets its inputs from.

use anyhow::Context;
use bracket_engine::{PicksMap, SiteConfig, TournamentData};
use log::debug;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

pub const TOURNAMENT_ENV: &str = "PICKEM_TOURNAMENT_JSON";
pub const SITE_CONFIG_ENV: &str = "PICKEM_SITE_CONFIG";

/// Load the tournament field.
///
/// Fallback chain:
/// 1) `--tournament` flag.
/// 2) `PICKEM_TOURNAMENT_JSON` env var.
/// 3) Embedded 2025 field.
pub fn load_tournament(flag: Option<&Path>) -> anyhow::Result<TournamentData> {
    if let Some(path) = flag.map(Path::to_path_buf).or_else(|| env_path(TOURNAMENT_ENV)) {
        return read_json(&path, "tournament");
    }
    debug!("no tournament file given, using the embedded 2025 field");
    TournamentData::sample_2025().context("invalid embedded 2025 field")
}

pub fn load_picks(path: &Path) -> anyhow::Result<PicksMap> {
    read_json(path, "picks")
}

/// Site config from `--config`, then `PICKEM_SITE_CONFIG`, else defaults.
pub fn load_site_config(flag: Option<&Path>) -> anyhow::Result<SiteConfig> {
    match flag.map(Path::to_path_buf).or_else(|| env_path(SITE_CONFIG_ENV)) {
        Some(path) => read_json(&path, "site config"),
        None => {
            debug!("no site config given, using defaults");
            Ok(SiteConfig::default())
        }
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> anyhow::Result<T> {
    debug!("loading {what} from {}", path.display());
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("could not read {what} file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("invalid {what} json at {}", path.display()))
}
