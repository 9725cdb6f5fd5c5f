use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::types::AppConfig;

/// Environment variable that overrides `api.base_url` after loading.
pub const API_URL_ENV: &str = "STORYBOARD_API_URL";

/// Discover and load the app config.
///
/// Priority:
/// 1. `--config` flag (explicit path)
/// 2. `$STORYBOARD_CONFIG` environment variable
/// 3. `$XDG_CONFIG_HOME/storyboard/config.toml`
/// 4. `~/.config/storyboard/config.toml`
///
/// Falls back to defaults when nothing is found. `$STORYBOARD_API_URL`, when
/// set and non-empty, replaces `api.base_url` in every case.
pub fn load_config(explicit_path: Option<&Path>) -> Result<AppConfig> {
    let path = match explicit_path {
        Some(p) => Some(p.to_path_buf()),
        None => find_global_config(),
    };

    let mut config = match path {
        Some(path) => read_config(&path)?,
        None => AppConfig::default(),
    };

    if let Ok(url) = std::env::var(API_URL_ENV)
        && !url.is_empty()
    {
        config.api.base_url = url;
    }

    if let Some(state_file) = config.session.state_file.take() {
        config.session.state_file = Some(expand_tilde(&state_file.to_string_lossy()));
    }

    Ok(config)
}

fn read_config(path: &Path) -> Result<AppConfig> {
    let contents =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("parsing TOML from {}", path.display()))
}

fn find_global_config() -> Option<PathBuf> {
    // $STORYBOARD_CONFIG
    if let Ok(path) = std::env::var("STORYBOARD_CONFIG") {
        let p = PathBuf::from(&path);
        if p.is_file() {
            return Some(p);
        }
    }

    // $XDG_CONFIG_HOME/storyboard/config.toml
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        let p = PathBuf::from(xdg).join("storyboard/config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    // ~/.config/storyboard/config.toml
    if let Some(home) = home_dir() {
        let p = home.join(".config/storyboard/config.toml");
        if p.is_file() {
            return Some(p);
        }
    }

    None
}

/// Default location of the persisted session when none is configured.
pub fn default_state_file() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return PathBuf::from(xdg).join("storyboard/session.json");
    }
    home_dir().map_or_else(
        || PathBuf::from(".storyboard-session.json"),
        |home| home.join(".local/state/storyboard/session.json"),
    )
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}
