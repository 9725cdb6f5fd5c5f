use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub pagination: PaginationConfig,
    pub notifications: NotificationConfig,
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Upgrade an `http://` base URL to `https://`.
    pub force_https: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_owned(),
            timeout_secs: 30,
            force_https: false,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// The base URL with a trailing slash removed and, if configured, the
    /// scheme upgraded to https.
    pub fn normalized_base_url(&self) -> String {
        let mut url = self.base_url.trim().to_owned();
        if self.force_https
            && let Some(rest) = url.strip_prefix("http://")
        {
            url = format!("https://{rest}");
        }
        while url.ends_with('/') {
            url.pop();
        }
        url
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Where the session token and current user are persisted. `None` means
    /// the default state location.
    pub state_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub page_size: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self { page_size: 10 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub dismiss_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { dismiss_ms: 3000 }
    }
}

impl NotificationConfig {
    pub fn dismiss_after(&self) -> Duration {
        Duration::from_millis(self.dismiss_ms)
    }
}
