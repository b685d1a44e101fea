use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const SETTINGS_FILE: &str = "tokengate_settings.json";

fn default_confirmation_timeout() -> u64 {
    90
}

fn default_show_notifications() -> bool {
    true
}

/// User settings that persist between sessions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSettings {
    /// Custom RPC endpoint for the required network (None = built-in default)
    #[serde(default)]
    pub rpc_url_override: Option<String>,
    /// How long to wait for a transaction confirmation, in seconds
    #[serde(default = "default_confirmation_timeout")]
    pub confirmation_timeout_secs: u64,
    /// Show the notification feed in the side panel
    #[serde(default = "default_show_notifications")]
    pub show_notifications: bool,
    /// Last mint amount the user submitted, recorded in the settings file.
    /// The input field itself starts empty on every launch.
    #[serde(default)]
    pub last_mint_amount: Option<u64>,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            rpc_url_override: None,
            confirmation_timeout_secs: default_confirmation_timeout(),
            show_notifications: default_show_notifications(),
            last_mint_amount: None,
        }
    }
}

impl UserSettings {
    /// Get the settings file path
    fn settings_path() -> PathBuf {
        // Try to use the app data directory, fall back to current directory
        if let Some(config_dir) = dirs::config_dir() {
            let app_dir = config_dir.join("tokengate");
            if !app_dir.exists() {
                let _ = fs::create_dir_all(&app_dir);
            }
            app_dir.join(SETTINGS_FILE)
        } else {
            PathBuf::from(SETTINGS_FILE)
        }
    }

    /// Load settings from disk, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load() -> Self {
        let path = Self::settings_path();
        match fs::read_to_string(&path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_else(|e| {
                tracing::warn!("Settings file corrupt ({}), using defaults", e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Persist settings to disk.
    pub fn save(&self) -> Result<()> {
        let path = Self::settings_path();
        let data = serde_json::to_string_pretty(self)?;
        fs::write(&path, data)?;
        Ok(())
    }
}
