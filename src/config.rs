use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::bridge::Aliases;
use crate::clipboard::ClipboardBackend;
use crate::error::SetupError;
use crate::relay::{DEFAULT_HIDE_DELAY, DEFAULT_PREVIEW_LENGTH, NotificationStyle, RelayOptions};

pub const DEFAULT_COPY_ALIAS: &str = "toclip";
pub const DEFAULT_TEE_ALIAS: &str = "teeclip";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_directory: Option<PathBuf>,
    #[serde(default = "default_copy_alias")]
    pub copy_alias: String,
    #[serde(default = "default_tee_alias")]
    pub tee_alias: String,
    #[serde(default)]
    pub notification: NotificationStyle,
    #[serde(default = "default_preview_length")]
    pub preview_length: usize,
    #[serde(default = "default_hide_delay_ms")]
    pub hide_delay_ms: u64,
    #[serde(default)]
    pub clipboard_backend: ClipboardBackend,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socket_path: Option<PathBuf>,

    // This field is not serialized, just used at runtime
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

fn default_enabled() -> bool {
    true
}

fn default_copy_alias() -> String {
    DEFAULT_COPY_ALIAS.to_string()
}

fn default_tee_alias() -> String {
    DEFAULT_TEE_ALIAS.to_string()
}

fn default_preview_length() -> usize {
    DEFAULT_PREVIEW_LENGTH
}

fn default_hide_delay_ms() -> u64 {
    DEFAULT_HIDE_DELAY.as_millis() as u64
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            temp_directory: None,
            copy_alias: default_copy_alias(),
            tee_alias: default_tee_alias(),
            notification: NotificationStyle::default(),
            preview_length: default_preview_length(),
            hide_delay_ms: default_hide_delay_ms(),
            clipboard_backend: ClipboardBackend::default(),
            socket_path: None,
            config_path: None,
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Load `path`, falling back to defaults when the file does not exist
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            log::debug!("Config file {:?} does not exist, using defaults", path);
            return Ok(Self {
                config_path: Some(path.to_path_buf()),
                ..Self::default()
            });
        }

        let config = Self::from_file(path)?;
        config.aliases()?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Write back to the file this config was loaded from, if any
    pub fn persist(&self) -> anyhow::Result<()> {
        match &self.config_path {
            Some(path) => self.save_to_file(path),
            None => Ok(()),
        }
    }

    pub fn aliases(&self) -> Result<Aliases, SetupError> {
        Aliases::new(self.copy_alias.clone(), self.tee_alias.clone())
    }

    pub fn hide_delay(&self) -> Duration {
        Duration::from_millis(self.hide_delay_ms)
    }

    pub fn relay_options(&self) -> RelayOptions {
        RelayOptions {
            style: self.notification,
            preview_length: self.preview_length,
            hide_delay: self.hide_delay(),
            tooltip: format!("{}: copied to clipboard", self.copy_alias),
        }
    }
}

/// `~/.config/termclip/config.toml`
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("termclip")
        .join("config.toml")
}
