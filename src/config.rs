use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::prompts::CONSENT_TIMEOUT;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PackageManager {
    #[default]
    Npm,
    Yarn,
}

impl PackageManager {
    pub fn use_yarn(&self) -> bool {
        matches!(self, PackageManager::Yarn)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct Settings {
    #[serde(default = "default_consent_timeout_ms")]
    pub consent_timeout_ms: u64,
    #[serde(default)]
    pub package_manager: PackageManager,
}

fn default_consent_timeout_ms() -> u64 {
    u64::try_from(CONSENT_TIMEOUT.as_millis()).unwrap_or(u64::MAX)
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            consent_timeout_ms: default_consent_timeout_ms(),
            package_manager: PackageManager::default(),
        }
    }
}

pub fn get_config_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| anyhow!("cannot get home dir"))?;
    Ok(home_dir.join(".config").join("askyn").join("config.json"))
}

impl Settings {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = fs::read(path)?;
        let settings: Settings = serde_json::from_slice(&bytes)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }
        let bytes = serde_json::to_vec_pretty(self)?;
        fs::write(path, bytes)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.consent_timeout_ms == 0 {
            anyhow::bail!("consent-timeout-ms must be a positive number of milliseconds");
        }
        Ok(())
    }

    pub fn consent_timeout(&self) -> Duration {
        Duration::from_millis(self.consent_timeout_ms)
    }
}

/// Load settings from `path`, falling back to defaults when the file is absent.
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    Settings::load(path)
}

pub fn load_settings() -> Result<Settings> {
    load_settings_from(&get_config_path()?)
}
