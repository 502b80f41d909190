use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::storage::FileStorage;
use crate::theme::ThemePreset;
use crate::types::StatusFilter;

pub const THEME_ENV: &str = "TASKLIST_THEME";
pub const DATA_DIR_ENV: &str = "TASKLIST_DATA_DIR";

const DEFAULT_THEME: &str = "default";
const DEFAULT_FILTER: &str = "all";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: String,
    pub default_filter: String,
    pub confirm_delete: bool,
    pub data_dir: Option<PathBuf>,
    pub keybindings: KeybindingsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct KeybindingsConfig {
    pub global: HashMap<String, Vec<String>>,
    pub list: HashMap<String, Vec<String>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: DEFAULT_THEME.to_string(),
            default_filter: DEFAULT_FILTER.to_string(),
            confirm_delete: true,
            data_dir: None,
            keybindings: KeybindingsConfig::default(),
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("tasklist");
        path.push("settings.toml");
        Some(path)
    }

    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        Self::load_from_path(&path)
    }

    pub fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Self>(&contents) {
                Ok(mut settings) => {
                    settings.validate();
                    settings
                }
                Err(error) => {
                    warn!(
                        "failed to parse settings config '{}': {}",
                        path.display(),
                        error
                    );
                    Self::default()
                }
            },
            Err(error) => {
                warn!(
                    "failed to read settings config '{}': {}",
                    path.display(),
                    error
                );
                Self::default()
            }
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path().ok_or_else(|| anyhow!("unable to determine config path"))?;
        self.save_to_path(&path)
    }

    pub fn save_to_path(&self, path: &Path) -> anyhow::Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow!("invalid settings config path"))?;
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory '{}'", parent.display()))?;

        let mut validated = self.clone();
        validated.validate();
        let contents =
            toml::to_string_pretty(&validated).context("failed to serialize settings to TOML")?;

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, contents).with_context(|| {
            format!(
                "failed to write temporary settings file '{}'",
                tmp_path.display()
            )
        })?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "failed to atomically rename settings file '{}' to '{}'",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }

    pub fn theme_preset(&self) -> ThemePreset {
        ThemePreset::from_str(&self.theme).unwrap_or_default()
    }

    pub fn initial_filter(&self) -> StatusFilter {
        StatusFilter::from_str(&self.default_filter).unwrap_or_default()
    }

    /// `--theme` beats `TASKLIST_THEME`, which beats the settings file.
    /// Unknown names are skipped with a warning.
    pub fn resolve_theme(&self, cli: Option<&str>, env: Option<&str>) -> ThemePreset {
        for (source, value) in [("--theme", cli), (THEME_ENV, env)] {
            let Some(value) = value else {
                continue;
            };
            match ThemePreset::from_str(value) {
                Ok(preset) => return preset,
                Err(()) => warn!("ignoring unknown theme '{value}' from {source}"),
            }
        }
        self.theme_preset()
    }

    /// Storage root: `--data-dir`, then `TASKLIST_DATA_DIR`, then the
    /// settings file, then the platform data directory.
    pub fn resolve_data_dir(
        &self,
        cli: Option<PathBuf>,
        env: Option<PathBuf>,
    ) -> anyhow::Result<PathBuf> {
        let chosen = [cli, env, self.data_dir.clone()]
            .into_iter()
            .flatten()
            .find(|dir| !dir.as_os_str().is_empty());
        match chosen {
            Some(dir) => Ok(dir),
            None => FileStorage::default_root(),
        }
    }

    fn validate(&mut self) {
        self.theme = match ThemePreset::from_str(&self.theme) {
            Ok(preset) => preset.as_str().to_string(),
            Err(()) => {
                warn!(
                    "invalid theme '{}' in settings config; falling back to default",
                    self.theme
                );
                DEFAULT_THEME.to_string()
            }
        };

        self.default_filter = match StatusFilter::from_str(&self.default_filter) {
            Ok(filter) => filter.as_str().to_string(),
            Err(()) => {
                warn!(
                    "invalid default_filter '{}' in settings config; falling back to {}",
                    self.default_filter, DEFAULT_FILTER
                );
                DEFAULT_FILTER.to_string()
            }
        };

        if self
            .data_dir
            .as_ref()
            .is_some_and(|dir| dir.as_os_str().is_empty())
        {
            self.data_dir = None;
        }
    }
}
