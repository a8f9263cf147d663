//! Persisted user settings under the XDG config directory.

use std::{
    env::var,
    fs::{create_dir_all, read_to_string, write},
    path::{Path, PathBuf},
};

use {
    serde::{Deserialize, Serialize},
    serde_json::{from_str, to_string_pretty},
    tracing::{debug, warn},
};

use crate::{
    assets::{AssetLocator, AssetResolver},
    error::{AssetError, SettingsError},
    locale::Locale,
};

const APP_DIR: &str = "muzigim";
const DEFAULT_CATALOG: &str = "data/data.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory or http(s) URL that picture and audio references resolve against.
    pub asset_base: String,
    /// Catalog document location; defaults to `data/data.json` under the asset base.
    pub catalog: Option<String>,
    pub locale: Locale,
    /// Index into the theme palette list.
    pub theme: usize,
    pub audio_enabled: bool,
    /// Start playing as soon as a clip is loaded.
    pub autoplay: bool,
    /// Song names containing any of these are narrations, unless the catalog says otherwise.
    pub narration_markers: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            asset_base: "assets".to_string(),
            catalog: None,
            locale: Locale::default(),
            theme: 0,
            audio_enabled: true,
            autoplay: true,
            narration_markers: ["açıklama", "anlatım", "description", "narration"]
                .map(String::from)
                .to_vec(),
        }
    }
}

impl Settings {
    /// Reads settings, returning defaults when the file does not exist yet.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        debug!("Loading settings from {}", path.display());
        Ok(from_str(&read_to_string(path)?)?)
    }

    /// Like [`Settings::load_from`] but falls back to defaults on a broken file.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load_from(path).unwrap_or_else(|e| {
            warn!("Ignoring unreadable settings at {}: {e}", path.display());
            Self::default()
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            create_dir_all(parent)?;
        }
        write(path, to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn resolver(&self) -> AssetResolver {
        AssetResolver::new(&self.asset_base)
    }

    pub fn catalog_locator(&self) -> Result<AssetLocator, AssetError> {
        match self.catalog.as_deref() {
            Some(c) if c.starts_with("http://") || c.starts_with("https://") => {
                Ok(AssetLocator::Url(c.to_string()))
            }
            Some(c) => Ok(AssetLocator::File(PathBuf::from(c))),
            None => self.resolver().resolve(DEFAULT_CATALOG),
        }
    }
}

/// `$XDG_CONFIG_HOME/muzigim`, falling back to `$HOME/.config/muzigim`.
pub fn config_dir() -> PathBuf {
    let base = match var("XDG_CONFIG_HOME") {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => var("HOME")
            .map(|home| PathBuf::from(home).join(".config"))
            .unwrap_or_else(|_| PathBuf::from(".")),
    };
    base.join(APP_DIR)
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

pub fn log_path() -> PathBuf {
    config_dir().join("muzigim.log")
}
