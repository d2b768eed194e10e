//! Run configuration.
//!
//! Loaded from TOML. Lookup order: an explicit path, then
//! `<config dir>/cdcr/config.toml`, then built-in defaults. Command-line
//! flags override whatever was loaded.
//!
//! ```toml
//! document_name = "test_entities"
//! seed = 42
//! threshold = 0.6
//! parallel = true
//! skip_corrupt_clusters = true
//! # split = 0.8
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::eval::DEFAULT_DOCUMENT_NAME;

/// Directory name under the platform config dir.
pub const CONFIG_DIR_NAME: &str = "cdcr";

/// File name inside [`CONFIG_DIR_NAME`].
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Effective settings for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Name after `#begin document`.
    pub document_name: String,
    /// Train fraction for the train/test split; no split when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split: Option<f64>,
    /// Seed for the split shuffle.
    pub seed: u64,
    /// Similarity threshold for `predict`.
    pub threshold: f64,
    /// Build topic groups in parallel.
    pub parallel: bool,
    /// Drop structurally broken clusters when scoring instead of failing.
    pub skip_corrupt_clusters: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            document_name: DEFAULT_DOCUMENT_NAME.to_string(),
            split: None,
            seed: 42,
            threshold: 0.6,
            parallel: true,
            skip_corrupt_clusters: true,
        }
    }
}

impl Config {
    /// Parse TOML text and check ranges.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text).map_err(|e| Error::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Read one file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_toml(&text).map_err(|e| Error::config(format!("{}: {}", path.display(), e)))
    }

    /// `<config dir>/cdcr/config.toml`, if the platform has a config dir.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut dir| {
            dir.push(CONFIG_DIR_NAME);
            dir.push(CONFIG_FILE_NAME);
            dir
        })
    }

    /// Resolve the effective config.
    ///
    /// An explicit path must exist. The default location is used only when
    /// present.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            log::debug!("loading config from {}", path.display());
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => {
                log::debug!("loading config from {}", path.display());
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Write to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if let Some(split) = self.split {
            if !(0.0..=1.0).contains(&split) {
                return Err(Error::config(format!("split must be within [0, 1], got {}", split)));
            }
        }
        if !self.threshold.is_finite() {
            return Err(Error::config("threshold must be a finite number"));
        }
        if self.document_name.trim().is_empty() || self.document_name.contains('\n') {
            return Err(Error::config("document_name must be a single non-empty line"));
        }
        Ok(())
    }
}
