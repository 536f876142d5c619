/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Explorer configuration, stored as TOML in the user config directory.

use crate::error::ConfigError;
use crate::layout::LayoutConfig;
use crate::stats::{DISEASE_CUTOFF_PERCENTILE, PATIENT_SUBGROUP_CUTOFF_PERCENTILE};
use crate::views::patient_subgroups::DEFAULT_MIN_CLUSTER_SIZE;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_DIR: &str = "comorbidities-explorer";
const CONFIG_FILE: &str = "config.toml";

/// Get the config directory for the explorer
pub fn config_dir() -> PathBuf {
    match dirs::config_dir() {
        Some(config_home) => config_home.join(APP_DIR),
        None => PathBuf::from(format!(".{APP_DIR}")),
    }
}

/// Default location of the config file
pub fn default_config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Directory holding one `<collection>.json` per raw collection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// View activated on start
    pub initial_view: String,

    /// Percentile of the distinct |relative risk| values used as the
    /// initial disease comorbidity cutoff
    pub disease_cutoff_percentile: f64,

    pub patient_subgroup_cutoff_percentile: f64,

    /// Initial smallest subgroup size shown
    pub min_cluster_size: u64,

    pub layout: LayoutConfig,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            initial_view: crate::views::diseases::VIEW_NAME.to_string(),
            disease_cutoff_percentile: DISEASE_CUTOFF_PERCENTILE,
            patient_subgroup_cutoff_percentile: PATIENT_SUBGROUP_CUTOFF_PERCENTILE,
            min_cluster_size: DEFAULT_MIN_CLUSTER_SIZE,
            layout: LayoutConfig::default(),
        }
    }
}

impl ExplorerConfig {
    /// Read and validate the config at `path`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Like `load`, but a missing file yields the defaults
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No configuration at {}, using defaults", path.display());
                Ok(Self::default())
            },
            other => other,
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("disease_cutoff_percentile", self.disease_cutoff_percentile),
            (
                "patient_subgroup_cutoff_percentile",
                self.patient_subgroup_cutoff_percentile,
            ),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be within 0..=1, got {value}"
                )));
            }
        }
        if self.layout.damping <= 0.0 || self.layout.damping > 1.0 {
            return Err(ConfigError::Invalid(format!(
                "layout.damping must be within (0, 1], got {}",
                self.layout.damping
            )));
        }
        Ok(())
    }
}
