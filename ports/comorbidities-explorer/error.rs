/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Error types surfaced by data loading and configuration.

/// Errors from fetching or decoding a raw data collection
#[derive(Debug)]
pub enum LoadError {
    /// Reading the collection failed
    Io { collection: String, message: String },

    /// The collection could not be decoded
    Parse { collection: String, message: String },

    /// The data source does not provide this collection
    MissingCollection(String),
}

impl LoadError {
    pub fn io(collection: &str, err: std::io::Error) -> Self {
        LoadError::Io {
            collection: collection.to_string(),
            message: err.to_string(),
        }
    }

    pub fn parse(collection: &str, err: serde_json::Error) -> Self {
        LoadError::Parse {
            collection: collection.to_string(),
            message: err.to_string(),
        }
    }
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io {
                collection,
                message,
            } => write!(f, "IO error loading {collection}: {message}"),
            LoadError::Parse {
                collection,
                message,
            } => write!(f, "Malformed {collection}: {message}"),
            LoadError::MissingCollection(collection) => {
                write!(f, "Collection not available: {collection}")
            },
        }
    }
}

impl std::error::Error for LoadError {}

/// Errors from reading or writing the explorer configuration
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {e}"),
            ConfigError::Toml(e) => write!(f, "TOML error: {e}"),
            ConfigError::Invalid(e) => write!(f, "Invalid configuration: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Toml(e.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(e: toml::ser::Error) -> Self {
        ConfigError::Toml(e.to_string())
    }
}
