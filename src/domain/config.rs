use std::{path::Path, time::Duration};

use serde::Deserialize;

use crate::domain::Policy;

/// Default settings for a comparison run.
///
/// Values given on the command line take precedence over these.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "Versions")]
pub struct Config {
    /// Termination policy used when none is given explicitly.
    pub mode: Policy,

    /// Wall-clock budget for the whole traversal, in seconds.
    max_time: u64,

    /// Command used to open a differing pair side by side.
    ///
    /// Both document paths are appended as arguments.
    pub viewer: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Policy::default(),
            max_time: default_max_time(),
            viewer: default_viewer(),
        }
    }
}

/// Errors that can occur when loading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid configuration TOML.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Loads the configuration if the file exists, falling back to defaults
    /// when it does not.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("no config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// The wall-clock budget for one comparison.
    #[must_use]
    pub const fn max_time(&self) -> Duration {
        Duration::from_secs(self.max_time)
    }
}

const fn default_max_time() -> u64 {
    300
}

fn default_viewer() -> String {
    "firefox".to_string()
}

/// The serialized versions of the configuration.
#[derive(Debug, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default)]
        mode: Policy,

        /// Seconds.
        #[serde(default = "default_max_time")]
        max_time: u64,

        #[serde(default = "default_viewer")]
        viewer: String,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                mode,
                max_time,
                viewer,
            } => Self {
                mode,
                max_time,
                viewer,
            },
        }
    }
}
