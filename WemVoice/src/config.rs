//! `wemvoice.toml` configuration file
//!
//! ```toml
//! [paths]
//! descriptors = "/games/oblivion/txtp"
//! voices = "/games/oblivion-fr/Sound/Voice"
//! output = "/games/oblivion/mod/wem"
//! logs = "logs"
//!
//! [substitutions]
//! subfolder_tokens = ["altvoice", "beggar"]
//! ```
//!
//! Every section is optional. Missing paths must then be given on the command
//! line, and missing substitution tables fall back to the built-in defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::matching::SubstitutionConfig;

/// Default config file name
pub const CONFIG_FILE_NAME: &str = "wemvoice.toml";

/// Folders of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    pub descriptors: Option<PathBuf>,
    pub voices: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub logs: Option<PathBuf>,
}

/// The full configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WemVoiceConfig {
    pub paths: PathSettings,
    pub substitutions: SubstitutionConfig,
}

impl WemVoiceConfig {
    /// Load a config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = toml::from_str(&text)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load `path` if given, else `wemvoice.toml` in the working directory if
    /// present, else the defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let local = Path::new(CONFIG_FILE_NAME);
                if local.is_file() {
                    Self::load(local)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The default configuration as TOML, for `config init`
    pub fn default_toml() -> Result<String> {
        Self::default().to_toml()
    }

    /// Write the config to `path`, creating parent folders
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }
}
