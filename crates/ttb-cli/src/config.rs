//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Timetable endpoint used when no config overrides it.
const DEFAULT_TIMETABLE_URL: &str = "https://mysubjects.uts.edu.au/aplus2015/aptimetable";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the timetable endpoint.
    pub timetable_url: String,

    /// Where the downloaded subject catalogue is written.
    pub subjects_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            timetable_url: DEFAULT_TIMETABLE_URL.to_string(),
            subjects_path: data_dir.join("subjects.json"),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (TTB_*)
        figment = figment.merge(Env::prefixed("TTB_"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for ttb.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("ttb"))
}

/// Returns the platform-specific data directory for ttb.
///
/// On Linux: `~/.local/share/ttb`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("ttb"))
}
