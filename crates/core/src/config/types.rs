use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::vault::extractor::DEFAULT_EXCLUDE_KEY;

#[derive(Debug, Deserialize)]
pub struct ConfigFile {
    pub version: u32,
    pub profile: Option<String>,
    pub profiles: HashMap<String, Profile>,
    #[serde(default)]
    pub references: ReferencesConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
pub struct Profile {
    pub vault_root: String,
    /// Folders excluded by folder rule (relative to vault_root).
    /// References written in them, or pointing into them, are dropped
    /// according to the `[references]` settings.
    #[serde(default)]
    pub excluded_folders: Vec<String>,
}

/// The `[references]` table.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ReferencesConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// How long a document view stays valid, in milliseconds.
    #[serde(default = "default_ttl_ms")]
    pub ttl_ms: u64,
    /// Front matter key that opts a document out of being a reference target.
    #[serde(default = "default_exclude_key")]
    pub exclude_key: String,
    #[serde(default = "default_true")]
    pub ignore_links_from_excluded_folders: bool,
    #[serde(default = "default_true")]
    pub ignore_links_to_excluded_folders: bool,
}

impl Default for ReferencesConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_ms: default_ttl_ms(),
            exclude_key: default_exclude_key(),
            ignore_links_from_excluded_folders: true,
            ignore_links_to_excluded_folders: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_ttl_ms() -> u64 {
    1000
}

fn default_exclude_key() -> String {
    DEFAULT_EXCLUDE_KEY.to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file_level: Option<String>,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), file_level: None, file: None }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub active_profile: String,
    pub vault_root: PathBuf,
    /// Excluded folders as `/`-separated paths relative to the vault root.
    pub excluded_folders: Vec<String>,
    pub references: ReferencesConfig,
    pub logging: LoggingConfig,
}
