pub mod doctor;
pub mod groups;
pub mod output;
pub mod refs;
pub mod reindex;
pub mod view;
pub mod watch;

use std::path::Path;

use backref_core::config::loader::ConfigLoader;
use backref_core::config::types::ResolvedConfig;
use backref_core::engine::{EngineSettings, ReferenceEngine};
use backref_core::vault::{VaultHost, VaultOptions};

use crate::OutputFormat;

/// Loaded configuration plus an engine over the configured vault.
pub struct Session {
    pub config: ResolvedConfig,
    pub engine: ReferenceEngine<VaultHost>,
}

/// Load config, start logging and open the vault. Exits on failure.
pub fn open_session(config: Option<&Path>, profile: Option<&str>) -> Session {
    let rc = match ConfigLoader::load(config, profile) {
        Ok(rc) => rc,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            std::process::exit(1);
        }
    };

    crate::logging::init(&rc);

    let options = VaultOptions {
        excluded_folders: rc.excluded_folders.clone(),
        exclude_key: rc.references.exclude_key.clone(),
    };
    let host = match VaultHost::open(&rc.vault_root, options) {
        Ok(host) => host,
        Err(e) => {
            eprintln!("Error opening vault: {e}");
            std::process::exit(1);
        }
    };

    let engine = ReferenceEngine::new(host, EngineSettings::from(&rc.references));
    Session { config: rc, engine }
}

pub fn resolve_format(output: OutputFormat, json: bool, quiet: bool) -> OutputFormat {
    if json {
        OutputFormat::Json
    } else if quiet {
        OutputFormat::Quiet
    } else {
        output
    }
}
