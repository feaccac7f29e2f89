use backref_core::config::loader::{ConfigLoader, default_config_path};
use backref_core::vault::{VaultHost, VaultOptions};
use std::path::Path;

pub fn run(config: Option<&Path>, profile: Option<&str>) {
    match ConfigLoader::load(config, profile) {
        Ok(rc) => {
            println!("OK   bref doctor");
            println!(
                "path: {}",
                config.map_or_else(
                    || default_config_path().display().to_string(),
                    |p| p.display().to_string()
                )
            );
            println!("profile: {}", rc.active_profile);
            println!("vault_root: {}", rc.vault_root.display());
            println!("excluded_folders: [{}]", rc.excluded_folders.join(", "));
            println!("references.enabled: {}", rc.references.enabled);
            println!("references.ttl_ms: {}", rc.references.ttl_ms);
            println!("references.exclude_key: {}", rc.references.exclude_key);
            println!(
                "references.ignore_links_from_excluded_folders: {}",
                rc.references.ignore_links_from_excluded_folders
            );
            println!(
                "references.ignore_links_to_excluded_folders: {}",
                rc.references.ignore_links_to_excluded_folders
            );
            println!("logging.level: {}", rc.logging.level);
            if let Some(file) = &rc.logging.file {
                println!("logging.file: {}", file.display());
            }

            let options = VaultOptions {
                excluded_folders: rc.excluded_folders.clone(),
                exclude_key: rc.references.exclude_key.clone(),
            };
            match VaultHost::open(&rc.vault_root, options) {
                Ok(host) => println!("vault: {} notes", host.len()),
                Err(e) => {
                    println!("vault: {e}");
                    std::process::exit(1);
                }
            }
        }
        Err(e) => {
            println!("FAIL bref doctor");
            println!("{e}");
            if config.is_none() {
                println!("looked for: {}", default_config_path().display());
            }
            std::process::exit(1);
        }
    }
}
