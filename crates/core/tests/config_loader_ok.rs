use backref_core::config::loader::ConfigLoader;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn write_file(path: &PathBuf, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn load_default_profile_ok() {
    let tmp = tempdir().unwrap();
    let cfg_path = tmp.path().join("config.toml");
    let toml = r#"
version = 1
profile = "default"

[profiles.default]
vault_root = "/tmp/vault"
excluded_folders = ["templates", "/archive/", ""]

[references]
ttl_ms = 250
exclude_key = "hide-backlinks"
ignore_links_to_excluded_folders = false
"#;

    write_file(&cfg_path, toml);

    let rc = ConfigLoader::load(Some(&cfg_path), None).expect("should load");
    assert_eq!(rc.active_profile, "default");
    assert_eq!(rc.vault_root.display().to_string(), "/tmp/vault");
    assert_eq!(rc.excluded_folders, vec!["templates", "archive"]);
    assert!(rc.references.enabled);
    assert_eq!(rc.references.ttl_ms, 250);
    assert_eq!(rc.references.exclude_key, "hide-backlinks");
    assert!(rc.references.ignore_links_from_excluded_folders);
    assert!(!rc.references.ignore_links_to_excluded_folders);
}

#[test]
fn references_table_defaults() {
    let tmp = tempdir().unwrap();
    let cfg_path = tmp.path().join("config.toml");
    write_file(&cfg_path, "version = 1\n[profiles.default]\nvault_root = \"/tmp/v\"\n");

    let rc = ConfigLoader::load(Some(&cfg_path), None).expect("should load");
    assert_eq!(rc.active_profile, "default");
    assert!(rc.excluded_folders.is_empty());
    assert!(rc.references.enabled);
    assert_eq!(rc.references.ttl_ms, 1000);
    assert_eq!(rc.references.exclude_key, "index-exclude");
    assert!(rc.references.ignore_links_from_excluded_folders);
    assert!(rc.references.ignore_links_to_excluded_folders);
    assert_eq!(rc.logging.level, "info");
    assert!(rc.logging.file.is_none());
}

#[test]
fn load_with_profile_override_ok() {
    let tmp = tempdir().unwrap();
    let cfg_path = tmp.path().join("backref/config.toml");
    let toml = r#"
version = 1
profile = "default"

[profiles.default]
vault_root = "/tmp/def"

[profiles.work]
vault_root = "/tmp/work"
excluded_folders = ["private"]
"#;
    write_file(&cfg_path, toml);

    let rc = ConfigLoader::load(Some(&cfg_path), Some("work")).expect("should load");
    assert_eq!(rc.active_profile, "work");
    assert_eq!(rc.vault_root.display().to_string(), "/tmp/work");
    assert_eq!(rc.excluded_folders, vec!["private"]);
}

#[test]
fn logging_file_substitutes_vault_root() {
    let tmp = tempdir().unwrap();
    let cfg_path = tmp.path().join("config.toml");
    let toml = r#"
version = 1

[profiles.default]
vault_root = "/tmp/vault"

[logging]
level = "debug"
file_level = "trace"
file = "{{vault_root}}/.backref/backref.log"
"#;
    write_file(&cfg_path, toml);

    let rc = ConfigLoader::load(Some(&cfg_path), None).expect("should load");
    assert_eq!(rc.logging.level, "debug");
    assert_eq!(rc.logging.file_level.as_deref(), Some("trace"));
    assert_eq!(
        rc.logging.file.unwrap().display().to_string(),
        "/tmp/vault/.backref/backref.log"
    );
}

#[test]
fn disabled_references_are_respected() {
    let tmp = tempdir().unwrap();
    let cfg_path = tmp.path().join("config.toml");
    let toml = r#"
version = 1
[profiles.default]
vault_root = "/tmp/vault"
[references]
enabled = false
"#;
    write_file(&cfg_path, toml);

    let rc = ConfigLoader::load(Some(&cfg_path), None).expect("should load");
    assert!(!rc.references.enabled);
    assert_eq!(rc.references.ttl_ms, 1000);
}
