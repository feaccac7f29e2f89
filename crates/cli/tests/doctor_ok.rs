use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

fn write_file(path: &PathBuf, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn doctor_reads_provided_config_path() {
    let tmp = tempdir().unwrap();
    let vault = tmp.path().join("vault");
    write_file(&vault.join("Note.md"), "# Note\n");
    let cfg = tmp.path().join("config.toml");
    let toml = format!(
        r#"
version = 1
profile = "default"

[profiles.default]
vault_root = "{}"
excluded_folders = ["templates"]

[references]
ttl_ms = 500
"#,
        vault.display()
    );
    write_file(&cfg, &toml);

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("bref"));
    cmd.args(["doctor", "--config", cfg.to_str().unwrap()]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("OK   bref doctor"))
        .stdout(predicate::str::contains("profile: default"))
        .stdout(predicate::str::contains(format!("vault_root: {}", vault.display())))
        .stdout(predicate::str::contains("excluded_folders: [templates]"))
        .stdout(predicate::str::contains("references.ttl_ms: 500"))
        .stdout(predicate::str::contains("vault: 1 notes"));
}

#[test]
fn doctor_uses_xdg_default_when_present() {
    let tmp = tempdir().unwrap();
    let vault = tmp.path().join("notes");
    fs::create_dir_all(&vault).unwrap();
    let cfg_path = tmp.path().join("backref").join("config.toml");
    write_file(
        &cfg_path,
        &format!(
            r#"
version = 1
profile = "default"
[profiles.default]
vault_root = "{}"
"#,
            vault.display()
        ),
    );

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("bref"));
    cmd.env("XDG_CONFIG_HOME", tmp.path());
    cmd.arg("doctor");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("OK   bref doctor"))
        .stdout(predicate::str::contains("references.exclude_key: index-exclude"))
        .stdout(predicate::str::contains("vault: 0 notes"));
}
