//! Refs command: the references behind one target key.

use std::path::Path;

use backref_core::host::strip_markdown_extension;
use backref_core::index::RebuildMode;

use super::output::{RecordOutput, print_json, print_records_table};
use super::{open_session, resolve_format};
use crate::{OutputFormat, RefsArgs};

pub fn run(config: Option<&Path>, profile: Option<&str>, args: RefsArgs) {
    let mut session = open_session(config, profile);
    session.engine.rebuild_index(RebuildMode::Full);

    let key = normalize_key(&args.key);
    let records: Vec<RecordOutput> = session
        .engine
        .reference_groups()
        .get(&key)
        .iter()
        .map(|r| RecordOutput::from(&**r))
        .collect();

    match resolve_format(args.output, args.json, args.quiet) {
        OutputFormat::Table => {
            println!("=== References to {} ===", key);
            println!();
            print_records_table(&records);
        }
        OutputFormat::Json => print_json(&records),
        OutputFormat::Quiet => {
            for record in &records {
                println!("{}:{}", record.source, record.line);
            }
        }
    }
}

/// Accept `./Note.md#Heading` as well as `Note#Heading`.
fn normalize_key(key: &str) -> String {
    let key = key.strip_prefix("./").unwrap_or(key);
    match key.split_once('#') {
        Some((path, anchor)) => format!("{}#{}", strip_markdown_extension(path), anchor),
        None => strip_markdown_extension(key).to_string(),
    }
}
