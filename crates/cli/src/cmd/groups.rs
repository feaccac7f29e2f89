//! Groups command: every target with its incoming reference count.

use std::path::Path;

use backref_core::index::RebuildMode;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use super::output::print_json;
use super::{open_session, resolve_format};
use crate::{GroupsArgs, OutputFormat};

#[derive(Debug, Serialize)]
struct GroupOutput {
    key: String,
    count: usize,
    excluded: usize,
    sources: usize,
    ghost: bool,
}

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "Target")]
    key: String,
    #[tabled(rename = "Refs")]
    count: usize,
    #[tabled(rename = "Sources")]
    sources: usize,
    #[tabled(rename = "Note")]
    note: String,
}

pub fn run(config: Option<&Path>, profile: Option<&str>, args: GroupsArgs) {
    let mut session = open_session(config, profile);
    session.engine.rebuild_index(RebuildMode::Full);

    let mut groups: Vec<GroupOutput> = session
        .engine
        .reference_groups()
        .iter()
        .filter_map(|(key, records)| {
            let excluded = records.iter().filter(|r| r.excluded).count();
            let count = if args.include_excluded { records.len() } else { records.len() - excluded };
            if count == 0 {
                return None;
            }
            let mut sources: Vec<&str> = records.iter().map(|r| r.source.as_str()).collect();
            sources.dedup();
            Some(GroupOutput {
                key: key.to_string(),
                count,
                excluded,
                sources: sources.len(),
                ghost: records.first().is_some_and(|r| r.is_ghost()),
            })
        })
        .collect();

    groups.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    if let Some(limit) = args.limit {
        groups.truncate(limit);
    }

    match resolve_format(args.output, args.json, args.quiet) {
        OutputFormat::Json => print_json(&groups),
        OutputFormat::Quiet => {
            for group in &groups {
                println!("{}", group.key);
            }
        }
        OutputFormat::Table => {
            if groups.is_empty() {
                println!("(no references found)");
                return;
            }
            let rows: Vec<GroupRow> = groups
                .iter()
                .map(|g| GroupRow {
                    key: g.key.clone(),
                    count: g.count,
                    sources: g.sources,
                    note: if g.ghost {
                        "unresolved".to_string()
                    } else if g.excluded > 0 {
                        format!("{} excluded", g.excluded)
                    } else {
                        String::new()
                    },
                })
                .collect();
            let table = Table::new(&rows).with(Style::rounded()).to_string();
            println!("{}", table);
            println!("\nTotal: {} targets", rows.len());
        }
    }
}
