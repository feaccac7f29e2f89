//! View command: one note annotated with reference counts.

use std::path::Path;

use backref_core::host::DocumentHost;
use backref_core::view::{DocumentView, ViewItem};
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use super::open_session;
use super::output::{ItemOutput, print_json};
use crate::{OutputFormat, ViewArgs};

#[derive(Debug, Serialize)]
struct ViewOutput {
    path: String,
    version: u64,
    created_at: String,
    blocks: Vec<ItemOutput>,
    headings: Vec<ItemOutput>,
    links: Vec<ItemOutput>,
    embeds: Vec<ItemOutput>,
}

impl From<&DocumentView> for ViewOutput {
    fn from(view: &DocumentView) -> Self {
        let items = |items: &[ViewItem]| -> Vec<ItemOutput> {
            items.iter().map(ItemOutput::from).collect()
        };
        Self {
            path: view.path.clone(),
            version: view.version,
            created_at: view.created_at.to_rfc3339(),
            blocks: items(&view.blocks),
            headings: items(&view.headings),
            links: items(&view.links),
            embeds: items(&view.embeds),
        }
    }
}

#[derive(Tabled)]
struct ItemRow {
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Line")]
    line: u32,
    #[tabled(rename = "Item")]
    label: String,
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Refs")]
    count: usize,
}

pub fn run(config: Option<&Path>, profile: Option<&str>, args: ViewArgs) {
    let mut session = open_session(config, profile);
    let path = args.path.strip_prefix("./").unwrap_or(&args.path);

    if session.engine.host().file_stat(path).is_none() {
        eprintln!("Note not found in vault: {}", path);
        std::process::exit(1);
    }

    let view = session.engine.document_view(path);

    if args.json || matches!(args.output, OutputFormat::Json) {
        print_json(&ViewOutput::from(view.as_ref()));
        return;
    }

    let sections: [(&'static str, &[ViewItem]); 4] = [
        ("block", &view.blocks),
        ("heading", &view.headings),
        ("link", &view.links),
        ("embed", &view.embeds),
    ];
    let rows: Vec<ItemRow> = sections
        .iter()
        .flat_map(|&(kind, items)| {
            items.iter().map(move |item| ItemRow {
                kind,
                line: item.position.start.line + 1,
                label: item.display_label.clone().unwrap_or_default(),
                key: item.key.clone(),
                count: item.count(),
            })
        })
        .collect();

    if matches!(args.output, OutputFormat::Quiet) {
        for row in &rows {
            println!("{}\t{}", row.key, row.count);
        }
        return;
    }

    println!("=== {} ===", view.path);
    println!();
    if rows.is_empty() {
        println!("(no blocks, headings or links)");
        return;
    }
    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{}", table);
    println!("\nIncoming references: {}", view.incoming_references());
}
