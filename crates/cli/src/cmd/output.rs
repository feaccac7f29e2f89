//! Shared output formatting for query commands.

use backref_core::index::ReferenceRecord;
use backref_core::view::ViewItem;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

/// Formatted reference record for JSON output.
#[derive(Debug, Serialize)]
pub struct RecordOutput {
    pub source: String,
    pub key: String,
    pub kind: String,
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_text: Option<String>,
    /// One-based line number in the source note.
    pub line: u32,
    pub column: u32,
    pub ghost: bool,
    pub excluded: bool,
}

impl From<&ReferenceRecord> for RecordOutput {
    fn from(record: &ReferenceRecord) -> Self {
        Self {
            source: record.source.clone(),
            key: record.key.clone(),
            kind: record.kind.as_str().to_string(),
            link: record.raw_link.clone(),
            display_text: Some(record.display_text.clone()).filter(|t| !t.is_empty()),
            line: record.position.start.line + 1,
            column: record.position.start.col + 1,
            ghost: record.is_ghost(),
            excluded: record.excluded,
        }
    }
}

/// Formatted view item for JSON output.
#[derive(Debug, Serialize)]
pub struct ItemOutput {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub line: u32,
    pub count: usize,
    pub sources: Vec<String>,
}

impl From<&ViewItem> for ItemOutput {
    fn from(item: &ViewItem) -> Self {
        let mut sources: Vec<String> = item.references.iter().map(|r| r.source.clone()).collect();
        sources.dedup();
        Self {
            key: item.key.clone(),
            label: item.display_label.clone(),
            line: item.position.start.line + 1,
            count: item.count(),
            sources,
        }
    }
}

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Line")]
    line: u32,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Link")]
    link: String,
    #[tabled(rename = "Flags")]
    flags: String,
}

/// Print records as a table.
pub fn print_records_table(records: &[RecordOutput]) {
    if records.is_empty() {
        println!("(no references found)");
        return;
    }

    let rows: Vec<RecordRow> = records
        .iter()
        .map(|r| {
            let mut flags = Vec::new();
            if r.ghost {
                flags.push("ghost");
            }
            if r.excluded {
                flags.push("excluded");
            }
            RecordRow {
                source: r.source.clone(),
                line: r.line,
                kind: r.kind.clone(),
                link: match &r.display_text {
                    Some(text) => format!("{} | {}", r.link, text),
                    None => r.link.clone(),
                },
                flags: flags.join(","),
            }
        })
        .collect();

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{}", table);
    println!("\nTotal: {} references", records.len());
}

/// Print any serializable value as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            std::process::exit(1);
        }
    }
}
