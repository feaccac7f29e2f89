//! Note content extraction: references, headings, block ids, opt-out flag.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::frontmatter;
use crate::host::{
    DocumentStructure, Position, RawReference, ReferenceKind, StructureBlock,
    StructureHeading, StructureLink,
};

/// Default front matter key that opts a note out of being counted.
pub const DEFAULT_EXCLUDE_KEY: &str = "index-exclude";

/// Extracted information from a note file.
#[derive(Debug, Clone, Default)]
pub struct ExtractedNote {
    /// Outgoing references in document order.
    pub references: Vec<RawReference>,
    /// Blocks, headings, links and embeds.
    pub structure: DocumentStructure,
    /// Front matter carries a truthy exclude key.
    pub excluded: bool,
}

// Matches [[target]], [[target|alias]], ![[target#section|alias]]
static WIKILINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(!?)\[\[([^\]|]+)(?:\|([^\]]+))?\]\]").unwrap());

// Matches [text](url) and ![alt](url)
static MARKDOWN_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(!?)\[([^\]]*)\]\(([^)\s]+)\)").unwrap());

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})[ \t]+(.+?)(?:[ \t]+#+)?[ \t]*$").unwrap());

// ^block-id at the end of a line, either alone or after content
static BLOCK_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)\^([A-Za-z0-9-]+)[ \t]*$").unwrap());

/// Extract references and structure from note content.
///
/// Front matter that fails to parse is treated as absent; the note is still
/// indexed.
pub fn extract_note(content: &str, exclude_key: &str) -> ExtractedNote {
    let (excluded, body_offset) = match frontmatter::parse(content) {
        Ok(parsed) => (
            parsed.frontmatter.as_ref().is_some_and(|fm| fm.is_truthy(exclude_key)),
            parsed.body_offset,
        ),
        Err(e) => {
            tracing::debug!("ignoring unparsable front matter: {e}");
            (false, skip_frontmatter_block(content))
        }
    };

    let mut note = ExtractedNote { excluded, ..Default::default() };
    let mut line_number = content[..body_offset].matches('\n').count() as u32;
    let mut line_offset = body_offset as u32;
    let mut in_fence = false;

    for raw_line in content[body_offset..].split_inclusive('\n') {
        let line = raw_line.trim_end_matches(['\n', '\r']);
        let trimmed = line.trim_start();

        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
        } else if !in_fence {
            extract_line(&mut note, line, line_number, line_offset);
        }

        line_number += 1;
        line_offset += raw_line.len() as u32;
    }

    note
}

fn extract_line(note: &mut ExtractedNote, line: &str, line_number: u32, line_offset: u32) {
    let span = |start: usize, end: usize| {
        Position::on_line(line_number, line_offset, start as u32, end as u32)
    };

    if let Some(cap) = HEADING_RE.captures(line) {
        let whole = cap.get(0).map_or(0..0, |m| m.range());
        note.structure.headings.push(StructureHeading {
            text: cap[2].trim().to_string(),
            level: cap[1].len() as u8,
            position: span(whole.start, whole.end),
        });
    }

    if let Some(cap) = BLOCK_ID_RE.captures(line) {
        note.structure.blocks.push(StructureBlock {
            id: cap[1].to_string(),
            position: span(0, line.len()),
        });
    }

    for cap in WIKILINK_RE.captures_iter(line) {
        let target = cap[2].trim();
        let alias = cap.get(3).map(|m| m.as_str().to_string());
        push_reference(note, &cap, target, alias, span);
    }

    for cap in MARKDOWN_LINK_RE.captures_iter(line) {
        let url = &cap[3];
        if !is_local_note_reference(url) {
            continue;
        }
        let target = url.replace("%20", " ");
        let text = cap.get(2).map(|m| m.as_str().to_string()).filter(|t| !t.is_empty());
        push_reference(note, &cap, &target, text, span);
    }
}

fn push_reference(
    note: &mut ExtractedNote,
    cap: &Captures<'_>,
    target: &str,
    display_text: Option<String>,
    span: impl Fn(usize, usize) -> Position,
) {
    let Some(whole) = cap.get(0) else { return };
    let kind =
        if cap.get(1).is_some_and(|m| !m.is_empty()) { ReferenceKind::Embed } else { ReferenceKind::Link };
    let position = span(whole.start(), whole.end());

    let entry = StructureLink {
        link: target.to_string(),
        original: whole.as_str().to_string(),
        position,
    };
    match kind {
        ReferenceKind::Link => note.structure.links.push(entry),
        ReferenceKind::Embed => note.structure.embeds.push(entry),
    }

    note.references.push(RawReference {
        link: target.to_string(),
        display_text,
        original: whole.as_str().to_string(),
        kind,
        position,
    });
}

/// Local `.md` targets and extension-less relative paths; never URLs or
/// assets.
fn is_local_note_reference(url: &str) -> bool {
    let lower = url.to_lowercase();
    if lower.contains("://") || lower.starts_with("mailto:") {
        return false;
    }
    let path = lower.split('#').next().unwrap_or("");
    if path.ends_with(".md") {
        return true;
    }
    // Pure anchors and names without an extension
    !path.rsplit('/').next().unwrap_or("").contains('.')
}

/// Byte offset just past a `---` block at the start of the content, used
/// when the block is not valid YAML.
fn skip_frontmatter_block(content: &str) -> usize {
    let mut lines = content.split_inclusive('\n');
    let Some(first) = lines.next() else { return 0 };
    if first.trim() != "---" {
        return 0;
    }
    let mut offset = first.len();
    for line in lines {
        offset += line.len();
        if line.trim() == "---" {
            return offset;
        }
    }
    0
}
