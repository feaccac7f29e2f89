//! The document host: everything the engine asks of the surrounding system.
//!
//! A host owns raw metadata extraction. It enumerates every reference in
//! the corpus, reports cheap file fingerprints, looks documents up by link
//! path and answers the two exclusion questions. The engine never reads
//! document text itself.

pub mod link;
pub mod memory;

pub use link::{
    LinkPath, find_by_linkpath, heading_anchor, heading_key, is_anchor_only, normalize_heading,
    normalize_subpath, parse_link_text, strip_markdown_extension,
};
pub use memory::{MemoryDocument, MemoryHost};

use serde::{Deserialize, Serialize};

/// A point inside a document. All fields are zero-based; `col` and
/// `offset` count bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Location {
    pub line: u32,
    pub col: u32,
    pub offset: u32,
}

/// Span of an item inside its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub start: Location,
    pub end: Location,
}

impl Position {
    /// Span covering `start_col..end_col` on one line that begins at
    /// byte `line_offset`.
    pub fn on_line(line: u32, line_offset: u32, start_col: u32, end_col: u32) -> Self {
        Self {
            start: Location { line, col: start_col, offset: line_offset + start_col },
            end: Location { line, col: end_col, offset: line_offset + end_col },
        }
    }
}

/// Change-detection fingerprint: creation time, modification time (both
/// milliseconds since the epoch) and size in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Fingerprint {
    pub created: i64,
    pub modified: i64,
    pub size: u64,
}

impl Fingerprint {
    pub fn new(created: i64, modified: i64, size: u64) -> Self {
        Self { created, modified, size }
    }
}

/// Whether a reference points at its target or pulls it inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    /// `[[note]]` or `[text](note.md)`
    Link,
    /// `![[note]]`
    Embed,
}

impl ReferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Link => "link",
            Self::Embed => "embed",
        }
    }
}

/// One reference occurrence as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReference {
    /// Link text without alias, e.g. `Folder/Note#Heading`.
    pub link: String,
    /// Alias or markdown link text, if the author wrote one.
    pub display_text: Option<String>,
    /// The markup exactly as written.
    pub original: String,
    pub kind: ReferenceKind,
    pub position: Position,
}

impl RawReference {
    /// A wikilink occurrence with no alias.
    pub fn link(link: impl Into<String>) -> Self {
        let link = link.into();
        Self {
            original: format!("[[{link}]]"),
            link,
            display_text: None,
            kind: ReferenceKind::Link,
            position: Position::default(),
        }
    }

    /// An embed occurrence.
    pub fn embed(link: impl Into<String>) -> Self {
        let link = link.into();
        Self {
            original: format!("![[{link}]]"),
            link,
            display_text: None,
            kind: ReferenceKind::Embed,
            position: Position::default(),
        }
    }

    pub fn with_display_text(mut self, text: impl Into<String>) -> Self {
        self.display_text = Some(text.into());
        self
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }
}

/// A document that exists in the corpus.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentHandle {
    /// Path relative to the corpus root, with extension.
    pub path: String,
    /// File name without extension.
    pub basename: String,
}

impl DocumentHandle {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = path.rsplit('/').next().unwrap_or(&path);
        let basename = match name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem.to_string(),
            _ => name.to_string(),
        };
        Self { path, basename }
    }

    /// Path with a trailing `.md` removed; the prefix of every key that
    /// targets this document.
    pub fn key_path(&self) -> &str {
        strip_markdown_extension(&self.path)
    }
}

/// A block carrying an explicit `^id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureBlock {
    pub id: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureHeading {
    pub text: String,
    pub level: u8,
    pub position: Position,
}

/// An outgoing link or embed as it appears in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureLink {
    pub link: String,
    pub original: String,
    pub position: Position,
}

/// Structural metadata of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentStructure {
    pub blocks: Vec<StructureBlock>,
    pub headings: Vec<StructureHeading>,
    pub links: Vec<StructureLink>,
    pub embeds: Vec<StructureLink>,
}

/// Collaborator contract between the engine and the host's metadata store.
///
/// All methods are synchronous and must not fail; a host that cannot
/// answer returns `None`/`false`/empty and the engine degrades accordingly.
pub trait DocumentHost {
    /// Call `visit(source_path, reference)` once per reference occurrence
    /// in the corpus. Order across documents is unspecified; order within
    /// one document must be stable.
    fn iterate_all_references(&self, visit: &mut dyn FnMut(&str, &RawReference));

    /// Current fingerprint of `path`, or `None` if the host has no such file.
    fn file_stat(&self, path: &str) -> Option<Fingerprint>;

    /// Split link text into path and anchor. No existence check.
    fn resolve_link_path(&self, link_text: &str, _base_path: &str) -> LinkPath {
        parse_link_text(link_text)
    }

    /// First document matching a link path, e.g. `Note` or `Folder/Note`.
    fn find_document_by_resolved_path(&self, path: &str) -> Option<DocumentHandle>;

    /// Folder-level exclusion rule.
    fn is_path_excluded_by_folder_rule(&self, path: &str) -> bool;

    /// Document-level opt-out, typically a front matter flag.
    fn is_document_excluded_by_content_flag(&self, path: &str) -> bool;

    fn document_structure(&self, path: &str) -> Option<DocumentStructure>;

    /// Every heading text in the corpus.
    fn all_known_heading_strings(&self) -> Vec<String>;
}
