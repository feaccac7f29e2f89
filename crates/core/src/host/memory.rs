//! In-memory document host.
//!
//! Holds the corpus as plain data. Used by embedders that already have
//! parsed metadata, by [`crate::vault::VaultHost`] as its backing store, and
//! throughout the tests.

use std::collections::BTreeMap;

use super::{
    DocumentHandle, DocumentHost, DocumentStructure, Fingerprint, Position, RawReference,
    ReferenceKind, StructureBlock, StructureHeading, StructureLink, find_by_linkpath,
};
use crate::vault::extractor::{DEFAULT_EXCLUDE_KEY, ExtractedNote, extract_note};

/// One document of a [`MemoryHost`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryDocument {
    pub fingerprint: Fingerprint,
    /// Outgoing references in document order.
    pub references: Vec<RawReference>,
    pub structure: DocumentStructure,
    /// Opted out of being counted as a reference target.
    pub content_excluded: bool,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from markdown text.
    pub fn from_markdown(content: &str, exclude_key: &str) -> Self {
        Self::from_note(
            extract_note(content, exclude_key),
            Fingerprint::new(0, 0, content.len() as u64),
        )
    }

    pub fn from_note(note: ExtractedNote, fingerprint: Fingerprint) -> Self {
        Self {
            fingerprint,
            references: note.references,
            structure: note.structure,
            content_excluded: note.excluded,
        }
    }

    /// Add an outgoing reference; it is also listed in the structure.
    pub fn with_reference(mut self, reference: RawReference) -> Self {
        let entry = StructureLink {
            link: reference.link.clone(),
            original: reference.original.clone(),
            position: reference.position,
        };
        match reference.kind {
            ReferenceKind::Link => self.structure.links.push(entry),
            ReferenceKind::Embed => self.structure.embeds.push(entry),
        }
        self.references.push(reference);
        self
    }

    pub fn with_heading(mut self, text: impl Into<String>, level: u8) -> Self {
        self.structure.headings.push(StructureHeading {
            text: text.into(),
            level,
            position: Position::default(),
        });
        self
    }

    pub fn with_block(mut self, id: impl Into<String>) -> Self {
        self.structure.blocks.push(StructureBlock { id: id.into(), position: Position::default() });
        self
    }

    pub fn with_fingerprint(mut self, fingerprint: Fingerprint) -> Self {
        self.fingerprint = fingerprint;
        self
    }

    pub fn excluded(mut self) -> Self {
        self.content_excluded = true;
        self
    }
}

/// A corpus held entirely in memory, keyed by `/`-separated path.
#[derive(Debug, Clone)]
pub struct MemoryHost {
    documents: BTreeMap<String, MemoryDocument>,
    excluded_folders: Vec<String>,
    exclude_key: String,
    tick: i64,
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryHost {
    pub fn new() -> Self {
        Self {
            documents: BTreeMap::new(),
            excluded_folders: Vec::new(),
            exclude_key: DEFAULT_EXCLUDE_KEY.to_string(),
            tick: 0,
        }
    }

    /// Front matter key read by [`MemoryHost::write_note`].
    pub fn with_exclude_key(mut self, key: impl Into<String>) -> Self {
        self.exclude_key = key.into();
        self
    }

    /// Treat everything under `folder` as excluded by folder rule.
    pub fn exclude_folder(&mut self, folder: impl Into<String>) {
        let folder = folder.into();
        let folder = folder.trim_matches('/').to_string();
        if !folder.is_empty() && !self.excluded_folders.contains(&folder) {
            self.excluded_folders.push(folder);
        }
    }

    pub fn excluded_folders(&self) -> &[String] {
        &self.excluded_folders
    }

    /// Store a document exactly as given.
    pub fn insert(&mut self, path: impl Into<String>, document: MemoryDocument) {
        self.documents.insert(path.into(), document);
    }

    /// Parse markdown and store it, giving it a fresh modification stamp so
    /// the change is visible to fingerprint comparison.
    pub fn write_note(&mut self, path: impl Into<String>, content: &str) {
        let path = path.into();
        self.tick += 1;
        let created = self.documents.get(&path).map_or(self.tick, |d| d.fingerprint.created);
        let document = MemoryDocument::from_markdown(content, &self.exclude_key)
            .with_fingerprint(Fingerprint::new(created, self.tick, content.len() as u64));
        self.documents.insert(path, document);
    }

    /// Bump a document's modification stamp without changing its content.
    pub fn touch(&mut self, path: &str) -> bool {
        self.tick += 1;
        let tick = self.tick;
        match self.documents.get_mut(path) {
            Some(doc) => {
                doc.fingerprint.modified = tick;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, path: &str) -> Option<MemoryDocument> {
        self.documents.remove(path)
    }

    pub fn get(&self, path: &str) -> Option<&MemoryDocument> {
        self.documents.get(path)
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut MemoryDocument> {
        self.documents.get_mut(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

fn in_folder(path: &str, folder: &str) -> bool {
    path.strip_prefix(folder).is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

impl DocumentHost for MemoryHost {
    fn iterate_all_references(&self, visit: &mut dyn FnMut(&str, &RawReference)) {
        for (path, document) in &self.documents {
            for reference in &document.references {
                visit(path, reference);
            }
        }
    }

    fn file_stat(&self, path: &str) -> Option<Fingerprint> {
        self.documents.get(path).map(|d| d.fingerprint)
    }

    fn find_document_by_resolved_path(&self, path: &str) -> Option<DocumentHandle> {
        find_by_linkpath(self.paths(), path).map(DocumentHandle::new)
    }

    fn is_path_excluded_by_folder_rule(&self, path: &str) -> bool {
        self.excluded_folders.iter().any(|folder| in_folder(path, folder))
    }

    fn is_document_excluded_by_content_flag(&self, path: &str) -> bool {
        self.documents.get(path).is_some_and(|d| d.content_excluded)
    }

    fn document_structure(&self, path: &str) -> Option<DocumentStructure> {
        self.documents.get(path).map(|d| d.structure.clone())
    }

    fn all_known_heading_strings(&self) -> Vec<String> {
        self.documents
            .values()
            .flat_map(|d| d.structure.headings.iter().map(|h| h.text.clone()))
            .collect()
    }
}
