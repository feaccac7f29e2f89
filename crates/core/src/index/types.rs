//! Index data types: resolved targets, reference records, source records.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::host::{DocumentHandle, Fingerprint, Position, RawReference, ReferenceKind};

/// Outcome of resolving one piece of link text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    /// Target document path without `.md`, plus the normalized anchor.
    /// Empty for ghost targets.
    pub canonical_path: String,
    /// Normalized anchor (`#Heading`, `#^block`) or empty.
    pub subpath: String,
    /// The target document, or `None` for a ghost link.
    pub document: Option<DocumentHandle>,
    /// The unresolved link path for ghost targets, empty otherwise.
    pub ghost_path: String,
    /// The target sits under a folder excluded by folder rule.
    pub target_ignored: bool,
}

impl ResolvedTarget {
    /// Canonical key records pointing here are grouped under.
    pub fn key(&self) -> &str {
        if self.document.is_some() { &self.canonical_path } else { &self.ghost_path }
    }

    pub fn is_ghost(&self) -> bool {
        self.document.is_none()
    }
}

/// "`source` refers to `key` at `position`": the atomic indexed fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    /// Alias or link text as the author wrote it; empty if none.
    pub display_text: String,
    /// Canonical target key.
    pub key: String,
    /// Where the reference sits in its source document.
    pub position: Position,
    /// Target document, `None` for ghost links.
    pub resolved: Option<DocumentHandle>,
    /// Unresolved path of a ghost link, empty otherwise.
    pub ghost_path: String,
    /// Link text as enumerated by the host.
    pub raw_link: String,
    /// Path of the document containing the reference.
    pub source: String,
    pub kind: ReferenceKind,
    /// The target opted out through document metadata. Excluded records
    /// stay in the index.
    pub excluded: bool,
}

impl ReferenceRecord {
    pub fn new(source: &str, reference: &RawReference, target: &ResolvedTarget) -> Self {
        Self {
            display_text: reference.display_text.clone().unwrap_or_default(),
            key: target.key().to_string(),
            position: reference.position,
            resolved: target.document.clone(),
            ghost_path: target.ghost_path.clone(),
            raw_link: reference.link.clone(),
            source: source.to_string(),
            kind: reference.kind,
            excluded: false,
        }
    }

    pub fn is_ghost(&self) -> bool {
        self.resolved.is_none()
    }
}

/// Everything the index knows about one referencing document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    pub path: String,
    /// Fingerprint observed when the references were last scanned.
    pub fingerprint: Fingerprint,
    /// The document sits under a folder excluded by folder rule.
    pub ignored: bool,
    /// References authored by this document, in document order.
    pub references: Vec<Arc<ReferenceRecord>>,
}
