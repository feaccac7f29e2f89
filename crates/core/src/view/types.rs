use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::host::{DocumentHandle, Position};
use crate::index::ReferenceRecord;

/// One block, heading, link or embed of a document, with the references
/// that point at its key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewItem {
    pub key: String,
    pub position: Position,
    /// Human-readable label. For links into a heading this is the matching
    /// heading text when one is known.
    pub display_label: Option<String>,
    pub references: Vec<Arc<ReferenceRecord>>,
}

impl ViewItem {
    pub fn count(&self) -> usize {
        self.references.len()
    }

    /// References whose target did not opt out.
    pub fn included_count(&self) -> usize {
        self.references.iter().filter(|r| !r.excluded).count()
    }
}

/// Snapshot of one document's structure annotated with incoming references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentView {
    pub path: String,
    pub basename: String,
    /// Index version the view was built against; 0 for empty views.
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub blocks: Vec<ViewItem>,
    pub headings: Vec<ViewItem>,
    pub links: Vec<ViewItem>,
    pub embeds: Vec<ViewItem>,
}

impl DocumentView {
    /// A view with no items.
    pub fn empty(path: &str) -> Self {
        Self {
            path: path.to_string(),
            basename: DocumentHandle::new(path).basename,
            version: 0,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            blocks: Vec::new(),
            headings: Vec::new(),
            links: Vec::new(),
            embeds: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items().next().is_none()
    }

    /// All items: blocks, then headings, links and embeds.
    pub fn items(&self) -> impl Iterator<Item = &ViewItem> {
        self.blocks.iter().chain(&self.headings).chain(&self.links).chain(&self.embeds)
    }

    /// References pointing into this document's blocks and headings.
    pub fn incoming_references(&self) -> usize {
        self.blocks.iter().chain(&self.headings).map(ViewItem::count).sum()
    }

    pub fn total_references(&self) -> usize {
        self.items().map(ViewItem::count).sum()
    }
}
