//! Builds and caches [`DocumentView`]s.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use super::types::{DocumentView, ViewItem};
use crate::host::{
    DocumentHandle, DocumentHost, DocumentStructure, Position, StructureLink, heading_anchor,
    heading_key, normalize_heading, strip_markdown_extension,
};
use crate::index::{IndexState, ReferenceGroupIndex};

/// View cache, one entry per recently viewed document.
#[derive(Debug, Default)]
pub struct DocumentViewProjector {
    views: HashMap<String, Arc<DocumentView>>,
    /// Creation time of the newest view per document. Survives
    /// invalidation so timestamps never repeat.
    stamps: HashMap<String, DateTime<Utc>>,
}

impl DocumentViewProjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached view for `path`, if it was built against `version` and
    /// is younger than `ttl`.
    pub fn cached(
        &self,
        path: &str,
        version: u64,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Option<Arc<DocumentView>> {
        let view = self.views.get(path)?;
        if view.version != version {
            return None;
        }
        let fresh = view.created_at.checked_add_signed(ttl).is_none_or(|expiry| now < expiry);
        fresh.then(|| Arc::clone(view))
    }

    /// Build a view of `path` from the current index and cache it.
    pub fn project<H: DocumentHost + ?Sized>(
        &mut self,
        host: &H,
        state: &mut IndexState,
        path: &str,
        structure: &DocumentStructure,
        now: DateTime<Utc>,
    ) -> Arc<DocumentView> {
        let base = strip_markdown_extension(path);

        // Resolve first: the cache lives in the index state.
        let mut resolve_all = |links: &[StructureLink]| -> Vec<String> {
            links.iter().map(|l| state.resolve(host, &l.link, path).key().to_string()).collect()
        };
        let link_keys = resolve_all(&structure.links);
        let embed_keys = resolve_all(&structure.embeds);

        let needs_headings = link_keys.iter().chain(&embed_keys).any(|k| heading_anchor(k).is_some());
        let known_headings = if needs_headings { host.all_known_heading_strings() } else { Vec::new() };

        let groups = state.groups();
        let item = |key: String, position: Position, display_label: Option<String>| ViewItem {
            references: groups.get(&key).to_vec(),
            key,
            position,
            display_label,
        };

        let blocks = structure
            .blocks
            .iter()
            .map(|b| item(format!("{base}#^{}", b.id), b.position, Some(format!("^{}", b.id))))
            .collect();
        let headings = structure
            .headings
            .iter()
            .map(|h| {
                let label = format!("{} {}", "#".repeat(usize::from(h.level)), h.text);
                item(heading_key(base, &h.text), h.position, Some(label))
            })
            .collect();
        let links = reference_items(&structure.links, link_keys, &known_headings, groups);
        let embeds = reference_items(&structure.embeds, embed_keys, &known_headings, groups);

        let created_at = match self.stamps.get(path) {
            Some(&previous) if now <= previous => previous + Duration::milliseconds(1),
            _ => now,
        };
        self.stamps.insert(path.to_string(), created_at);

        let view = Arc::new(DocumentView {
            path: path.to_string(),
            basename: DocumentHandle::new(path).basename,
            version: state.version(),
            created_at,
            blocks,
            headings,
            links,
            embeds,
        });
        self.views.insert(path.to_string(), Arc::clone(&view));
        tracing::trace!(path, version = view.version, "document view projected");
        view
    }

    pub fn invalidate(&mut self, path: &str) {
        self.views.remove(path);
    }

    pub fn clear(&mut self) {
        self.views.clear();
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

fn reference_items(
    links: &[StructureLink],
    keys: Vec<String>,
    known_headings: &[String],
    groups: &ReferenceGroupIndex,
) -> Vec<ViewItem> {
    links
        .iter()
        .zip(keys)
        .map(|(link, key)| {
            let display_label = match heading_anchor(&key) {
                Some(anchor) => {
                    known_headings.iter().find(|h| normalize_heading(h) == anchor).cloned()
                }
                None => Some(link.original.clone()),
            };
            ViewItem {
                references: groups.get(&key).to_vec(),
                key,
                position: link.position,
                display_label,
            }
        })
        .collect()
}
