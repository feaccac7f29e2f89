//! Memoized link resolution.

use std::collections::HashMap;
use std::sync::Arc;

use super::types::ResolvedTarget;
use crate::host::{DocumentHost, is_anchor_only, normalize_subpath, strip_markdown_extension};

/// Resolve link text against the host without caching.
///
/// An empty link path falls back to `base_path` (the containing document)
/// so `#Heading` style links point into their own document.
pub fn resolve_link<H: DocumentHost + ?Sized>(
    host: &H,
    link_text: &str,
    base_path: &str,
) -> ResolvedTarget {
    let parsed = host.resolve_link_path(link_text, base_path);
    let path = if parsed.path.is_empty() {
        strip_markdown_extension(base_path).to_string()
    } else {
        parsed.path
    };
    let subpath = normalize_subpath(&parsed.subpath);

    match host.find_document_by_resolved_path(&path) {
        Some(document) => {
            let canonical_path = format!("{}{}", document.key_path(), subpath);
            let target_ignored = host.is_path_excluded_by_folder_rule(&document.path);
            ResolvedTarget {
                canonical_path,
                subpath,
                document: Some(document),
                ghost_path: String::new(),
                target_ignored,
            }
        }
        None => ResolvedTarget {
            canonical_path: String::new(),
            subpath,
            document: None,
            ghost_path: path,
            target_ignored: false,
        },
    }
}

/// Cache of link text → resolved target for one indexing epoch.
///
/// Entries are keyed by the literal link text, so a link repeated across
/// many documents is resolved once. Anchor-only link text depends on the
/// document containing it and is keyed by (source, link text) instead.
/// Nothing is evicted until [`LinkResolutionCache::clear`].
#[derive(Debug, Default)]
pub struct LinkResolutionCache {
    by_link: HashMap<String, Arc<ResolvedTarget>>,
    by_source_anchor: HashMap<(String, String), Arc<ResolvedTarget>>,
    hits: usize,
    misses: usize,
}

impl LinkResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve<H: DocumentHost + ?Sized>(
        &mut self,
        host: &H,
        link_text: &str,
        base_path: &str,
    ) -> Arc<ResolvedTarget> {
        if is_anchor_only(link_text) {
            let key = (base_path.to_string(), link_text.to_string());
            if let Some(found) = self.by_source_anchor.get(&key) {
                self.hits += 1;
                return Arc::clone(found);
            }
            self.misses += 1;
            let resolved = Arc::new(resolve_link(host, link_text, base_path));
            self.by_source_anchor.insert(key, Arc::clone(&resolved));
            return resolved;
        }

        if let Some(found) = self.by_link.get(link_text) {
            self.hits += 1;
            return Arc::clone(found);
        }
        self.misses += 1;
        let resolved = Arc::new(resolve_link(host, link_text, base_path));
        self.by_link.insert(link_text.to_string(), Arc::clone(&resolved));
        resolved
    }

    pub fn clear(&mut self) {
        self.by_link.clear();
        self.by_source_anchor.clear();
        self.reset_counters();
    }

    pub fn reset_counters(&mut self) {
        self.hits = 0;
        self.misses = 0;
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.by_link.len() + self.by_source_anchor.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
