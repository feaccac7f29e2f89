//! The index state owned by one engine.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::groups::ReferenceGroupIndex;
use super::resolution::LinkResolutionCache;
use super::types::{ResolvedTarget, SourceRecord};
use crate::host::DocumentHost;

/// Source records, the resolution cache and the published group index.
///
/// `version` increases by one every time a rebuild publishes new groups;
/// anything derived from the groups records the version it was built
/// against.
#[derive(Debug, Default)]
pub struct IndexState {
    pub(super) sources: BTreeMap<String, SourceRecord>,
    pub(super) resolutions: LinkResolutionCache,
    groups: ReferenceGroupIndex,
    version: u64,
    built: bool,
}

impl IndexState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> &ReferenceGroupIndex {
        &self.groups
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether at least one rebuild has completed.
    pub fn is_built(&self) -> bool {
        self.built
    }

    pub fn source(&self, path: &str) -> Option<&SourceRecord> {
        self.sources.get(path)
    }

    pub fn sources(&self) -> impl Iterator<Item = &SourceRecord> {
        self.sources.values()
    }

    pub fn resolutions(&self) -> &LinkResolutionCache {
        &self.resolutions
    }

    /// Resolve link text through the shared cache.
    pub fn resolve(
        &mut self,
        host: &(impl DocumentHost + ?Sized),
        link_text: &str,
        base_path: &str,
    ) -> Arc<ResolvedTarget> {
        self.resolutions.resolve(host, link_text, base_path)
    }

    /// Drop everything learned so far. The version keeps counting.
    pub(super) fn reset(&mut self) {
        self.sources.clear();
        self.resolutions.clear();
        self.groups = ReferenceGroupIndex::new();
    }

    pub(super) fn publish(&mut self, groups: ReferenceGroupIndex) {
        self.groups = groups;
        self.version += 1;
        self.built = true;
    }
}
