//! The reference engine: index state, view cache and settings behind one
//! owner.

use std::sync::Arc;

use chrono::Duration;

use crate::clock::{Clock, SystemClock};
use crate::config::ReferencesConfig;
use crate::host::DocumentHost;
use crate::index::{
    ExclusionSettings, IndexBuilder, IndexState, IndexStats, RebuildMode, ReferenceGroupIndex,
};
use crate::view::{DocumentView, DocumentViewProjector};

static EMPTY_GROUPS: ReferenceGroupIndex = ReferenceGroupIndex::new();

pub const DEFAULT_TTL_MS: i64 = 1000;

/// Runtime settings of a [`ReferenceEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineSettings {
    /// When off, rebuilds do nothing and every query answers empty.
    pub enabled: bool,
    /// Maximum age of a cached document view.
    pub ttl: Duration,
    pub exclusion: ExclusionSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: Duration::milliseconds(DEFAULT_TTL_MS),
            exclusion: ExclusionSettings::default(),
        }
    }
}

impl From<&ReferencesConfig> for EngineSettings {
    fn from(config: &ReferencesConfig) -> Self {
        let ttl = i64::try_from(config.ttl_ms)
            .ok()
            .and_then(Duration::try_milliseconds)
            .unwrap_or(Duration::MAX);
        Self {
            enabled: config.enabled,
            ttl,
            exclusion: ExclusionSettings {
                ignore_links_from_excluded_folders: config.ignore_links_from_excluded_folders,
                ignore_links_to_excluded_folders: config.ignore_links_to_excluded_folders,
            },
        }
    }
}

/// Owns a document host and everything derived from it.
///
/// Every mutating operation takes `&mut self`, so a rebuild can never
/// interleave with another rebuild or with a view query.
pub struct ReferenceEngine<H, C = SystemClock> {
    host: H,
    clock: C,
    settings: EngineSettings,
    state: IndexState,
    views: DocumentViewProjector,
}

impl<H: DocumentHost> ReferenceEngine<H> {
    pub fn new(host: H, settings: EngineSettings) -> Self {
        Self::with_clock(host, settings, SystemClock)
    }
}

impl<H: DocumentHost, C: Clock> ReferenceEngine<H, C> {
    pub fn with_clock(host: H, settings: EngineSettings, clock: C) -> Self {
        Self {
            host,
            clock,
            settings,
            state: IndexState::new(),
            views: DocumentViewProjector::new(),
        }
    }

    /// Run one indexing pass. Does nothing while indexing is disabled.
    pub fn rebuild_index(&mut self, mode: RebuildMode) -> IndexStats {
        if !self.settings.enabled {
            tracing::debug!(mode = %mode, "indexing disabled; rebuild skipped");
            return IndexStats { mode, ..Default::default() };
        }
        IndexBuilder::new(&self.host, &mut self.state, self.settings.exclusion).rebuild(mode)
    }

    /// The published group index; empty while indexing is disabled.
    pub fn reference_groups(&self) -> &ReferenceGroupIndex {
        if self.settings.enabled { self.state.groups() } else { &EMPTY_GROUPS }
    }

    /// Annotated view of one document.
    ///
    /// Returns the cached view while it is current and within the TTL,
    /// otherwise projects a new one. A view requested before the first
    /// rebuild triggers a full rebuild.
    pub fn document_view(&mut self, path: &str) -> Arc<DocumentView> {
        if !self.settings.enabled {
            return Arc::new(DocumentView::empty(path));
        }

        let now = self.clock.now();
        if let Some(view) = self.views.cached(path, self.state.version(), now, self.settings.ttl) {
            return view;
        }

        let Some(structure) = self.host.document_structure(path) else {
            tracing::debug!(path, "no structure for document; returning empty view");
            return Arc::new(DocumentView::empty(path));
        };

        if !self.state.is_built() {
            tracing::debug!("view requested before the first rebuild");
            self.rebuild_index(RebuildMode::Full);
        }

        self.views.project(&self.host, &mut self.state, path, &structure, now)
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Turn indexing on or off. Cached views are dropped either way.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.settings.enabled != enabled {
            self.settings.enabled = enabled;
            self.views.clear();
        }
    }

    pub fn set_ttl(&mut self, ttl: Duration) {
        self.settings.ttl = ttl;
    }

    /// Change the folder-rule settings. They take effect on the next full
    /// rebuild, since unchanged sources keep their records.
    pub fn set_exclusion(&mut self, exclusion: ExclusionSettings) {
        self.settings.exclusion = exclusion;
    }

    pub fn invalidate_views(&mut self) {
        self.views.clear();
    }

    /// Number of rebuilds published so far.
    pub fn version(&self) -> u64 {
        self.state.version()
    }

    pub fn is_built(&self) -> bool {
        self.state.is_built()
    }

    pub fn state(&self) -> &IndexState {
        &self.state
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host. Changes become visible on the next
    /// rebuild.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn into_host(self) -> H {
        self.host
    }
}
