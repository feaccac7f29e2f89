//! Index building orchestration.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::exclusion::{ExclusionFilter, ExclusionSettings, apply_content_exclusion};
use super::fingerprint::FingerprintTracker;
use super::groups::{flatten, group};
use super::state::IndexState;
use super::types::{ReferenceRecord, SourceRecord};
use crate::host::{DocumentHost, Fingerprint};

/// How much of the previous pass may be reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RebuildMode {
    /// Forget everything and rescan the whole corpus.
    Full,
    /// Rescan only documents whose fingerprint changed or that are new.
    #[default]
    Partial,
}

impl RebuildMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Partial => "partial",
        }
    }
}

impl fmt::Display for RebuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statistics from a rebuild pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub mode: RebuildMode,
    /// Source documents reported by the host this pass.
    pub sources_seen: usize,
    /// Sources whose references were rescanned.
    pub sources_rescanned: usize,
    /// Sources reused as-is.
    pub sources_unchanged: usize,
    /// Sources dropped because the host no longer reports them.
    pub sources_removed: usize,
    /// Reference occurrences enumerated.
    pub occurrences: usize,
    /// Occurrences skipped because their source was unchanged.
    pub occurrences_skipped_unchanged: usize,
    pub resolution_hits: usize,
    pub resolution_misses: usize,
    /// Occurrences dropped because their source is in an excluded folder.
    pub dropped_from_excluded_source: usize,
    /// Occurrences dropped because their target is in an excluded folder.
    pub dropped_to_excluded_target: usize,
    /// Sources the host enumerated but could not stat.
    pub lookup_inconsistencies: usize,
    /// Records in the published index.
    pub records_indexed: usize,
    /// Of those, records flagged by a target's opt-out.
    pub records_excluded: usize,
    /// Distinct keys in the published index.
    pub groups: usize,
    /// Pass duration in milliseconds.
    pub duration_ms: u64,
}

/// Per-source accumulation for the pass in progress. Committed to the
/// index only after the enumeration finishes.
struct PendingSource {
    rescan: bool,
    fingerprint: Fingerprint,
    ignored: bool,
    references: Vec<Arc<ReferenceRecord>>,
}

/// Runs rebuild passes over an [`IndexState`].
pub struct IndexBuilder<'a, H: ?Sized> {
    host: &'a H,
    state: &'a mut IndexState,
    settings: ExclusionSettings,
}

impl<'a, H: DocumentHost + ?Sized> IndexBuilder<'a, H> {
    pub fn new(host: &'a H, state: &'a mut IndexState, settings: ExclusionSettings) -> Self {
        Self { host, state, settings }
    }

    /// Clear all caches and rescan the entire corpus.
    pub fn full_rebuild(self) -> IndexStats {
        self.rebuild(RebuildMode::Full)
    }

    /// Reuse unchanged sources, rescan the rest.
    pub fn partial_rebuild(self) -> IndexStats {
        self.rebuild(RebuildMode::Partial)
    }

    /// Run one pass. Never fails: anomalies are logged and the affected
    /// occurrences skipped, leaving the index consistent.
    pub fn rebuild(self, mode: RebuildMode) -> IndexStats {
        let start = Instant::now();
        let mut stats = IndexStats { mode, ..Default::default() };
        let host = self.host;
        let state = self.state;

        if mode == RebuildMode::Full {
            tracing::debug!("full rebuild: clearing source records and resolution cache");
            state.reset();
        }
        state.resolutions.reset_counters();

        let filter = ExclusionFilter::new(host, self.settings);

        // None marks a source the host could not stat; its occurrences are skipped.
        let mut pending: HashMap<String, Option<PendingSource>> = HashMap::new();

        // Phase 1: enumerate and resolve
        host.iterate_all_references(&mut |source, reference| {
            stats.occurrences += 1;

            if !pending.contains_key(source) {
                let opened = open_source(host, state, &filter, source);
                if opened.is_none() {
                    stats.lookup_inconsistencies += 1;
                }
                pending.insert(source.to_string(), opened);
            }
            let Some(Some(entry)) = pending.get_mut(source) else {
                return;
            };

            if !entry.rescan {
                stats.occurrences_skipped_unchanged += 1;
                return;
            }

            let target = state.resolutions.resolve(host, &reference.link, source);

            if filter.drops_source(entry.ignored) {
                stats.dropped_from_excluded_source += 1;
                return;
            }
            if filter.drops_target(&target) {
                stats.dropped_to_excluded_target += 1;
                return;
            }

            entry.references.push(Arc::new(ReferenceRecord::new(source, reference, &target)));
        });

        stats.sources_seen = pending.len();
        stats.resolution_hits = state.resolutions.hits();
        stats.resolution_misses = state.resolutions.misses();

        // Phase 2: commit rescanned sources, drop vanished ones
        if mode == RebuildMode::Partial {
            let before = state.sources.len();
            state.sources.retain(|path, _| pending.contains_key(path));
            stats.sources_removed = before - state.sources.len();
        }

        for (path, entry) in pending {
            let Some(entry) = entry else { continue };
            if !entry.rescan {
                stats.sources_unchanged += 1;
                continue;
            }
            stats.sources_rescanned += 1;
            state.sources.insert(
                path.clone(),
                SourceRecord {
                    path,
                    fingerprint: entry.fingerprint,
                    ignored: entry.ignored,
                    references: entry.references,
                },
            );
        }

        // Phase 3: document-level opt-out, once every record is known
        for source in state.sources.values_mut() {
            source.references = apply_content_exclusion(&source.references, &filter);
        }

        // Phase 4: flatten and group
        let records = flatten(&state.sources);
        stats.records_indexed = records.len();
        stats.records_excluded = records.iter().filter(|r| r.excluded).count();
        let groups = group(records);
        stats.groups = groups.len();
        state.publish(groups);

        stats.duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            mode = %mode,
            sources = stats.sources_seen,
            rescanned = stats.sources_rescanned,
            removed = stats.sources_removed,
            records = stats.records_indexed,
            excluded = stats.records_excluded,
            groups = stats.groups,
            duration_ms = stats.duration_ms,
            "reference index rebuilt"
        );
        if stats.lookup_inconsistencies > 0 {
            tracing::warn!(
                count = stats.lookup_inconsistencies,
                "host enumerated references for documents it could not stat"
            );
        }

        stats
    }
}

/// Decide, once per source and pass, whether its references are rescanned.
fn open_source<H: DocumentHost + ?Sized>(
    host: &H,
    state: &IndexState,
    filter: &ExclusionFilter<'_, H>,
    path: &str,
) -> Option<PendingSource> {
    let Some(fingerprint) = host.file_stat(path) else {
        tracing::warn!(source = path, "no file stats for enumerated source; skipping its references");
        return None;
    };

    let rescan = FingerprintTracker::new(&state.sources).needs_rescan(path, &fingerprint);
    let ignored = match state.sources.get(path) {
        Some(known) if !rescan => known.ignored,
        _ => filter.is_source_excluded(path),
    };

    Some(PendingSource { rescan, fingerprint, ignored, references: Vec::new() })
}
