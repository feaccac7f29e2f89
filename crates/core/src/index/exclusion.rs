//! Source-side and target-side exclusion.
//!
//! Folder rules are known before resolution and drop occurrences outright.
//! Document-level opt-out only flags records, and runs once the whole pass
//! has been aggregated.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::types::{ReferenceRecord, ResolvedTarget};
use crate::host::DocumentHost;

/// Which folder-rule checks are applied while scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionSettings {
    /// Drop references written inside excluded folders.
    pub ignore_links_from_excluded_folders: bool,
    /// Drop references pointing into excluded folders.
    pub ignore_links_to_excluded_folders: bool,
}

impl Default for ExclusionSettings {
    fn default() -> Self {
        Self { ignore_links_from_excluded_folders: true, ignore_links_to_excluded_folders: true }
    }
}

/// Exclusion predicates backed by the host.
pub struct ExclusionFilter<'h, H: ?Sized> {
    host: &'h H,
    settings: ExclusionSettings,
    content_flags: RefCell<HashMap<String, bool>>,
}

impl<'h, H: DocumentHost + ?Sized> ExclusionFilter<'h, H> {
    pub fn new(host: &'h H, settings: ExclusionSettings) -> Self {
        Self { host, settings, content_flags: RefCell::new(HashMap::new()) }
    }

    /// Folder rule for a source document.
    pub fn is_source_excluded(&self, path: &str) -> bool {
        self.host.is_path_excluded_by_folder_rule(path)
    }

    /// Document-level opt-out of a target. Answers are memoized for the
    /// lifetime of the filter.
    pub fn is_target_excluded(&self, path: &str) -> bool {
        if let Some(&known) = self.content_flags.borrow().get(path) {
            return known;
        }
        let excluded = self.host.is_document_excluded_by_content_flag(path);
        self.content_flags.borrow_mut().insert(path.to_string(), excluded);
        excluded
    }

    /// Whether an occurrence from a source with the given folder status is
    /// dropped.
    pub fn drops_source(&self, source_ignored: bool) -> bool {
        self.settings.ignore_links_from_excluded_folders && source_ignored
    }

    /// Whether an occurrence resolving to `target` is dropped.
    pub fn drops_target(&self, target: &ResolvedTarget) -> bool {
        self.settings.ignore_links_to_excluded_folders && target.target_ignored
    }
}

/// Flag records whose resolved target opted out. Ghost records are never
/// flagged. Records whose flag does not change are shared, not copied.
pub fn apply_content_exclusion<H: DocumentHost + ?Sized>(
    records: &[Arc<ReferenceRecord>],
    filter: &ExclusionFilter<'_, H>,
) -> Vec<Arc<ReferenceRecord>> {
    records
        .iter()
        .map(|record| {
            let excluded = record
                .resolved
                .as_ref()
                .is_some_and(|document| filter.is_target_excluded(&document.path));
            if excluded == record.excluded {
                Arc::clone(record)
            } else {
                Arc::new(ReferenceRecord { excluded, ..(**record).clone() })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{MemoryDocument, MemoryHost, RawReference};
    use crate::index::resolution::resolve_link;

    fn corpus() -> MemoryHost {
        let mut host = MemoryHost::new();
        host.insert("Public.md", MemoryDocument::new());
        host.insert("Private.md", MemoryDocument::new().excluded());
        host.insert("archive/Old.md", MemoryDocument::new());
        host.exclude_folder("archive");
        host
    }

    fn record(host: &MemoryHost, link: &str) -> Arc<ReferenceRecord> {
        let target = resolve_link(host, link, "Src.md");
        Arc::new(ReferenceRecord::new("Src.md", &RawReference::link(link), &target))
    }

    #[test]
    fn test_content_exclusion_flags_but_keeps_records() {
        let host = corpus();
        let filter = ExclusionFilter::new(&host, ExclusionSettings::default());
        let records =
            vec![record(&host, "Public"), record(&host, "Private"), record(&host, "Ghost")];

        let marked = apply_content_exclusion(&records, &filter);

        assert_eq!(marked.len(), 3);
        let flags: Vec<_> = marked.iter().map(|r| r.excluded).collect();
        assert_eq!(flags, vec![false, true, false]);
        assert!(Arc::ptr_eq(&records[0], &marked[0]));
        assert!(!Arc::ptr_eq(&records[1], &marked[1]));
    }

    #[test]
    fn test_content_exclusion_is_stable_when_reapplied() {
        let host = corpus();
        let filter = ExclusionFilter::new(&host, ExclusionSettings::default());
        let once = apply_content_exclusion(&[record(&host, "Private")], &filter);
        let twice = apply_content_exclusion(&once, &filter);

        assert!(Arc::ptr_eq(&once[0], &twice[0]));
    }

    #[test]
    fn test_folder_checks_follow_settings() {
        let host = corpus();
        let target = resolve_link(&host, "Old", "Src.md");

        let strict = ExclusionFilter::new(&host, ExclusionSettings::default());
        assert!(strict.is_source_excluded("archive/Old.md"));
        assert!(strict.drops_source(true));
        assert!(strict.drops_target(&target));

        let lenient = ExclusionFilter::new(
            &host,
            ExclusionSettings {
                ignore_links_from_excluded_folders: false,
                ignore_links_to_excluded_folders: false,
            },
        );
        assert!(!lenient.drops_source(true));
        assert!(!lenient.drops_target(&target));
    }
}
