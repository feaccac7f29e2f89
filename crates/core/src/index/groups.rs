//! The grouped "what links here" index.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::types::{ReferenceRecord, SourceRecord};

/// Canonical key → records referring to it, in scan order.
///
/// Keys are the literal resolved key strings: two links to different
/// headings of one document land in different groups, and identical keys
/// from different sources land in the same group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceGroupIndex {
    groups: BTreeMap<String, Vec<Arc<ReferenceRecord>>>,
}

impl ReferenceGroupIndex {
    pub const fn new() -> Self {
        Self { groups: BTreeMap::new() }
    }

    /// Records for `key`; empty when nothing refers to it.
    pub fn get(&self, key: &str) -> &[Arc<ReferenceRecord>] {
        self.groups.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn count(&self, key: &str) -> usize {
        self.get(key).len()
    }

    /// Records for `key` whose target has not opted out.
    pub fn count_included(&self, key: &str) -> usize {
        self.get(key).iter().filter(|r| !r.excluded).count()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.groups.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Arc<ReferenceRecord>])> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn total_references(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Distinct source documents referring to `key`, in first-seen order.
    pub fn sources_of(&self, key: &str) -> Vec<&str> {
        let mut sources: Vec<&str> = Vec::new();
        for record in self.get(key) {
            if !sources.contains(&record.source.as_str()) {
                sources.push(&record.source);
            }
        }
        sources
    }
}

/// All references of all sources, ordered by source path and then by
/// position within each source.
pub fn flatten(sources: &BTreeMap<String, SourceRecord>) -> Vec<Arc<ReferenceRecord>> {
    sources.values().flat_map(|s| s.references.iter().cloned()).collect()
}

/// Group records by canonical key, keeping input order inside each group.
pub fn group<I>(records: I) -> ReferenceGroupIndex
where
    I: IntoIterator<Item = Arc<ReferenceRecord>>,
{
    let mut groups: BTreeMap<String, Vec<Arc<ReferenceRecord>>> = BTreeMap::new();
    for record in records {
        groups.entry(record.key.clone()).or_default().push(record);
    }
    ReferenceGroupIndex { groups }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{Fingerprint, RawReference};
    use crate::index::types::ResolvedTarget;

    fn record(source: &str, key: &str) -> Arc<ReferenceRecord> {
        let target = ResolvedTarget {
            canonical_path: String::new(),
            subpath: String::new(),
            document: None,
            ghost_path: key.to_string(),
            target_ignored: false,
        };
        Arc::new(ReferenceRecord::new(source, &RawReference::link(key), &target))
    }

    #[test]
    fn test_group_preserves_scan_order() {
        let index = group(vec![
            record("A.md", "X"),
            record("B.md", "Y"),
            record("C.md", "X"),
        ]);

        assert_eq!(index.len(), 2);
        assert_eq!(index.total_references(), 3);
        let x_sources: Vec<_> = index.get("X").iter().map(|r| r.source.as_str()).collect();
        assert_eq!(x_sources, vec!["A.md", "C.md"]);
    }

    #[test]
    fn test_identical_keys_from_different_sources_share_a_group() {
        let index = group(vec![record("A.md", "Doc#Part"), record("B.md", "Doc#Part")]);
        assert_eq!(index.count("Doc#Part"), 2);
        assert_eq!(index.sources_of("Doc#Part"), vec!["A.md", "B.md"]);
    }

    #[test]
    fn test_different_headings_of_one_document_do_not_share() {
        let index = group(vec![record("A.md", "Doc#One"), record("A.md", "Doc#Two")]);
        assert_eq!(index.count("Doc#One"), 1);
        assert_eq!(index.count("Doc#Two"), 1);
        assert_eq!(index.count("Doc"), 0);
        assert!(index.get("Doc").is_empty());
    }

    #[test]
    fn test_flatten_orders_by_source_path() {
        let mut sources = BTreeMap::new();
        for (path, keys) in [("b.md", vec!["1", "2"]), ("a.md", vec!["3"])] {
            sources.insert(
                path.to_string(),
                SourceRecord {
                    path: path.to_string(),
                    fingerprint: Fingerprint::default(),
                    ignored: false,
                    references: keys.into_iter().map(|k| record(path, k)).collect(),
                },
            );
        }

        let keys: Vec<_> = flatten(&sources).iter().map(|r| r.key.clone()).collect();
        assert_eq!(keys, vec!["3", "1", "2"]);
    }

    #[test]
    fn test_group_summary_snapshot() {
        let index = group(vec![
            record("A.md", "B"),
            record("B.md", "C#Heading1"),
            record("D.md", "B"),
        ]);
        let summary: Vec<String> =
            index.iter().map(|(key, records)| format!("{key}: {}", records.len())).collect();

        insta::assert_snapshot!(summary.join("\n"), @r"
        B: 2
        C#Heading1: 1
        ");
    }
}
