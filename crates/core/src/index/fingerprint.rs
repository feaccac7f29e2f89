//! Change detection for source documents.

use std::collections::BTreeMap;

use super::types::SourceRecord;
use crate::host::Fingerprint;

/// Read-only view over stored source records answering "does this
/// document need a rescan?".
#[derive(Debug, Clone, Copy)]
pub struct FingerprintTracker<'a> {
    sources: &'a BTreeMap<String, SourceRecord>,
}

impl<'a> FingerprintTracker<'a> {
    pub fn new(sources: &'a BTreeMap<String, SourceRecord>) -> Self {
        Self { sources }
    }

    /// True when `path` has never been scanned or any of its created time,
    /// modified time or size differs from the stored fingerprint.
    pub fn needs_rescan(&self, path: &str, current: &Fingerprint) -> bool {
        match self.sources.get(path) {
            Some(record) => record.fingerprint != *current,
            None => true,
        }
    }
}
