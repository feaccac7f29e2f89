//! Document host backed by a vault directory.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use super::extractor::{DEFAULT_EXCLUDE_KEY, extract_note};
use super::walker::{VaultWalker, VaultWalkerError, WalkedFile};
use crate::host::{
    DocumentHandle, DocumentHost, DocumentStructure, Fingerprint, LinkPath, MemoryDocument,
    MemoryHost, RawReference,
};
use crate::index::RebuildMode;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error(transparent)]
    Walker(#[from] VaultWalkerError),

    #[error("failed to read note {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// How a vault is interpreted.
#[derive(Debug, Clone)]
pub struct VaultOptions {
    /// Folders excluded by folder rule, relative to the vault root.
    pub excluded_folders: Vec<String>,
    /// Front matter key that opts a note out of being a reference target.
    pub exclude_key: String,
}

impl Default for VaultOptions {
    fn default() -> Self {
        Self { excluded_folders: Vec::new(), exclude_key: DEFAULT_EXCLUDE_KEY.to_string() }
    }
}

/// Outcome of [`VaultHost::refresh`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshStats {
    /// Known notes whose fingerprint changed and were re-read.
    pub changed: usize,
    /// Notes seen for the first time.
    pub added: usize,
    /// Notes no longer on disk.
    pub removed: usize,
    /// Notes that could not be read this time.
    pub skipped: usize,
}

impl RefreshStats {
    pub fn is_empty(&self) -> bool {
        self.changed == 0 && self.added == 0 && self.removed == 0
    }

    /// Rebuild mode that brings the index in line with this refresh.
    ///
    /// Added or removed notes change what link text can resolve to, and
    /// resolutions are only dropped by a full rebuild.
    pub fn rebuild_mode(&self) -> RebuildMode {
        if self.added > 0 || self.removed > 0 { RebuildMode::Full } else { RebuildMode::Partial }
    }
}

/// A vault on disk, held as an in-memory corpus that is re-synced on
/// [`VaultHost::refresh`].
#[derive(Debug)]
pub struct VaultHost {
    walker: VaultWalker,
    options: VaultOptions,
    corpus: MemoryHost,
}

impl VaultHost {
    /// Open a vault and read every note in it.
    pub fn open(root: &Path, options: VaultOptions) -> Result<Self, VaultError> {
        let walker = VaultWalker::new(root)?;
        let mut corpus = MemoryHost::new().with_exclude_key(options.exclude_key.clone());
        for folder in &options.excluded_folders {
            corpus.exclude_folder(folder.as_str());
        }

        let mut host = Self { walker, options, corpus };
        let stats = host.refresh()?;
        tracing::debug!(
            root = %host.root().display(),
            notes = host.len(),
            skipped = stats.skipped,
            "vault opened"
        );
        Ok(host)
    }

    /// Re-walk the vault. Only notes whose fingerprint changed are read
    /// again; notes gone from disk are forgotten. A note that cannot be
    /// read is logged and left out until a later refresh succeeds.
    pub fn refresh(&mut self) -> Result<RefreshStats, VaultError> {
        let files = self.walker.walk()?;
        let mut stats = RefreshStats::default();
        let mut on_disk = BTreeSet::new();

        for file in &files {
            on_disk.insert(file.relative_path.as_str());
            let fingerprint = file.fingerprint();
            let known = self.corpus.file_stat(&file.relative_path);
            if known == Some(fingerprint) {
                continue;
            }

            match self.read_note(file) {
                Ok(document) => {
                    self.corpus.insert(file.relative_path.clone(), document);
                    if known.is_some() {
                        stats.changed += 1;
                    } else {
                        stats.added += 1;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable note");
                    self.corpus.remove(&file.relative_path);
                    stats.skipped += 1;
                }
            }
        }

        let gone: Vec<String> = self
            .corpus
            .paths()
            .filter(|path| !on_disk.contains(path))
            .map(str::to_string)
            .collect();
        for path in gone {
            self.corpus.remove(&path);
            stats.removed += 1;
        }

        if !stats.is_empty() {
            tracing::debug!(
                changed = stats.changed,
                added = stats.added,
                removed = stats.removed,
                "vault refreshed"
            );
        }
        Ok(stats)
    }

    fn read_note(&self, file: &WalkedFile) -> Result<MemoryDocument, VaultError> {
        let content = fs::read_to_string(&file.absolute_path).map_err(|source| {
            VaultError::FileRead { path: file.relative_path.clone(), source }
        })?;
        let note = extract_note(&content, &self.options.exclude_key);
        Ok(MemoryDocument::from_note(note, file.fingerprint()))
    }

    /// Canonical vault root.
    pub fn root(&self) -> &Path {
        self.walker.root()
    }

    pub fn options(&self) -> &VaultOptions {
        &self.options
    }

    /// Absolute path of a note given its vault-relative path.
    pub fn absolute_path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// The notes currently held, as plain data.
    pub fn corpus(&self) -> &MemoryHost {
        &self.corpus
    }

    pub fn len(&self) -> usize {
        self.corpus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corpus.is_empty()
    }
}

impl DocumentHost for VaultHost {
    fn iterate_all_references(&self, visit: &mut dyn FnMut(&str, &RawReference)) {
        self.corpus.iterate_all_references(visit);
    }

    fn file_stat(&self, path: &str) -> Option<Fingerprint> {
        self.corpus.file_stat(path)
    }

    fn resolve_link_path(&self, link_text: &str, base_path: &str) -> LinkPath {
        self.corpus.resolve_link_path(link_text, base_path)
    }

    fn find_document_by_resolved_path(&self, path: &str) -> Option<DocumentHandle> {
        self.corpus.find_document_by_resolved_path(path)
    }

    fn is_path_excluded_by_folder_rule(&self, path: &str) -> bool {
        self.corpus.is_path_excluded_by_folder_rule(path)
    }

    fn is_document_excluded_by_content_flag(&self, path: &str) -> bool {
        self.corpus.is_document_excluded_by_content_flag(path)
    }

    fn document_structure(&self, path: &str) -> Option<DocumentStructure> {
        self.corpus.document_structure(path)
    }

    fn all_known_heading_strings(&self) -> Vec<String> {
        self.corpus.all_known_heading_strings()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_vault() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        fs::create_dir_all(root.join("projects")).unwrap();
        fs::create_dir_all(root.join("templates")).unwrap();
        fs::write(root.join("index.md"), "# Index\n\n[[projects/alpha]] and [[Beta]]\n").unwrap();
        fs::write(root.join("projects/alpha.md"), "# Alpha\n\nText ^intro\n").unwrap();
        fs::write(root.join("templates/daily.md"), "[[index]]\n").unwrap();

        dir
    }

    #[test]
    fn test_rebuild_mode_follows_note_set() {
        let edited = RefreshStats { changed: 2, ..Default::default() };
        let added = RefreshStats { added: 1, ..Default::default() };
        let removed = RefreshStats { changed: 1, removed: 1, ..Default::default() };

        assert_eq!(edited.rebuild_mode(), RebuildMode::Partial);
        assert_eq!(added.rebuild_mode(), RebuildMode::Full);
        assert_eq!(removed.rebuild_mode(), RebuildMode::Full);
    }

    #[test]
    fn test_open_reads_all_notes() {
        let dir = create_test_vault();
        let host = VaultHost::open(dir.path(), VaultOptions::default()).unwrap();

        assert_eq!(host.len(), 3);
        let mut sources = Vec::new();
        host.iterate_all_references(&mut |src, r| sources.push((src.to_string(), r.link.clone())));
        assert_eq!(
            sources,
            vec![
                ("index.md".to_string(), "projects/alpha".to_string()),
                ("index.md".to_string(), "Beta".to_string()),
                ("templates/daily.md".to_string(), "index".to_string()),
            ]
        );
    }

    #[test]
    fn test_excluded_folders_apply() {
        let dir = create_test_vault();
        let options =
            VaultOptions { excluded_folders: vec!["templates".into()], ..Default::default() };
        let host = VaultHost::open(dir.path(), options).unwrap();

        assert!(host.is_path_excluded_by_folder_rule("templates/daily.md"));
        assert!(!host.is_path_excluded_by_folder_rule("index.md"));
    }

    #[test]
    fn test_structure_is_extracted() {
        let dir = create_test_vault();
        let host = VaultHost::open(dir.path(), VaultOptions::default()).unwrap();

        let structure = host.document_structure("projects/alpha.md").unwrap();
        assert_eq!(structure.headings[0].text, "Alpha");
        assert_eq!(structure.blocks[0].id, "intro");
        assert!(host.document_structure("missing.md").is_none());
    }

    #[test]
    fn test_refresh_reports_changes() {
        let dir = create_test_vault();
        let mut host = VaultHost::open(dir.path(), VaultOptions::default()).unwrap();

        let unchanged = host.refresh().unwrap();
        assert!(unchanged.is_empty());

        fs::write(dir.path().join("projects/alpha.md"), "# Alpha\n\nLonger text now\n").unwrap();
        fs::write(dir.path().join("beta.md"), "# Beta\n").unwrap();
        fs::remove_file(dir.path().join("templates/daily.md")).unwrap();

        let stats = host.refresh().unwrap();
        assert_eq!(stats.changed, 1);
        assert_eq!(stats.added, 1);
        assert_eq!(stats.removed, 1);
        assert!(host.file_stat("beta.md").is_some());
        assert!(host.file_stat("templates/daily.md").is_none());
    }

    #[test]
    fn test_content_flag_uses_configured_key() {
        let dir = create_test_vault();
        fs::write(dir.path().join("secret.md"), "---\nno-backlinks: yes\n---\n# Secret\n")
            .unwrap();
        let options = VaultOptions { exclude_key: "no-backlinks".into(), ..Default::default() };
        let host = VaultHost::open(dir.path(), options).unwrap();

        assert!(host.is_document_excluded_by_content_flag("secret.md"));
        assert!(!host.is_document_excluded_by_content_flag("index.md"));
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = VaultHost::open(&dir.path().join("nope"), VaultOptions::default()).unwrap_err();
        assert!(matches!(err, VaultError::Walker(VaultWalkerError::MissingRoot(_))));
    }
}
