#![deny(clippy::all)]
#![allow(clippy::module_name_repetitions)]

//! Incremental backlink indexing for markdown vaults.
//!
//! The engine scans a document corpus for every cross-document reference,
//! resolves each reference to a canonical target key, groups the results
//! into a "what links here" index and projects that index onto single
//! documents with a TTL-bounded view cache.
//!
//! ```no_run
//! use backref_core::engine::{EngineSettings, ReferenceEngine};
//! use backref_core::index::RebuildMode;
//! use backref_core::vault::{VaultHost, VaultOptions};
//! use std::path::Path;
//!
//! let host = VaultHost::open(Path::new("/notes"), VaultOptions::default()).unwrap();
//! let mut engine = ReferenceEngine::new(host, EngineSettings::default());
//! engine.rebuild_index(RebuildMode::Full);
//!
//! let view = engine.document_view("Projects/Alpha.md");
//! for heading in &view.headings {
//!     println!("{} <- {}", heading.key, heading.references.len());
//! }
//! ```

pub mod clock;
pub mod config;
pub mod engine;
pub mod frontmatter;
pub mod host;
pub mod index;
pub mod vault;
pub mod view;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
