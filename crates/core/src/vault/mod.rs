//! Filesystem vault support.
//!
//! This module provides utilities for walking vault directories,
//! extracting references and structure from markdown files, and a
//! [`VaultHost`] that serves a vault to the reference engine.

pub mod extractor;
pub mod host;
pub mod walker;

pub use extractor::{DEFAULT_EXCLUDE_KEY, ExtractedNote, extract_note};
pub use host::{RefreshStats, VaultError, VaultHost, VaultOptions};
pub use walker::{VaultWalker, VaultWalkerError, WalkedFile};
