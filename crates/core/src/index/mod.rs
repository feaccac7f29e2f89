//! Reference index: who refers to what.
//!
//! This module turns the raw reference occurrences reported by a
//! [`DocumentHost`](crate::host::DocumentHost) into a [`ReferenceGroupIndex`]
//! keyed by canonical target:
//! - Link text is resolved once per epoch through a [`LinkResolutionCache`]
//! - Unchanged sources are reused between passes ([`RebuildMode::Partial`])
//! - Folder rules drop occurrences, document opt-out flags them
//!
//! # Example
//!
//! ```
//! use backref_core::host::MemoryHost;
//! use backref_core::index::{ExclusionSettings, IndexBuilder, IndexState, RebuildMode};
//!
//! let mut host = MemoryHost::new();
//! host.write_note("A.md", "See [[B]].");
//! host.write_note("B.md", "# B");
//!
//! let mut state = IndexState::new();
//! let stats = IndexBuilder::new(&host, &mut state, ExclusionSettings::default())
//!     .rebuild(RebuildMode::Full);
//!
//! assert_eq!(stats.records_indexed, 1);
//! assert_eq!(state.groups().get("B")[0].source, "A.md");
//! ```

pub mod builder;
pub mod exclusion;
pub mod fingerprint;
pub mod groups;
pub mod resolution;
pub mod state;
pub mod types;

pub use builder::{IndexBuilder, IndexStats, RebuildMode};
pub use exclusion::{ExclusionFilter, ExclusionSettings, apply_content_exclusion};
pub use fingerprint::FingerprintTracker;
pub use groups::{ReferenceGroupIndex, flatten, group};
pub use resolution::{LinkResolutionCache, resolve_link};
pub use state::IndexState;
pub use types::{ReferenceRecord, ResolvedTarget, SourceRecord};
