//! Per-document projection of the reference index.

pub mod projector;
pub mod types;

pub use projector::DocumentViewProjector;
pub use types::{DocumentView, ViewItem};
