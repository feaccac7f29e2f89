//! Frontmatter parsing for markdown documents.
//!
//! Only the parts the indexer needs: splitting YAML front matter from the
//! body and reading flag fields such as `index-exclude`.

pub mod parser;
pub mod types;

pub use parser::{FrontmatterParseError, parse};
pub use types::{Frontmatter, ParsedDocument};
