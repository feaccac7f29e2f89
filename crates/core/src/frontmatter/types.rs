//! Frontmatter types and data structures.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::HashMap;

/// Represents parsed YAML frontmatter from a markdown document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Frontmatter {
    /// Fields as key-value pairs.
    #[serde(flatten)]
    pub fields: HashMap<String, Value>,
}

impl Frontmatter {
    /// Whether `key` holds a value that reads as "yes".
    ///
    /// Accepts YAML booleans, the strings `true`/`yes`/`on`/`1` (any case)
    /// and non-zero integers.
    pub fn is_truthy(&self, key: &str) -> bool {
        match self.fields.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => {
                matches!(s.trim().to_lowercase().as_str(), "true" | "yes" | "on" | "1")
            }
            Some(Value::Number(n)) => n.as_i64().is_some_and(|n| n != 0),
            _ => false,
        }
    }
}

/// Result of splitting frontmatter from markdown.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// Parsed frontmatter (if present).
    pub frontmatter: Option<Frontmatter>,
    /// The markdown body (everything after frontmatter).
    pub body: String,
    /// Byte offset of the body inside the original content.
    pub body_offset: usize,
}

impl ParsedDocument {
    /// Zero-based line of the original content on which the body starts.
    pub fn body_line(&self, content: &str) -> usize {
        content[..self.body_offset.min(content.len())].matches('\n').count()
    }
}
