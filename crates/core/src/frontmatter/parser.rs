//! Frontmatter parsing from markdown documents.

use super::types::{Frontmatter, ParsedDocument};
use thiserror::Error;

/// Errors that can occur during frontmatter parsing.
#[derive(Debug, Error)]
pub enum FrontmatterParseError {
    #[error("invalid YAML frontmatter: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),
}

/// Parse frontmatter from markdown content.
///
/// Frontmatter is delimited by `---` at the start of the document:
/// ```markdown
/// ---
/// key: value
/// ---
/// # Document content
/// ```
pub fn parse(content: &str) -> Result<ParsedDocument, FrontmatterParseError> {
    let trimmed = content.trim_start();

    if !trimmed.starts_with("---") {
        return Ok(whole_body(content));
    }

    let after_first = &trimmed[3..];

    // Skip the newline after opening ---
    let after_newline = after_first
        .strip_prefix('\n')
        .or_else(|| after_first.strip_prefix("\r\n"))
        .unwrap_or(after_first);

    if let Some(end_pos) = find_closing_delimiter(after_newline) {
        let yaml_content = &after_newline[..end_pos];

        // Skip closing --- and the newline after it
        let after_closing = &after_newline[end_pos + 3..];
        let body = after_closing
            .strip_prefix('\n')
            .or_else(|| after_closing.strip_prefix("\r\n"))
            .unwrap_or(after_closing);

        let frontmatter: Frontmatter = if yaml_content.trim().is_empty() {
            Frontmatter::default()
        } else {
            serde_yaml::from_str(yaml_content.trim())?
        };

        Ok(ParsedDocument {
            frontmatter: Some(frontmatter),
            body: body.to_string(),
            body_offset: content.len() - body.len(),
        })
    } else {
        // No closing ---, treat as no frontmatter
        Ok(whole_body(content))
    }
}

fn whole_body(content: &str) -> ParsedDocument {
    ParsedDocument { frontmatter: None, body: content.to_string(), body_offset: 0 }
}

/// Find the position of closing `---` delimiter.
fn find_closing_delimiter(content: &str) -> Option<usize> {
    let mut pos = 0;
    for line in content.split_inclusive('\n') {
        if line.trim() == "---" {
            // Byte position of the delimiter itself, past any indentation
            return Some(pos + (line.len() - line.trim_start().len()));
        }
        pos += line.len();
    }
    None
}
