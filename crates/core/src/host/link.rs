//! Link text helpers shared by hosts, the resolution cache and the view
//! projector.

/// Link text split into the document part and the anchor part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkPath {
    /// Document path as written, e.g. `Folder/Note` or `Note.md`.
    pub path: String,
    /// Anchor including its leading `#`, or empty.
    pub subpath: String,
}

/// Split `Note#Heading` into `Note` and `#Heading`.
///
/// An alias (`Note|alias`) is dropped if the host left one in place.
pub fn parse_link_text(link: &str) -> LinkPath {
    let link = link.split_once('|').map_or(link, |(target, _)| target);
    match link.find('#') {
        Some(idx) => LinkPath {
            path: link[..idx].trim().to_string(),
            subpath: link[idx..].trim().to_string(),
        },
        None => LinkPath { path: link.trim().to_string(), subpath: String::new() },
    }
}

/// Remove a trailing `.md`. Other extensions are kept so attachments with
/// the same stem stay distinct.
pub fn strip_markdown_extension(path: &str) -> &str {
    path.strip_suffix(".md").unwrap_or(path)
}

/// True for link text that only carries an anchor (`#Heading`, `#^id`),
/// i.e. a reference into the document that contains it.
pub fn is_anchor_only(link: &str) -> bool {
    let link = link.trim_start();
    link.is_empty() || link.starts_with('#')
}

/// Normalize heading text the way anchors are compared: punctuation that
/// cannot survive in a link anchor becomes a space, whitespace collapses.
pub fn normalize_heading(text: &str) -> String {
    let replaced: String = text
        .chars()
        .map(|c| match c {
            '!' | '"' | '#' | '$' | '%' | '&' | '(' | ')' | '*' | '+' | ',' | '.' | ':'
            | ';' | '<' | '=' | '>' | '?' | '@' | '^' | '`' | '{' | '|' | '}' | '~' | '/'
            | '\\' | '[' | ']' => ' ',
            other => other,
        })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Canonical form of an anchor: `#^id` for blocks, `#` plus the normalized
/// heading otherwise. Nested heading anchors keep the innermost heading.
pub fn normalize_subpath(subpath: &str) -> String {
    let Some(last) = subpath.split('#').map(str::trim).filter(|s| !s.is_empty()).next_back()
    else {
        return String::new();
    };

    if let Some(id) = last.strip_prefix('^') {
        let id = id.trim();
        return if id.is_empty() { String::new() } else { format!("#^{id}") };
    }

    let heading = normalize_heading(last);
    if heading.is_empty() { String::new() } else { format!("#{heading}") }
}

/// Group key of a heading in the document keyed `base`. A heading with no
/// text left after normalization keys as the document itself, the same key
/// a link to it produces.
pub fn heading_key(base: &str, text: &str) -> String {
    let heading = normalize_heading(text);
    if heading.is_empty() { base.to_string() } else { format!("{base}#{heading}") }
}

/// The heading part of a canonical key, if the key targets a heading.
pub fn heading_anchor(key: &str) -> Option<&str> {
    let (_, anchor) = key.split_once('#')?;
    if anchor.starts_with('^') || anchor.is_empty() { None } else { Some(anchor) }
}

/// Pick the document a link path points to.
///
/// Exact path matches win (with or without `.md`), then the same match
/// ignoring case. Otherwise the shortest path whose extension-less form
/// ends with `/<linkpath>` is chosen, and failing that the shortest path
/// with the same file stem; both fallbacks ignore case. Ties go to the
/// first candidate in iteration order.
pub fn find_by_linkpath<'a, I>(paths: I, linkpath: &str) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let wanted = linkpath.trim().trim_start_matches("./").trim_start_matches('/');
    if wanted.is_empty() {
        return None;
    }
    let wanted_stem = strip_markdown_extension(wanted);
    let wanted_lower = wanted_stem.to_lowercase();
    let suffix = format!("/{wanted_lower}");
    let wanted_name = file_stem(&wanted_lower).to_string();

    let mut by_case: Option<&'a str> = None;
    let mut by_suffix: Option<&'a str> = None;
    let mut by_name: Option<&'a str> = None;
    for path in paths {
        let stem = strip_markdown_extension(path);
        if path == wanted || stem == wanted_stem {
            return Some(path);
        }
        let lower = stem.to_lowercase();
        if by_case.is_none() && lower == wanted_lower {
            by_case = Some(path);
        }
        if lower.ends_with(&suffix) && by_suffix.is_none_or(|b| path.len() < b.len()) {
            by_suffix = Some(path);
        }
        if file_stem(&lower) == wanted_name && by_name.is_none_or(|b| path.len() < b.len()) {
            by_name = Some(path);
        }
    }
    by_case.or(by_suffix).or(by_name)
}

fn file_stem(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
