//! Domain rule-file loading and keyword matching.
//!
//! Rule files live next to the manifest and are deliberately forgiving:
//! a missing file means the domain simply contributes nothing this turn.
//! Lines of the form `KEY=value` contribute the value, plain lines
//! contribute themselves, comments and blanks are skipped.

use std::path::Path;

/// Load the rule lines from a domain file.
///
/// Missing, unreadable, or empty files yield an empty vector — a rule
/// file is content, never a precondition.
pub fn load_domain_file(path: &Path) -> Vec<String> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read domain file");
            }
            return Vec::new();
        }
    };
    parse_rule_lines(&content)
}

/// The rule lines in already-read domain-file content. Callers that read
/// the file through async I/O parse with this directly.
pub fn parse_rule_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|raw| {
            let line = raw.trim_end_matches('\r').trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            // KEY=value lines carry the rule in the value position.
            match line.split_once('=') {
                Some((_, value)) if !value.trim().is_empty() => Some(value.trim().to_string()),
                Some(_) => None,
                None => Some(line.to_string()),
            }
        })
        .collect()
}

/// The recall keywords from `keywords` found in `prompt`, as
/// case-insensitive literal substrings. Empty keywords never match, and
/// an empty prompt matches nothing.
pub fn match_keywords<'a>(prompt: &str, keywords: &'a [String]) -> Vec<&'a str> {
    if prompt.is_empty() {
        return Vec::new();
    }
    let haystack = prompt.to_lowercase();
    keywords
        .iter()
        .filter(|kw| !kw.is_empty())
        .filter(|kw| haystack.contains(&kw.to_lowercase()))
        .map(String::as_str)
        .collect()
}

/// Whether any global or per-domain exclude keyword appears in the
/// prompt. Same matching rules as [`match_keywords`].
pub fn is_excluded(prompt: &str, global_exclude: &[String], domain_exclude: &[String]) -> bool {
    !match_keywords(prompt, global_exclude).is_empty()
        || !match_keywords(prompt, domain_exclude).is_empty()
}
