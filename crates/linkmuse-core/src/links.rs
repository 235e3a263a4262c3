//! Wiki-link extraction.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

fn wiki_link_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[\[([^\]]+)\]\]").expect("static wiki-link regex"))
}

/// Collect the note names referenced by `[[...]]` markers in `content`.
///
/// `[[Target|alias]]` and `[[Target#Heading]]` both resolve to `Target`.
/// Embeds (`![[Target]]`) count as references too.
pub fn extract_wiki_links(content: &str) -> HashSet<String> {
    wiki_link_regex()
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .filter_map(|m| {
            let target = m.as_str().split(['|', '#']).next().unwrap_or_default().trim();
            (!target.is_empty()).then(|| target.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_plain_links() {
        let links = extract_wiki_links("See [[B]] and [[Second Note]].");
        assert_eq!(links.len(), 2);
        assert!(links.contains("B"));
        assert!(links.contains("Second Note"));
    }

    #[test]
    fn test_alias_and_heading_resolve_to_target() {
        let links = extract_wiki_links("[[Rust|the language]] [[Tokio#Runtime]]");
        assert!(links.contains("Rust"));
        assert!(links.contains("Tokio"));
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn test_duplicates_collapse() {
        let links = extract_wiki_links("[[A]] [[A]] ![[A]]");
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn test_no_links() {
        assert!(extract_wiki_links("plain text [not a link]").is_empty());
        assert!(extract_wiki_links("[[]]").is_empty());
        assert!(extract_wiki_links("[[#only heading]]").is_empty());
    }
}
