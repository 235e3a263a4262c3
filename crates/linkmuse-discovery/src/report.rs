//! Markdown rendering of discovery results.

use linkmuse_core::PotentialLink;

/// Heading of the suggestions section.
pub const REPORT_HEADING: &str = "## 潜在的笔记关联";

/// One suggestion line.
pub fn render_link(link: &PotentialLink) -> String {
    format!(
        "当前笔记和[[{}]]潜在的关联：{}，关联程度：{}",
        link.note_name, link.content, link.relevance_score
    )
}

/// The suggestions section: heading, then one blank-line separated line per
/// link in the given order.
pub fn render_report(links: &[PotentialLink]) -> String {
    let mut out = format!("{}\n\n", REPORT_HEADING);
    for link in links {
        out.push_str(&render_link(link));
        out.push_str("\n\n");
    }
    out
}

/// Focal note content with the report appended after a blank line.
pub fn append_report(content: &str, report: &str) -> String {
    format!("{}\n\n{}", content, report)
}
