//! Issue document parser.
//!
//! Export files follow a loose layout:
//! - Header line: `# #<id>: <title>`
//! - `## Description` followed by the issue body
//! - Optional `## Comments` section (ignored)
//!
//! Parsing never fails. Missing pieces fall back to the file name, the
//! `"Unknown"` title, or an empty description.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use triage_shared::{IssueDocument, IssueId};

/// Title used when a document has no header line.
pub const UNKNOWN_TITLE: &str = "Unknown";

// ---------------------------------------------------------------------------
// Regex patterns (compiled once)
// ---------------------------------------------------------------------------

/// Matches `# #123: Title` on its own line.
static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#[ \t]+#(\d+):[ \t]*(.*)$").expect("header regex"));

/// Matches the description heading and its line break.
static DESCRIPTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"## Description\r?\n").expect("description regex"));

/// Matches the comments heading at the start of a line.
static COMMENTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^## Comments").expect("comments regex"));

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Parse one issue export file.
pub fn parse_issue(path: &Path, content: String) -> IssueDocument {
    let header = parse_header(&content);
    let has_header = header.is_some();

    let (id, title) = match header {
        Some((id, title)) => (id, title),
        None => {
            debug!(path = %path.display(), "no issue header, falling back to file name");
            (id_from_file_name(path), UNKNOWN_TITLE.to_string())
        }
    };

    let description = extract_description(&content);

    IssueDocument {
        path: path.to_path_buf(),
        id,
        title,
        description,
        has_header,
        content,
    }
}

/// Extract `(id, title)` from the first header line.
fn parse_header(content: &str) -> Option<(IssueId, String)> {
    let caps = HEADER_RE.captures(content)?;
    let id = caps[1].parse::<u64>().ok()?;
    Some((IssueId::Number(id), caps[2].trim().to_string()))
}

/// Numeric file stem (`1234.md` → 1234), else the sentinel.
fn id_from_file_name(path: &Path) -> IssueId {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(|stem| stem.parse::<u64>().ok())
        .map(IssueId::Number)
        .unwrap_or(IssueId::Unknown)
}

/// Body of the description section, up to `## Comments` or end of document.
fn extract_description(content: &str) -> String {
    let Some(heading) = DESCRIPTION_RE.find(content) else {
        return String::new();
    };

    let rest = &content[heading.end()..];
    let body = match COMMENTS_RE.find(rest) {
        Some(comments) => &rest[..comments.start()],
        None => rest,
    };

    body.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(name: &str, content: &str) -> IssueDocument {
        parse_issue(Path::new(name), content.to_string())
    }

    #[test]
    fn parses_full_document() {
        let doc = parse(
            "docs/issues/4021.md",
            "# #4021: Crash on invalid SIMD shuffle\n\n\
             ## Description\n\n\
             Binaryen aborts with an assertion failure.\n\n\
             ## Comments\n\n\
             **alice**: confirmed\n",
        );
        assert!(doc.has_header);
        assert_eq!(doc.id, IssueId::Number(4021));
        assert_eq!(doc.title, "Crash on invalid SIMD shuffle");
        assert_eq!(doc.description, "Binaryen aborts with an assertion failure.");
    }

    #[test]
    fn description_runs_to_end_without_comments() {
        let doc = parse(
            "7.md",
            "# #7: Title\n\n## Description\n\nFirst line.\n\nSecond line.\n",
        );
        assert_eq!(doc.description, "First line.\n\nSecond line.");
    }

    #[test]
    fn description_immediately_followed_by_comments_is_empty() {
        let doc = parse("8.md", "# #8: Title\n\n## Description\n\n## Comments\n\nhi\n");
        assert_eq!(doc.description, "");
    }

    #[test]
    fn missing_description_section_is_empty() {
        let doc = parse("9.md", "# #9: Title only\n");
        assert_eq!(doc.description, "");
        assert_eq!(doc.title, "Title only");
    }

    #[test]
    fn missing_header_falls_back_to_file_name() {
        let doc = parse("docs/issues/512.md", "## Description\n\nSomething broke here.\n");
        assert!(!doc.has_header);
        assert_eq!(doc.id, IssueId::Number(512));
        assert_eq!(doc.title, UNKNOWN_TITLE);
        assert_eq!(doc.description, "Something broke here.");
    }

    #[test]
    fn non_numeric_file_name_uses_sentinel() {
        let doc = parse("docs/issues/notes.md", "no structure at all");
        assert_eq!(doc.id, IssueId::Unknown);
        assert_eq!(doc.description, "");
    }

    #[test]
    fn header_must_start_a_line() {
        let doc = parse("3.md", "see # #99: not a header\n");
        assert!(!doc.has_header);
        assert_eq!(doc.id, IssueId::Number(3));
    }

    #[test]
    fn header_does_not_span_lines() {
        let doc = parse("5.md", "#\n#12: split across lines\n");
        assert!(!doc.has_header);
        assert_eq!(doc.id, IssueId::Number(5));

        let doc = parse("6.md", "# #12:\nnext line\n");
        assert!(doc.has_header);
        assert_eq!(doc.title, "");
    }

    #[test]
    fn crlf_documents_parse() {
        let doc = parse(
            "11.md",
            "# #11: Windows export\r\n\r\n## Description\r\n\r\nBody text here.\r\n\r\n## Comments\r\n",
        );
        assert_eq!(doc.title, "Windows export");
        assert_eq!(doc.description, "Body text here.");
    }
}
