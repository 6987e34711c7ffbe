//! Markup stripping passes used before summarizing a description.
//!
//! Each pass is a function `&str -> String` applied in sequence.
//! The result is plain prose: no code, no comments, no link targets, no
//! emphasis or heading markers.

use std::sync::LazyLock;

use regex::Regex;

/// Run the full stripping pipeline on a Markdown description.
pub(crate) fn run_pipeline(md: &str) -> String {
    let mut result = md.to_string();

    result = strip_code_blocks(&result);
    result = strip_html_comments(&result);
    result = unwrap_links(&result);
    result = strip_markers(&result);

    result
}

// ---------------------------------------------------------------------------
// Pass 1: Remove fenced code blocks
// ---------------------------------------------------------------------------

/// Drop everything between a pair of triple backticks, fences included.
fn strip_code_blocks(md: &str) -> String {
    static CODE_BLOCK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)```.*?```").expect("valid regex"));

    CODE_BLOCK_RE.replace_all(md, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 2: Remove HTML comments
// ---------------------------------------------------------------------------

/// Issue templates leave `<!-- ... -->` prompts behind; drop them.
fn strip_html_comments(md: &str) -> String {
    static HTML_COMMENT_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex"));

    HTML_COMMENT_RE.replace_all(md, "").to_string()
}

// ---------------------------------------------------------------------------
// Pass 3: Replace links by their text
// ---------------------------------------------------------------------------

/// `[text](url)` → `text`.
fn unwrap_links(md: &str) -> String {
    static LINK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\[(.*?)\]\(.*?\)").expect("valid regex"));

    LINK_RE.replace_all(md, "$1").to_string()
}

// ---------------------------------------------------------------------------
// Pass 4: Remove emphasis and heading markers
// ---------------------------------------------------------------------------

fn strip_markers(md: &str) -> String {
    md.chars()
        .filter(|c| !matches!(c, '*' | '`' | '#' | '_'))
        .collect()
}

// ---------------------------------------------------------------------------
// Sentence splitting
// ---------------------------------------------------------------------------

/// Split text into sentence-like units.
///
/// A unit ends after `.`, `!` or `?` followed by whitespace, or at a run of
/// newlines. Units are returned untrimmed.
pub(crate) fn split_sentences(text: &str) -> Vec<&str> {
    static BREAK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[.!?]\s+|\n+").expect("valid regex"));

    let mut units = Vec::new();
    let mut start = 0;

    for m in BREAK_RE.find_iter(text) {
        // Terminal punctuation stays with its sentence.
        let cut = if m.as_str().starts_with(['.', '!', '?']) {
            m.start() + 1
        } else {
            m.start()
        };
        units.push(&text[start..cut]);
        start = m.end();
    }
    units.push(&text[start..]);

    units
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_code_blocks_spans_lines() {
        let input = "Before\n```wat\n(module)\n```\nAfter";
        assert_eq!(strip_code_blocks(input), "Before\n\nAfter");
    }

    #[test]
    fn strip_code_blocks_is_non_greedy() {
        let input = "```a``` keep ```b```";
        assert_eq!(strip_code_blocks(input), " keep ");
    }

    #[test]
    fn unclosed_fence_is_left_for_marker_pass() {
        let input = "```\nno closing fence";
        assert_eq!(strip_code_blocks(input), input);
        assert_eq!(run_pipeline(input), "\nno closing fence");
    }

    #[test]
    fn strip_html_comments_removes_template_prompts() {
        let input = "<!-- Describe the bug -->\nIt breaks.";
        assert_eq!(strip_html_comments(input), "\nIt breaks.");
    }

    #[test]
    fn unwrap_links_keeps_text() {
        let input = "See [the docs](https://example.com/x) and [#12](../12)";
        assert_eq!(unwrap_links(input), "See the docs and #12");
    }

    #[test]
    fn strip_markers_removes_emphasis() {
        assert_eq!(strip_markers("## **Bold** _it_ `code`"), " Bold it code");
    }

    #[test]
    fn split_keeps_terminal_punctuation() {
        let units = split_sentences("First one. Second one! Third?");
        assert_eq!(units, vec!["First one.", "Second one!", "Third?"]);
    }

    #[test]
    fn split_on_newline_runs() {
        let units = split_sentences("line a\n\n\nline b\nline c");
        assert_eq!(units, vec!["line a", "line b", "line c"]);
    }

    #[test]
    fn split_ignores_inner_dots() {
        let units = split_sentences("Use binaryen.js v1.2 here. Done");
        assert_eq!(units, vec!["Use binaryen.js v1.2 here.", "Done"]);
    }

    #[test]
    fn full_pipeline_produces_plain_text() {
        let input = "<!-- template -->\n**Steps**: run [wasm-opt](http://x) -O3\n```\nwasm-opt a.wasm\n```\n";
        let result = run_pipeline(input);
        assert!(!result.contains("wasm-opt a.wasm"));
        assert!(!result.contains("template"));
        assert!(!result.contains("http://x"));
        assert!(result.contains("Steps: run wasm-opt -O3"));
    }
}
