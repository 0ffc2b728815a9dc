//! Whitespace normalization
//!
//! Rendered fragments carry the raw text of the source page: non-breaking
//! spaces, zero-width spaces, indentation from the editor's markup. Two passes
//! clean this up:
//!
//! - [`clean_text`] runs on every fragment that becomes a heading, paragraph,
//!   list item or quote. It never touches newlines.
//! - [`finish_document`] runs once on the whole [`Rendered`] body. It
//!   applies the same cleanup to all text, leaving list indentation and code
//!   blocks alone, then limits vertical spacing to a single blank line with
//!   [`collapse_blank_lines`].
//!
//! # Examples
//!
//! ```rust
//! use wechat_markdown::normalize::{clean_text, collapse_blank_lines};
//!
//! assert_eq!(clean_text("a\u{00A0}\u{00A0}b \n\t c"), "a b\nc");
//! assert_eq!(collapse_blank_lines("a\n\n\n\nb"), "a\n\nb");
//! ```

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

type RegexCell = OnceLock<Option<Regex>>;

fn compiled(cell: &'static RegexCell, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

/// Normalize horizontal whitespace while keeping every newline
///
/// In order: NBSP becomes a space, ZWSP is removed, spaces and tabs before
/// or after a newline are dropped, and remaining runs of two or more spaces
/// or tabs collapse to one space.
pub fn clean_text(text: &str) -> String {
    static TRAILING: RegexCell = OnceLock::new();
    static LEADING: RegexCell = OnceLock::new();
    static RUNS: RegexCell = OnceLock::new();

    let mut cleaned = text.replace('\u{00A0}', " ").replace('\u{200B}', "");

    let steps: [(&'static RegexCell, &str, &str); 3] = [
        (&TRAILING, r"[ \t]+\n", "\n"),
        (&LEADING, r"\n[ \t]+", "\n"),
        (&RUNS, r"[ \t]{2,}", " "),
    ];
    for (cell, pattern, replacement) in steps {
        if let Some(regex) = compiled(cell, pattern) {
            cleaned = regex.replace_all(&cleaned, replacement).into_owned();
        }
    }

    cleaned
}

/// Collapse three or more consecutive newlines into exactly two
pub fn collapse_blank_lines(text: &str) -> String {
    static BLANK_LINES: RegexCell = OnceLock::new();
    match compiled(&BLANK_LINES, r"\n{3,}") {
        Some(regex) => regex.replace_all(text, "\n\n").into_owned(),
        None => text.to_string(),
    }
}

/// One piece of rendered Markdown
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Text from the page plus markup; cleaned by [`finish_document`]
    Text(String),
    /// Leading spaces of a nested list item
    Indent(usize),
    /// Body of a fenced code block
    Code(String),
}

/// Rendered Markdown that remembers which parts are list indentation and
/// code
///
/// The converter builds one of these instead of a flat string so that the
/// final whitespace pass knows exactly what it may collapse. Adjacent text
/// is merged, which lets [`clean_text`] see across element boundaries.
///
/// ```rust
/// use wechat_markdown::normalize::{Rendered, finish_document};
///
/// let mut rendered = Rendered::from("- item\n");
/// rendered.push_indent(2);
/// rendered.push_text("-   nested\n\n```\n");
/// rendered.push_code("fn f() {\n    x();\n}");
/// rendered.push_text("\n```\n");
///
/// assert_eq!(rendered.to_string(), "- item\n  -   nested\n\n```\nfn f() {\n    x();\n}\n```\n");
/// assert_eq!(
///     finish_document(&rendered),
///     "- item\n  - nested\n\n```\nfn f() {\n    x();\n}\n```\n"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    segments: Vec<Segment>,
}

impl Rendered {
    /// Append text, merging it with preceding text
    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.segments.last_mut() {
            Some(Segment::Text(last)) => last.push_str(text),
            _ => self.segments.push(Segment::Text(text.to_string())),
        }
    }

    /// Append `width` spaces of list indentation
    pub fn push_indent(&mut self, width: usize) {
        if width > 0 {
            self.segments.push(Segment::Indent(width));
        }
    }

    /// Append the body of a code block, kept as written
    pub fn push_code(&mut self, code: &str) {
        if !code.is_empty() {
            self.segments.push(Segment::Code(code.to_string()));
        }
    }

    /// Append another rendering
    pub fn append(&mut self, other: Rendered) {
        for segment in other.segments {
            match segment {
                Segment::Text(text) => self.push_text(&text),
                segment => self.segments.push(segment),
            }
        }
    }

    /// True when nothing was rendered
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl From<&str> for Rendered {
    fn from(text: &str) -> Self {
        let mut rendered = Self::default();
        rendered.push_text(text);
        rendered
    }
}

impl From<String> for Rendered {
    fn from(text: String) -> Self {
        Self::from(text.as_str())
    }
}

impl FromIterator<Rendered> for Rendered {
    fn from_iter<I: IntoIterator<Item = Rendered>>(iter: I) -> Self {
        let mut rendered = Self::default();
        for part in iter {
            rendered.append(part);
        }
        rendered
    }
}

impl fmt::Display for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Text(text) | Segment::Code(text) => f.write_str(text)?,
                Segment::Indent(width) => f.write_str(&" ".repeat(*width))?,
            }
        }
        Ok(())
    }
}

/// Finish a rendered document body
///
/// Text is cleaned with [`clean_text`]. List indentation is kept. Code keeps
/// its indentation and inner spacing and only loses NBSP, ZWSP and blanks at
/// line ends. The result is trimmed, limited to single blank lines and
/// terminated with exactly one newline; a blank body becomes `"\n"`.
pub fn finish_document(rendered: &Rendered) -> String {
    let mut joined = String::new();
    for segment in &rendered.segments {
        match segment {
            Segment::Text(text) => joined.push_str(&clean_text(text)),
            Segment::Indent(width) => joined.push_str(&" ".repeat(*width)),
            Segment::Code(code) => {
                let lines: Vec<String> = code
                    .split('\n')
                    .map(|line| {
                        line.replace('\u{00A0}', " ")
                            .replace('\u{200B}', "")
                            .trim_end_matches([' ', '\t'])
                            .to_string()
                    })
                    .collect();
                joined.push_str(&lines.join("\n"));
            }
        }
    }

    let collapsed = collapse_blank_lines(joined.trim());
    let mut document = collapsed.trim().to_string();
    document.push('\n');
    document
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_nbsp_and_zero_width_space() {
        assert_eq!(clean_text("a\u{00A0}b"), "a b");
        assert_eq!(clean_text("zero\u{200B}width"), "zerowidth");
    }

    #[test]
    fn test_whitespace_around_newlines() {
        assert_eq!(clean_text("line one  \t\n   line two"), "line one\nline two");
        assert_eq!(clean_text("a \n \n b"), "a\n\nb");
    }

    #[test]
    fn test_runs_collapse_but_newlines_survive() {
        assert_eq!(clean_text("a  b\t\tc \t d"), "a b c d");
        assert_eq!(clean_text("a\n\n\n\nb"), "a\n\n\n\nb");
    }

    #[test]
    fn test_single_spaces_untouched() {
        assert_eq!(clean_text(" a b "), " a b ");
    }

    #[test]
    fn test_collapse_blank_lines() {
        assert_eq!(collapse_blank_lines("a\n\nb"), "a\n\nb");
        assert_eq!(collapse_blank_lines("a\n\n\nb\n\n\n\n\nc"), "a\n\nb\n\nc");
    }

    fn finish(text: &str) -> String {
        finish_document(&Rendered::from(text))
    }

    #[test]
    fn test_finish_document() {
        assert_eq!(finish("\n\n  Title\n\n\n\nBody  \n\n"), "Title\n\nBody\n");
        assert_eq!(finish(""), "\n");
        assert_eq!(finish(" \u{00A0}\n\t"), "\n");
        assert_eq!(finish_document(&Rendered::default()), "\n");
    }

    #[test]
    fn test_text_indentation_is_never_kept() {
        // Only indentation pushed as such survives, text that looks like a list does not
        assert_eq!(finish("intro\n      - 2024 plan\n   3. later"), "intro\n- 2024 plan\n3. later\n");

        let mut rendered = Rendered::from("- a\n");
        rendered.push_indent(2);
        rendered.push_text("- b\n  plain  indented\n");
        assert_eq!(finish_document(&rendered), "- a\n  - b\nplain indented\n");
    }

    #[test]
    fn test_code_kept_verbatim() {
        let mut rendered = Rendered::from("```\n");
        rendered.push_code("if x {\n\u{00A0}\u{00A0}  y  =  1;   \n}");
        rendered.push_text("\n```\n\n  after  \n");
        assert_eq!(finish_document(&rendered), "```\nif x {\n    y  =  1;\n}\n```\n\nafter\n");
    }

    #[test]
    fn test_fence_text_does_not_protect_what_follows() {
        // A fence line inside code or in plain text changes nothing for later text
        let mut rendered = Rendered::from("```\n");
        rendered.push_code("a\n```\nb");
        rendered.push_text("\n```\n\nx   y\n\n```\n\n    z  \t w\n");
        assert_eq!(
            finish_document(&rendered),
            "```\na\n```\nb\n```\n\nx y\n\n```\n\nz w\n"
        );
    }

    #[test]
    fn test_adjacent_text_is_merged() {
        let mut rendered = Rendered::from("a  ");
        rendered.append(Rendered::from("  b"));
        rendered.push_indent(0);
        rendered.push_code("");
        rendered.push_text("");
        assert_eq!(rendered.segments, vec![Segment::Text("a    b".to_string())]);
        assert_eq!(finish_document(&rendered), "a b\n");
    }

    #[test]
    fn test_collect_preserves_order() {
        let parts = vec![Rendered::from("one "), Rendered::default(), {
            let mut code = Rendered::default();
            code.push_code("  two");
            code
        }];
        let rendered: Rendered = parts.into_iter().collect();
        assert_eq!(rendered.to_string(), "one   two");
        assert!(!rendered.is_empty());
        assert!(Rendered::from("").is_empty());
    }

    proptest! {
        #[test]
        fn prop_clean_text_is_idempotent(text in "[ a\t\n\u{00A0}\u{200B}b]{0,40}") {
            let once = clean_text(&text);
            prop_assert_eq!(clean_text(&once), once);
        }

        #[test]
        fn prop_clean_text_leaves_no_horizontal_runs(text in "[ x\t\n\u{00A0}]{0,40}") {
            let cleaned = clean_text(&text);
            for bad in ["  ", "\t\t", " \t", "\t ", " \n", "\t\n", "\n ", "\n\t"] {
                prop_assert!(!cleaned.contains(bad), "{:?} left in {:?}", bad, cleaned);
            }
        }

        #[test]
        fn prop_clean_text_keeps_newline_count(text in "[ x\t\n]{0,40}") {
            let before = text.matches('\n').count();
            prop_assert_eq!(clean_text(&text).matches('\n').count(), before);
        }

        #[test]
        fn prop_finished_document_ends_with_one_newline(text in "[ x\n]{0,40}") {
            let document = finish(&text);
            prop_assert!(document.ends_with('\n'));
            prop_assert!(!document.ends_with("\n\n"));
            prop_assert!(!document.contains("\n\n\n"));
        }
    }
}
