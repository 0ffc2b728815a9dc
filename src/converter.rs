//! Markdown converter - turns an article body into clean Markdown
//!
//! The converter walks the html5ever DOM of an article body in document order
//! and produces a deliberately small Markdown dialect: `#`..`####` headings,
//! `**bold**`, `*italic*`, inline code, fenced code blocks, `-` / `1.` lists
//! with two spaces of indentation per level, `> ` quotes, tab-separated table
//! rows and `---` rules. Nothing else is ever emitted.
//!
//! # Rendering Modes
//!
//! Every node is rendered in one of two modes:
//!
//! - **Block mode** ([`MarkdownConverter::render_block`]) handles structural
//!   elements. Paragraphs, headings, quotes, lists, code blocks and tables
//!   each end with a blank line. Containers and unknown tags are transparent.
//! - **Inline mode** ([`MarkdownConverter::render_inline`]) flattens phrasing
//!   content into one fragment. Only `<br>` introduces newlines.
//!
//! Scripts, styles and media (`img`, `video`, `svg`, ...) contribute nothing
//! in either mode. Links keep their text but never their target.
//!
//! # Heading Inference
//!
//! Article editors rarely use heading tags. A `<p>` that looks like a section
//! title (short, bold, or set in a large font) is emitted as a heading; see
//! [`crate::heading`].
//!
//! # Examples
//!
//! Input HTML:
//! ```html
//! <section>
//!   <h2>Intro</h2>
//!   <p>Some <b>bold</b> text.</p>
//!   <p><span style="font-size: 22px">Big Title</span></p>
//!   <ul><li>one<ul><li>nested</li></ul></li></ul>
//! </section>
//! ```
//!
//! Output Markdown:
//! ```markdown
//! ## Intro
//!
//! Some **bold** text.
//!
//! ## Big Title
//!
//! - one
//!   - nested
//! ```

use markup5ever_rcdom::{Handle, NodeData};

use crate::dom::{self, TagKind, Walk};
use crate::heading;
use crate::normalize::{Rendered, clean_text, finish_document};

/// Rendering options
#[derive(Debug, Clone)]
pub struct ConversionOptions {
    /// Promote heading-like paragraphs to headings
    pub infer_headings: bool,
    /// Prepend the article title as a level-1 heading
    pub include_title: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            infer_headings: true,
            include_title: true,
        }
    }
}

/// Markdown converter
///
/// Rendering is pure: the tree is only read, and the same tree always
/// produces the same string.
///
/// # Examples
///
/// ```rust
/// use wechat_markdown::converter::MarkdownConverter;
/// use wechat_markdown::parser::parse_html;
///
/// let dom = parse_html(b"<h2>Intro</h2><p>Hello <b>world</b></p>").expect("Parse failed");
/// let markdown = MarkdownConverter::new().convert(&dom.document, "My Post");
/// assert_eq!(markdown, "# My Post\n\n## Intro\n\nHello **world**\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MarkdownConverter {
    options: ConversionOptions,
}

impl MarkdownConverter {
    /// Create a new converter with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new converter with custom options
    ///
    /// ```rust
    /// use wechat_markdown::converter::{ConversionOptions, MarkdownConverter};
    ///
    /// let options = ConversionOptions {
    ///     infer_headings: false,
    ///     ..Default::default()
    /// };
    /// let converter = MarkdownConverter::with_options(options);
    /// assert!(!converter.options().infer_headings);
    /// ```
    pub fn with_options(options: ConversionOptions) -> Self {
        Self { options }
    }

    /// Options this converter was built with
    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Convert an article body to a finished Markdown document
    ///
    /// The body is block-rendered, whitespace-normalized, limited to single
    /// blank lines and terminated by exactly one newline. A non-empty `title`
    /// is prepended as `# title` unless the body already opens with that
    /// exact heading.
    pub fn convert(&self, content: &Handle, title: &str) -> String {
        let body = finish_document(&self.render_block(content, 0));

        let title = title.trim();
        if !self.options.include_title || title.is_empty() {
            return body;
        }

        let first_line = body.lines().next().unwrap_or_default().trim();
        let already_titled = first_line
            .strip_prefix("# ")
            .is_some_and(|heading| heading.trim() == title);
        if already_titled {
            return body;
        }

        if body.trim().is_empty() {
            format!("# {title}\n")
        } else {
            format!("# {title}\n\n{body}")
        }
    }

    /// Render a node in block mode
    ///
    /// `list_level` is the nesting depth of the enclosing lists and controls
    /// list item indentation. Text is returned as found in the page; it is
    /// cleaned when the whole body goes through [`finish_document`].
    pub fn render_block(&self, node: &Handle, list_level: usize) -> Rendered {
        match node.data {
            NodeData::Document => self.block_children(node, list_level),
            NodeData::Text { ref contents } => Rendered::from(contents.borrow().to_string()),
            NodeData::Element { .. } => self.render_block_element(node, list_level),
            NodeData::Comment { .. }
            | NodeData::Doctype { .. }
            | NodeData::ProcessingInstruction { .. } => Rendered::default(),
        }
    }

    /// Render a node in inline mode
    pub fn render_inline(&self, node: &Handle) -> String {
        let inside_pre = dom::parent(node)
            .is_some_and(|parent| dom::tag_name(&parent) == Some("pre"));
        self.inline(node, inside_pre)
    }

    fn render_block_element(&self, node: &Handle, list_level: usize) -> Rendered {
        let Some(kind) = TagKind::of(node) else {
            return Rendered::default();
        };

        match kind {
            TagKind::HardDrop => Rendered::default(),
            TagKind::Heading(level) => self.render_heading(node, level).into(),
            TagKind::Paragraph => self.render_paragraph(node).into(),
            TagKind::Blockquote => self.render_blockquote(node, list_level).into(),
            TagKind::UnorderedList => self.render_list(node, list_level, false),
            TagKind::OrderedList => self.render_list(node, list_level, true),
            TagKind::Preformatted => render_preformatted(node),
            TagKind::Table => render_table(node).into(),
            TagKind::HorizontalRule => Rendered::from("\n---\n\n"),
            // Everything else is a transparent container at block level
            TagKind::Container
            | TagKind::ListItem
            | TagKind::LineBreak
            | TagKind::Link
            | TagKind::Strong
            | TagKind::Emphasis
            | TagKind::Code
            | TagKind::Other => self.block_children(node, list_level),
        }
    }

    fn block_children(&self, node: &Handle, list_level: usize) -> Rendered {
        node.children
            .borrow()
            .iter()
            .map(|child| self.render_block(child, list_level))
            .collect()
    }

    fn inline_children(&self, node: &Handle) -> String {
        let inside_pre = dom::tag_name(node) == Some("pre");
        node.children
            .borrow()
            .iter()
            .map(|child| self.inline(child, inside_pre))
            .collect()
    }

    /// Inline rendering; `inside_pre` tells whether `node` is a direct
    /// child of `<pre>`
    fn inline(&self, node: &Handle, inside_pre: bool) -> String {
        match node.data {
            NodeData::Text { ref contents } => contents.borrow().to_string(),
            NodeData::Document => self.inline_children(node),
            NodeData::Element { .. } => match TagKind::of(node) {
                Some(TagKind::HardDrop) => String::new(),
                Some(TagKind::LineBreak) => "\n".to_string(),
                Some(TagKind::Strong) => wrap_emphasis(&self.inline_children(node), "**"),
                Some(TagKind::Emphasis) => wrap_emphasis(&self.inline_children(node), "*"),
                Some(TagKind::Code) if !inside_pre => {
                    format!("`{}`", dom::raw_text(node).replace('`', "\\`"))
                }
                // Links render their text only; the target is discarded
                _ => self.inline_children(node),
            },
            _ => String::new(),
        }
    }

    fn render_heading(&self, node: &Handle, level: u8) -> String {
        let text = clean_text(&self.inline_children(node));
        let text = text.trim();
        if text.is_empty() {
            return String::new();
        }
        format!("{} {}\n\n", "#".repeat(usize::from(level)), text)
    }

    fn render_paragraph(&self, node: &Handle) -> String {
        let plain = dom::visible_text(node);
        if plain.is_empty() {
            return String::new();
        }

        if self.options.infer_headings
            && let Some(level) = heading::classify(node)
        {
            tracing::debug!(level, text = %plain, "paragraph promoted to heading");
            let text = clean_text(&plain);
            return format!("{} {}\n\n", "#".repeat(usize::from(level)), text.trim());
        }

        let text = clean_text(&self.inline_children(node));
        let text = text.trim();
        if text.is_empty() {
            String::new()
        } else {
            format!("{text}\n\n")
        }
    }

    fn render_blockquote(&self, node: &Handle, list_level: usize) -> String {
        // Quoted blocks are flattened, code and list indentation included
        let inner = clean_text(&self.block_children(node, list_level).to_string());
        let quoted: Vec<String> = inner
            .trim()
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| format!("> {line}"))
            .collect();
        if quoted.is_empty() {
            return String::new();
        }
        let mut output = quoted.join("\n");
        output.push_str("\n\n");
        output
    }

    /// Render the direct `<li>` children of a list
    ///
    /// Ordered items are numbered by position among the direct items, so a
    /// nested list inside an item does not disturb the numbering.
    fn render_list(&self, node: &Handle, list_level: usize, ordered: bool) -> Rendered {
        let mut output = Rendered::default();
        let mut any_item = false;

        let items = dom::element_children(node)
            .into_iter()
            .filter(|child| TagKind::of(child) == Some(TagKind::ListItem));
        for (position, item) in items.enumerate() {
            let index = ordered.then_some(position + 1);
            let rendered = self.render_list_item(&item, list_level, index);
            any_item |= !rendered.is_empty();
            output.append(rendered);
        }

        if any_item {
            output.push_text("\n");
        }
        output
    }

    /// Render one list item; `index` is `Some` for ordered lists
    fn render_list_item(&self, node: &Handle, list_level: usize, index: Option<usize>) -> Rendered {
        let mut nested_lists = Vec::new();
        let mut content = String::new();
        for child in node.children.borrow().iter() {
            if TagKind::of(child).is_some_and(TagKind::is_list) {
                nested_lists.push(child.clone());
            } else {
                content.push_str(&self.inline(child, false));
            }
        }

        let text = clean_text(&content);
        let text = text.trim();
        if text.is_empty() && nested_lists.is_empty() {
            return Rendered::default();
        }

        let marker = match index {
            Some(index) => format!("{index}. "),
            None => "- ".to_string(),
        };
        let line = format!("{marker}{text}");

        let mut output = Rendered::default();
        output.push_indent(2 * list_level);
        output.push_text(line.trim_end());
        output.push_text("\n");

        for nested in &nested_lists {
            output.append(self.render_block(nested, list_level + 1));
        }
        output
    }
}

fn wrap_emphasis(inner: &str, marker: &str) -> String {
    let inner = inner.trim();
    if inner.is_empty() {
        String::new()
    } else {
        format!("{marker}{inner}{marker}")
    }
}

/// Fenced code block with the element's text kept verbatim
fn render_preformatted(node: &Handle) -> Rendered {
    let text = dom::raw_text(node);
    let code = text.trim_end_matches('\n');
    if code.trim().is_empty() {
        return Rendered::default();
    }
    let mut output = Rendered::from("```\n");
    output.push_code(code);
    output.push_text("\n```\n\n");
    output
}

/// Tab-separated rows, one per `<tr>` with at least one non-empty cell
fn render_table(node: &Handle) -> String {
    let rows: Vec<String> = descendants_tagged(node, &["tr"])
        .iter()
        .filter_map(|row| {
            let cells: Vec<String> = descendants_tagged(row, &["th", "td"])
                .iter()
                .map(dom::visible_text)
                .collect();
            cells
                .iter()
                .any(|cell| !cell.is_empty())
                .then(|| cells.join("\t"))
        })
        .collect();

    if rows.is_empty() {
        return String::new();
    }
    let mut output = rows.join("\n");
    output.push_str("\n\n");
    output
}

/// All descendants with one of the given tags, nested ones included
fn descendants_tagged(node: &Handle, tags: &[&str]) -> Vec<Handle> {
    let mut found = Vec::new();
    let _ = dom::walk_descendants(node, &mut |child| {
        if dom::tag_name(child).is_some_and(|tag| tags.contains(&tag)) {
            found.push(child.clone());
        }
        Walk::Continue
    });
    found
}
