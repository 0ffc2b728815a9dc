//! Read-only helpers over the html5ever DOM
//!
//! The conversion core walks `markup5ever_rcdom` handles directly. This
//! module collects the small queries it needs (tag classification,
//! attribute lookup, text flattening, bounded descendant walks and simple
//! selector matching) so the renderers stay focused on Markdown.
//!
//! Nothing here mutates the tree.

use markup5ever_rcdom::{Handle, Node, NodeData};
use std::ops::ControlFlow;
use std::rc::Weak;

/// Closed classification of element tag names
///
/// Resolved once per element; `Other` is the transparent default so
/// unknown tags never need special handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// Scripts, styles and media: contribute nothing, never descended into
    HardDrop,
    /// `article`, `div`, `section`
    Container,
    /// `h1`..`h6`
    Heading(u8),
    /// `p`
    Paragraph,
    /// `blockquote`
    Blockquote,
    /// `ul`
    UnorderedList,
    /// `ol`
    OrderedList,
    /// `li`
    ListItem,
    /// `pre`
    Preformatted,
    /// `table`
    Table,
    /// `hr`
    HorizontalRule,
    /// `br`
    LineBreak,
    /// `a`
    Link,
    /// `strong`, `b`
    Strong,
    /// `em`, `i`
    Emphasis,
    /// `code`
    Code,
    /// Anything else
    Other,
}

impl TagKind {
    /// Classify a lowercase tag name
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "script" | "style" | "noscript" | "img" | "figure" | "video" | "audio" | "source"
            | "iframe" | "canvas" | "svg" => TagKind::HardDrop,
            "article" | "div" | "section" => TagKind::Container,
            "h1" => TagKind::Heading(1),
            "h2" => TagKind::Heading(2),
            "h3" => TagKind::Heading(3),
            "h4" => TagKind::Heading(4),
            "h5" => TagKind::Heading(5),
            "h6" => TagKind::Heading(6),
            "p" => TagKind::Paragraph,
            "blockquote" => TagKind::Blockquote,
            "ul" => TagKind::UnorderedList,
            "ol" => TagKind::OrderedList,
            "li" => TagKind::ListItem,
            "pre" => TagKind::Preformatted,
            "table" => TagKind::Table,
            "hr" => TagKind::HorizontalRule,
            "br" => TagKind::LineBreak,
            "a" => TagKind::Link,
            "strong" | "b" => TagKind::Strong,
            "em" | "i" => TagKind::Emphasis,
            "code" => TagKind::Code,
            _ => TagKind::Other,
        }
    }

    /// Classify a node; `None` for non-element nodes
    pub fn of(node: &Node) -> Option<Self> {
        tag_name(node).map(TagKind::from_tag)
    }

    /// True for `ul` and `ol`
    pub fn is_list(self) -> bool {
        matches!(self, TagKind::UnorderedList | TagKind::OrderedList)
    }
}

/// Lowercase local tag name of an element, `None` for other node types
pub fn tag_name(node: &Node) -> Option<&str> {
    match node.data {
        NodeData::Element { ref name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// Value of an attribute on an element
pub fn attr(node: &Node, attr_name: &str) -> Option<String> {
    match node.data {
        NodeData::Element { ref attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| attr.name.local.as_ref() == attr_name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

/// Parent of a node, if it is still attached
pub fn parent(node: &Node) -> Option<Handle> {
    let weak = node.parent.take();
    let parent = weak.as_ref().and_then(Weak::upgrade);
    node.parent.set(weak);
    parent
}

fn is_hard_drop(node: &Node) -> bool {
    TagKind::of(node) == Some(TagKind::HardDrop)
}

/// Element children in document order
pub fn element_children(node: &Handle) -> Vec<Handle> {
    node.children
        .borrow()
        .iter()
        .filter(|child| matches!(child.data, NodeData::Element { .. }))
        .cloned()
        .collect()
}

/// Feed every text payload under `node` to `visit`, in document order
///
/// Comments are not text; hard-drop subtrees are skipped.
fn for_each_text(node: &Handle, visit: &mut impl FnMut(&str)) {
    match node.data {
        NodeData::Text { ref contents } => visit(&contents.borrow()),
        NodeData::Element { .. } if is_hard_drop(node) => {}
        NodeData::Element { .. } | NodeData::Document => {
            for child in node.children.borrow().iter() {
                for_each_text(child, visit);
            }
        }
        _ => {}
    }
}

/// Visible text of a subtree
///
/// Each text node is trimmed, empty pieces are skipped, and the rest are
/// joined with single spaces. `<p>Hello <b>world</b></p>` gives
/// `"Hello world"`.
pub fn visible_text(node: &Handle) -> String {
    let mut pieces: Vec<String> = Vec::new();
    for_each_text(node, &mut |text| {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            pieces.push(trimmed.to_string());
        }
    });
    pieces.join(" ")
}

/// Raw text of a subtree: all text payloads concatenated untouched
pub fn raw_text(node: &Handle) -> String {
    let mut output = String::new();
    for_each_text(node, &mut |text| output.push_str(text));
    output
}

/// Pre-order walk over the element descendants of `node` (excluding `node`)
///
/// `visit` decides per element whether to keep going, skip that element's
/// subtree, or stop the whole walk.
pub fn walk_descendants(
    node: &Handle,
    visit: &mut impl FnMut(&Handle) -> Walk,
) -> ControlFlow<()> {
    for child in node.children.borrow().iter() {
        if !matches!(child.data, NodeData::Element { .. }) {
            continue;
        }
        match visit(child) {
            Walk::Stop => return ControlFlow::Break(()),
            Walk::SkipChildren => {}
            Walk::Continue => walk_descendants(child, visit)?,
        }
    }
    ControlFlow::Continue(())
}

/// Decision returned by a [`walk_descendants`] visitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    /// Descend into this element's children
    Continue,
    /// Do not descend into this element
    SkipChildren,
    /// Abort the walk
    Stop,
}

/// A compound selector: optional tag, optional `#id`, any number of `.class`
///
/// Enough to express the fixed structural selectors used to locate titles
/// and article bodies (`#js_content`, `div.rich_media_content`, `title`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleSelector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl SimpleSelector {
    /// Parse a compound selector such as `div.rich_media_content`
    ///
    /// Returns `None` for empty input or descendant/combinator syntax.
    pub fn parse(selector: &str) -> Option<Self> {
        let selector = selector.trim();
        if selector.is_empty() || selector.contains(char::is_whitespace) {
            return None;
        }

        let mut parsed = SimpleSelector {
            tag: None,
            id: None,
            classes: Vec::new(),
        };

        let mut rest = selector;
        let tag_end = rest.find(['#', '.']).unwrap_or(rest.len());
        if tag_end > 0 {
            parsed.tag = Some(rest[..tag_end].to_ascii_lowercase());
        }
        rest = &rest[tag_end..];

        while let Some(marker) = rest.chars().next() {
            let body = &rest[1..];
            let end = body.find(['#', '.']).unwrap_or(body.len());
            let token = &body[..end];
            if token.is_empty() {
                return None;
            }
            match marker {
                '#' => parsed.id = Some(token.to_string()),
                _ => parsed.classes.push(token.to_string()),
            }
            rest = &body[end..];
        }

        Some(parsed)
    }

    /// Does this selector match the given node?
    pub fn matches(&self, node: &Node) -> bool {
        let Some(tag) = tag_name(node) else {
            return false;
        };
        if let Some(ref wanted) = self.tag
            && wanted != tag
        {
            return false;
        }
        if let Some(ref wanted) = self.id
            && attr(node, "id").as_deref() != Some(wanted.as_str())
        {
            return false;
        }
        if self.classes.is_empty() {
            return true;
        }
        let class_attr = attr(node, "class").unwrap_or_default();
        self.classes
            .iter()
            .all(|class| class_attr.split_whitespace().any(|token| token == class))
    }

    /// First matching element under `root` in document order
    pub fn find_first(&self, root: &Handle) -> Option<Handle> {
        let mut found = None;
        let _ = walk_descendants(root, &mut |node| {
            if self.matches(node) {
                found = Some(node.clone());
                Walk::Stop
            } else {
                Walk::Continue
            }
        });
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_html;

    fn first(html: &str, selector: &str) -> Handle {
        let dom = parse_html(html.as_bytes()).expect("Parse failed");
        SimpleSelector::parse(selector)
            .expect("valid selector")
            .find_first(&dom.document)
            .expect("selector should match")
    }

    #[test]
    fn test_tag_kind_dispatch() {
        assert_eq!(TagKind::from_tag("svg"), TagKind::HardDrop);
        assert_eq!(TagKind::from_tag("section"), TagKind::Container);
        assert_eq!(TagKind::from_tag("h4"), TagKind::Heading(4));
        assert_eq!(TagKind::from_tag("b"), TagKind::Strong);
        assert_eq!(TagKind::from_tag("i"), TagKind::Emphasis);
        assert_eq!(TagKind::from_tag("marquee"), TagKind::Other);
        assert!(TagKind::from_tag("ol").is_list());
        assert!(!TagKind::from_tag("li").is_list());
    }

    #[test]
    fn test_visible_text_joins_trimmed_pieces() {
        let p = first("<p>  Hello <b>world</b>!  </p>", "p");
        assert_eq!(visible_text(&p), "Hello world !");
    }

    #[test]
    fn test_visible_text_skips_comments_and_hard_drop() {
        let p = first(
            "<div id=x>One<!-- hidden --><script>var a;</script><span>Two</span></div>",
            "#x",
        );
        assert_eq!(visible_text(&p), "One Two");
    }

    #[test]
    fn test_raw_text_preserves_whitespace() {
        let pre = first("<pre>  line 1\n    line 2\n</pre>", "pre");
        assert_eq!(raw_text(&pre), "  line 1\n    line 2\n");
    }

    #[test]
    fn test_attr_lookup() {
        let span = first(r#"<span style="font-size: 18px" class="a">x</span>"#, "span");
        assert_eq!(attr(&span, "style").as_deref(), Some("font-size: 18px"));
        assert_eq!(attr(&span, "id"), None);
    }

    #[test]
    fn test_parent_lookup() {
        let code = first("<pre><code>x</code></pre>", "code");
        let parent = parent(&code).expect("attached to pre");
        assert_eq!(tag_name(&parent), Some("pre"));
        // Lookup leaves the link in place
        assert!(super::parent(&code).is_some());
    }

    #[test]
    fn test_selector_parse() {
        assert!(SimpleSelector::parse("").is_none());
        assert!(SimpleSelector::parse("div p").is_none());
        assert!(SimpleSelector::parse("div.").is_none());
        assert!(SimpleSelector::parse("#js_content").is_some());
        assert!(SimpleSelector::parse("div.rich_media_content").is_some());
    }

    #[test]
    fn test_selector_matches_class_tokens() {
        let html = r#"<section class="rich_media_content_x">no</section><div class="a rich_media_content b">yes</div>"#;
        let node = first(html, ".rich_media_content");
        assert_eq!(visible_text(&node), "yes");

        let node = first(html, "div.rich_media_content");
        assert_eq!(visible_text(&node), "yes");
    }

    #[test]
    fn test_selector_tag_and_id() {
        let html = r#"<span id="activity-name">span</span><h1 id="activity-name">h1</h1>"#;
        assert_eq!(visible_text(&first(html, "h1#activity-name")), "h1");
        assert_eq!(visible_text(&first(html, "#activity-name")), "span");
    }

    #[test]
    fn test_walk_descendants_stops_early() {
        let root = first("<div id=r><span>1</span><span>2</span><span>3</span></div>", "#r");
        let mut seen = 0;
        let flow = walk_descendants(&root, &mut |_| {
            seen += 1;
            if seen == 2 { Walk::Stop } else { Walk::Continue }
        });
        assert_eq!(flow, ControlFlow::Break(()));
        assert_eq!(seen, 2);
    }

    #[test]
    fn test_walk_descendants_skip_children() {
        let root = first("<div id=r><p><span>in</span></p><span>out</span></div>", "#r");
        let mut tags = Vec::new();
        let _ = walk_descendants(&root, &mut |node| {
            tags.push(tag_name(node).unwrap_or_default().to_string());
            if tag_name(node) == Some("p") {
                Walk::SkipChildren
            } else {
                Walk::Continue
            }
        });
        assert_eq!(tags, vec!["p", "span"]);
    }
}
