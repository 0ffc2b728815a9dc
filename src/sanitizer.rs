//! Structural cleanup of an article body before conversion
//!
//! Saved pages carry far more than the article: embedded players, forms,
//! reward buttons, tracking links and a thick layer of inline attributes.
//! The sanitizer reduces the body subtree to plain structure, in place.
//!
//! # Passes
//!
//! Each pass walks the whole subtree below the root, in this order:
//!
//! 1. **Comments**: every comment node is removed
//! 2. **Noise**: scripts, styles, embeds, form controls and all media are
//!    removed together with their subtrees (see [`REMOVED_ELEMENTS`])
//! 3. **Links**: each `<a>` is replaced by a text node holding its visible
//!    text, so link targets (and their tracking parameters) are gone
//! 4. **Attributes**: every attribute except `style` is dropped
//!
//! `style` survives the last pass because inline font sizes drive heading
//! inference. [`Sanitizer::strip_styles`] removes it once it is no longer
//! needed.
//!
//! # Examples
//!
//! ```rust
//! use wechat_markdown::parser::parse_html;
//! use wechat_markdown::sanitizer::Sanitizer;
//!
//! let dom = parse_html(br#"<p class="x">Hi <a href="https://t.example/?id=1">there</a><img src="a.png"></p>"#).unwrap();
//! let report = Sanitizer::new().sanitize(&dom.document);
//! assert_eq!(report.elements_removed, 1);
//! assert_eq!(report.links_unwrapped, 1);
//! ```

use html5ever::tendril::StrTendril;
use markup5ever_rcdom::{Handle, Node, NodeData};
use std::cell::RefCell;
use std::rc::Rc;

use crate::dom::{self, Walk};

/// Elements removed together with everything inside them
pub const REMOVED_ELEMENTS: &[&str] = &[
    "script",   // executable
    "style",    // stylesheets
    "noscript", // fallback markup
    "iframe",   // embedded players and widgets
    "form",     // comment and reward forms
    "input",
    "button",
    "textarea",
    "select",
    "option",
    "img", // media never reaches the output
    "figure",
    "video",
    "audio",
    "source",
    "canvas",
    "svg",
];

/// The only attribute kept by [`Sanitizer::sanitize`]
const KEPT_ATTRIBUTE: &str = "style";

/// Action to take when sanitizing an element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanitizeAction {
    /// Keep the element, minus its attributes
    Keep,
    /// Remove the element and all its children
    Remove,
    /// Replace the element with its visible text
    Unwrap,
}

/// Counts of what a sanitize run changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SanitizeReport {
    /// Comment nodes removed
    pub comments_removed: usize,
    /// Elements removed with their subtrees (nested ones not counted)
    pub elements_removed: usize,
    /// Links replaced by their text
    pub links_unwrapped: usize,
    /// Attributes dropped
    pub attributes_stripped: usize,
}

/// In-place sanitizer for an article subtree
///
/// The root itself is never removed or stripped; only its descendants are.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sanitizer;

impl Sanitizer {
    /// Create a new sanitizer
    pub fn new() -> Self {
        Self
    }

    /// Decide what happens to an element with the given tag name
    pub fn check_element(&self, tag_name: &str) -> SanitizeAction {
        if REMOVED_ELEMENTS.contains(&tag_name) {
            SanitizeAction::Remove
        } else if tag_name == "a" {
            SanitizeAction::Unwrap
        } else {
            SanitizeAction::Keep
        }
    }

    fn action_for(&self, node: &Node) -> SanitizeAction {
        dom::tag_name(node).map_or(SanitizeAction::Keep, |tag| self.check_element(tag))
    }

    /// Run all four passes over the descendants of `root`
    pub fn sanitize(&self, root: &Handle) -> SanitizeReport {
        let mut report = SanitizeReport::default();

        for_each_parent(root, &mut |node| {
            node.children.borrow_mut().retain(|child| {
                let is_comment = matches!(child.data, NodeData::Comment { .. });
                report.comments_removed += usize::from(is_comment);
                !is_comment
            });
        });

        for_each_parent(root, &mut |node| {
            node.children.borrow_mut().retain(|child| {
                let remove = self.action_for(child) == SanitizeAction::Remove;
                report.elements_removed += usize::from(remove);
                !remove
            });
        });

        for_each_parent(root, &mut |node| {
            let mut children = node.children.borrow_mut();
            for child in children.iter_mut() {
                if self.action_for(child) == SanitizeAction::Unwrap {
                    *child = text_node(&dom::visible_text(child), node);
                    report.links_unwrapped += 1;
                }
            }
        });

        let _ = dom::walk_descendants(root, &mut |node| {
            if let NodeData::Element { ref attrs, .. } = node.data {
                let mut attrs = attrs.borrow_mut();
                let before = attrs.len();
                attrs.retain(|attr| attr.name.local.as_ref() == KEPT_ATTRIBUTE);
                report.attributes_stripped += before - attrs.len();
            }
            Walk::Continue
        });

        tracing::debug!(
            comments = report.comments_removed,
            elements = report.elements_removed,
            links = report.links_unwrapped,
            attributes = report.attributes_stripped,
            "article body sanitized"
        );
        report
    }

    /// Remove every `style` attribute below `root`
    ///
    /// Returns the number of attributes removed.
    pub fn strip_styles(&self, root: &Handle) -> usize {
        let mut stripped = 0;
        let _ = dom::walk_descendants(root, &mut |node| {
            if let NodeData::Element { ref attrs, .. } = node.data {
                let mut attrs = attrs.borrow_mut();
                let before = attrs.len();
                attrs.retain(|attr| attr.name.local.as_ref() != KEPT_ATTRIBUTE);
                stripped += before - attrs.len();
            }
            Walk::Continue
        });
        stripped
    }
}

/// Visit `root` and every element below it, parents before children
///
/// `visit` may rewrite the children of the node it is given; the walk then
/// continues into the rewritten list.
fn for_each_parent(root: &Handle, visit: &mut impl FnMut(&Handle)) {
    visit(root);
    let _ = dom::walk_descendants(root, &mut |node| {
        visit(node);
        Walk::Continue
    });
}

fn text_node(text: &str, parent: &Handle) -> Handle {
    let node = Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from_slice(text)),
    });
    node.parent.set(Some(Rc::downgrade(parent)));
    node
}
