//! Article structure location
//!
//! Saved article pages wrap the article in a lot of chrome: account cards,
//! reward buttons, comment widgets, QR codes. The title and the body sit in
//! well-known containers, so both are located with short, prioritized lists
//! of selectors. The first selector that matches anything wins.
//!
//! | Part | Selectors, in priority order | Fallback |
//! |---|---|---|
//! | Title | `#activity-name`, `.rich_media_title`, `title` | empty string |
//! | Body | `#js_content`, `div.rich_media_content`, `#img-content`, `body` | the document node |
//!
//! # Examples
//!
//! ```rust
//! use wechat_markdown::extract::{locate_content, locate_title};
//! use wechat_markdown::parser::parse_html;
//!
//! let html = br#"<html><head><title>Tab title</title></head><body>
//!   <h1 id="activity-name"> Real  title </h1>
//!   <div id="js_content"><p>Body</p></div>
//! </body></html>"#;
//! let dom = parse_html(html).unwrap();
//!
//! assert_eq!(locate_title(&dom), "Real  title");
//! let content = locate_content(&dom);
//! assert_eq!(wechat_markdown::dom::attr(&content, "id").as_deref(), Some("js_content"));
//! ```

use markup5ever_rcdom::{Handle, RcDom};

use crate::dom::{self, SimpleSelector};

/// Title selectors, highest priority first
pub const TITLE_SELECTORS: &[&str] = &["#activity-name", ".rich_media_title", "title"];

/// Article body selectors, highest priority first
pub const CONTENT_SELECTORS: &[&str] = &[
    "#js_content",
    "div.rich_media_content",
    "#img-content",
    "body",
];

/// Title and body located in a parsed page
#[derive(Debug, Clone)]
pub struct Article {
    /// Visible title text, empty when the page has none
    pub title: String,
    /// Root of the article body
    pub content: Handle,
}

impl Article {
    /// Locate both parts of an article
    pub fn locate(dom: &RcDom) -> Self {
        Self {
            title: locate_title(dom),
            content: locate_content(dom),
        }
    }
}

/// First element matched by the highest-priority selector that matches
fn find_first(root: &Handle, selectors: &[&'static str]) -> Option<(&'static str, Handle)> {
    selectors.iter().find_map(|&selector| {
        let node = SimpleSelector::parse(selector)?.find_first(root)?;
        Some((selector, node))
    })
}

/// Visible text of the article title
///
/// Returns an empty string when no title selector matches.
pub fn locate_title(dom: &RcDom) -> String {
    match find_first(&dom.document, TITLE_SELECTORS) {
        Some((selector, node)) => {
            tracing::debug!(selector, "title located");
            dom::visible_text(&node)
        }
        None => {
            tracing::warn!("no title element found");
            String::new()
        }
    }
}

/// Root element of the article body
///
/// Falls back to the document node when not even `<body>` exists.
pub fn locate_content(dom: &RcDom) -> Handle {
    match find_first(&dom.document, CONTENT_SELECTORS) {
        Some((selector, node)) => {
            if selector == "body" {
                tracing::warn!("article container not found, converting the whole body");
            } else {
                tracing::debug!(selector, "article body located");
            }
            node
        }
        None => {
            tracing::warn!("no body element found, converting the whole document");
            dom.document.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_html;

    fn parse(html: &str) -> RcDom {
        parse_html(html.as_bytes()).expect("Parse failed")
    }

    #[test]
    fn test_title_priority() {
        let dom = parse(
            r#"<title>Tab</title><h2 class="rich_media_title">Class title</h2><h1 id="activity-name">Id title</h1>"#,
        );
        assert_eq!(locate_title(&dom), "Id title");

        let dom = parse(r#"<title>Tab</title><h2 class="x rich_media_title">Class  title</h2>"#);
        assert_eq!(locate_title(&dom), "Class  title");

        let dom = parse("<title> Tab title </title><p>body</p>");
        assert_eq!(locate_title(&dom), "Tab title");
    }

    #[test]
    fn test_missing_title_is_empty() {
        assert_eq!(locate_title(&parse("<p>No title here</p>")), "");
    }

    #[test]
    fn test_content_priority() {
        let dom = parse(
            r#"<div id="img-content"><div class="rich_media_content">rich</div><div id="js_content">js</div></div>"#,
        );
        assert_eq!(dom::visible_text(&locate_content(&dom)), "js");

        let dom = parse(r#"<div id="img-content"><div class="rich_media_content">rich</div></div>"#);
        assert_eq!(dom::visible_text(&locate_content(&dom)), "rich");

        let dom = parse(r#"<div id="img-content"><section class="rich_media_content">s</section></div>"#);
        assert_eq!(dom::attr(&locate_content(&dom), "id").as_deref(), Some("img-content"));
    }

    #[test]
    fn test_content_falls_back_to_body() {
        let dom = parse("<p>plain page</p>");
        let content = locate_content(&dom);
        assert_eq!(dom::tag_name(&content), Some("body"));
    }

    #[test]
    fn test_plain_h1_and_article_are_not_selectors() {
        let dom = parse("<title>Tab</title><h1>Heading</h1><article><p>inside</p></article>");
        assert_eq!(locate_title(&dom), "Tab");
        assert_eq!(dom::tag_name(&locate_content(&dom)), Some("body"));
    }

    #[test]
    fn test_article_locate() {
        let dom = parse(r#"<h1 id="activity-name">T</h1><div id="js_content"><p>B</p></div>"#);
        let article = Article::locate(&dom);
        assert_eq!(article.title, "T");
        assert_eq!(dom::visible_text(&article.content), "B");
    }
}
