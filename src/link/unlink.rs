//! Removing links to a page that no longer exists.

use tracing::debug;

use crate::link::markup::anchors;
use crate::link::route::PageRoute;
use crate::page::PageId;

/// Replaces every anchor that targets `page` with its display text.
///
/// Returns the new content and the number of anchors removed. Anchors to
/// other pages and non-wiki anchors are left as they are.
///
/// # Examples
///
/// ```
/// use scribe::link::unlink_page;
/// use scribe::PageId;
///
/// let html = r#"See <a href="/worlds/1/concept/2/page/3">the Keep</a>."#;
/// let (out, removed) = unlink_page(html, PageId::new(3), "/worlds");
/// assert_eq!(out, "See the Keep.");
/// assert_eq!(removed, 1);
/// ```
#[must_use]
pub fn unlink_page(content: &str, page: PageId, prefix: &str) -> (String, usize) {
    let mut out = String::with_capacity(content.len());
    let mut cursor = 0;
    let mut removed = 0;

    for anchor in anchors(content) {
        let targets_page = anchor
            .href
            .as_deref()
            .and_then(|h| PageRoute::parse(h, prefix))
            .is_some_and(|route| route.page == page);
        if !targets_page {
            continue;
        }
        out.push_str(&content[cursor..anchor.span.start]);
        out.push_str(&anchor.text());
        cursor = anchor.span.end;
        removed += 1;
    }

    if removed == 0 {
        return (content.to_string(), 0);
    }

    out.push_str(&content[cursor..]);
    debug!(page = %page, removed, "removed links to page");
    (out, removed)
}
