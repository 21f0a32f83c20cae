//! Page routes: `{prefix}/{world}/concept/{concept}/page/{page}`.

use crate::link::markup::anchors;
use crate::page::{ConceptId, EntityCandidate, PageId, WorldId};

/// Default route prefix.
pub const DEFAULT_ROUTE_PREFIX: &str = "/worlds";

/// Target of a wiki link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRoute {
    pub world: WorldId,
    pub concept: ConceptId,
    pub page: PageId,
}

impl PageRoute {
    /// Route of a link candidate.
    #[must_use]
    pub fn of(candidate: &EntityCandidate) -> Self {
        Self {
            world: candidate.gameworld_id,
            concept: candidate.concept_id,
            page: candidate.id,
        }
    }

    /// Renders the route under `prefix`.
    ///
    /// # Examples
    ///
    /// ```
    /// use scribe::link::PageRoute;
    /// use scribe::EntityCandidate;
    ///
    /// let route = PageRoute::of(&EntityCandidate::new(9, "Keep", 4, 2));
    /// assert_eq!(route.to_href("/worlds"), "/worlds/2/concept/4/page/9");
    /// ```
    #[must_use]
    pub fn to_href(&self, prefix: &str) -> String {
        format!(
            "{prefix}/{}/concept/{}/page/{}",
            self.world, self.concept, self.page
        )
    }

    /// Parses an href produced by [`PageRoute::to_href`].
    ///
    /// The route may be preceded by a scheme and host and followed by a
    /// query, fragment or trailing slash. Returns `None` for anything else.
    #[must_use]
    pub fn parse(href: &str, prefix: &str) -> Option<Self> {
        let marker = format!("{prefix}/");
        let start = href.find(&marker)? + marker.len();
        let mut parts = href[start..].splitn(5, '/');

        let world = parse_id(parts.next()?, false)?;
        if parts.next()? != "concept" {
            return None;
        }
        let concept = parse_id(parts.next()?, false)?;
        if parts.next()? != "page" {
            return None;
        }
        let page = parse_id(parts.next()?, true)?;

        Some(Self {
            world: WorldId::new(world),
            concept: ConceptId::new(concept),
            page: PageId::new(page),
        })
    }
}

/// Parses a path segment as an id. The last segment may carry a trailing
/// query or fragment.
fn parse_id(segment: &str, last: bool) -> Option<i64> {
    let digits_end = segment
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(segment.len());
    if digits_end == 0 {
        return None;
    }
    let rest = &segment[digits_end..];
    let rest_ok = rest.is_empty() || (last && (rest.starts_with('?') || rest.starts_with('#') || rest.starts_with('/')));
    if !rest_ok {
        return None;
    }
    segment[..digits_end].parse().ok()
}

/// Pages referenced by anchors in `content`, first-seen order, no repeats.
#[must_use]
pub fn linked_page_ids(content: &str, prefix: &str) -> Vec<PageId> {
    let mut ids = Vec::new();
    for anchor in anchors(content) {
        let Some(route) = anchor.href.as_deref().and_then(|h| PageRoute::parse(h, prefix)) else {
            continue;
        };
        if !ids.contains(&route.page) {
            ids.push(route.page);
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roundtrip() {
        let route = PageRoute {
            world: WorldId::new(1),
            concept: ConceptId::new(22),
            page: PageId::new(333),
        };
        let href = route.to_href(DEFAULT_ROUTE_PREFIX);
        assert_eq!(PageRoute::parse(&href, DEFAULT_ROUTE_PREFIX), Some(route));
    }

    #[test]
    fn test_parse_accepts_host_and_fragment() {
        let route = PageRoute::parse("https://wiki.example/worlds/1/concept/2/page/3#history", "/worlds").unwrap();
        assert_eq!(route.page, PageId::new(3));
        assert!(PageRoute::parse("/worlds/1/concept/2/page/3?tab=x", "/worlds").is_some());
    }

    #[test]
    fn test_parse_rejects_other_shapes() {
        assert!(PageRoute::parse("/worlds/1/concept/2", "/worlds").is_none());
        assert!(PageRoute::parse("/worlds/1/group/2/page/3", "/worlds").is_none());
        assert!(PageRoute::parse("/worlds/1/concept/2/page/3abc", "/worlds").is_none());
        assert!(PageRoute::parse("/worlds/x/concept/2/page/3", "/worlds").is_none());
        assert!(PageRoute::parse("/elders/1/concept/2/page/3", "/worlds").is_none());
    }

    #[test]
    fn test_linked_page_ids_dedup_in_order() {
        let html = concat!(
            r#"<a href="/worlds/1/concept/2/page/7">A</a> "#,
            r#"<a href="https://example.com">ext</a> "#,
            r#"<a href="/worlds/1/concept/2/page/5">B</a> "#,
            r#"<a href="/worlds/1/concept/2/page/7">A again</a>"#,
        );
        assert_eq!(
            linked_page_ids(html, DEFAULT_ROUTE_PREFIX),
            vec![PageId::new(7), PageId::new(5)]
        );
    }
}
