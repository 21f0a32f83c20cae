//! Entity auto-linking.
//!
//! Candidates are processed strictly longest name first, each against the
//! content as modified by the candidates before it. Replacements never touch
//! tags or the body of an existing anchor, so a phrase already wrapped by a
//! longer candidate cannot be wrapped again by a shorter one.

use std::ops::Range;

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::LinkerConfig;
use crate::link::markup::{at_word_boundary, overlaps_any, protected_spans, LinkedSet};
use crate::link::route::PageRoute;
use crate::page::{EntityCandidate, PageId, WorldId};

/// Where the content being linked lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkContext {
    /// World of the page being rendered.
    pub world: WorldId,

    /// Permit links to pages of other worlds.
    #[serde(default)]
    pub allow_cross_world: bool,

    /// Page being rendered; never linked to itself.
    #[serde(default)]
    pub exclude_page: Option<PageId>,

    /// The page's own opt-out. When false nothing is linked.
    #[serde(default = "default_allow_links")]
    pub allow_links: bool,
}

const fn default_allow_links() -> bool {
    true
}

impl LinkContext {
    /// Context confined to `world`.
    #[must_use]
    pub const fn new(world: WorldId) -> Self {
        Self {
            world,
            allow_cross_world: false,
            exclude_page: None,
            allow_links: true,
        }
    }

    /// Sets the cross-world flag.
    #[must_use]
    pub const fn cross_world(mut self, allow: bool) -> Self {
        self.allow_cross_world = allow;
        self
    }

    /// Sets the page-level linking opt-out.
    #[must_use]
    pub const fn links_allowed(mut self, allow: bool) -> Self {
        self.allow_links = allow;
        self
    }

    /// Excludes the page being rendered from the candidates.
    #[must_use]
    pub const fn excluding(mut self, page: PageId) -> Self {
        self.exclude_page = Some(page);
        self
    }

    /// Returns true if `candidate` may be linked from this context.
    #[must_use]
    pub fn permits(&self, candidate: &EntityCandidate) -> bool {
        if candidate.ignore_crosslink || self.exclude_page == Some(candidate.id) {
            return false;
        }
        self.allow_cross_world || candidate.gameworld_id == self.world
    }
}

/// Links inserted for one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertedLink {
    pub page: PageId,
    pub count: usize,
}

/// Linked content plus what was inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOutcome {
    pub content: String,
    /// One entry per candidate that produced at least one link.
    pub inserted: Vec<InsertedLink>,
}

impl LinkOutcome {
    fn unchanged(content: &str) -> Self {
        Self {
            content: content.to_string(),
            inserted: Vec::new(),
        }
    }

    /// Total number of anchors inserted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.inserted.iter().map(|l| l.count).sum()
    }

    /// Returns true if any anchor was inserted.
    #[must_use]
    pub fn changed(&self) -> bool {
        !self.inserted.is_empty()
    }
}

/// Wraps known entity names in hyperlink markup.
///
/// # Examples
///
/// ```
/// use scribe::{EntityCandidate, EntityLinker, LinkContext, WorldId};
///
/// let linker = EntityLinker::default();
/// let candidates = vec![EntityCandidate::new(3, "Aurelia", 2, 1)];
/// let html = linker.link("Trade flows through aurelia.", &candidates, &LinkContext::new(WorldId::new(1)));
/// assert_eq!(
///     html,
///     r#"Trade flows through <a class="wiki-link" href="/worlds/1/concept/2/page/3">Aurelia</a>."#
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct EntityLinker {
    config: LinkerConfig,
}

impl EntityLinker {
    /// Creates a linker with the given markup settings.
    #[must_use]
    pub const fn new(config: LinkerConfig) -> Self {
        Self { config }
    }

    /// Returns the markup settings.
    #[must_use]
    pub const fn config(&self) -> &LinkerConfig {
        &self.config
    }

    /// Returns `content` with candidate names linked.
    #[must_use]
    pub fn link(&self, content: &str, candidates: &[EntityCandidate], ctx: &LinkContext) -> String {
        self.link_with_report(content, candidates, ctx).content
    }

    /// Links `content` and reports the anchors inserted per candidate.
    #[must_use]
    pub fn link_with_report(
        &self,
        content: &str,
        candidates: &[EntityCandidate],
        ctx: &LinkContext,
    ) -> LinkOutcome {
        if !ctx.allow_links || content.is_empty() || candidates.is_empty() {
            return LinkOutcome::unchanged(content);
        }

        let mut ordered: Vec<&EntityCandidate> = candidates.iter().collect();
        // Stable: equal lengths keep directory order.
        ordered.sort_by(|a, b| b.name.chars().count().cmp(&a.name.chars().count()));

        // Computed once per pass; anchors inserted below are not added.
        let linked = LinkedSet::scan(content);

        let mut result = content.to_string();
        let mut inserted = Vec::new();

        for candidate in ordered {
            if candidate.name.trim().is_empty() || !ctx.permits(candidate) {
                continue;
            }

            let href = PageRoute::of(candidate).to_href(&self.config.route_prefix);
            if linked.has_text(&candidate.name) || linked.has_href(&href) {
                continue;
            }

            let spans = self.find_spans(&result, &candidate.name);
            if spans.is_empty() {
                continue;
            }

            let anchor = self.anchor(&href, &candidate.name);
            let mut next = String::with_capacity(result.len() + spans.len() * anchor.len());
            let mut cursor = 0;
            for span in &spans {
                next.push_str(&result[cursor..span.start]);
                next.push_str(&anchor);
                cursor = span.end;
            }
            next.push_str(&result[cursor..]);
            result = next;

            inserted.push(InsertedLink {
                page: candidate.id,
                count: spans.len(),
            });
        }

        let outcome = LinkOutcome {
            content: result,
            inserted,
        };
        debug!(
            candidates = candidates.len(),
            linked_candidates = outcome.inserted.len(),
            anchors = outcome.total(),
            "auto-linked content"
        );
        outcome
    }

    /// Spans of `name` in `content` that may be replaced.
    fn find_spans(&self, content: &str, name: &str) -> Vec<Range<usize>> {
        let matcher = match RegexBuilder::new(&regex::escape(name))
            .case_insensitive(true)
            .build()
        {
            Ok(re) => re,
            Err(e) => {
                warn!(name, error = %e, "skipping candidate with unusable matcher");
                return Vec::new();
            }
        };

        let protected = protected_spans(content);
        let mut spans = Vec::new();
        let mut pos = 0;

        while pos <= content.len() {
            let Some(m) = matcher.find_at(content, pos) else {
                break;
            };
            let range = m.range();

            if range.is_empty() {
                break;
            }

            if at_word_boundary(content, &range) && !overlaps_any(&range, &protected) {
                pos = range.end;
                spans.push(range);
                if self.config.first_occurrence_only {
                    break;
                }
            } else {
                // Retry one character later, as a lookaround assertion would.
                pos = range.start + content[range.start..].chars().next().map_or(1, char::len_utf8);
            }
        }

        spans
    }

    fn anchor(&self, href: &str, name: &str) -> String {
        if self.config.title_attribute {
            format!(
                r#"<a class="{}" href="{href}" title="{}">{name}</a>"#,
                self.config.link_class,
                escape_attribute(name)
            )
        } else {
            format!(r#"<a class="{}" href="{href}">{name}</a>"#, self.config.link_class)
        }
    }
}

/// Escapes a value for a double-quoted attribute.
fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Links `content` with the default markup settings.
#[must_use]
pub fn auto_link(
    content: &str,
    candidates: &[EntityCandidate],
    world: WorldId,
    allow_cross_world: bool,
) -> String {
    EntityLinker::default().link(
        content,
        candidates,
        &LinkContext::new(world).cross_world(allow_cross_world),
    )
}
