//! Index-based inspection of existing HTML markup.
//!
//! The linker never parses HTML into a tree. It only needs to know where
//! tags and anchor elements sit so that a match can be rejected when it
//! falls inside one of them.

use std::collections::HashSet;
use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

static ANCHOR_RE: OnceLock<Regex> = OnceLock::new();
static HREF_RE: OnceLock<Regex> = OnceLock::new();
static TAG_RE: OnceLock<Regex> = OnceLock::new();

/// Tag body where quoted attribute values may contain `>`.
const TAG_BODY: &str = r#"(?:[^>"']|"[^"]*"|'[^']*')*"#;

fn anchor_re() -> &'static Regex {
    ANCHOR_RE.get_or_init(|| {
        Regex::new(&format!(r"(?is)<a((?:\s{TAG_BODY})?)>(.*?)</a\s*>"))
            .expect("anchor pattern is valid")
    })
}

fn href_re() -> &'static Regex {
    HREF_RE.get_or_init(|| {
        Regex::new(r#"(?i)\bhref\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("href pattern is valid")
    })
}

fn tag_re() -> &'static Regex {
    TAG_RE.get_or_init(|| Regex::new(&format!("<{TAG_BODY}>")).expect("tag pattern is valid"))
}

/// An `<a ...>...</a>` element found in content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// Byte span of the whole element, tags included.
    pub span: Range<usize>,
    pub href: Option<String>,
    /// Raw markup between the opening and closing tags.
    pub inner: String,
}

impl Anchor {
    /// Display text: inner markup with tags stripped.
    #[must_use]
    pub fn text(&self) -> String {
        strip_tags(&self.inner)
    }
}

/// All anchor elements, in document order.
#[must_use]
pub fn anchors(content: &str) -> Vec<Anchor> {
    anchor_re()
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let attrs = caps.get(1).map_or("", |m| m.as_str());
            let href = href_re().captures(attrs).and_then(|h| {
                h.get(1)
                    .or_else(|| h.get(2))
                    .map(|m| m.as_str().to_string())
            });
            Some(Anchor {
                span: whole.range(),
                href,
                inner: caps.get(2).map_or("", |m| m.as_str()).to_string(),
            })
        })
        .collect()
}

/// Byte spans that a replacement must not touch: every tag, and every
/// anchor element from its opening tag to its closing tag.
#[must_use]
pub fn protected_spans(content: &str) -> Vec<Range<usize>> {
    let mut spans: Vec<Range<usize>> = tag_re().find_iter(content).map(|m| m.range()).collect();
    spans.extend(anchors(content).into_iter().map(|a| a.span));
    spans.sort_by_key(|r| r.start);
    spans
}

/// Returns true if `range` overlaps any of `spans`.
#[must_use]
pub fn overlaps_any(range: &Range<usize>, spans: &[Range<usize>]) -> bool {
    spans
        .iter()
        .take_while(|s| s.start < range.end)
        .any(|s| s.end > range.start)
}

/// Anchor texts and hrefs already present in content.
#[derive(Debug, Clone, Default)]
pub struct LinkedSet {
    texts: HashSet<String>,
    hrefs: HashSet<String>,
}

impl LinkedSet {
    /// Collects the linked display texts and targets of `content`.
    #[must_use]
    pub fn scan(content: &str) -> Self {
        let mut set = Self::default();
        for anchor in anchors(content) {
            set.texts.insert(normalize_text(&anchor.text()));
            if let Some(href) = anchor.href {
                set.hrefs.insert(href);
            }
        }
        set
    }

    /// Returns true if `name` already appears as an anchor's text.
    #[must_use]
    pub fn has_text(&self, name: &str) -> bool {
        self.texts.contains(&normalize_text(name))
    }

    /// Returns true if an anchor already points at `href`.
    #[must_use]
    pub fn has_href(&self, href: &str) -> bool {
        self.hrefs.contains(href)
    }

    /// Number of distinct linked texts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// Returns true if the content had no anchors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty() && self.hrefs.is_empty()
    }
}

/// Word characters for phrase boundaries.
#[must_use]
pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Returns true if `range` in `content` is not glued to a word character
/// on either side.
#[must_use]
pub fn at_word_boundary(content: &str, range: &Range<usize>) -> bool {
    let before = content[..range.start].chars().next_back();
    let after = content[range.end..].chars().next();
    !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
}

/// Removes tags, keeping text.
#[must_use]
pub fn strip_tags(markup: &str) -> String {
    tag_re().replace_all(markup, "").into_owned()
}

/// Comparison key for linked texts.
#[must_use]
pub fn normalize_text(s: &str) -> String {
    s.trim().to_lowercase()
}
