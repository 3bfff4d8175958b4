//! DOM-level content isolation over rendered page source.
//!
//! Headline and body container are each found with an ordered selector
//! cascade where the first acceptable match wins. Text is then assembled
//! from paragraph and heading elements of the container, skipping noise
//! subtrees. A page-wide paragraph scan backs up containers that yield too
//! little text.

use harvest_config::ExtractionSettings;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

/// Headline candidates, most specific first.
pub const TITLE_SELECTORS: &[&str] = &[
    "article h1",
    "[class*='article'] h1",
    "[class*='post'] h1",
    "h1.entry-title",
    ".entry-title",
    "header h1",
    "h1",
];

/// Body container candidates, most specific first.
pub const BODY_SELECTORS: &[&str] = &[
    "[class*='article-content']",
    "[class*='article-body']",
    "[class*='post-content']",
    "[class*='entry-content']",
    "[class*='content-detail']",
    "[class*='detail-content']",
    "[itemprop='articleBody']",
    "article",
    "main",
    "[role='main']",
    "#content",
    ".content",
];

const NOISE_TAGS: &[&str] = &[
    "script", "style", "noscript", "iframe", "nav", "aside", "footer", "form",
];

const NOISE_KEYWORDS: &[&str] = &[
    "sidebar",
    "banner",
    "social",
    "share",
    "comment",
    "newsletter",
    "related",
];

static TITLE_CASCADE: LazyLock<SelectorCascade> =
    LazyLock::new(|| SelectorCascade::new(TITLE_SELECTORS));
static BODY_CASCADE: LazyLock<SelectorCascade> =
    LazyLock::new(|| SelectorCascade::new(BODY_SELECTORS));
static PARAGRAPH: LazyLock<Option<Selector>> = LazyLock::new(|| Selector::parse("p").ok());

/// Ordered selector candidates; the first match an acceptor takes wins.
pub struct SelectorCascade {
    selectors: Vec<Selector>,
}

impl SelectorCascade {
    pub fn new(candidates: &[&str]) -> Self {
        let selectors = candidates
            .iter()
            .filter_map(|css| Selector::parse(css).ok())
            .collect();
        Self { selectors }
    }

    /// Try each selector's first match in order until `accept` returns a value.
    pub fn first_accepted<'a, T>(
        &self,
        document: &'a Html,
        mut accept: impl FnMut(ElementRef<'a>) -> Option<T>,
    ) -> Option<T> {
        self.selectors
            .iter()
            .find_map(|sel| document.select(sel).next().and_then(&mut accept))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedArticle {
    pub headline: Option<String>,
    pub body: String,
    /// True when the page-wide paragraph scan produced the body.
    pub used_fallback: bool,
}

impl ExtractedArticle {
    /// Headline and body joined by a blank line; `None` when both are empty.
    pub fn into_text(self) -> Option<String> {
        let parts: Vec<String> = self
            .headline
            .into_iter()
            .chain(std::iter::once(self.body))
            .filter(|s| !s.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join("\n\n"))
    }
}

/// Isolate headline and body text from rendered page source.
pub fn extract_article(html: &str, rules: &ExtractionSettings) -> ExtractedArticle {
    let document = Html::parse_document(html);

    let headline = TITLE_CASCADE.first_accepted(&document, |el| {
        let text = collapse_whitespace(&visible_text(el));
        (text.chars().count() > rules.min_title_chars).then_some(text)
    });

    let mut body = fragment_selector(rules)
        .and_then(|fragments| {
            BODY_CASCADE.first_accepted(&document, |container| {
                let text = assemble_fragments(container, &fragments, rules);
                (!text.is_empty()).then_some(text)
            })
        })
        .unwrap_or_default();

    let mut used_fallback = false;
    if body.chars().count() < rules.min_body_chars {
        let scanned = scan_paragraphs(&document, rules);
        if !scanned.is_empty() {
            body = scanned;
            used_fallback = true;
        }
    }

    ExtractedArticle {
        headline,
        body,
        used_fallback,
    }
}

fn fragment_tags(rules: &ExtractionSettings) -> Vec<&'static str> {
    let mut tags = vec!["p", "h2", "h3", "h4"];
    if rules.include_blockquote {
        tags.push("blockquote");
    }
    tags
}

fn fragment_selector(rules: &ExtractionSettings) -> Option<FragmentSelector> {
    let tags = fragment_tags(rules);
    let selector = Selector::parse(&tags.join(", ")).ok()?;
    Some(FragmentSelector { selector, tags })
}

struct FragmentSelector {
    selector: Selector,
    tags: Vec<&'static str>,
}

/// Text of the fragment elements inside `container`, in document order.
///
/// Fragments under a noise subtree or nested in another fragment element are
/// skipped, as are fragments shorter than the configured minimum.
fn assemble_fragments(
    container: ElementRef<'_>,
    fragments: &FragmentSelector,
    rules: &ExtractionSettings,
) -> String {
    container
        .select(&fragments.selector)
        .filter(|el| *el != container)
        .filter(|el| !is_noise(*el) && !has_excluding_ancestor(*el, container, &fragments.tags))
        .map(|el| collapse_whitespace(&visible_text(el)))
        .filter(|text| text.chars().count() >= rules.min_fragment_chars)
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn has_excluding_ancestor(el: ElementRef<'_>, container: ElementRef<'_>, tags: &[&str]) -> bool {
    for node in el.ancestors() {
        if node == *container {
            return false;
        }
        if let Some(ancestor) = ElementRef::wrap(node) {
            if is_noise(ancestor) || tags.contains(&ancestor.value().name()) {
                return true;
            }
        }
    }
    false
}

/// Page-wide scan: every paragraph longer than the fallback threshold, capped.
fn scan_paragraphs(document: &Html, rules: &ExtractionSettings) -> String {
    let Some(p) = PARAGRAPH.as_ref() else {
        return String::new();
    };
    document
        .select(p)
        .map(|el| collapse_whitespace(&visible_text(el)))
        .filter(|text| text.chars().count() > rules.fallback_paragraph_chars)
        .take(rules.fallback_max_paragraphs)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Concatenated text of `el`, leaving out noise descendants.
fn visible_text(el: ElementRef<'_>) -> String {
    let mut out = String::new();
    push_visible_text(el, &mut out);
    out
}

fn push_visible_text(el: ElementRef<'_>, out: &mut String) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_el) = ElementRef::wrap(child) {
            if !is_noise(child_el) {
                push_visible_text(child_el, out);
            }
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Script-like tags, and elements whose class or id names a page furniture
/// block (sidebar, share bar, comments) or an ad slot.
pub fn is_noise(el: ElementRef<'_>) -> bool {
    let value = el.value();
    if NOISE_TAGS.contains(&value.name()) {
        return true;
    }
    value.classes().chain(value.id()).any(is_noise_token)
}

pub fn is_noise_token(token: &str) -> bool {
    let token = token.to_ascii_lowercase();
    NOISE_KEYWORDS.iter().any(|k| token.contains(k)) || is_ad_token(&token)
}

/// Ad markers are matched per `-`/`_` segment so words that merely contain
/// "ad" (`header`, `headshot`, `download`) are left alone.
fn is_ad_token(token: &str) -> bool {
    token.contains("advert")
        || token
            .split(['-', '_'])
            .any(|seg| matches!(seg, "ad" | "ads" | "adv" | "adslot") || seg.starts_with("adsby"))
}
