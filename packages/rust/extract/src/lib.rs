//! Content extraction: raw page body → normalized block sequence.
//!
//! The extractor locates the main content region via a prioritized selector
//! list, prunes known non-content elements, and walks the remaining tree in
//! document order, classifying a closed set of tags into [`ContentBlock`]
//! variants. Unrecognized tags are descended into rather than dropped, so
//! nested content survives. Inline formatting inside paragraphs and list
//! items is flattened to inline Markdown instead of being discarded.

mod inline;

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument, warn};
use url::Url;

use guidebook_shared::{ContentBlock, GuidebookError, Result, SelectorConfig};

use inline::{collapse_whitespace, flatten_inline};

// ---------------------------------------------------------------------------
// Options & result
// ---------------------------------------------------------------------------

/// Configuration for content extraction.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Content-root candidates, tried in order; first match wins.
    pub content_selectors: Vec<String>,
    /// Elements pruned (with their subtrees) before classification.
    /// Entries are bare tag names, `.class` tokens, or `#id` tokens.
    pub unwanted_selectors: Vec<String>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        let selectors = SelectorConfig::default();
        Self {
            content_selectors: selectors.content,
            unwanted_selectors: selectors.unwanted,
        }
    }
}

impl From<&SelectorConfig> for ExtractOptions {
    fn from(selectors: &SelectorConfig) -> Self {
        Self {
            content_selectors: selectors.content.clone(),
            unwanted_selectors: selectors.unwanted.clone(),
        }
    }
}

/// A page reduced to its title and normalized content blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    pub title: String,
    pub blocks: Vec<ContentBlock>,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Extract the normalized content of one page.
///
/// Fails with [`GuidebookError::Extraction`] when the content region yields
/// no blocks at all; callers treat that as an empty-content page and keep
/// going.
#[instrument(skip(html, opts), fields(url = %page_url))]
pub fn extract(html: &str, page_url: &Url, opts: &ExtractOptions) -> Result<ExtractedPage> {
    let doc = Html::parse_document(html);

    let denylist = Denylist::parse(&opts.unwanted_selectors);
    let content_root = select_content_root(&doc, &opts.content_selectors);

    let mut blocks = Vec::new();
    walk_children(content_root, &denylist, page_url, &mut blocks);

    let title = blocks
        .iter()
        .find_map(|block| match block {
            ContentBlock::Heading { text, .. } => Some(text.clone()),
            _ => None,
        })
        .or_else(|| document_title(&doc))
        .unwrap_or_else(|| "Untitled".to_string());

    if blocks.is_empty() {
        return Err(GuidebookError::extraction(format!(
            "no content blocks found in {page_url}"
        )));
    }

    debug!(blocks = blocks.len(), title = %title, "page extracted");
    Ok(ExtractedPage { title, blocks })
}

// ---------------------------------------------------------------------------
// Content root selection
// ---------------------------------------------------------------------------

/// Pick the main content region: first matching selector wins, falling back
/// to the document body. The body fallback is permissive and can let
/// residual chrome through; the denylist pruning limits the damage.
fn select_content_root<'a>(doc: &'a Html, selectors: &[String]) -> ElementRef<'a> {
    for sel_str in selectors {
        let Ok(selector) = Selector::parse(sel_str) else {
            warn!(selector = %sel_str, "invalid content selector, skipping");
            continue;
        };
        if let Some(el) = doc.select(&selector).next() {
            debug!(selector = %sel_str, "content root matched");
            return el;
        }
    }

    let body = Selector::parse("body").expect("static selector");
    doc.select(&body)
        .next()
        .unwrap_or_else(|| doc.root_element())
}

/// The `<title>` element, trimmed at a site-name separator.
fn document_title(doc: &Html) -> Option<String> {
    let title_sel = Selector::parse("title").expect("static selector");
    let raw = doc
        .select(&title_sel)
        .next()
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))?;

    if raw.is_empty() {
        return None;
    }

    for separator in [" — ", " – ", " | ", " - "] {
        if let Some((prefix, _)) = raw.split_once(separator) {
            return Some(prefix.trim().to_string());
        }
    }

    Some(raw)
}

// ---------------------------------------------------------------------------
// Denylist
// ---------------------------------------------------------------------------

/// Non-content element matcher built from the configured denylist.
///
/// Class and id entries match as whole tokens, case-insensitively, so
/// `.nav` hits `class="nav sidebar"` but not `class="navigate"`.
#[derive(Debug)]
struct Denylist {
    tags: HashSet<String>,
    classes: HashSet<String>,
    ids: HashSet<String>,
}

impl Denylist {
    fn parse(selectors: &[String]) -> Self {
        let mut tags = HashSet::new();
        let mut classes = HashSet::new();
        let mut ids = HashSet::new();

        for entry in selectors {
            let entry = entry.trim();
            if let Some(class) = entry.strip_prefix('.') {
                classes.insert(class.to_lowercase());
            } else if let Some(id) = entry.strip_prefix('#') {
                ids.insert(id.to_lowercase());
            } else if !entry.is_empty() {
                tags.insert(entry.to_lowercase());
            }
        }

        Self { tags, classes, ids }
    }

    fn matches(&self, el: ElementRef<'_>) -> bool {
        if self.tags.contains(el.value().name()) {
            return true;
        }

        if let Some(class) = el.value().attr("class") {
            let lower = class.to_lowercase();
            if lower
                .split_whitespace()
                .any(|token| self.classes.contains(token))
            {
                return true;
            }
        }

        if let Some(id) = el.value().attr("id") {
            if self.ids.contains(&id.to_lowercase()) {
                return true;
            }
        }

        false
    }
}

// ---------------------------------------------------------------------------
// Tag classification
// ---------------------------------------------------------------------------

/// Closed-set classification of block-level tags. Everything else is
/// [`TagKind::Unrecognized`] and gets descended into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
    Heading(u8),
    Paragraph,
    List { ordered: bool },
    Code,
    Image,
    /// `div` — a paragraph if it carries direct text, a container otherwise.
    TextContainer,
    Unrecognized,
}

fn classify(tag: &str) -> TagKind {
    match tag {
        "h1" => TagKind::Heading(1),
        "h2" => TagKind::Heading(2),
        "h3" => TagKind::Heading(3),
        "h4" => TagKind::Heading(4),
        "h5" => TagKind::Heading(5),
        "h6" => TagKind::Heading(6),
        "p" => TagKind::Paragraph,
        "ul" => TagKind::List { ordered: false },
        "ol" => TagKind::List { ordered: true },
        "pre" | "code" => TagKind::Code,
        "img" => TagKind::Image,
        "div" => TagKind::TextContainer,
        _ => TagKind::Unrecognized,
    }
}

// ---------------------------------------------------------------------------
// Tree walk
// ---------------------------------------------------------------------------

/// Walk an element's children in document order, emitting blocks.
fn walk_children(
    el: ElementRef<'_>,
    deny: &Denylist,
    base: &Url,
    blocks: &mut Vec<ContentBlock>,
) {
    for child in el.children() {
        let Some(child_el) = ElementRef::wrap(child) else {
            continue;
        };

        if deny.matches(child_el) {
            continue;
        }

        match classify(child_el.value().name()) {
            TagKind::Heading(level) => {
                let text = collapse_whitespace(&child_el.text().collect::<String>());
                if !text.is_empty() {
                    blocks.push(ContentBlock::Heading { level, text });
                }
            }
            TagKind::Paragraph => push_paragraph(child_el, base, blocks),
            TagKind::List { ordered } => {
                let items = list_items(child_el, base);
                if !items.is_empty() {
                    blocks.push(ContentBlock::List { ordered, items });
                }
            }
            TagKind::Code => {
                let text = code_text(child_el);
                if !text.is_empty() {
                    blocks.push(ContentBlock::Code {
                        language: language_hint(child_el),
                        text,
                    });
                }
            }
            TagKind::Image => push_image(child_el, base, blocks),
            TagKind::TextContainer => {
                if has_direct_text(child_el) {
                    push_paragraph(child_el, base, blocks);
                } else {
                    walk_children(child_el, deny, base, blocks);
                }
            }
            TagKind::Unrecognized => walk_children(child_el, deny, base, blocks),
        }
    }
}

fn push_paragraph(el: ElementRef<'_>, base: &Url, blocks: &mut Vec<ContentBlock>) {
    let text = flatten_inline(el, base);
    if !text.is_empty() {
        blocks.push(ContentBlock::Paragraph { text });
    }
}

fn push_image(el: ElementRef<'_>, base: &Url, blocks: &mut Vec<ContentBlock>) {
    let Some(resolved) = el
        .value()
        .attr("src")
        .and_then(|src| base.join(src).ok())
    else {
        return;
    };

    blocks.push(ContentBlock::Image {
        alt: el.value().attr("alt").unwrap_or_default().trim().to_string(),
        src: resolved.to_string(),
    });
}

/// Direct `<li>` children, each flattened to inline text.
fn list_items(el: ElementRef<'_>, base: &Url) -> Vec<String> {
    el.children()
        .filter_map(ElementRef::wrap)
        .filter(|item| item.value().name() == "li")
        .map(|item| flatten_inline(item, base))
        .filter(|text| !text.is_empty())
        .collect()
}

/// Code content, verbatim except for enclosing blank lines.
fn code_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim_matches('\n').to_string()
}

/// Language hint from `language-*` / `lang-*` / `highlight-*` classes on the
/// element itself or a nested `code` element.
fn language_hint(el: ElementRef<'_>) -> Option<String> {
    if let Some(lang) = class_language(el) {
        return Some(lang);
    }

    let code_sel = Selector::parse("code").expect("static selector");
    el.select(&code_sel).find_map(class_language)
}

fn class_language(el: ElementRef<'_>) -> Option<String> {
    for class in el.value().classes() {
        for prefix in ["language-", "lang-", "highlight-"] {
            if let Some(rest) = class.strip_prefix(prefix) {
                if !rest.is_empty() {
                    return Some(rest.to_string());
                }
            }
        }
    }
    None
}

/// Whether the element has a non-whitespace text node as a direct child.
fn has_direct_text(el: ElementRef<'_>) -> bool {
    el.children().any(|child| {
        child
            .value()
            .as_text()
            .is_some_and(|text| !text.trim().is_empty())
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn page_url() -> Url {
        Url::parse("https://docs.example.com/guide/a/page").unwrap()
    }

    fn run(html: &str) -> ExtractedPage {
        extract(html, &page_url(), &ExtractOptions::default()).expect("extract")
    }

    #[test]
    fn extracts_headings_and_paragraphs() {
        let page = run(r#"<html><body><main>
            <h1>Intro</h1>
            <p>First paragraph.</p>
            <h2>Details</h2>
            <p>Second paragraph.</p>
        </main></body></html>"#);

        assert_eq!(page.title, "Intro");
        assert_eq!(
            page.blocks,
            vec![
                ContentBlock::Heading {
                    level: 1,
                    text: "Intro".into()
                },
                ContentBlock::Paragraph {
                    text: "First paragraph.".into()
                },
                ContentBlock::Heading {
                    level: 2,
                    text: "Details".into()
                },
                ContentBlock::Paragraph {
                    text: "Second paragraph.".into()
                },
            ]
        );
    }

    #[test]
    fn extracts_lists() {
        let page = run(r#"<main>
            <ul><li>alpha</li><li>beta</li></ul>
            <ol><li>first</li><li>second</li></ol>
        </main>"#);

        assert_eq!(
            page.blocks,
            vec![
                ContentBlock::List {
                    ordered: false,
                    items: vec!["alpha".into(), "beta".into()]
                },
                ContentBlock::List {
                    ordered: true,
                    items: vec!["first".into(), "second".into()]
                },
            ]
        );
    }

    #[test]
    fn code_blocks_are_verbatim_with_language_hint() {
        let page = run(
            "<main><pre><code class=\"language-rust\">fn main() {\n    println!(\"**not bold**\");\n}</code></pre></main>",
        );

        assert_eq!(
            page.blocks,
            vec![ContentBlock::Code {
                language: Some("rust".into()),
                text: "fn main() {\n    println!(\"**not bold**\");\n}".into()
            }]
        );
    }

    #[test]
    fn code_language_hint_variants() {
        let page = run(r#"<main><pre class="highlight-python">print(1)</pre></main>"#);
        assert_eq!(
            page.blocks,
            vec![ContentBlock::Code {
                language: Some("python".into()),
                text: "print(1)".into()
            }]
        );

        let page = run("<main><pre>plain</pre></main>");
        assert_eq!(
            page.blocks,
            vec![ContentBlock::Code {
                language: None,
                text: "plain".into()
            }]
        );
    }

    #[test]
    fn inline_formatting_is_flattened() {
        let page = run(r#"<main><p>Mix of <strong>bold</strong>, <em>italic</em>,
            <code>spans</code> and <a href="/guide/a/other">links</a>.</p></main>"#);

        assert_eq!(
            page.blocks,
            vec![ContentBlock::Paragraph {
                text: "Mix of **bold**, *italic*, `spans` and \
                       [links](https://docs.example.com/guide/a/other)."
                    .into()
            }]
        );
    }

    #[test]
    fn unwanted_elements_are_pruned() {
        let page = run(r#"<html><body><main>
            <nav><a href="/x">chrome</a></nav>
            <h1>Kept</h1>
            <div class="advertisement"><p>buy things</p></div>
            <p>Real content.</p>
            <footer>page footer</footer>
        </main></body></html>"#);

        assert_eq!(
            page.blocks,
            vec![
                ContentBlock::Heading {
                    level: 1,
                    text: "Kept".into()
                },
                ContentBlock::Paragraph {
                    text: "Real content.".into()
                },
            ]
        );
    }

    #[test]
    fn denylist_matches_whole_tokens_only() {
        let page = run(r#"<main>
            <div class="ads banner"><p>sponsored</p></div>
            <div class="roads"><p>kept despite substring</p></div>
        </main>"#);

        assert_eq!(
            page.blocks,
            vec![ContentBlock::Paragraph {
                text: "kept despite substring".into()
            }]
        );
    }

    #[test]
    fn unrecognized_tags_are_descended_into() {
        let page = run(r#"<main>
            <section><blockquote><p>Nested survives.</p></blockquote></section>
        </main>"#);

        assert_eq!(
            page.blocks,
            vec![ContentBlock::Paragraph {
                text: "Nested survives.".into()
            }]
        );
    }

    #[test]
    fn div_with_direct_text_becomes_paragraph() {
        let page = run("<main><div>Loose text in a div.</div></main>");
        assert_eq!(
            page.blocks,
            vec![ContentBlock::Paragraph {
                text: "Loose text in a div.".into()
            }]
        );
    }

    #[test]
    fn div_without_direct_text_is_a_container() {
        let page = run("<main><div><div><p>Inner.</p></div></div></main>");
        assert_eq!(
            page.blocks,
            vec![ContentBlock::Paragraph {
                text: "Inner.".into()
            }]
        );
    }

    #[test]
    fn images_become_references() {
        let page = run(r#"<main><p>Before.</p><img src="/img/shot.png" alt="A screenshot"></main>"#);
        assert_eq!(
            page.blocks[1],
            ContentBlock::Image {
                alt: "A screenshot".into(),
                src: "https://docs.example.com/img/shot.png".into()
            }
        );
    }

    #[test]
    fn falls_back_to_body_when_no_selector_matches() {
        let page = run("<html><body><h1>Bare</h1><p>No main element.</p></body></html>");
        assert_eq!(page.title, "Bare");
        assert_eq!(page.blocks.len(), 2);
    }

    #[test]
    fn title_from_document_metadata_when_no_heading() {
        let page = run(concat!(
            "<html><head><title>Setup Guide - Example Docs</title></head>",
            "<body><main><p>Only a paragraph.</p></main></body></html>"
        ));
        assert_eq!(page.title, "Setup Guide");
    }

    #[test]
    fn empty_content_is_an_extraction_error() {
        let err = extract(
            "<html><body><main></main></body></html>",
            &page_url(),
            &ExtractOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, GuidebookError::Extraction { .. }));
    }

    #[test]
    fn custom_content_selector_takes_priority() {
        let opts = ExtractOptions {
            content_selectors: vec!["div.docs".into()],
            ..ExtractOptions::default()
        };
        let page = extract(
            r#"<html><body>
                <main><p>Decoy.</p></main>
                <div class="docs"><p>Chosen.</p></div>
            </body></html>"#,
            &page_url(),
            &opts,
        )
        .expect("extract");

        assert_eq!(
            page.blocks,
            vec![ContentBlock::Paragraph {
                text: "Chosen.".into()
            }]
        );
    }
}
