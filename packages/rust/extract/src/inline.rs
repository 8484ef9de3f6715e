//! Inline-markup flattening.
//!
//! Bold, italic, code spans, links, and inline images inside paragraphs and
//! list items are flattened to an inline Markdown representation rather than
//! discarded. Link targets are resolved against the page URL.

use scraper::{ElementRef, Node};
use url::Url;

/// Flatten an element's inline content to a single normalized line.
pub(crate) fn flatten_inline(el: ElementRef<'_>, base: &Url) -> String {
    let mut out = String::new();
    append_inline(el, base, &mut out);
    collapse_whitespace(&out)
}

/// Collapse whitespace runs (including newlines) into single spaces.
pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn append_inline(el: ElementRef<'_>, base: &Url, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&text.text),
            Node::Element(_) => {
                let Some(child_el) = ElementRef::wrap(child) else {
                    continue;
                };
                match child_el.value().name() {
                    "strong" | "b" => wrap_marker(child_el, base, out, "**"),
                    "em" | "i" => wrap_marker(child_el, base, out, "*"),
                    "code" => {
                        let text = collapse_whitespace(&child_el.text().collect::<String>());
                        if !text.is_empty() {
                            out.push('`');
                            out.push_str(&text);
                            out.push('`');
                        }
                    }
                    "a" => append_link(child_el, base, out),
                    "img" => append_image(child_el, base, out),
                    "br" => out.push(' '),
                    // Non-content elements that can lurk inside text containers.
                    "script" | "style" | "noscript" | "button" => {}
                    _ => append_inline(child_el, base, out),
                }
            }
            _ => {}
        }
    }
}

fn wrap_marker(el: ElementRef<'_>, base: &Url, out: &mut String, marker: &str) {
    let mut inner = String::new();
    append_inline(el, base, &mut inner);
    let inner = collapse_whitespace(&inner);
    if inner.is_empty() {
        return;
    }
    out.push_str(marker);
    out.push_str(&inner);
    out.push_str(marker);
}

fn append_link(el: ElementRef<'_>, base: &Url, out: &mut String) {
    let mut inner = String::new();
    append_inline(el, base, &mut inner);
    let label = collapse_whitespace(&inner);
    if label.is_empty() {
        return;
    }

    let resolved = el
        .value()
        .attr("href")
        .and_then(|href| base.join(href).ok());

    match resolved {
        Some(target) => {
            out.push('[');
            out.push_str(&label);
            out.push_str("](");
            out.push_str(target.as_str());
            out.push(')');
        }
        None => out.push_str(&label),
    }
}

fn append_image(el: ElementRef<'_>, base: &Url, out: &mut String) {
    let Some(resolved) = el
        .value()
        .attr("src")
        .and_then(|src| base.join(src).ok())
    else {
        return;
    };

    let alt = el.value().attr("alt").unwrap_or_default().trim();
    out.push_str("![");
    out.push_str(alt);
    out.push_str("](");
    out.push_str(resolved.as_str());
    out.push(')');
}
