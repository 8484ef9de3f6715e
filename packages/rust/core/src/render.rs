//! Standalone HTML rendering of the compiled document.
//!
//! One fixed page template with embedded styling and no external resource
//! references, plus in-document navigation links from the TOC to each page's
//! anchor. Block text is HTML-escaped, then the flattened inline Markdown is
//! converted back to semantic inline elements.

use std::sync::LazyLock;

use regex::Regex;

use guidebook_shared::{ContentBlock, GuidePage};

use crate::compiler::CompiledDocument;

/// Embedded stylesheet. `@page` rules size the print rendering.
const STYLESHEET: &str = r#"
@page {
    margin: 2cm;
    size: A4;
}
body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Arial, sans-serif;
    line-height: 1.6;
    color: #333;
    max-width: 800px;
    margin: 0 auto;
    padding: 1em;
}
h1 {
    color: #000;
    border-bottom: 2px solid #000;
    padding-bottom: 0.3em;
    margin-top: 1.5em;
}
h2 {
    color: #333;
    border-bottom: 1px solid #ccc;
    padding-bottom: 0.2em;
    margin-top: 1.2em;
}
h3 {
    color: #555;
    margin-top: 1em;
}
code {
    background: #f4f4f4;
    padding: 2px 6px;
    border-radius: 3px;
    font-family: 'Courier New', 'Monaco', monospace;
    font-size: 0.9em;
}
pre {
    background: #f4f4f4;
    padding: 12px;
    border-radius: 5px;
    overflow-x: auto;
    border-left: 3px solid #007AFF;
}
pre code {
    background: none;
    padding: 0;
}
a {
    color: #007AFF;
    text-decoration: none;
}
a:hover {
    text-decoration: underline;
}
img {
    max-width: 100%;
    height: auto;
}
nav.toc ol {
    padding-left: 1.5em;
}
p.source {
    color: #666;
    font-size: 0.9em;
}
section {
    page-break-before: always;
}
"#;

/// Render the compiled document as a self-contained HTML page.
pub fn to_html(doc: &CompiledDocument) -> String {
    let mut out = String::new();

    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>{}</title>\n", escape_html(&doc.title)));
    out.push_str(&format!("<style>{STYLESHEET}</style>\n"));
    out.push_str("</head>\n<body>\n");

    out.push_str(&format!("<h1>{}</h1>\n", escape_html(&doc.title)));
    out.push_str(&format!(
        "<p class=\"source\">Compiled from <a href=\"{0}\">{0}</a></p>\n",
        escape_html(&doc.root_url)
    ));

    out.push_str("<nav class=\"toc\">\n<h2>Table of Contents</h2>\n<ol>\n");
    for entry in &doc.toc {
        out.push_str(&format!(
            "<li><a href=\"#{}\">{}</a></li>\n",
            entry.anchor,
            escape_html(&entry.title)
        ));
    }
    out.push_str("</ol>\n</nav>\n");

    for (page, entry) in doc.pages.iter().zip(&doc.toc) {
        out.push_str(&format!("<section id=\"{}\">\n", entry.anchor));
        out.push_str(&format!("<h2>{}</h2>\n", escape_html(&page.title)));
        out.push_str(&format!(
            "<p class=\"source\">Source: <a href=\"{0}\">{0}</a></p>\n",
            escape_html(&page.url)
        ));
        render_page_blocks(page, &mut out);
        out.push_str("</section>\n");
    }

    out.push_str("</body>\n</html>\n");
    out
}

fn render_page_blocks(page: &GuidePage, out: &mut String) {
    // The section heading above already shows the title.
    let blocks = match page.blocks.first() {
        Some(ContentBlock::Heading { text, .. }) if *text == page.title => &page.blocks[1..],
        _ => &page.blocks[..],
    };

    for block in blocks {
        render_block(block, out);
    }
}

fn render_block(block: &ContentBlock, out: &mut String) {
    match block {
        ContentBlock::Heading { level, text } => {
            let level = (*level).clamp(1, 6);
            out.push_str(&format!(
                "<h{level}>{}</h{level}>\n",
                inline_to_html(text)
            ));
        }
        ContentBlock::Paragraph { text } => {
            out.push_str(&format!("<p>{}</p>\n", inline_to_html(text)));
        }
        ContentBlock::List { ordered, items } => {
            let tag = if *ordered { "ol" } else { "ul" };
            out.push_str(&format!("<{tag}>\n"));
            for item in items {
                out.push_str(&format!("<li>{}</li>\n", inline_to_html(item)));
            }
            out.push_str(&format!("</{tag}>\n"));
        }
        ContentBlock::Code { language, text } => {
            let class = language
                .as_ref()
                .map(|lang| format!(" class=\"language-{}\"", escape_html(lang)))
                .unwrap_or_default();
            out.push_str(&format!(
                "<pre><code{class}>{}</code></pre>\n",
                escape_html(text)
            ));
        }
        ContentBlock::Image { alt, src } => {
            out.push_str(&format!(
                "<img src=\"{}\" alt=\"{}\">\n",
                escape_html(src),
                escape_html(alt)
            ));
        }
    }
}

// ---------------------------------------------------------------------------
// Inline conversion
// ---------------------------------------------------------------------------

/// Convert flattened inline Markdown back to inline HTML, escaping first.
fn inline_to_html(text: &str) -> String {
    static CODE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"`([^`]+)`").expect("valid regex"));
    static BOLD_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid regex"));
    static ITALIC_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\*([^*]+)\*").expect("valid regex"));
    static IMAGE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").expect("valid regex"));
    static LINK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid regex"));

    let escaped = escape_html(text);

    let converted = CODE_RE.replace_all(&escaped, "<code>$1</code>");
    let converted = BOLD_RE.replace_all(&converted, "<strong>$1</strong>");
    let converted = ITALIC_RE.replace_all(&converted, "<em>$1</em>");
    let converted = IMAGE_RE.replace_all(&converted, "<img src=\"$2\" alt=\"$1\">");
    let converted = LINK_RE.replace_all(&converted, "<a href=\"$2\">$1</a>");

    converted.into_owned()
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
