//! Document compiler: ordered pages → one combined Markdown document.
//!
//! The combined document is a pure function of the page list: a TOC with
//! anchor links, then each page introduced by its anchor target, a visible
//! heading, and a provenance line. Identical input produces byte-identical
//! output.

use url::Url;

use guidebook_markdown::render_blocks;
use guidebook_shared::{ContentBlock, GuidePage};

use crate::toc::{TocEntry, build_toc};

/// The compiled guide: every surviving page plus its generated TOC.
#[derive(Debug, Clone)]
pub struct CompiledDocument {
    /// Guide title, taken from the first page.
    pub title: String,
    /// The guide entry point the run started from.
    pub root_url: String,
    /// One entry per page, in page order, anchors unique.
    pub toc: Vec<TocEntry>,
    /// Pages in discovery order.
    pub pages: Vec<GuidePage>,
}

/// Assemble the compiled document from the ordered page list.
pub fn compile(pages: Vec<GuidePage>, root_url: &Url) -> CompiledDocument {
    let title = pages
        .first()
        .map(|page| page.title.clone())
        .or_else(|| root_url.host_str().map(String::from))
        .unwrap_or_else(|| "Guide".to_string());

    let toc = build_toc(&pages);

    CompiledDocument {
        title,
        root_url: root_url.to_string(),
        toc,
        pages,
    }
}

/// Serialize the compiled document to Markdown.
pub fn to_markdown(doc: &CompiledDocument) -> String {
    let mut out = String::new();

    out.push_str(&format!("# {}\n\n", doc.title));
    out.push_str(&format!("Compiled from <{}>\n\n", doc.root_url));

    out.push_str("## Table of Contents\n\n");
    for entry in &doc.toc {
        out.push_str(&format!("- [{}](#{})\n", entry.title, entry.anchor));
    }
    out.push_str("\n---\n");

    for (page, entry) in doc.pages.iter().zip(&doc.toc) {
        out.push_str(&format!("\n<a id=\"{}\"></a>\n\n", entry.anchor));
        out.push_str(&format!("## {}\n\n", page.title));
        out.push_str(&format!("Source: <{}>\n\n", page.url));
        out.push_str(&render_blocks(page_body(page)));
        out.push_str("\n---\n");
    }

    out
}

/// The page's blocks minus a leading heading that repeats the page title;
/// the compiler already emits a visible heading per page.
fn page_body(page: &GuidePage) -> &[ContentBlock] {
    match page.blocks.first() {
        Some(ContentBlock::Heading { text, .. }) if *text == page.title => &page.blocks[1..],
        _ => &page.blocks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root() -> Url {
        Url::parse("https://docs.example.com/guide/a/welcome").unwrap()
    }

    fn page(index: usize, title: &str, body: &str) -> GuidePage {
        GuidePage {
            index,
            url: format!("https://docs.example.com/guide/a/{}", index + 1),
            title: title.into(),
            blocks: vec![
                ContentBlock::Heading {
                    level: 1,
                    text: title.into(),
                },
                ContentBlock::Paragraph { text: body.into() },
            ],
        }
    }

    #[test]
    fn compile_takes_title_from_first_page() {
        let doc = compile(vec![page(0, "Welcome", "Hi.")], &root());
        assert_eq!(doc.title, "Welcome");
    }

    #[test]
    fn compile_empty_falls_back_to_host() {
        let doc = compile(vec![], &root());
        assert_eq!(doc.title, "docs.example.com");
    }

    #[test]
    fn markdown_contains_toc_and_anchored_pages() {
        let doc = compile(
            vec![page(0, "Welcome", "Hi."), page(1, "Setup", "Install.")],
            &root(),
        );
        let md = to_markdown(&doc);

        assert!(md.contains("- [Welcome](#welcome)"));
        assert!(md.contains("- [Setup](#setup)"));
        assert!(md.contains("<a id=\"welcome\"></a>"));
        assert!(md.contains("## Setup\n\nSource: <https://docs.example.com/guide/a/2>"));
        // Page order preserved in the body
        let welcome_pos = md.find("## Welcome").unwrap();
        let setup_pos = md.find("## Setup").unwrap();
        assert!(welcome_pos < setup_pos);
    }

    #[test]
    fn leading_title_heading_is_not_duplicated() {
        let doc = compile(vec![page(0, "Welcome", "Hi.")], &root());
        let md = to_markdown(&doc);

        // The compiler's own "## Welcome" is the only heading for the page;
        // the page's leading H1 with the same text is dropped.
        assert_eq!(md.matches("# Welcome").count(), 2); // "# Welcome" doc title + "## Welcome"
        assert!(!md.contains("\n# Welcome\n"));
    }

    #[test]
    fn unrelated_leading_heading_is_kept() {
        let mut p = page(0, "Welcome", "Hi.");
        p.blocks[0] = ContentBlock::Heading {
            level: 1,
            text: "Different".into(),
        };
        let doc = compile(vec![p], &root());
        let md = to_markdown(&doc);
        assert!(md.contains("# Different"));
    }

    #[test]
    fn output_is_byte_deterministic() {
        let pages = vec![
            page(0, "Welcome", "Hi."),
            page(1, "Setup", "Install."),
            page(2, "Usage", "Run it."),
        ];
        let doc_a = compile(pages.clone(), &root());
        let doc_b = compile(pages, &root());

        assert_eq!(to_markdown(&doc_a), to_markdown(&doc_b));
    }

    #[test]
    fn duplicate_titles_keep_distinct_anchors_in_output() {
        let doc = compile(
            vec![page(0, "Introduction", "One."), page(1, "Introduction", "Two.")],
            &root(),
        );
        let md = to_markdown(&doc);

        assert!(md.contains("<a id=\"introduction\"></a>"));
        assert!(md.contains("<a id=\"introduction-2\"></a>"));
    }
}
