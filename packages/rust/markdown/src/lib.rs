//! Markdown serialization of normalized content blocks.
//!
//! One fixed, deterministic mapping from [`ContentBlock`] sequences to
//! structural Markdown text: heading markers, list markers, fenced code.
//! Also provides slug generation and the YAML front-matter used by section
//! files.

use guidebook_shared::{ContentBlock, GuidePage};

/// Maximum slug length in characters.
const SLUG_MAX_CHARS: usize = 50;

// ---------------------------------------------------------------------------
// Block serialization
// ---------------------------------------------------------------------------

/// Serialize a block sequence to Markdown. Deterministic: identical input
/// always yields byte-identical output.
pub fn render_blocks(blocks: &[ContentBlock]) -> String {
    let mut out = String::new();

    for block in blocks {
        match block {
            ContentBlock::Heading { level, text } => {
                let level = (*level).clamp(1, 6) as usize;
                out.push_str(&"#".repeat(level));
                out.push(' ');
                out.push_str(text);
                out.push_str("\n\n");
            }
            ContentBlock::Paragraph { text } => {
                out.push_str(text);
                out.push_str("\n\n");
            }
            ContentBlock::List { ordered, items } => {
                for (i, item) in items.iter().enumerate() {
                    if *ordered {
                        out.push_str(&format!("{}. {item}\n", i + 1));
                    } else {
                        out.push_str(&format!("- {item}\n"));
                    }
                }
                out.push('\n');
            }
            ContentBlock::Code { language, text } => {
                out.push_str("```");
                if let Some(lang) = language {
                    out.push_str(lang);
                }
                out.push('\n');
                out.push_str(text);
                out.push_str("\n```\n\n");
            }
            ContentBlock::Image { alt, src } => {
                out.push_str(&format!("![{alt}]({src})\n\n"));
            }
        }
    }

    // Exactly one trailing newline.
    while out.ends_with('\n') {
        out.pop();
    }
    out.push('\n');
    out
}

/// Serialize one page as a section file: front-matter, then body.
pub fn section_document(page: &GuidePage) -> String {
    let frontmatter = build_frontmatter(&page.url, &page.title);
    format!("{frontmatter}\n{}", render_blocks(&page.blocks))
}

// ---------------------------------------------------------------------------
// Front-matter
// ---------------------------------------------------------------------------

/// Build the YAML front-matter block carried by section files.
pub fn build_frontmatter(source_url: &str, title: &str) -> String {
    let mut fm = String::from("---\n");
    fm.push_str(&format!("source_url: \"{source_url}\"\n"));
    fm.push_str(&format!("title: \"{}\"\n", escape_yaml_string(title)));
    fm.push_str("---\n");
    fm
}

/// Escape special characters in a YAML string value.
fn escape_yaml_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

// ---------------------------------------------------------------------------
// Slugs
// ---------------------------------------------------------------------------

/// Generate a filesystem/anchor-safe slug from a title.
///
/// Lowercase, non-alphanumeric runs collapsed to a single `-`, truncated to
/// a bounded length. Idempotent: `slug(slug(x)) == slug(x)`.
pub fn slug(title: &str) -> String {
    let collapsed = title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    let truncated: String = collapsed.chars().take(SLUG_MAX_CHARS).collect();
    let trimmed = truncated.trim_matches('-');

    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_headings_and_paragraphs() {
        let blocks = vec![
            ContentBlock::Heading {
                level: 1,
                text: "Title".into(),
            },
            ContentBlock::Paragraph {
                text: "Body text.".into(),
            },
            ContentBlock::Heading {
                level: 3,
                text: "Sub".into(),
            },
        ];

        assert_eq!(render_blocks(&blocks), "# Title\n\nBody text.\n\n### Sub\n");
    }

    #[test]
    fn renders_lists() {
        let blocks = vec![
            ContentBlock::List {
                ordered: false,
                items: vec!["alpha".into(), "beta".into()],
            },
            ContentBlock::List {
                ordered: true,
                items: vec!["first".into(), "second".into()],
            },
        ];

        assert_eq!(
            render_blocks(&blocks),
            "- alpha\n- beta\n\n1. first\n2. second\n"
        );
    }

    #[test]
    fn renders_fenced_code_with_language() {
        let blocks = vec![ContentBlock::Code {
            language: Some("rust".into()),
            text: "fn main() {}".into(),
        }];

        assert_eq!(render_blocks(&blocks), "```rust\nfn main() {}\n```\n");
    }

    #[test]
    fn renders_code_without_language() {
        let blocks = vec![ContentBlock::Code {
            language: None,
            text: "plain text".into(),
        }];

        assert_eq!(render_blocks(&blocks), "```\nplain text\n```\n");
    }

    #[test]
    fn code_content_is_not_reinterpreted() {
        // Markdown-looking code must survive byte-for-byte inside the fence.
        let blocks = vec![ContentBlock::Code {
            language: None,
            text: "# not a heading\n- not a list".into(),
        }];

        assert_eq!(
            render_blocks(&blocks),
            "```\n# not a heading\n- not a list\n```\n"
        );
    }

    #[test]
    fn renders_image_references() {
        let blocks = vec![ContentBlock::Image {
            alt: "shot".into(),
            src: "https://docs.example.com/i.png".into(),
        }];

        assert_eq!(
            render_blocks(&blocks),
            "![shot](https://docs.example.com/i.png)\n"
        );
    }

    #[test]
    fn section_document_carries_frontmatter() {
        let page = GuidePage {
            index: 0,
            url: "https://docs.example.com/guide/a/intro".into(),
            title: "Intro \"quoted\"".into(),
            blocks: vec![ContentBlock::Paragraph {
                text: "Hello.".into(),
            }],
        };

        let doc = section_document(&page);
        assert!(doc.starts_with("---\n"));
        assert!(doc.contains("source_url: \"https://docs.example.com/guide/a/intro\""));
        assert!(doc.contains("title: \"Intro \\\"quoted\\\"\""));
        assert!(doc.ends_with("Hello.\n"));
    }

    #[test]
    fn render_is_deterministic() {
        let blocks = vec![
            ContentBlock::Heading {
                level: 2,
                text: "Same".into(),
            },
            ContentBlock::Paragraph {
                text: "Every time.".into(),
            },
        ];

        assert_eq!(render_blocks(&blocks), render_blocks(&blocks));
    }

    #[test]
    fn slug_basics() {
        assert_eq!(slug("Getting Started"), "getting-started");
        assert_eq!(slug("Use the  Shortcuts   app"), "use-the-shortcuts-app");
        assert_eq!(slug("What's new?"), "what-s-new");
        assert_eq!(slug("  --Trimmed--  "), "trimmed");
    }

    #[test]
    fn slug_is_idempotent() {
        for input in [
            "Getting Started",
            "Intro to Shortcuts, part 2!",
            "A very long title that goes on and on and on far past the size cap",
            "ünïcode Tïtle",
            "",
            "!!!",
        ] {
            let once = slug(input);
            assert_eq!(slug(&once), once, "slug not idempotent for {input:?}");
        }
    }

    #[test]
    fn slug_is_bounded() {
        let long = "word ".repeat(40);
        assert!(slug(&long).chars().count() <= SLUG_MAX_CHARS);
    }

    #[test]
    fn empty_slug_falls_back() {
        assert_eq!(slug("???"), "untitled");
    }
}
