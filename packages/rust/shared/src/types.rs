//! Core domain types for a guide-archiving run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ContentBlock
// ---------------------------------------------------------------------------

/// A block-level content node: one structural unit of page content,
/// independent of output format.
///
/// Paragraph text and list items carry inline markup in flattened Markdown
/// form (`**bold**`, `*italic*`, `` `code` ``, `[text](url)`). `Code` text is
/// verbatim and is never re-interpreted as structural markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// A heading with level 1–6.
    Heading { level: u8, text: String },
    /// A paragraph of inline-formatted text.
    Paragraph { text: String },
    /// An ordered or unordered list of inline-formatted items.
    List { ordered: bool, items: Vec<String> },
    /// A fenced code block with an optional language hint.
    Code {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        text: String,
    },
    /// A reference to an image.
    Image { alt: String, src: String },
}

// ---------------------------------------------------------------------------
// GuidePage
// ---------------------------------------------------------------------------

/// One fetched and extracted guide page.
///
/// Created with `url` and `index` when the page list is discovered, populated
/// with `title` and `blocks` after fetch + extraction, immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidePage {
    /// Zero-based position in the guide's reading order.
    pub index: usize,
    /// Absolute source URL.
    pub url: String,
    /// Page title (first heading, or document title metadata).
    pub title: String,
    /// Normalized block content in document order.
    pub blocks: Vec<ContentBlock>,
}

// ---------------------------------------------------------------------------
// RunMetadata
// ---------------------------------------------------------------------------

/// A page that could not be fetched, with the final failure reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedPage {
    pub url: String,
    pub reason: String,
}

/// Statistics for a completed run, written once as `metadata.json`.
/// Purely observational; no later stage consumes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    /// The guide entry point the run started from.
    pub root_url: String,
    /// Number of pages found in the table of contents (after the cap).
    pub pages_discovered: usize,
    /// Number of pages fetched and extracted.
    pub pages_succeeded: usize,
    /// Pages skipped after exhausting all fetch strategies.
    pub pages_failed: Vec<FailedPage>,
    /// When the run finished.
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_block_tagged_serialization() {
        let block = ContentBlock::Heading {
            level: 2,
            text: "Getting Started".into(),
        };
        let json = serde_json::to_string(&block).expect("serialize");
        assert!(json.contains("\"type\":\"heading\""));
        assert!(json.contains("\"level\":2"));

        let parsed: ContentBlock = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, block);
    }

    #[test]
    fn code_block_omits_absent_language() {
        let block = ContentBlock::Code {
            language: None,
            text: "let x = 1;".into(),
        };
        let json = serde_json::to_string(&block).expect("serialize");
        assert!(!json.contains("language"));

        let hinted = ContentBlock::Code {
            language: Some("rust".into()),
            text: "let x = 1;".into(),
        };
        let json = serde_json::to_string(&hinted).expect("serialize");
        assert!(json.contains("\"language\":\"rust\""));
    }

    #[test]
    fn guide_page_roundtrip() {
        let page = GuidePage {
            index: 3,
            url: "https://docs.example.com/guide/intro".into(),
            title: "Introduction".into(),
            blocks: vec![
                ContentBlock::Heading {
                    level: 1,
                    text: "Introduction".into(),
                },
                ContentBlock::Paragraph {
                    text: "Welcome to the guide.".into(),
                },
                ContentBlock::List {
                    ordered: false,
                    items: vec!["one".into(), "two".into()],
                },
            ],
        };

        let json = serde_json::to_string_pretty(&page).expect("serialize");
        let parsed: GuidePage = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, page);
    }

    #[test]
    fn run_metadata_serialization() {
        let meta = RunMetadata {
            root_url: "https://docs.example.com/guide/welcome".into(),
            pages_discovered: 3,
            pages_succeeded: 2,
            pages_failed: vec![FailedPage {
                url: "https://docs.example.com/guide/broken".into(),
                reason: "HTTP 500".into(),
            }],
            timestamp: Utc::now(),
        };

        let json = serde_json::to_string_pretty(&meta).expect("serialize");
        let parsed: RunMetadata = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.pages_discovered, 3);
        assert_eq!(parsed.pages_failed.len(), 1);
        assert_eq!(parsed.pages_failed[0].reason, "HTTP 500");
    }
}
