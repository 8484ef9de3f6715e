//! Section store and run-metadata persistence.
//!
//! Each page is written to its own file named by a zero-padded sequence
//! number and the slugified title; existing files are overwritten, so a run
//! is idempotent for a fixed page set.

use std::path::{Path, PathBuf};

use tracing::debug;

use guidebook_markdown::{section_document, slug};
use guidebook_shared::{GuidePage, GuidebookError, Result, RunMetadata};

/// File name for one section: `001-getting-started.md`.
pub fn section_file_name(page: &GuidePage) -> String {
    format!("{:03}-{}.md", page.index + 1, slug(&page.title))
}

/// Write one page into the sections directory, returning the file path.
pub fn write_section(sections_dir: &Path, page: &GuidePage) -> Result<PathBuf> {
    std::fs::create_dir_all(sections_dir)
        .map_err(|e| GuidebookError::io(sections_dir, e))?;

    let path = sections_dir.join(section_file_name(page));
    std::fs::write(&path, section_document(page)).map_err(|e| GuidebookError::io(&path, e))?;

    debug!(path = %path.display(), title = %page.title, "wrote section");
    Ok(path)
}

/// Write a text artifact (combined Markdown or HTML), creating parents.
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| GuidebookError::io(parent, e))?;
    }
    std::fs::write(path, content).map_err(|e| GuidebookError::io(path, e))?;

    debug!(path = %path.display(), bytes = content.len(), "wrote artifact");
    Ok(())
}

/// Write the run statistics as pretty-printed JSON.
pub fn write_metadata(output_dir: &Path, metadata: &RunMetadata) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir).map_err(|e| GuidebookError::io(output_dir, e))?;

    let path = output_dir.join("metadata.json");
    let json = serde_json::to_string_pretty(metadata)
        .map_err(|e| GuidebookError::config(format!("metadata serialization failed: {e}")))?;
    std::fs::write(&path, json).map_err(|e| GuidebookError::io(&path, e))?;

    debug!(path = %path.display(), "wrote run metadata");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use guidebook_shared::ContentBlock;

    fn page(index: usize, title: &str) -> GuidePage {
        GuidePage {
            index,
            url: format!("https://docs.example.com/guide/a/{index}"),
            title: title.into(),
            blocks: vec![ContentBlock::Paragraph {
                text: "Body.".into(),
            }],
        }
    }

    #[test]
    fn section_file_names_are_zero_padded_and_slugged() {
        assert_eq!(section_file_name(&page(0, "Getting Started")), "001-getting-started.md");
        assert_eq!(section_file_name(&page(41, "What's New?")), "042-what-s-new.md");
    }

    #[test]
    fn writes_section_with_frontmatter() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_section(dir.path(), &page(0, "Intro")).expect("write");

        assert!(path.ends_with("001-intro.md"));
        let content = std::fs::read_to_string(&path).expect("read");
        assert!(content.starts_with("---\n"));
        assert!(content.contains("title: \"Intro\""));
        assert!(content.contains("Body."));
    }

    #[test]
    fn rewriting_a_section_overwrites() {
        let dir = tempfile::tempdir().expect("tempdir");
        let first = write_section(dir.path(), &page(0, "Intro")).expect("write");

        let mut changed = page(0, "Intro");
        changed.blocks = vec![ContentBlock::Paragraph {
            text: "Replaced.".into(),
        }];
        let second = write_section(dir.path(), &changed).expect("rewrite");

        assert_eq!(first, second);
        let content = std::fs::read_to_string(&second).expect("read");
        assert!(content.contains("Replaced."));
        assert!(!content.contains("Body."));
    }

    #[test]
    fn metadata_roundtrips_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let metadata = RunMetadata {
            root_url: "https://docs.example.com/guide/a/welcome".into(),
            pages_discovered: 2,
            pages_succeeded: 2,
            pages_failed: vec![],
            timestamp: Utc::now(),
        };

        let path = write_metadata(dir.path(), &metadata).expect("write");
        let parsed: RunMetadata =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("parse");
        assert_eq!(parsed.pages_discovered, 2);
        assert!(parsed.pages_failed.is_empty());
    }
}
