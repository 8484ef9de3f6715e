//! Table-of-contents building with unique anchors.
//!
//! One entry per page, in page order. Anchors are page slugs; when two pages
//! slugify identically a numeric suffix keeps every anchor unique.

use std::collections::HashSet;

use guidebook_markdown::slug;
use guidebook_shared::GuidePage;

/// A single table-of-contents entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    /// Display title.
    pub title: String,
    /// Unique in-document anchor.
    pub anchor: String,
}

/// Build the TOC for an ordered page list.
pub fn build_toc(pages: &[GuidePage]) -> Vec<TocEntry> {
    let mut issued: HashSet<String> = HashSet::new();
    let mut entries = Vec::with_capacity(pages.len());

    for page in pages {
        let anchor = disambiguate(&slug(&page.title), &mut issued);
        entries.push(TocEntry {
            title: page.title.clone(),
            anchor,
        });
    }

    entries
}

/// Return `base`, or the first `base-N` (N ≥ 2) not yet issued.
fn disambiguate(base: &str, issued: &mut HashSet<String>) -> String {
    if issued.insert(base.to_string()) {
        return base.to_string();
    }

    let mut n = 2usize;
    loop {
        let candidate = format!("{base}-{n}");
        if issued.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}
