//! Shared test utilities for the folio test suite.
//!
//! Provides manuscript fixture setup, in-memory section builders, and lookup
//! helpers that work with scan-phase and export data structures.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let manuscript = scan(tmp.path()).unwrap();
//! let section = find_section(&manuscript.document, "main/010-the-harbour");
//! assert_eq!(section.title, "The Harbour");
//!
//! let doc = document(vec![
//!     section(Matter::Front, "# My Book\n"),
//!     section(Matter::Main, "# First Light\nText."),
//! ]);
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::markup;
use crate::types::{Document, Matter, Section};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/manuscript/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/manuscript");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Write files (relative path, content) under `root`, creating directories.
pub fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (rel, content) in files {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
    }
}

// =========================================================================
// In-memory builders
// =========================================================================

/// Build a section whose title is its first `# heading` (or "Untitled").
///
/// `id` and `order` are placeholders; [`document`] renumbers them.
pub fn section(matter: Matter, content: &str) -> Section {
    let title = markup::headings(content)
        .into_iter()
        .find(|h| h.level == 1)
        .map(|h| h.text)
        .unwrap_or_else(|| "Untitled".to_string());
    Section {
        id: String::new(),
        title,
        content: content.to_string(),
        matter,
        order: 0,
    }
}

/// Build a document with default options, assigning ids and reading order.
pub fn document(mut sections: Vec<Section>) -> Document {
    for (i, s) in sections.iter_mut().enumerate() {
        s.order = i as u32;
        s.id = format!("{}/{:03}", s.matter.dir_name(), i);
    }
    Document {
        sections,
        ..Default::default()
    }
}

// =========================================================================
// Lookups (panic with a clear message on miss)
// =========================================================================

/// Find a section by id. Panics if not found.
pub fn find_section<'a>(doc: &'a Document, id: &str) -> &'a Section {
    doc.sections.iter().find(|s| s.id == id).unwrap_or_else(|| {
        let ids: Vec<&str> = doc.sections.iter().map(|s| s.id.as_str()).collect();
        panic!("section '{id}' not found. Available: {ids:?}")
    })
}

/// All section titles in reading order.
pub fn section_titles(doc: &Document) -> Vec<&str> {
    doc.sections.iter().map(|s| s.title.as_str()).collect()
}

/// Non-empty lines of `markup` that are bare directives (`\mainmatter`, ...).
pub fn directive_lines(markup: &str) -> Vec<&str> {
    markup
        .lines()
        .filter(|l| markup::is_directive_line(l))
        .collect()
}
