//! Manuscript scanning.
//!
//! Reads a manuscript directory into a [`Document`] that the assembler
//! consumes. The directory layout carries the matter of every section:
//!
//! ```text
//! manuscript/                      # Manuscript root
//! ├── config.toml                  # Metadata and options (optional)
//! ├── front/
//! │   ├── 010-title-page.md        # Front matter, in number order
//! │   └── 020-dedication.md
//! ├── main/
//! │   ├── 010-the-harbour.md       # Chapters
//! │   ├── 020-part-one.md
//! │   └── notes-to-self.md         # Unnumbered = draft, skipped
//! └── back/
//!     └── 010-references.md
//! ```
//!
//! ## Naming Conventions
//!
//! - **Numbered files** (`NNN-name.md`): sorted by number within their matter
//! - **Unnumbered files**: drafts, left out of the document
//! - **Titles**: first `# heading` in the file, else the filename with dashes
//!   turned into spaces
//!
//! ## Validation
//!
//! - No duplicate numbers within a matter directory
//! - Missing matter directories are simply empty

use crate::config::{self, EngineConfig};
use crate::markup::{self, HeadingSyntax};
use crate::naming::{SectionName, parse_section_name};
use crate::types::{Document, Matter, Section};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Duplicate section number {0} in {1}")]
    DuplicateNumber(u32, PathBuf),
}

/// A scanned manuscript: the document plus the config it was read with.
#[derive(Debug, Serialize)]
pub struct Manuscript {
    pub root: PathBuf,
    pub document: Document,
    pub config: EngineConfig,
    /// Unnumbered files that were skipped, relative to the root
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub drafts: Vec<PathBuf>,
}

pub fn scan(root: &Path) -> Result<Manuscript, ScanError> {
    // Uses defaults if config.toml doesn't exist
    let config = config::load_config(root)?;

    let mut sections = Vec::new();
    let mut drafts = Vec::new();
    for matter in [Matter::Front, Matter::Main, Matter::Back] {
        scan_matter(root, matter, &mut sections, &mut drafts)?;
    }

    let mut metadata = config.metadata.clone();
    if metadata.title.trim().is_empty() {
        metadata.title = title_from_root(root);
    }

    log::debug!(
        "scanned {}: {} sections, {} drafts",
        root.display(),
        sections.len(),
        drafts.len()
    );

    Ok(Manuscript {
        root: root.to_path_buf(),
        document: Document {
            metadata,
            options: config.book.clone(),
            sections,
        },
        config,
        drafts,
    })
}

/// Append the numbered sections of one matter directory, in number order.
fn scan_matter(
    root: &Path,
    matter: Matter,
    sections: &mut Vec<Section>,
    drafts: &mut Vec<PathBuf>,
) -> Result<(), ScanError> {
    let dir = root.join(matter.dir_name());
    if !dir.is_dir() {
        return Ok(());
    }

    let mut numbered: BTreeMap<u32, (PathBuf, String, SectionName)> = BTreeMap::new();
    for path in collect_markdown(&dir)? {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let name = parse_section_name(&stem);
        let Some(number) = name.number else {
            log::debug!("skipping unnumbered draft {}", path.display());
            drafts.push(path.strip_prefix(root).unwrap_or(&path).to_path_buf());
            continue;
        };
        if numbered.contains_key(&number) {
            return Err(ScanError::DuplicateNumber(number, dir));
        }
        numbered.insert(number, (path, stem, name));
    }

    for (path, stem, name) in numbered.into_values() {
        let content = fs::read_to_string(&path)?;
        let title = first_heading(&content).unwrap_or(name.display_title);
        sections.push(Section {
            id: format!("{}/{}", matter.dir_name(), stem),
            title,
            content,
            matter,
            order: sections.len() as u32,
        });
    }
    Ok(())
}

fn collect_markdown(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            let hidden = p
                .file_name()
                .map(|n| n.to_string_lossy().starts_with('.'))
                .unwrap_or(true);
            !hidden
                && p.is_file()
                && p.extension()
                    .map(|e| e.eq_ignore_ascii_case("md"))
                    .unwrap_or(false)
        })
        .collect();

    files.sort();
    Ok(files)
}

/// Text of the first level-1 Markdown heading outside code.
fn first_heading(content: &str) -> Option<String> {
    markup::headings(content)
        .into_iter()
        .find(|h| h.level == 1 && h.syntax == HeadingSyntax::Markdown && !h.text.is_empty())
        .map(|h| h.text)
}

/// Book title fallback: the manuscript directory name, dashes as spaces.
fn title_from_root(root: &Path) -> String {
    let dir = root
        .canonicalize()
        .unwrap_or_else(|_| root.to_path_buf())
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let title = parse_section_name(&dir).display_title;
    if title.trim().is_empty() {
        "Untitled".to_string()
    } else {
        title
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    #[test]
    fn scan_reads_all_matters_in_order() {
        let tmp = setup_fixtures();
        let manuscript = scan(tmp.path()).unwrap();
        let doc = &manuscript.document;

        let matters: Vec<Matter> = doc.sections.iter().map(|s| s.matter).collect();
        let mut sorted = matters.clone();
        sorted.sort();
        assert_eq!(matters, sorted);
        assert!(!doc.sections_in(Matter::Front).is_empty());
        assert!(!doc.sections_in(Matter::Main).is_empty());
        assert!(!doc.sections_in(Matter::Back).is_empty());
    }

    #[test]
    fn order_is_global_and_contiguous() {
        let tmp = setup_fixtures();
        let manuscript = scan(tmp.path()).unwrap();
        let orders: Vec<u32> = manuscript.document.sections.iter().map(|s| s.order).collect();
        let expected: Vec<u32> = (0..orders.len() as u32).collect();
        assert_eq!(orders, expected);
    }

    #[test]
    fn drafts_are_skipped() {
        let tmp = setup_fixtures();
        let manuscript = scan(tmp.path()).unwrap();
        assert_eq!(manuscript.drafts, vec![PathBuf::from("main/notes-to-self.md")]);
        assert!(
            manuscript
                .document
                .sections
                .iter()
                .all(|s| !s.id.contains("notes-to-self"))
        );
    }

    #[test]
    fn config_is_loaded_from_root() {
        let tmp = setup_fixtures();
        let manuscript = scan(tmp.path()).unwrap();
        assert_eq!(manuscript.document.metadata.title, "The Quiet Harbour");
        assert_eq!(manuscript.document.options, manuscript.config.book);
    }

    #[test]
    fn numbers_order_sections_within_matter() {
        let tmp = TempDir::new().unwrap();
        write_files(
            tmp.path(),
            &[
                ("main/020-second.md", "# Second\n"),
                ("main/003-first.md", "# First\n"),
                ("main/100-third.md", "# Third\n"),
            ],
        );
        let doc = scan(tmp.path()).unwrap().document;
        assert_eq!(section_titles(&doc), vec!["First", "Second", "Third"]);
        assert_eq!(doc.sections[0].id, "main/003-first");
    }

    #[test]
    fn title_falls_back_to_filename() {
        let tmp = TempDir::new().unwrap();
        write_files(
            tmp.path(),
            &[
                ("back/010-about-the-author.md", "No heading here.\n"),
                ("back/020-colophon.md", "```\n# not a title\n```\n## Set in Garamond\n"),
            ],
        );
        let doc = scan(tmp.path()).unwrap().document;
        assert_eq!(find_section(&doc, "back/010-about-the-author").title, "about the author");
        assert_eq!(find_section(&doc, "back/020-colophon").title, "colophon");
    }

    #[test]
    fn duplicate_number_is_error() {
        let tmp = TempDir::new().unwrap();
        write_files(
            tmp.path(),
            &[("main/010-one.md", "# One\n"), ("main/010-uno.md", "# Uno\n")],
        );
        let result = scan(tmp.path());
        assert!(matches!(result, Err(ScanError::DuplicateNumber(10, _))));
    }

    #[test]
    fn same_number_in_different_matters_is_fine() {
        let tmp = TempDir::new().unwrap();
        write_files(
            tmp.path(),
            &[("front/010-title.md", "# Book\n"), ("main/010-one.md", "# One\n")],
        );
        assert_eq!(scan(tmp.path()).unwrap().document.sections.len(), 2);
    }

    #[test]
    fn non_markdown_and_hidden_files_are_ignored() {
        let tmp = TempDir::new().unwrap();
        write_files(
            tmp.path(),
            &[
                ("main/010-one.md", "# One\n"),
                ("main/020-cover.png", "not markdown"),
                ("main/.030-hidden.md", "# Hidden\n"),
            ],
        );
        let doc = scan(tmp.path()).unwrap().document;
        assert_eq!(section_titles(&doc), vec!["One"]);
    }

    #[test]
    fn empty_manuscript_uses_directory_name_as_title() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("the-long-night");
        fs::create_dir_all(&root).unwrap();
        let manuscript = scan(&root).unwrap();
        assert!(manuscript.document.sections.is_empty());
        assert_eq!(manuscript.document.metadata.title, "the long night");
    }

    #[test]
    fn invalid_config_is_error() {
        let tmp = TempDir::new().unwrap();
        write_files(tmp.path(), &[("config.toml", "[book]\ntoc_depth = 7\n")]);
        assert!(matches!(scan(tmp.path()), Err(ScanError::Config(_))));
    }
}
