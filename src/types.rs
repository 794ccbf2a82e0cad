//! Shared types used across the assembly pipeline.
//!
//! A [`Document`] is built once per export (by [`crate::scan`] or by a caller
//! holding sections in memory) and only ever borrowed by the engine. Every
//! derived artifact (markup, geometry, bibliography candidates) is a new
//! value; the caller's sections are never mutated.

use serde::{Deserialize, Serialize};

/// The three-part division of a book.
///
/// Ordering follows reading order, so matter transitions can be checked with
/// plain comparisons: `Front < Main < Back`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Matter {
    Front,
    Main,
    Back,
}

impl Matter {
    /// Directory name used for this matter inside a manuscript.
    pub fn dir_name(self) -> &'static str {
        match self {
            Matter::Front => "front",
            Matter::Main => "main",
            Matter::Back => "back",
        }
    }

    /// The LaTeX book-class command that opens this matter.
    pub fn directive(self) -> &'static str {
        match self {
            Matter::Front => "\\frontmatter",
            Matter::Main => "\\mainmatter",
            Matter::Back => "\\backmatter",
        }
    }
}

/// One authored unit of the book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// Stable identifier (`<matter>/<file stem>` for scanned manuscripts)
    pub id: String,
    /// Title from the first `# heading`, or the filename display title
    pub title: String,
    /// Raw markdown content
    pub content: String,
    pub matter: Matter,
    /// Global reading-order position
    pub order: u32,
}

/// How main-matter chapters are labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChapterLabelFormat {
    /// `Chapter 1`
    #[default]
    Number,
    /// `Chapter One`
    Text,
    /// No label and no number
    None,
}

/// Bibliographic metadata carried alongside the content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BookMetadata {
    pub title: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
}

/// Per-book export options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BookOptions {
    /// Language code used for localized section names and the TOC title.
    pub language: String,
    /// Trim size name, e.g. `"6x9"`.
    pub trim_size: String,
    pub include_toc: bool,
    /// Deepest heading level listed in the table of contents.
    pub toc_depth: u8,
    pub numbered_headings: bool,
    pub chapter_label_format: ChapterLabelFormat,
    /// Let the renderer's own chapter counter produce the numbers.
    pub use_auto_chapter_numbers: bool,
    /// Whether a page-number footer is rendered.
    pub page_numbers: bool,
}

impl Default for BookOptions {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            trim_size: "6x9".to_string(),
            include_toc: true,
            toc_depth: 1,
            numbered_headings: true,
            chapter_label_format: ChapterLabelFormat::Number,
            use_auto_chapter_numbers: false,
            page_numbers: true,
        }
    }
}

/// An ordered set of sections plus the metadata and options for one export.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    pub metadata: BookMetadata,
    pub options: BookOptions,
    pub sections: Vec<Section>,
}

impl Document {
    /// Sections of one matter, in reading order.
    pub fn sections_in(&self, matter: Matter) -> Vec<&Section> {
        let mut sections: Vec<&Section> =
            self.sections.iter().filter(|s| s.matter == matter).collect();
        sections.sort_by_key(|s| s.order);
        sections
    }
}
