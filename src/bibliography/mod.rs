//! Bibliography detection and URL wrapping.
//!
//! Reference lists are full of long URLs that a narrow print column cannot
//! break, so they overflow into the margin. This module finds the segments of
//! a document that look like bibliographies and inserts zero-width break
//! opportunities into their long URLs.
//!
//! # Pipeline
//!
//! ```text
//! markup ─► segment ─► score each segment ─► candidates ─► wrap URLs in candidates only
//! ```
//!
//! A segment whose heading is a known bibliography title ("References",
//! "Literaturverzeichnis", ...) is accepted outright. Anything else is scored
//! from its content: URL density, list structure, citation patterns, position
//! in the book, punctuation. See [`scoring`] for the signals and weights.
//!
//! # Precision over recall
//!
//! Segments that are not flagged are left byte-for-byte untouched. Missing a
//! bibliography costs an overfull line; wrongly rewriting prose costs invisible
//! characters inside URLs readers might copy. The default threshold leans
//! towards the former.

pub mod detect;
pub mod scoring;
pub mod urls;

use serde::Serialize;
use std::ops::Range;

pub use detect::{Segment, detect_bibliography_sections, segment};
pub use scoring::{CitationScores, ScoreBreakdown};
pub use urls::{WrapOutcome, ZERO_WIDTH_BREAK, is_well_formed, wrap_all_long_urls, wrap_long_urls, wrap_url};

/// Default score at which a segment counts as a bibliography.
pub const DEFAULT_THRESHOLD: f64 = 0.5;
/// Default URL length above which URLs in bibliographies are wrapped.
pub const DEFAULT_WRAP_LENGTH: usize = 30;
/// Default URL length for the optional document-wide pass.
pub const DEFAULT_DOCUMENT_WRAP_LENGTH: usize = 50;

/// How a candidate was recognized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "method", rename_all = "kebab-case")]
pub enum Detection {
    /// The heading is a known bibliography title.
    TitleMatch,
    /// The content scored high enough; the breakdown shows why.
    ContentAnalysis(ScoreBreakdown),
}

impl Detection {
    /// Score in `[0, 1]`.
    pub fn score(&self) -> f64 {
        match self {
            Detection::TitleMatch => 1.0,
            Detection::ContentAnalysis(breakdown) => breakdown.total,
        }
    }
}

/// A segment flagged as a bibliography.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BibliographyCandidate {
    /// Index among the (noise-filtered) segments of the document
    pub section_index: usize,
    /// Heading text, if the segment has one
    pub heading: Option<String>,
    pub score: f64,
    pub method: Detection,
    /// Byte range of the segment in the document
    pub span: Range<usize>,
}
