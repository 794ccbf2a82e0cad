//! Document segmentation and bibliography detection.

use super::scoring::score_content;
use super::{BibliographyCandidate, Detection};
use crate::headings::strip_author_numbering;
use crate::markup::{self, FenceTracker};
use std::collections::BTreeSet;
use std::ops::Range;

/// Segments shorter than this many characters are noise.
pub const MIN_SEGMENT_CHARS: usize = 10;

/// A heading plus everything up to the next heading.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    /// Heading text; `None` for content before the first heading
    pub heading: Option<String>,
    /// Byte range of the whole segment, heading line included
    pub span: Range<usize>,
    /// Byte range of the content after the heading line
    pub body: Range<usize>,
}

/// Split a document at every heading line (levels 1–6, either syntax).
///
/// Headings inside code fences don't split. Segments under
/// [`MIN_SEGMENT_CHARS`] characters of trimmed text are dropped.
pub fn segment(document: &str) -> Vec<Segment> {
    let mut raw: Vec<Segment> = Vec::new();
    let mut fences = FenceTracker::default();
    let mut current = Segment {
        heading: None,
        span: 0..0,
        body: 0..0,
    };
    let mut offset = 0;

    for piece in document.split_inclusive('\n') {
        let line = piece.trim_end_matches(['\n', '\r']);
        let is_heading = !fences.is_code(line);
        if is_heading && let Some((_, text, _)) = markup::parse_heading(line) {
            current.span.end = offset;
            current.body.end = offset;
            if current.heading.is_some() || offset > current.span.start {
                raw.push(current);
            }
            current = Segment {
                heading: Some(text),
                span: offset..offset,
                body: offset + piece.len()..offset + piece.len(),
            };
        }
        offset += piece.len();
    }
    current.span.end = offset;
    current.body.end = offset.max(current.body.start);
    if current.heading.is_some() || offset > current.span.start {
        raw.push(current);
    }

    raw.into_iter()
        .filter(|s| document[s.span.clone()].trim().chars().count() >= MIN_SEGMENT_CHARS)
        .collect()
}

/// Whether a heading names a bibliography, with or without a chapter label.
///
/// Main-matter headings reach detection already numbered, so
/// `Chapter 2: References` must match as well as `References`.
fn is_bibliography_title(heading: &str, titles: &BTreeSet<String>) -> bool {
    let raw = heading.trim().to_lowercase();
    if titles.contains(&raw) {
        return true;
    }
    let bare = strip_author_numbering(heading).to_lowercase();
    !bare.is_empty() && titles.contains(&bare)
}

/// Score every segment and return those at or above `threshold`.
///
/// `titles` holds lowercased known bibliography titles. Never fails: a
/// document without headings or references yields no candidates.
pub fn detect_bibliography_sections(
    document: &str,
    titles: &BTreeSet<String>,
    threshold: f64,
) -> Vec<BibliographyCandidate> {
    let total = document.len();
    let mut candidates = Vec::new();

    for (index, seg) in segment(document).into_iter().enumerate() {
        let detection = match &seg.heading {
            Some(heading) if is_bibliography_title(heading, titles) => Detection::TitleMatch,
            _ => {
                let position = if total == 0 {
                    0.0
                } else {
                    seg.span.start as f64 / total as f64
                };
                Detection::ContentAnalysis(score_content(&document[seg.body.clone()], position))
            }
        };
        let score = detection.score();
        log::debug!(
            "segment {} ({:?}) scored {:.2}",
            index,
            seg.heading.as_deref().unwrap_or("<untitled>"),
            score
        );
        if score >= threshold {
            candidates.push(BibliographyCandidate {
                section_index: index,
                heading: seg.heading,
                score,
                method: detection,
                span: seg.span,
            });
        }
    }
    candidates
}
