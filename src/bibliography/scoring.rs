//! Content-analysis scoring for segments without a known bibliography title.
//!
//! Each signal contributes an independently capped amount; the sum is capped
//! at 1.0. Segments with fewer than [`MIN_WORDS`] words score zero.
//!
//! | Signal        | Contribution                                        | Cap  |
//! |---------------|-----------------------------------------------------|------|
//! | URL density   | 0.05 per URL per 100 words                          | 0.25 |
//! | Line shape    | flat, for long lines of consistent length           | 0.10 |
//! | List          | 0.15 if ≥ 50% list lines, 0.08 if ≥ 25%             | 0.15 |
//! | Citations     | sum of the citation sub-scores below                | 0.40 |
//! | Position      | ramps from 0 at 70% of the document to max at 100%  | 0.15 |
//! | Punctuation   | flat, above 0.5 marks per word                      | 0.05 |
//!
//! Citation sub-scores (each capped): four-digit years, `Surname, I.`
//! authors, italicized titles, publisher names, DOIs, `p./pp. N` page
//! markers, and parenthetical `(Author 2019)` citations.

use crate::markup;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

/// Minimum body words for content analysis.
pub const MIN_WORDS: usize = 20;

const URL_WEIGHT: f64 = 0.05;
const URL_CAP: f64 = 0.25;
const LINE_SHAPE_BONUS: f64 = 0.10;
const LIST_MAJORITY_BONUS: f64 = 0.15;
const LIST_PARTIAL_BONUS: f64 = 0.08;
const CITATION_CAP: f64 = 0.40;
const POSITION_START: f64 = 0.7;
const POSITION_MAX: f64 = 0.15;
const PUNCTUATION_RATIO: f64 = 0.5;
const PUNCTUATION_BONUS: f64 = 0.05;

lazy_static! {
    static ref RE_URL: Regex =
        Regex::new(r#"(?:https?://|www\.)[^\s<>()\[\]{}"']+"#).unwrap();
    static ref RE_YEAR: Regex = Regex::new(r"\b(?:1[5-9]|20)\d{2}\b").unwrap();
    static ref RE_AUTHOR: Regex = Regex::new(r"\b\p{Lu}[\p{Ll}'’\-]+,\s+\p{Lu}\.").unwrap();
    static ref RE_ITALIC: Regex =
        Regex::new(r"\*[^*\s][^*\n]*\*|\b_[^_\s][^_\n]*_\b|\\(?:emph|textit)\{").unwrap();
    static ref RE_PUBLISHER: Regex = Regex::new(
        r"(?i)\b(?:press|publishing|publishers?|verlag|éditions|editorial|editora|uitgeverij|wiley|springer|elsevier|routledge|penguin|harpercollins|macmillan|o'reilly)\b"
    )
    .unwrap();
    static ref RE_DOI: Regex = Regex::new(r"\b10\.\d{4,9}/\S+").unwrap();
    static ref RE_PAGES: Regex = Regex::new(r"\bpp?\.\s*\d+").unwrap();
    static ref RE_PARENTHETICAL: Regex =
        Regex::new(r"\([^()\n]*\b(?:19|20)\d{2}[a-z]?\b[^()\n]*\)").unwrap();
    static ref RE_LIST_ITEM: Regex = Regex::new(r"^\s*(?:[-*+]|\d+[.)]|\[\d+\])\s+").unwrap();
}

/// Citation-pattern sub-scores.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CitationScores {
    pub years: f64,
    pub authors: f64,
    pub italic_titles: f64,
    pub publishers: f64,
    pub dois: f64,
    pub page_markers: f64,
    pub parenthetical: f64,
}

impl CitationScores {
    /// Sum of sub-scores, capped.
    pub fn total(&self) -> f64 {
        (self.years
            + self.authors
            + self.italic_titles
            + self.publishers
            + self.dois
            + self.page_markers
            + self.parenthetical)
            .min(CITATION_CAP)
    }
}

/// Per-signal contributions to a content-analysis score.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub words: usize,
    pub url_density: f64,
    pub line_shape: f64,
    pub list_structure: f64,
    pub citations: CitationScores,
    pub position: f64,
    pub punctuation: f64,
    /// Capped sum of all signals
    pub total: f64,
}

fn capped(count: usize, per_match: f64, cap: f64) -> f64 {
    (count as f64 * per_match).min(cap)
}

/// Score segment content. `position` is where the segment starts, as a
/// fraction of the document length.
pub fn score_content(body: &str, position: f64) -> ScoreBreakdown {
    let lines: Vec<&str> = body
        .lines()
        .filter(|l| !l.trim().is_empty() && !markup::is_directive_line(l))
        .collect();
    let text = lines.join("\n");
    let words = text.split_whitespace().count();
    if words < MIN_WORDS {
        return ScoreBreakdown {
            words,
            ..Default::default()
        };
    }

    let urls = RE_URL.find_iter(&text).count();
    let url_density = (urls as f64 * 100.0 / words as f64 * URL_WEIGHT).min(URL_CAP);

    let line_shape = line_shape_score(&lines);

    let list_lines = lines.iter().filter(|l| RE_LIST_ITEM.is_match(l)).count();
    let list_ratio = list_lines as f64 / lines.len() as f64;
    let list_structure = if list_ratio >= 0.5 {
        LIST_MAJORITY_BONUS
    } else if list_ratio >= 0.25 {
        LIST_PARTIAL_BONUS
    } else {
        0.0
    };

    let citations = CitationScores {
        years: capped(RE_YEAR.find_iter(&text).count(), 0.02, 0.15),
        authors: capped(RE_AUTHOR.find_iter(&text).count(), 0.03, 0.15),
        italic_titles: capped(RE_ITALIC.find_iter(&text).count(), 0.02, 0.10),
        publishers: capped(RE_PUBLISHER.find_iter(&text).count(), 0.03, 0.10),
        dois: capped(RE_DOI.find_iter(&text).count(), 0.05, 0.15),
        page_markers: capped(RE_PAGES.find_iter(&text).count(), 0.02, 0.10),
        parenthetical: capped(RE_PARENTHETICAL.find_iter(&text).count(), 0.03, 0.10),
    };

    let position = if position > POSITION_START {
        ((position - POSITION_START) / (1.0 - POSITION_START)).min(1.0) * POSITION_MAX
    } else {
        0.0
    };

    let marks = text
        .chars()
        .filter(|c| matches!(c, '.' | ',' | ';' | ':' | '(' | ')' | '[' | ']'))
        .count();
    let punctuation = if marks as f64 / words as f64 > PUNCTUATION_RATIO {
        PUNCTUATION_BONUS
    } else {
        0.0
    };

    let total = (url_density + line_shape + list_structure + citations.total() + position + punctuation)
        .min(1.0);

    ScoreBreakdown {
        words,
        url_density,
        line_shape,
        list_structure,
        citations,
        position,
        punctuation,
        total,
    }
}

/// Reference lists have several long lines of similar length.
fn line_shape_score(lines: &[&str]) -> f64 {
    if lines.len() < 3 {
        return 0.0;
    }
    let lengths: Vec<f64> = lines.iter().map(|l| l.chars().count() as f64).collect();
    let mean = lengths.iter().sum::<f64>() / lengths.len() as f64;
    if !(40.0..=250.0).contains(&mean) {
        return 0.0;
    }
    let variance = lengths.iter().map(|len| (len - mean).powi(2)).sum::<f64>() / lengths.len() as f64;
    if variance.sqrt() / mean <= 0.6 {
        LINE_SHAPE_BONUS
    } else {
        0.0
    }
}
