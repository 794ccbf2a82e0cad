//! Front-matter classification.
//!
//! Authors often write everything before the first chapter into one
//! front-matter blob: the book title, a dedication, a foreword, and sometimes
//! the first chapters too. This module finds where main matter begins inside
//! that blob.
//!
//! ## Rules
//!
//! Level-1 headings are walked in order:
//!
//! 1. The first heading is the book title. It is never a chapter.
//! 2. A `Main Matter` marker (as a heading or a bare line) ends front matter
//!    immediately. The marker line itself is dropped from the output.
//! 3. Otherwise the first heading that is not a recognized front-matter name
//!    ("Dedication", "Foreword", ...) starts main matter.
//! 4. If every heading is a recognized name, everything stays front matter.
//!
//! Matter only ever moves forward: nothing after the boundary can return to
//! front matter. Classification never fails; input it cannot make sense of
//! is treated as all front matter.

use crate::locale::LocaleTable;
use crate::markup::{self, FenceTracker, HeadingSyntax};
use serde::Serialize;

/// Text of the explicit front/main separator.
pub const MAIN_MATTER_MARKER: &str = "main matter";

/// How the boundary was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoundaryKind {
    /// Only a title heading; content passes through unmodified.
    TitleOnly,
    /// A `Main Matter` marker was found.
    ExplicitMarker,
    /// The first unrecognized heading starts main matter.
    FirstChapter,
    /// Only recognized front-matter headings; boundary after the last one.
    AfterFrontMatter,
    /// No headings at all; everything is front matter.
    EndOfContent,
}

/// Where main matter begins inside the front-matter blob.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatterBoundary {
    pub kind: BoundaryKind,
    /// Line of the book title heading
    pub title_line: Option<usize>,
    /// Line of the `Main Matter` marker, dropped from output
    pub marker_line: Option<usize>,
    /// First line of main matter; equals the line count when there is none
    pub main_start: usize,
    /// Recognized front-matter heading lines before the boundary
    pub front_headings: Vec<usize>,
}

impl MatterBoundary {
    /// Whether any main matter was found in the blob.
    pub fn has_main_matter(&self) -> bool {
        matches!(
            self.kind,
            BoundaryKind::ExplicitMarker | BoundaryKind::FirstChapter
        )
    }
}

/// Front-matter blob split at the boundary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatterSplit {
    pub front: String,
    pub main: String,
}

enum Landmark {
    Heading,
    Marker,
}

fn is_marker(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case(MAIN_MATTER_MARKER)
}

/// Find the front/main boundary in a front-matter blob.
pub fn classify_front_matter(text: &str, locale: &LocaleTable) -> MatterBoundary {
    let line_count = text.lines().count();
    let mut fences = FenceTracker::default();
    let landmarks: Vec<(usize, String, Landmark)> = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !fences.is_code(line))
        .filter_map(|(idx, line)| match markup::parse_heading(line) {
            Some((1, heading, HeadingSyntax::Markdown)) => {
                Some((idx, heading, Landmark::Heading))
            }
            Some(_) => None,
            None if is_marker(line) => Some((idx, line.trim().to_string(), Landmark::Marker)),
            None => None,
        })
        .collect();

    let mut title_line = None;
    let mut front_headings = Vec::new();

    for (line, heading, landmark) in &landmarks {
        if matches!(landmark, Landmark::Marker) || is_marker(heading) {
            log::debug!("explicit main matter marker at line {}", line);
            return MatterBoundary {
                kind: BoundaryKind::ExplicitMarker,
                title_line,
                marker_line: Some(*line),
                main_start: line + 1,
                front_headings,
            };
        }
        if title_line.is_none() {
            title_line = Some(*line);
            continue;
        }
        if locale.is_front_matter_name(heading) {
            front_headings.push(*line);
            continue;
        }
        log::debug!("main matter starts at line {} ('{}')", line, heading);
        return MatterBoundary {
            kind: BoundaryKind::FirstChapter,
            title_line,
            marker_line: None,
            main_start: *line,
            front_headings,
        };
    }

    let kind = match (title_line, front_headings.is_empty()) {
        (_, false) => BoundaryKind::AfterFrontMatter,
        (Some(_), true) => BoundaryKind::TitleOnly,
        (None, true) => BoundaryKind::EndOfContent,
    };
    MatterBoundary {
        kind,
        title_line,
        marker_line: None,
        main_start: line_count,
        front_headings,
    }
}

/// Split a front-matter blob at its boundary, dropping any marker line.
pub fn split_front_matter(text: &str, boundary: &MatterBoundary) -> FrontMatterSplit {
    let lines: Vec<&str> = text.lines().collect();
    let front_end = boundary
        .marker_line
        .unwrap_or(boundary.main_start)
        .min(lines.len());
    let main_start = boundary.main_start.min(lines.len());
    FrontMatterSplit {
        front: lines[..front_end].join("\n"),
        main: lines[main_start..].join("\n"),
    }
}
