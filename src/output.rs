//! CLI output formatting for scan, export and estimate results.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every entity is its semantic identity, meaning title and positional
//! index, with filesystem paths shown as secondary
//! context via indented `Source:` lines.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Front matter
//! 001 The Quiet Harbour
//!     Source: front/010-title-page.md
//!
//! Main matter
//! 001 The Harbour
//!     Source: main/010-the-harbour.md
//!
//! Drafts
//!     main/notes-to-self.md
//!
//! Config
//!     config.toml
//! ```
//!
//! ## Export
//!
//! ```text
//! Matter
//!     Front/main boundary: first-chapter
//! Chapters
//! 001 Chapter 1: The First Morning
//!     Part I: Departures (part)
//! Bibliography
//!     References (title match)
//! Layout
//!     Trim: 6x9, ~42 pages
//!     Margins: inside 0.375in, outside 0.725in, top 0.75in, bottom 1in
//!     Text block: 4.9in x 7.25in
//! Digest: 3f2a…
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions do no I/O.

use crate::assemble::Export;
use crate::bibliography::Detection;
use crate::headings::ChapterKind;
use crate::layout::{ContentStats, PageEstimate, TrimSize};
use crate::scan::Manuscript;
use crate::types::Matter;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format an entity header: positional index + title, with optional detail.
///
/// ```text
/// 001 The Harbour
/// 002 References (bibliography)
/// ```
fn entity_header(index: usize, title: &str, detail: Option<&str>) -> String {
    match detail {
        Some(d) => format!("{} {} ({})", format_index(index), title, d),
        None => format!("{} {}", format_index(index), title),
    }
}

/// Format inches without trailing zeros: `0.750` → `0.75in`.
fn inches(value: f64) -> String {
    let s = format!("{:.3}", value);
    format!("{}in", s.trim_end_matches('0').trim_end_matches('.'))
}

fn matter_heading(matter: Matter) -> &'static str {
    match matter {
        Matter::Front => "Front matter",
        Matter::Main => "Main matter",
        Matter::Back => "Back matter",
    }
}

// ============================================================================
// Scan output
// ============================================================================

/// Format scan output showing the discovered manuscript structure.
pub fn format_scan_output(manuscript: &Manuscript) -> Vec<String> {
    let mut lines = Vec::new();
    let doc = &manuscript.document;

    lines.push(format!("Book: {}", doc.metadata.title));
    if !doc.metadata.author.is_empty() {
        lines.push(format!("{}Author: {}", indent(1), doc.metadata.author));
    }

    for matter in [Matter::Front, Matter::Main, Matter::Back] {
        let sections = doc.sections_in(matter);
        if sections.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(matter_heading(matter).to_string());
        for (i, section) in sections.iter().enumerate() {
            lines.push(entity_header(i + 1, &section.title, None));
            lines.push(format!("{}Source: {}.md", indent(1), section.id));
        }
    }

    if !manuscript.drafts.is_empty() {
        lines.push(String::new());
        lines.push("Drafts".to_string());
        for draft in &manuscript.drafts {
            lines.push(format!("{}{}", indent(1), draft.display()));
        }
    }

    lines.push(String::new());
    lines.push("Config".to_string());
    if manuscript.root.join("config.toml").exists() {
        lines.push(format!("{}config.toml", indent(1)));
    } else {
        lines.push(format!("{}(stock defaults)", indent(1)));
    }

    lines
}

/// Print scan output to stdout.
pub fn print_scan_output(manuscript: &Manuscript) {
    for line in format_scan_output(manuscript) {
        println!("{}", line);
    }
}

// ============================================================================
// Export output
// ============================================================================

/// Format the result of one export.
pub fn format_export_output(export: &Export) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Matter".to_string());
    let boundary = serde_json::to_value(export.boundary.kind)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();
    lines.push(format!("{}Front/main boundary: {}", indent(1), boundary));

    let main_chapters: Vec<_> = export
        .chapters
        .iter()
        .filter(|c| c.matter == Matter::Main)
        .collect();
    if !main_chapters.is_empty() {
        lines.push("Chapters".to_string());
        let mut index = 0;
        for chapter in main_chapters {
            match chapter.kind {
                ChapterKind::PartDivider => {
                    lines.push(format!("{}{} (part)", indent(1), chapter.display));
                }
                _ => {
                    index += 1;
                    lines.push(entity_header(index, &chapter.display, None));
                }
            }
        }
    }

    if !export.bibliography.is_empty() {
        lines.push("Bibliography".to_string());
        for candidate in &export.bibliography {
            let heading = candidate.heading.as_deref().unwrap_or("(untitled)");
            let how = match &candidate.method {
                Detection::TitleMatch => "title match".to_string(),
                Detection::ContentAnalysis(b) => format!("content analysis, score {:.2}", b.total),
            };
            lines.push(format!("{}{} ({})", indent(1), heading, how));
        }
        lines.push(format!("{}URLs wrapped: {}", indent(1), export.urls_wrapped));
    }

    let g = &export.geometry;
    lines.push("Layout".to_string());
    lines.push(format!(
        "{}Trim: {}, ~{} pages",
        indent(1),
        export.trim_size,
        export.page_estimate
    ));
    lines.push(format!(
        "{}Margins: inside {}, outside {}, top {}, bottom {}",
        indent(1),
        inches(g.inside_margin),
        inches(g.outside_margin),
        inches(g.top_margin),
        inches(g.bottom_margin)
    ));
    lines.push(format!(
        "{}Text block: {} x {}",
        indent(1),
        inches(g.text_width),
        inches(g.text_height)
    ));
    for w in &g.warnings {
        lines.push(format!(
            "{}Warning: {} margin {} is below the {} minimum",
            indent(1),
            w.side,
            inches(w.actual),
            inches(w.minimum)
        ));
    }

    lines.push(format!("Digest: {}", export.digest));
    lines
}

/// Print export output to stdout.
pub fn print_export_output(export: &Export) {
    for line in format_export_output(export) {
        println!("{}", line);
    }
}

// ============================================================================
// Estimate output
// ============================================================================

/// Format a page estimate with the content volume it was computed from.
pub fn format_estimate_output(
    stats: &ContentStats,
    trim: &TrimSize,
    estimate: PageEstimate,
) -> Vec<String> {
    vec![
        format!(
            "Trim: {} ({} x {}, {} words/page)",
            trim.name,
            inches(trim.width),
            inches(trim.height),
            trim.family.words_per_page()
        ),
        format!("{}Words: {}", indent(1), stats.words),
        format!("{}Images: {}", indent(1), stats.images),
        format!("{}Chapters: {}", indent(1), stats.chapters),
        format!("Estimated pages: {}", estimate),
    ]
}

/// Print estimate output to stdout.
pub fn print_estimate_output(stats: &ContentStats, trim: &TrimSize, estimate: PageEstimate) {
    for line in format_estimate_output(stats, trim, estimate) {
        println!("{}", line);
    }
}

// ============================================================================
// Batch output
// ============================================================================

/// One line per manuscript in a batch run.
pub fn format_batch_line(index: usize, name: &str, outcome: Result<&Export, &str>) -> String {
    match outcome {
        Ok(export) => entity_header(
            index,
            name,
            Some(&format!(
                "~{} pages, {} chapters",
                export.page_estimate,
                export
                    .chapters
                    .iter()
                    .filter(|c| c.kind == ChapterKind::Numbered)
                    .count()
            )),
        ),
        Err(error) => entity_header(index, name, Some(&format!("failed: {}", error))),
    }
}
