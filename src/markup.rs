//! Line-level recognizers shared by the classifier, the heading transformer,
//! the page estimator and the bibliography detector.
//!
//! Assembled markup mixes two heading syntaxes: Markdown ATX headings written
//! by authors (`## Notes`) and the LaTeX sectioning directives the heading
//! transformer emits (`\chapter*{Notes}`). Everything downstream of the
//! transformer must see both as headings, so recognition lives here.
//!
//! Lines inside fenced code blocks are never headings.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// ATX heading with optional closing sequence: `## Title ##`
    static ref RE_ATX_HEADING: Regex =
        Regex::new(r"^ {0,3}(#{1,6})(?:[ \t]+(.*?))?(?:[ \t]+#+)?[ \t]*$").unwrap();

    /// Sectioning directive, starred or not: `\chapter*{Title}`
    static ref RE_DIRECTIVE_HEADING: Regex =
        Regex::new(r"^\\(part|chapter|section|subsection|subsubsection)\*?\{(.*)\}\s*$").unwrap();

    /// Any line consisting of a single LaTeX command we emit or pass through.
    static ref RE_DIRECTIVE_LINE: Regex =
        Regex::new(r"^\\[A-Za-z]+\*?(\{.*\}|\[.*\])*\s*$").unwrap();

    /// Opening or closing code fence.
    static ref RE_FENCE: Regex = Regex::new(r"^ {0,3}(`{3,}|~{3,})").unwrap();
}

/// Which syntax a heading line was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingSyntax {
    Markdown,
    Directive,
}

/// A heading found at a specific line.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingLine {
    /// Zero-based line index
    pub line: usize,
    /// 1 for chapters/parts, 2 for sections, and so on
    pub level: u8,
    /// Heading text, trimmed
    pub text: String,
    pub syntax: HeadingSyntax,
}

/// Recognize a single line as a heading.
pub fn parse_heading(line: &str) -> Option<(u8, String, HeadingSyntax)> {
    if let Some(caps) = RE_ATX_HEADING.captures(line) {
        let level = caps[1].len() as u8;
        let text = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
        return Some((level, text.to_string(), HeadingSyntax::Markdown));
    }
    if let Some(caps) = RE_DIRECTIVE_HEADING.captures(line) {
        let level = match &caps[1] {
            "part" | "chapter" => 1,
            "section" => 2,
            "subsection" => 3,
            _ => 4,
        };
        let text = unescape_latex(caps[2].trim());
        return Some((level, text, HeadingSyntax::Directive));
    }
    None
}

/// Whether the line is a bare LaTeX command such as `\mainmatter` or
/// `\addcontentsline{toc}{chapter}{Notes}`.
pub fn is_directive_line(line: &str) -> bool {
    RE_DIRECTIVE_LINE.is_match(line.trim_end())
}

/// Tracks fenced code blocks while walking lines in order.
#[derive(Debug, Default)]
pub struct FenceTracker {
    open: Option<(char, usize)>,
}

impl FenceTracker {
    /// Feed the next line; returns `true` when the line is code (a fence
    /// line itself or anything between fences).
    pub fn is_code(&mut self, line: &str) -> bool {
        let fence = RE_FENCE
            .captures(line)
            .map(|caps| {
                let run = &caps[1];
                (run.chars().next().unwrap_or('`'), run.len())
            });
        match (self.open, fence) {
            (None, Some(f)) => {
                self.open = Some(f);
                true
            }
            (Some((c, n)), Some((fc, fn_len))) if c == fc && fn_len >= n => {
                self.open = None;
                true
            }
            (Some(_), _) => true,
            (None, None) => false,
        }
    }
}

/// All headings outside code fences, in document order.
pub fn headings(text: &str) -> Vec<HeadingLine> {
    let mut fences = FenceTracker::default();
    text.lines()
        .enumerate()
        .filter(|(_, line)| !fences.is_code(line))
        .filter_map(|(idx, line)| {
            parse_heading(line).map(|(level, text, syntax)| HeadingLine {
                line: idx,
                level,
                text,
                syntax,
            })
        })
        .collect()
}

/// Escape text for use inside a LaTeX command argument.
pub fn escape_latex(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '{' | '}' | '&' | '%' | '$' | '#' | '_' => {
                out.push('\\');
                out.push(c);
            }
            '^' => out.push_str("\\textasciicircum{}"),
            '~' => out.push_str("\\textasciitilde{}"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverse of [`escape_latex`], used when reading directive headings back.
pub fn unescape_latex(text: &str) -> String {
    text.replace("\\textbackslash{}", "\\")
        .replace("\\textasciicircum{}", "^")
        .replace("\\textasciitilde{}", "~")
        .replace("\\{", "{")
        .replace("\\}", "}")
        .replace("\\&", "&")
        .replace("\\%", "%")
        .replace("\\$", "$")
        .replace("\\#", "#")
        .replace("\\_", "_")
}
