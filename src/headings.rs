//! Heading and chapter-numbering transformation.
//!
//! Rewrites Markdown headings into LaTeX sectioning commands:
//!
//! | Input                  | Front/back matter            | Main matter                        |
//! |------------------------|------------------------------|------------------------------------|
//! | `# Title`              | `\chapter*` + TOC entry      | numbered chapter (see below)       |
//! | `# Part II: The Sea`   | `\chapter*` + TOC entry      | `\chapter*` + TOC entry, no number |
//! | `## Title`             | `\section*`                  | `\section` or `\section*`          |
//! | `### ...` and deeper   | unchanged                    | unchanged                          |
//!
//! ## Numbering
//!
//! One [`HeadingTransformer`] is used for the whole book, so there is a
//! single chapter counter across all of main matter. The counter starts at 1
//! at the first main-matter chapter and increments once per chapter heading.
//! Numbers typed by the author (`# Chapter 3: The Storm`) are stripped and
//! replaced, which keeps the sequence contiguous even when the author's
//! numbering isn't. Part dividers never touch the counter.
//!
//! Labels follow [`ChapterLabelFormat`]: `Chapter 4` (number), `Chapter Four`
//! (text), or no label at all (none). With `use_auto_chapter_numbers` and the
//! number format, the renderer's own `\chapter` counter prints the number;
//! since every other chapter-level heading we emit is starred, the renderer
//! counts in lockstep with ours.

use crate::locale::LocaleTable;
use crate::markup::{self, FenceTracker, HeadingSyntax, escape_latex};
use crate::types::{BookOptions, ChapterLabelFormat, Matter};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

const NUMBER_WORDS: &str = "one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve|thirteen|fourteen|fifteen|sixteen|seventeen|eighteen|nineteen|twenty|thirty|forty|fifty|sixty|seventy|eighty|ninety";

lazy_static! {
    /// `Part IV: Title`
    static ref RE_PART_DIVIDER: Regex =
        Regex::new(r"^(?i:part)\s+([IVXLCDM]+)\s*:\s*(.*\S)\s*$").unwrap();

    /// Author-typed chapter label: `Chapter 3:`, `Ch. Twenty-One -`, `Kapitel 2.`
    static ref RE_CHAPTER_LABEL: Regex = Regex::new(&format!(
        r"^(?i)(?:chapter|ch\.?|kapitel|chapitre|cap[ií]tulo|capitolo|hoofdstuk)\s+(?:\d+|[ivxlcdm]+|(?:{NUMBER_WORDS})(?:-(?:{NUMBER_WORDS}))?)\b\s*[:.\-–—]?\s*"
    ))
    .unwrap();

    /// Bare leading number: `3. Title`, `12) Title`, `IV. Title`
    static ref RE_LEADING_NUMBER: Regex =
        Regex::new(r"^(?:\d+\s*[.:)\-–—]|[IVXLCDM]+\.)\s+").unwrap();
}

/// Numbering and labelling rules for one export.
#[derive(Debug, Clone)]
pub struct NumberingPolicy {
    pub numbered_headings: bool,
    pub chapter_label_format: ChapterLabelFormat,
    pub use_auto_chapter_numbers: bool,
    /// Deepest level that gets table-of-contents entries
    pub toc_depth: u8,
    /// Localized word for labels, e.g. "Chapter"
    pub chapter_word: String,
    /// Whether numbers may be spelled out in English
    pub number_words: bool,
}

impl NumberingPolicy {
    pub fn from_options(options: &BookOptions, locale: &LocaleTable) -> Self {
        Self {
            numbered_headings: options.numbered_headings,
            chapter_label_format: options.chapter_label_format,
            use_auto_chapter_numbers: options.use_auto_chapter_numbers,
            toc_depth: options.toc_depth,
            chapter_word: locale.chapter_word.clone(),
            number_words: locale.number_words,
        }
    }

    fn numbers_chapters(&self) -> bool {
        self.numbered_headings && self.chapter_label_format != ChapterLabelFormat::None
    }

    fn renderer_numbers(&self) -> bool {
        self.numbers_chapters()
            && self.use_auto_chapter_numbers
            && self.chapter_label_format == ChapterLabelFormat::Number
    }

    fn label(&self, number: u32) -> String {
        let number = match self.chapter_label_format {
            ChapterLabelFormat::Text if self.number_words => number_to_words(number),
            _ => number.to_string(),
        };
        format!("{} {}", self.chapter_word, number)
    }
}

/// What kind of chapter-level entry a heading became.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChapterKind {
    Numbered,
    Unnumbered,
    PartDivider,
}

/// A chapter-level entry emitted by the transformer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChapterEntry {
    pub matter: Matter,
    pub kind: ChapterKind,
    pub number: Option<u32>,
    /// Full heading as displayed, e.g. "Chapter 2: The Storm"
    pub display: String,
    /// Title with any author numbering removed
    pub title: String,
}

/// Stateful heading rewriter; carries the chapter counter between blocks.
#[derive(Debug)]
pub struct HeadingTransformer {
    policy: NumberingPolicy,
    counter: u32,
    chapters: Vec<ChapterEntry>,
}

impl HeadingTransformer {
    pub fn new(policy: NumberingPolicy) -> Self {
        Self {
            policy,
            counter: 0,
            chapters: Vec::new(),
        }
    }

    /// Chapter-level entries emitted so far, in order.
    pub fn chapters(&self) -> &[ChapterEntry] {
        &self.chapters
    }

    /// Consume the transformer, keeping only its entries.
    pub fn into_chapters(self) -> Vec<ChapterEntry> {
        self.chapters
    }

    /// Rewrite the headings of one block of content.
    ///
    /// `title_line` is a line (zero-based) to leave verbatim, used for the book
    /// title inside front matter. Line endings are preserved.
    pub fn transform(&mut self, text: &str, matter: Matter, title_line: Option<usize>) -> String {
        let mut out = String::with_capacity(text.len() + 64);
        let mut fences = FenceTracker::default();

        for (idx, piece) in text.split_inclusive('\n').enumerate() {
            let line = piece.trim_end_matches(['\n', '\r']);
            let ending = &piece[line.len()..];
            if fences.is_code(line) || Some(idx) == title_line {
                out.push_str(piece);
                continue;
            }
            let rewritten = match markup::parse_heading(line) {
                Some((1, heading, HeadingSyntax::Markdown)) => Some(self.chapter(&heading, matter)),
                Some((2, heading, HeadingSyntax::Markdown)) => Some(self.section(&heading, matter)),
                _ => None,
            };
            match rewritten {
                Some(replacement) => {
                    out.push_str(&replacement);
                    out.push_str(ending);
                }
                None => out.push_str(piece),
            }
        }
        out
    }

    fn chapter(&mut self, heading: &str, matter: Matter) -> String {
        if matter == Matter::Main
            && let Some(caps) = RE_PART_DIVIDER.captures(heading)
        {
            let display = format!("Part {}: {}", &caps[1], &caps[2]);
            self.chapters.push(ChapterEntry {
                matter,
                kind: ChapterKind::PartDivider,
                number: None,
                display: display.clone(),
                title: caps[2].to_string(),
            });
            return starred_chapter(&display);
        }

        if matter != Matter::Main || !self.policy.numbers_chapters() {
            self.chapters.push(ChapterEntry {
                matter,
                kind: ChapterKind::Unnumbered,
                number: None,
                display: heading.to_string(),
                title: heading.to_string(),
            });
            return starred_chapter(heading);
        }

        self.counter += 1;
        let number = self.counter;
        let title = strip_author_numbering(heading);
        let label = self.policy.label(number);
        let display = if title.is_empty() {
            label
        } else {
            format!("{label}: {title}")
        };
        log::debug!("chapter {} '{}'", number, title);
        self.chapters.push(ChapterEntry {
            matter,
            kind: ChapterKind::Numbered,
            number: Some(number),
            display: display.clone(),
            title: title.clone(),
        });

        if self.policy.renderer_numbers() {
            format!("\\chapter{{{}}}", escape_latex(&title))
        } else {
            starred_chapter(&display)
        }
    }

    fn section(&self, heading: &str, matter: Matter) -> String {
        let title = escape_latex(heading);
        if matter == Matter::Main && self.policy.renderer_numbers() {
            return format!("\\section{{{title}}}");
        }
        if self.policy.toc_depth >= 2 {
            format!("\\section*{{{title}}}\n\\addcontentsline{{toc}}{{section}}{{{title}}}")
        } else {
            format!("\\section*{{{title}}}")
        }
    }
}

/// Unnumbered chapter that still appears in the table of contents.
fn starred_chapter(display: &str) -> String {
    let title = escape_latex(display);
    format!("\\chapter*{{{title}}}\n\\addcontentsline{{toc}}{{chapter}}{{{title}}}")
}

/// Remove author-typed chapter numbering from a heading.
///
/// `"Chapter 3: The Storm"` → `"The Storm"`, `"4. Ashore"` → `"Ashore"`.
pub fn strip_author_numbering(heading: &str) -> String {
    let stripped = RE_CHAPTER_LABEL.replace(heading.trim(), "");
    let stripped = RE_LEADING_NUMBER.replace(&stripped, "");
    stripped.trim().to_string()
}

/// Spell out 1–99 in English; larger numbers stay numerals.
pub fn number_to_words(n: u32) -> String {
    const ONES: [&str; 20] = [
        "Zero", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine", "Ten",
        "Eleven", "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen", "Eighteen",
        "Nineteen",
    ];
    const TENS: [&str; 10] = [
        "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
    ];
    match n {
        0..=19 => ONES[n as usize].to_string(),
        20..=99 if n % 10 == 0 => TENS[(n / 10) as usize].to_string(),
        20..=99 => format!("{}-{}", TENS[(n / 10) as usize], ONES[(n % 10) as usize]),
        _ => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::Locales;

    fn policy(format: ChapterLabelFormat) -> NumberingPolicy {
        let options = BookOptions {
            chapter_label_format: format,
            ..Default::default()
        };
        NumberingPolicy::from_options(&options, Locales::builtin().table("en"))
    }

    fn numbers(chapters: &[ChapterEntry]) -> Vec<u32> {
        chapters.iter().filter_map(|c| c.number).collect()
    }

    #[test]
    fn main_chapters_are_numbered_from_one() {
        let mut t = HeadingTransformer::new(policy(ChapterLabelFormat::Number));
        let out = t.transform("# The Storm\ntext\n# Ashore\n", Matter::Main, None);
        assert_eq!(
            out,
            "\\chapter*{Chapter 1: The Storm}\n\\addcontentsline{toc}{chapter}{Chapter 1: The Storm}\ntext\n\
             \\chapter*{Chapter 2: Ashore}\n\\addcontentsline{toc}{chapter}{Chapter 2: Ashore}\n"
        );
    }

    #[test]
    fn author_numbers_are_replaced_not_trusted() {
        let mut t = HeadingTransformer::new(policy(ChapterLabelFormat::Number));
        t.transform(
            "# Chapter 3: The Storm\n# Chapter Seven - Ashore\n# 12. Night\n# Chapter 1\n",
            Matter::Main,
            None,
        );
        assert_eq!(numbers(t.chapters()), vec![1, 2, 3, 4]);
        let titles: Vec<&str> = t.chapters().iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["The Storm", "Ashore", "Night", ""]);
        assert_eq!(t.chapters()[3].display, "Chapter 4");
    }

    #[test]
    fn part_dividers_do_not_break_the_sequence() {
        let mut t = HeadingTransformer::new(policy(ChapterLabelFormat::Number));
        let out = t.transform(
            "# Part I: Departure\n# One\n# Two\n# Part II: Return\n# Three\n",
            Matter::Main,
            None,
        );
        assert_eq!(numbers(t.chapters()), vec![1, 2, 3]);
        let parts = t
            .chapters()
            .iter()
            .filter(|c| c.kind == ChapterKind::PartDivider)
            .count();
        assert_eq!(parts, 2);
        assert!(out.starts_with(
            "\\chapter*{Part I: Departure}\n\\addcontentsline{toc}{chapter}{Part I: Departure}"
        ));
    }

    #[test]
    fn counter_spans_multiple_blocks() {
        let mut t = HeadingTransformer::new(policy(ChapterLabelFormat::Number));
        t.transform("# A\n", Matter::Main, None);
        t.transform("# B\n# Part III: Later\n", Matter::Main, None);
        t.transform("# C\n", Matter::Main, None);
        assert_eq!(numbers(t.chapters()), vec![1, 2, 3]);
    }

    #[test]
    fn front_and_back_matter_are_unnumbered_with_toc_entries() {
        let mut t = HeadingTransformer::new(policy(ChapterLabelFormat::Number));
        let front = t.transform("# Book\n# Foreword\n", Matter::Front, Some(0));
        assert_eq!(
            front,
            "# Book\n\\chapter*{Foreword}\n\\addcontentsline{toc}{chapter}{Foreword}\n"
        );
        t.transform("# Chapter 9: Start\n", Matter::Main, None);
        let back = t.transform("# Appendix: Part I: Tables\n", Matter::Back, None);
        assert!(back.starts_with("\\chapter*{Appendix: Part I: Tables}"));
        assert_eq!(numbers(t.chapters()), vec![1]);
    }

    #[test]
    fn title_only_front_matter_is_untouched() {
        let mut t = HeadingTransformer::new(policy(ChapterLabelFormat::Number));
        let text = "# The Quiet Sea\r\n\r\nA novel.\r\n";
        assert_eq!(t.transform(text, Matter::Front, Some(0)), text);
        assert!(t.chapters().is_empty());
    }

    #[test]
    fn text_labels_spell_numbers() {
        let mut t = HeadingTransformer::new(policy(ChapterLabelFormat::Text));
        let out = t.transform("# Arrival\n", Matter::Main, None);
        assert!(out.starts_with("\\chapter*{Chapter One: Arrival}"));
    }

    #[test]
    fn none_format_leaves_chapters_unnumbered() {
        let mut t = HeadingTransformer::new(policy(ChapterLabelFormat::None));
        let out = t.transform("# Chapter 2: Arrival\n", Matter::Main, None);
        assert!(out.starts_with("\\chapter*{Chapter 2: Arrival}"));
        assert_eq!(t.chapters()[0].kind, ChapterKind::Unnumbered);
        assert!(numbers(t.chapters()).is_empty());
    }

    #[test]
    fn auto_numbers_hand_counting_to_renderer() {
        let mut p = policy(ChapterLabelFormat::Number);
        p.use_auto_chapter_numbers = true;
        let mut t = HeadingTransformer::new(p);
        let out = t.transform("# Chapter 5: Q&A\n## Setup\n", Matter::Main, None);
        assert_eq!(out, "\\chapter{Q\\&A}\n\\section{Setup}\n");
        assert_eq!(numbers(t.chapters()), vec![1]);
    }

    #[test]
    fn sections_get_toc_entries_only_when_deep_enough() {
        let mut p = policy(ChapterLabelFormat::Number);
        let mut t = HeadingTransformer::new(p.clone());
        assert_eq!(t.transform("## Setup", Matter::Main, None), "\\section*{Setup}");
        p.toc_depth = 2;
        let mut t = HeadingTransformer::new(p);
        assert_eq!(
            t.transform("## Setup", Matter::Front, None),
            "\\section*{Setup}\n\\addcontentsline{toc}{section}{Setup}"
        );
    }

    #[test]
    fn deeper_headings_and_code_are_untouched() {
        let mut t = HeadingTransformer::new(policy(ChapterLabelFormat::Number));
        let text = "### Small\n```\n# code\n```\n";
        assert_eq!(t.transform(text, Matter::Main, None), text);
    }

    #[test]
    fn localized_chapter_word() {
        let options = BookOptions {
            chapter_label_format: ChapterLabelFormat::Text,
            ..Default::default()
        };
        let p = NumberingPolicy::from_options(&options, Locales::builtin().table("de"));
        let mut t = HeadingTransformer::new(p);
        let out = t.transform("# Kapitel 4: Anfang\n", Matter::Main, None);
        assert!(out.starts_with("\\chapter*{Kapitel 1: Anfang}"));
    }

    #[test]
    fn strip_numbering_variants() {
        assert_eq!(strip_author_numbering("Chapter Twenty-One: End"), "End");
        assert_eq!(strip_author_numbering("Ch. 3 – Rain"), "Rain");
        assert_eq!(strip_author_numbering("IV. Winter"), "Winter");
        assert_eq!(strip_author_numbering("Chapters of Life"), "Chapters of Life");
        assert_eq!(strip_author_numbering("1984 Revisited"), "1984 Revisited");
    }

    #[test]
    fn words() {
        assert_eq!(number_to_words(7), "Seven");
        assert_eq!(number_to_words(40), "Forty");
        assert_eq!(number_to_words(42), "Forty-Two");
        assert_eq!(number_to_words(120), "120");
    }
}
