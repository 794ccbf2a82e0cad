//! Page-count estimation from raw content volume.
//!
//! The binding margin depends on the page count, and the page count depends
//! on the layout. We break the cycle with a single forward pass: estimate the
//! pages from content volume first, then pick margins once. The estimate is
//! never corrected against the page count the renderer eventually produces.
//!
//! ```text
//! base      = ceil(words / words_per_page)
//! + 4                               front matter (title, copyright, ...)
//! + ceil(running_total / 15)        table of contents, when enabled
//! + images                          one page per embedded image
//! + floor(chapters / 2)             chapter-break overhead
//! floored at 24 pages
//! ```

use super::trim::TrimSize;
use crate::markup::{self, FenceTracker};
use pulldown_cmark::{Event, Parser, Tag};
use serde::Serialize;

/// Pages reserved for title page, copyright page and similar.
pub const FRONT_MATTER_PAGES: u32 = 4;
/// Table-of-contents page per this many content pages.
pub const PAGES_PER_TOC_PAGE: u32 = 15;
/// Smallest page count any estimate reports.
pub const MINIMUM_PAGES: u32 = 24;

/// Estimated rendered page count, always at least [`MINIMUM_PAGES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PageEstimate(u32);

impl PageEstimate {
    /// Wrap a raw count, applying the floor.
    pub fn new(pages: u32) -> Self {
        Self(pages.max(MINIMUM_PAGES))
    }

    pub fn pages(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for PageEstimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Content volume measured from markup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ContentStats {
    pub words: u32,
    pub images: u32,
    pub chapters: u32,
}

impl ContentStats {
    /// Measure assembled markup.
    ///
    /// Raw directive lines are dropped before word counting; chapter-level
    /// headings count in either syntax; images count as Markdown images or
    /// `\includegraphics` commands.
    pub fn from_markup(text: &str) -> Self {
        let mut chapters = 0u32;
        let mut latex_images = 0u32;
        let mut prose = String::with_capacity(text.len());
        let mut fences = FenceTracker::default();

        for line in text.lines() {
            let in_code = fences.is_code(line);
            if !in_code && line.contains("\\includegraphics") {
                latex_images += line.matches("\\includegraphics").count() as u32;
            }
            if !in_code
                && let Some((1, _, markup::HeadingSyntax::Directive)) = markup::parse_heading(line)
            {
                chapters += 1;
                continue;
            }
            if !in_code && markup::is_directive_line(line) {
                continue;
            }
            prose.push_str(line);
            prose.push('\n');
        }

        let mut words = 0u32;
        let mut images = 0u32;
        for event in Parser::new(&prose) {
            match event {
                Event::Text(text) | Event::Code(text) => {
                    words += text.split_whitespace().count() as u32;
                }
                Event::Start(Tag::Image { .. }) => images += 1,
                Event::Start(Tag::Heading { level, .. })
                    if level == pulldown_cmark::HeadingLevel::H1 =>
                {
                    chapters += 1;
                }
                _ => {}
            }
        }

        Self {
            words,
            images: images + latex_images,
            chapters,
        }
    }
}

/// Estimate the page count of assembled markup.
pub fn estimate_page_count(content: &str, trim: &TrimSize, include_toc: bool) -> PageEstimate {
    estimate_from_stats(&ContentStats::from_markup(content), trim, include_toc)
}

/// Estimate the page count from already-measured content.
pub fn estimate_from_stats(stats: &ContentStats, trim: &TrimSize, include_toc: bool) -> PageEstimate {
    let words_per_page = trim.family.words_per_page();
    let mut pages = stats.words.div_ceil(words_per_page);
    pages += FRONT_MATTER_PAGES;
    if include_toc {
        pages += pages.div_ceil(PAGES_PER_TOC_PAGE);
    }
    pages += stats.images;
    pages += stats.chapters / 2;

    log::debug!(
        "page estimate for {}: {} words, {} images, {} chapters -> {} pages",
        trim.name,
        stats.words,
        stats.images,
        stats.chapters,
        pages
    );
    PageEstimate::new(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::TrimTable;

    fn six_by_nine() -> TrimSize {
        TrimTable::standard().lookup("6x9").unwrap()
    }

    #[test]
    fn worked_example_six_by_nine() {
        // ceil(9000/300) + 4 + ceil(34/15) + 0 + floor(10/2) = 30 + 4 + 3 + 0 + 5
        let stats = ContentStats {
            words: 9_000,
            images: 0,
            chapters: 10,
        };
        assert_eq!(estimate_from_stats(&stats, &six_by_nine(), true).pages(), 42);
    }

    #[test]
    fn toc_disabled_skips_toc_pages() {
        let stats = ContentStats {
            words: 9_000,
            images: 0,
            chapters: 10,
        };
        assert_eq!(estimate_from_stats(&stats, &six_by_nine(), false).pages(), 39);
    }

    #[test]
    fn images_add_one_page_each() {
        let stats = ContentStats {
            words: 30_000,
            images: 7,
            chapters: 0,
        };
        // 100 + 4 + 0 + 7
        assert_eq!(estimate_from_stats(&stats, &six_by_nine(), false).pages(), 111);
    }

    #[test]
    fn short_books_floor_at_minimum() {
        let stats = ContentStats {
            words: 500,
            images: 0,
            chapters: 1,
        };
        assert_eq!(estimate_from_stats(&stats, &six_by_nine(), true).pages(), MINIMUM_PAGES);
        assert_eq!(PageEstimate::new(3).pages(), MINIMUM_PAGES);
    }

    #[test]
    fn small_trims_need_more_pages() {
        let table = TrimTable::standard();
        let stats = ContentStats {
            words: 60_000,
            images: 0,
            chapters: 0,
        };
        let small = estimate_from_stats(&stats, &table.lookup("5x8").unwrap(), false);
        let large = estimate_from_stats(&stats, &table.lookup("8.5x11").unwrap(), false);
        assert_eq!(small.pages(), 244);
        assert_eq!(large.pages(), 154);
    }

    #[test]
    fn stats_count_words_images_and_both_heading_syntaxes() {
        let markup = "\\frontmatter\n\
                      \\chapter*{Foreword}\n\
                      \\addcontentsline{toc}{chapter}{Foreword}\n\
                      One two three.\n\n\
                      # Second\n\n\
                      Four five ![a figure](fig.png) six.\n\n\
                      \\includegraphics{map.pdf}\n";
        let stats = ContentStats::from_markup(markup);
        assert_eq!(stats.chapters, 2);
        assert_eq!(stats.images, 2);
        // One two three. / Second / Four five / a figure / six.
        assert_eq!(stats.words, 9);
    }

    #[test]
    fn stats_ignore_headings_in_code() {
        let markup = "```\n\\chapter{Not}\n# Not\n```\n";
        assert_eq!(ContentStats::from_markup(markup).chapters, 0);
    }
}
