//! Export pipeline: sections in, typesetter-ready markup and geometry out.
//!
//! ```text
//! front sections ─► classify ─► split ─┐
//!                                      ├─► headings ─► matter directives + TOC
//! main sections ───────────────────────┤
//! back sections ───────────────────────┘
//!        ─► bibliography detection + URL wrapping
//!        ─► page estimate ─► geometry
//! ```
//!
//! Every stage is a pure function over text; the [`Document`] is only
//! borrowed. Exports for different documents share nothing but the
//! read-only [`Locales`] and [`TrimTable`], so they can run in parallel.

use crate::bibliography::{self, BibliographyCandidate};
use crate::classify::{self, BoundaryKind, MatterBoundary};
use crate::config::EngineConfig;
use crate::headings::{ChapterEntry, HeadingTransformer, NumberingPolicy};
use crate::layout::{self, GeometrySpec, LayoutError, PageEstimate, TrimTable};
use crate::locale::{LocaleTable, Locales};
use crate::markup::{self, escape_latex};
use crate::types::{Document, Matter, Section};
use serde::Serialize;
use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssembleError {
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),
}

/// Everything one export produces.
#[derive(Debug, Clone, Serialize)]
pub struct Export {
    /// Assembled markup for the typesetter
    #[serde(skip)]
    pub markup: String,
    pub trim_size: String,
    pub geometry: GeometrySpec,
    pub page_estimate: PageEstimate,
    /// Front/main boundary found inside the front-matter sections
    pub boundary: MatterBoundary,
    pub chapters: Vec<ChapterEntry>,
    pub bibliography: Vec<BibliographyCandidate>,
    /// URLs that received break opportunities
    pub urls_wrapped: usize,
    /// SHA-256 of the markup, hex
    pub digest: String,
}

/// Assemble one document.
///
/// Options come from `document.options`; detection, URL and geometry
/// settings from `config`. Fails only when the trim size is unknown or the
/// margins cannot produce a valid page.
pub fn assemble(
    document: &Document,
    config: &EngineConfig,
    locales: &Locales,
    trims: &TrimTable,
) -> Result<Export, AssembleError> {
    let options = &document.options;
    let locale = locales.table(&options.language);
    let trim = trims.lookup(&options.trim_size)?;

    let front_blob = document
        .sections_in(Matter::Front)
        .iter()
        .map(|s| s.content.trim_end())
        .collect::<Vec<_>>()
        .join("\n\n");
    let boundary = classify::classify_front_matter(&front_blob, locale);
    let split = classify::split_front_matter(&front_blob, &boundary);
    log::debug!("front matter boundary: {:?}", boundary.kind);

    let mut transformer = HeadingTransformer::new(NumberingPolicy::from_options(options, locale));

    // A lone title block is delivered exactly as written.
    let front = if boundary.kind == BoundaryKind::TitleOnly {
        split.front.clone()
    } else {
        transformer.transform(&split.front, Matter::Front, boundary.title_line)
    };

    let mut main_blocks = Vec::new();
    if !split.main.trim().is_empty() {
        main_blocks.push(transformer.transform(&split.main, Matter::Main, None));
    }
    for section in document.sections_in(Matter::Main) {
        main_blocks.push(transformer.transform(&with_title_heading(section), Matter::Main, None));
    }

    let back_blocks: Vec<String> = document
        .sections_in(Matter::Back)
        .into_iter()
        .map(|section| transformer.transform(&with_title_heading(section), Matter::Back, None))
        .collect();

    let mut writer = MatterWriter::default();
    if !front.trim().is_empty() || options.include_toc {
        writer.open(Matter::Front);
        writer.push(&front);
        if options.include_toc {
            writer.push(&toc_block(locale, options.toc_depth));
        }
    }
    if main_blocks.iter().any(|b| !b.trim().is_empty()) {
        writer.open(Matter::Main);
        for block in &main_blocks {
            writer.push(block);
        }
    }
    if back_blocks.iter().any(|b| !b.trim().is_empty()) {
        writer.open(Matter::Back);
        for block in &back_blocks {
            writer.push(block);
        }
    }
    let markup = writer.finish();

    let titles = locales.bibliography_titles();
    let candidates =
        bibliography::detect_bibliography_sections(&markup, &titles, config.bibliography.threshold);
    let wrapped =
        bibliography::wrap_long_urls(&markup, &candidates, config.bibliography.url_wrap_length);
    let mut markup = wrapped.markup;
    let mut urls_wrapped = wrapped.wrapped;
    if config.urls.wrap_document {
        let all = bibliography::wrap_all_long_urls(&markup, config.urls.document_wrap_length);
        markup = all.markup;
        urls_wrapped += all.wrapped;
    }

    let page_estimate = layout::estimate_page_count(&markup, &trim, options.include_toc);
    let geometry = layout::compute_geometry(
        &trim,
        page_estimate,
        options.page_numbers,
        &config.geometry.overrides(),
        config.geometry.enforce_margin_floor,
    )?;

    let digest = format!("{:x}", Sha256::digest(markup.as_bytes()));
    let chapters = transformer.into_chapters();

    log::info!(
        "assembled '{}': {} chapters, {} bibliography sections, {} URLs wrapped, ~{} pages on {}",
        document.metadata.title,
        chapters
            .iter()
            .filter(|c| c.matter == Matter::Main)
            .count(),
        candidates.len(),
        urls_wrapped,
        page_estimate,
        trim.name
    );

    Ok(Export {
        markup,
        trim_size: trim.name,
        geometry,
        page_estimate,
        boundary,
        chapters,
        bibliography: candidates,
        urls_wrapped,
        digest,
    })
}

/// Section content, with `# <title>` prepended when it doesn't open with a
/// chapter-level heading.
fn with_title_heading(section: &Section) -> String {
    let opens_with_heading = section
        .content
        .lines()
        .find(|l| !l.trim().is_empty())
        .and_then(markup::parse_heading)
        .is_some_and(|(level, _, _)| level == 1);
    if opens_with_heading || section.title.trim().is_empty() {
        section.content.clone()
    } else {
        format!("# {}\n\n{}", section.title.trim(), section.content)
    }
}

/// Localized table of contents.
///
/// `toc_depth` counts chapters as level 1; LaTeX counts them as 0.
fn toc_block(locale: &LocaleTable, toc_depth: u8) -> String {
    format!(
        "\\renewcommand{{\\contentsname}}{{{}}}\n\\setcounter{{tocdepth}}{{{}}}\n\\tableofcontents",
        escape_latex(&locale.toc_title),
        i32::from(toc_depth) - 1
    )
}

/// Joins blocks and emits each matter directive once, in reading order.
#[derive(Default)]
struct MatterWriter {
    blocks: Vec<String>,
    current: Option<Matter>,
}

impl MatterWriter {
    fn open(&mut self, matter: Matter) {
        if self.current.is_some_and(|m| m >= matter) {
            return;
        }
        self.current = Some(matter);
        self.blocks.push(matter.directive().to_string());
    }

    fn push(&mut self, text: &str) {
        let text = text.trim_matches('\n');
        if !text.trim().is_empty() {
            self.blocks.push(text.to_string());
        }
    }

    fn finish(self) -> String {
        if self.blocks.is_empty() {
            return String::new();
        }
        let mut out = self.blocks.join("\n\n");
        out.push('\n');
        out
    }
}
