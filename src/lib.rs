//! # Folio
//!
//! A book assembly and print layout engine. Folio takes the sections of a
//! book (front matter, chapters, back matter) and produces one markup buffer
//! for an external typesetter (Pandoc + LaTeX), plus the page geometry that
//! typesetter should use.
//!
//! # Architecture: One Pure Pipeline
//!
//! ```text
//! 1. Scan        manuscript/          →  Document       (filesystem → sections)
//! 2. Classify    front-matter blob    →  MatterBoundary (where main matter starts)
//! 3. Headings    sections             →  markup         (chapter numbering, TOC)
//! 4. Bibliography markup              →  markup         (long URLs made breakable)
//! 5. Layout      markup + trim size   →  GeometrySpec   (page estimate, margins)
//! ```
//!
//! Only the scan stage touches the filesystem. Everything after it is a pure
//! function from text to text or numbers, so unit tests exercise the engine
//! without fixtures, and independent exports can run in parallel.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Reads `front/`, `main/`, `back/` and `config.toml` into a [`types::Document`] |
//! | [`assemble`] | Runs the pipeline and lays out matter directives and the table of contents |
//! | [`classify`] | Finds the front/main boundary inside front-matter sections |
//! | [`headings`] | Rewrites headings into sectioning commands and numbers chapters |
//! | [`bibliography`] | Detects reference lists and inserts zero-width breaks into long URLs |
//! | [`layout`] | Trim sizes, page-count estimation, and margin computation |
//! | [`locale`] | Localized section names and table-of-contents titles |
//! | [`markup`] | Heading, directive and code-fence recognition shared by all stages |
//! | [`config`] | `config.toml` loading, validation, and merging over stock defaults |
//! | [`types`] | Shared types (`Section`, `Matter`, `BookOptions`, `Document`) |
//! | [`naming`] | `NNN-name` filename convention parser |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Single-Pass Geometry
//!
//! The binding margin depends on the page count, and the page count depends
//! on the margins. Folio estimates pages from content volume once, then picks
//! margins once. It never iterates to a fixed point; the estimate only has to
//! land in the right margin tier.
//!
//! ## Precision Over Recall for URLs
//!
//! Only sections that look like bibliographies get their URLs rewritten.
//! A missed reference list costs an overfull line; a false positive inserts
//! invisible characters into URLs a reader might copy out of prose.
//!
//! ## Injected Tables
//!
//! Trim sizes and localized names are plain values ([`layout::TrimTable`],
//! [`locale::Locales`]) passed into [`assemble::assemble`], not globals.
//! Tests substitute their own.
//!
//! ## Forward-Only Matter
//!
//! Classification only ever moves content forward: front → main → back.
//! Nothing after the first chapter can return to front matter, and every
//! matter directive is emitted at most once.

pub mod assemble;
pub mod bibliography;
pub mod classify;
pub mod config;
pub mod headings;
pub mod layout;
pub mod locale;
pub mod markup;
pub mod naming;
pub mod output;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
