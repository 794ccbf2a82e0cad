//! Page geometry for print-on-demand output.
//!
//! All functions here are pure: they take a trim size and content, and
//! return numbers. No I/O, no renderer.
//!
//! ```text
//! trim name ──► TrimTable::lookup ──► TrimSize
//! markup ─────► estimate_page_count ─► PageEstimate
//! TrimSize + PageEstimate ─► compute_geometry ─► GeometrySpec
//! ```

pub mod margins;
pub mod pagination;
pub mod trim;

use thiserror::Error;

pub use margins::{
    GeometrySpec, MarginOverrides, MarginSide, MarginViolation, compute_geometry,
    inside_margin_for,
};
pub use pagination::{ContentStats, PageEstimate, estimate_from_stats, estimate_page_count};
pub use trim::{TrimFamily, TrimSize, TrimTable};

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("Unknown trim size: {0}")]
    UnknownTrimSize(String),
    #[error(
        "{side} margin {actual:.3}in is below the {minimum:.3}in print-binding minimum for trim size {trim} at {pages} pages"
    )]
    MarginBelowMinimum {
        trim: String,
        pages: u32,
        side: MarginSide,
        actual: f64,
        minimum: f64,
    },
    #[error("Margins leave no text area on trim size {trim} at {pages} pages")]
    NoTextArea { trim: String, pages: u32 },
}
