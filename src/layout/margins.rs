//! Margin and text-block geometry.
//!
//! The inside (binding) margin grows with the page count: a thicker book
//! curves more into the spine, swallowing more of the inner page.
//!
//! | Pages      | Inside margin |
//! |------------|---------------|
//! | ≤ 150      | 0.375in       |
//! | 151 – 300  | 0.5in         |
//! | 301 – 500  | 0.625in       |
//! | 501 – 700  | 0.75in        |
//! | > 700      | 0.875in       |
//!
//! Outside, top and bottom margins start from the trim family's minimums,
//! which are also their print-binding floor. The bottom margin gains room
//! for the page-number footer when one is rendered, and the outside margin
//! gets a small cosmetic allowance.

use super::LayoutError;
use super::pagination::PageEstimate;
use super::trim::TrimSize;
use serde::{Deserialize, Serialize};

/// Page-count tiers and their minimum inside margins.
pub const INSIDE_MARGIN_TIERS: &[(u32, f64)] = &[(150, 0.375), (300, 0.5), (500, 0.625), (700, 0.75)];
/// Inside margin beyond the last tier.
pub const INSIDE_MARGIN_MAX: f64 = 0.875;
/// Extra bottom margin for the page-number footer.
pub const PAGE_NUMBER_ALLOWANCE: f64 = 0.25;
/// Extra outside margin so text doesn't crowd the trim edge.
pub const OUTSIDE_ALLOWANCE: f64 = 0.125;

/// Inside margin required for a page count.
pub fn inside_margin_for(pages: u32) -> f64 {
    INSIDE_MARGIN_TIERS
        .iter()
        .find(|&&(limit, _)| pages <= limit)
        .map(|&(_, margin)| margin)
        .unwrap_or(INSIDE_MARGIN_MAX)
}

/// User-supplied margins that replace computed ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarginOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inside_margin: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outside_margin: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_margin: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottom_margin: Option<f64>,
}

/// Which margin a violation concerns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarginSide {
    Inside,
    Outside,
    Top,
    Bottom,
}

impl std::fmt::Display for MarginSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MarginSide::Inside => "inside",
            MarginSide::Outside => "outside",
            MarginSide::Top => "top",
            MarginSide::Bottom => "bottom",
        };
        f.write_str(name)
    }
}

/// A margin below the print-binding minimum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarginViolation {
    pub side: MarginSide,
    pub actual: f64,
    pub minimum: f64,
}

/// Final page geometry in inches.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeometrySpec {
    pub trim_width: f64,
    pub trim_height: f64,
    pub inside_margin: f64,
    pub outside_margin: f64,
    pub top_margin: f64,
    pub bottom_margin: f64,
    pub text_width: f64,
    pub text_height: f64,
    pub footskip: f64,
    /// Margins accepted below the floor (only when enforcement is off).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<MarginViolation>,
}

impl GeometrySpec {
    /// Render as a LaTeX `geometry` package directive.
    pub fn to_directive(&self) -> String {
        format!(
            "\\geometry{{paperwidth={}in, paperheight={}in, inner={}in, outer={}in, top={}in, bottom={}in, footskip={}in}}",
            fmt_inches(self.trim_width),
            fmt_inches(self.trim_height),
            fmt_inches(self.inside_margin),
            fmt_inches(self.outside_margin),
            fmt_inches(self.top_margin),
            fmt_inches(self.bottom_margin),
            fmt_inches(self.footskip),
        )
    }
}

/// Format inches with at most three decimals and no trailing zeros.
fn fmt_inches(value: f64) -> String {
    let s = format!("{:.3}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    s.to_string()
}

/// Compute margins and text block for a trim size and page estimate.
///
/// Margins below the print-binding floor are logged and recorded in
/// [`GeometrySpec::warnings`]; with `enforce_floor` they are an error instead.
/// A text block with no positive area is always an error.
pub fn compute_geometry(
    trim: &TrimSize,
    pages: PageEstimate,
    has_page_numbers: bool,
    overrides: &MarginOverrides,
    enforce_floor: bool,
) -> Result<GeometrySpec, LayoutError> {
    let family = trim.family.minimum_margins();
    let required_inside = inside_margin_for(pages.pages());

    let inside = overrides.inside_margin.unwrap_or(required_inside);
    let outside = overrides
        .outside_margin
        .unwrap_or(family.outside + OUTSIDE_ALLOWANCE);
    let top = overrides.top_margin.unwrap_or(family.top);
    let bottom = overrides.bottom_margin.unwrap_or(if has_page_numbers {
        family.bottom + PAGE_NUMBER_ALLOWANCE
    } else {
        family.bottom
    });

    let checks = [
        (MarginSide::Inside, inside, required_inside),
        (MarginSide::Outside, outside, family.outside),
        (MarginSide::Top, top, family.top),
        (MarginSide::Bottom, bottom, family.bottom),
    ];
    let mut warnings = Vec::new();
    for (side, actual, minimum) in checks {
        if actual + f64::EPSILON < minimum {
            if enforce_floor {
                return Err(LayoutError::MarginBelowMinimum {
                    trim: trim.name.clone(),
                    pages: pages.pages(),
                    side,
                    actual,
                    minimum,
                });
            }
            log::warn!(
                "{} margin {:.3}in is below the {:.3}in print minimum for trim {} at {} pages",
                side,
                actual,
                minimum,
                trim.name,
                pages
            );
            warnings.push(MarginViolation {
                side,
                actual,
                minimum,
            });
        }
    }

    let text_width = trim.width - inside - outside;
    let text_height = trim.height - top - bottom;
    if text_width <= 0.0 || text_height <= 0.0 {
        return Err(LayoutError::NoTextArea {
            trim: trim.name.clone(),
            pages: pages.pages(),
        });
    }

    let footskip = if has_page_numbers {
        bottom * 0.5
    } else {
        bottom * 0.25
    };

    log::debug!(
        "geometry for {} at {} pages: inner {:.3} outer {:.3} top {:.3} bottom {:.3} text {:.3}x{:.3}",
        trim.name,
        pages,
        inside,
        outside,
        top,
        bottom,
        text_width,
        text_height
    );

    Ok(GeometrySpec {
        trim_width: trim.width,
        trim_height: trim.height,
        inside_margin: inside,
        outside_margin: outside,
        top_margin: top,
        bottom_margin: bottom,
        text_width,
        text_height,
        footskip,
        warnings,
    })
}
