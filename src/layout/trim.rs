//! Trim-size table: physical page dimensions and per-family minimums.
//!
//! Print-on-demand services publish a fixed list of trim sizes. Each size
//! belongs to a family (small, standard, large) that decides how dense the
//! text is set and how generous the non-binding margins are.

use super::LayoutError;
use std::collections::BTreeMap;

/// Families of trim sizes sharing density and margin minimums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrimFamily {
    /// Pocket and mass-market sizes, up to 5.5in wide
    Small,
    /// Trade paperback sizes, up to 6.69in wide
    Standard,
    /// Textbook and workbook sizes
    Large,
}

impl TrimFamily {
    /// Family for a page width in inches.
    pub fn for_width(width: f64) -> Self {
        if width <= 5.5 {
            TrimFamily::Small
        } else if width <= 6.69 {
            TrimFamily::Standard
        } else {
            TrimFamily::Large
        }
    }

    /// Average words that fit on one page of this family.
    pub fn words_per_page(self) -> u32 {
        match self {
            TrimFamily::Small => 250,
            TrimFamily::Standard => 300,
            TrimFamily::Large => 400,
        }
    }

    /// Minimum outside, top and bottom margins in inches.
    pub fn minimum_margins(self) -> FamilyMargins {
        match self {
            TrimFamily::Small => FamilyMargins {
                outside: 0.5,
                top: 0.6,
                bottom: 0.6,
            },
            TrimFamily::Standard => FamilyMargins {
                outside: 0.6,
                top: 0.75,
                bottom: 0.75,
            },
            TrimFamily::Large => FamilyMargins {
                outside: 0.75,
                top: 0.875,
                bottom: 0.875,
            },
        }
    }
}

/// Non-binding margin minimums for a family, in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FamilyMargins {
    pub outside: f64,
    pub top: f64,
    pub bottom: f64,
}

/// A resolved trim size.
#[derive(Debug, Clone, PartialEq)]
pub struct TrimSize {
    /// Name as requested, e.g. `"6x9"`
    pub name: String,
    pub width: f64,
    pub height: f64,
    pub family: TrimFamily,
}

/// Lookup table from trim-size name to dimensions.
///
/// Names not in the table are accepted when they spell out dimensions
/// (`"5.06x7.81"`), so custom sizes work without editing the table.
#[derive(Debug, Clone)]
pub struct TrimTable {
    sizes: BTreeMap<String, (f64, f64)>,
}

impl TrimTable {
    pub fn new(sizes: BTreeMap<String, (f64, f64)>) -> Self {
        Self { sizes }
    }

    /// Common print-on-demand trim sizes in inches.
    pub fn standard() -> Self {
        let sizes = [
            ("5x8", (5.0, 8.0)),
            ("5.25x8", (5.25, 8.0)),
            ("5.5x8.5", (5.5, 8.5)),
            ("6x9", (6.0, 9.0)),
            ("6.14x9.21", (6.14, 9.21)),
            ("6.69x9.61", (6.69, 9.61)),
            ("7x10", (7.0, 10.0)),
            ("7.5x9.25", (7.5, 9.25)),
            ("8x10", (8.0, 10.0)),
            ("8.5x11", (8.5, 11.0)),
        ];
        Self::new(
            sizes
                .into_iter()
                .map(|(name, dims)| (name.to_string(), dims))
                .collect(),
        )
    }

    /// Resolve a trim-size name.
    pub fn lookup(&self, name: &str) -> Result<TrimSize, LayoutError> {
        let key = name
            .to_lowercase()
            .replace(' ', "")
            .replace('×', "x")
            .replace("in", "");
        let (width, height) = match self.sizes.get(&key) {
            Some(&dims) => dims,
            None => parse_dimensions(&key)
                .ok_or_else(|| LayoutError::UnknownTrimSize(name.to_string()))?,
        };
        Ok(TrimSize {
            name: name.trim().to_string(),
            width,
            height,
            family: TrimFamily::for_width(width),
        })
    }

    /// Names of all tabulated sizes.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sizes.keys().map(String::as_str)
    }
}

impl Default for TrimTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Parse `"WxH"` with positive dimensions.
fn parse_dimensions(key: &str) -> Option<(f64, f64)> {
    let (w, h) = key.split_once('x')?;
    let width: f64 = w.parse().ok()?;
    let height: f64 = h.parse().ok()?;
    (width > 0.0 && height > 0.0 && width.is_finite() && height.is_finite())
        .then_some((width, height))
}
