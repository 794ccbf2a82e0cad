//! Filename conventions for manuscript sections.
//!
//! Section files use an optional numeric prefix for ordering:
//! `010-foreword.md`, `020-a-long-night.md`. The number orders sections within
//! their matter directory; files without a number are drafts and stay out of
//! the export.
//!
//! ## Display Titles
//!
//! Dashes in the name portion become spaces when a section has no `# heading`
//! of its own:
//! - `020-a-long-night` → "a long night"
//! - `010-Foreword` → "Foreword"

/// Result of parsing a section file stem like `020-a-long-night`.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionName {
    /// Ordering number if present (`20` from `020-a-long-night`)
    pub number: Option<u32>,
    /// Name part after `NNN-`, dashes preserved. Full input when unnumbered.
    pub name: String,
    /// Name with dashes converted to spaces.
    pub display_title: String,
}

/// Parse a section file stem following the `NNN-name` convention.
///
/// - `"020-a-long-night"` → number=Some(20), name="a-long-night", display_title="a long night"
/// - `"010"` → number=Some(10), name="", display_title=""
/// - `"notes-to-self"` → number=None, name="notes-to-self", display_title="notes to self"
pub fn parse_section_name(stem: &str) -> SectionName {
    if let Some((prefix, rest)) = stem.split_once('-')
        && let Ok(number) = prefix.parse::<u32>()
    {
        return SectionName {
            number: Some(number),
            name: rest.to_string(),
            display_title: rest.replace('-', " "),
        };
    }
    if let Ok(number) = stem.parse::<u32>() {
        return SectionName {
            number: Some(number),
            name: String::new(),
            display_title: String::new(),
        };
    }
    SectionName {
        number: None,
        name: stem.to_string(),
        display_title: stem.replace('-', " "),
    }
}

/// Lowercase ASCII slug for output filenames: `"The Long Night!"` → `"the-long-night"`.
///
/// Returns `"book"` when nothing usable remains.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "book".to_string()
    } else {
        slug.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_multi_word() {
        let p = parse_section_name("020-a-long-night");
        assert_eq!(p.number, Some(20));
        assert_eq!(p.name, "a-long-night");
        assert_eq!(p.display_title, "a long night");
    }

    #[test]
    fn numbered_single_word_keeps_case() {
        let p = parse_section_name("010-Foreword");
        assert_eq!(p.number, Some(10));
        assert_eq!(p.display_title, "Foreword");
    }

    #[test]
    fn number_only() {
        let p = parse_section_name("010");
        assert_eq!(p.number, Some(10));
        assert_eq!(p.name, "");
    }

    #[test]
    fn number_with_trailing_dash() {
        let p = parse_section_name("010-");
        assert_eq!(p.number, Some(10));
        assert_eq!(p.display_title, "");
    }

    #[test]
    fn unnumbered_draft() {
        let p = parse_section_name("notes-to-self");
        assert_eq!(p.number, None);
        assert_eq!(p.display_title, "notes to self");
    }

    #[test]
    fn zero_prefix() {
        assert_eq!(parse_section_name("000-Title").number, Some(0));
    }

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("The Long Night!"), "the-long-night");
        assert_eq!(slugify("  Über -- Alles  "), "ber-alles");
    }

    #[test]
    fn slugify_empty_falls_back() {
        assert_eq!(slugify("???"), "book");
    }
}
