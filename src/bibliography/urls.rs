//! Zero-width break insertion for long URLs.
//!
//! URLs are recognized in four forms: `\url{...}`, `\href{target}{text}`,
//! Markdown links `[text](target)`, and bare URLs in running text. Link
//! targets are never rewritten since they must stay resolvable; only the
//! visible text is. Angle-bracket autolinks are both target and text and
//! are left alone.
//!
//! Wrapping is idempotent. URLs are still recognized once they carry
//! breaks; existing breaks are stripped before a URL is measured, then
//! reinserted at the same positions, so a second pass counts nothing.

use super::BibliographyCandidate;
use crate::markup::FenceTracker;
use lazy_static::lazy_static;
use regex::{Captures, Regex};

/// Invisible break opportunity understood by the typesetter.
pub const ZERO_WIDTH_BREAK: char = '\u{200B}';

/// Characters after which a break may be inserted.
const BREAK_AFTER: [char; 7] = ['/', '.', '-', '?', '&', '=', '_'];

/// Trailing characters that belong to the sentence, not the URL.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', '*', '\'', '"'];

lazy_static! {
    static ref RE_URL_FORMS: Regex = Regex::new(concat!(
        r"(?P<url>\\url\{(?P<url_body>[^}]*)\})",
        r"|(?P<href>\\href\{(?P<href_target>[^}]*)\}\{(?P<href_text>[^}]*)\})",
        r"|(?P<link>\[(?P<link_text>[^\]]*)\]\((?P<link_target>[^)]*)\))",
        r"|(?P<auto><(?:https?:/\x{200B}?/|www\.)[^>\s]*>)",
        r#"|(?P<bare>(?:https?:/\x{200B}?/|www\.)[^\s<>()\[\]{}"']+)"#,
    ))
    .unwrap();
}

/// Result of a wrapping pass.
#[derive(Debug, Clone, PartialEq)]
pub struct WrapOutcome {
    pub markup: String,
    /// URLs that received break opportunities
    pub wrapped: usize,
}

/// Whether `url` has a scheme (or `www.`) and a plausible host.
///
/// Hosts must contain a dot, except `localhost`. An optional numeric port
/// is allowed.
pub fn is_well_formed(url: &str) -> bool {
    if url.is_empty() || url.chars().any(char::is_whitespace) {
        return false;
    }
    let rest = ["https://", "http://"]
        .iter()
        .find_map(|scheme| url.strip_prefix(scheme))
        .or_else(|| url.starts_with("www.").then_some(url));
    let Some(rest) = rest else {
        return false;
    };
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host = match authority.rsplit_once(':') {
        Some((host, port)) if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) => host,
        _ => authority,
    };
    if host.eq_ignore_ascii_case("localhost") {
        return true;
    }
    !host.is_empty()
        && host.contains('.')
        && !host.starts_with('.')
        && !host.ends_with('.')
        && host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '.')
}

/// Insert break opportunities into `url` if it is longer than `min_len`
/// characters. Malformed URLs and short URLs come back unchanged.
pub fn wrap_url(url: &str, min_len: usize) -> String {
    let clean: String = url.chars().filter(|c| *c != ZERO_WIDTH_BREAK).collect();
    if clean.chars().count() <= min_len || !is_well_formed(&clean) {
        return url.to_string();
    }
    let chars: Vec<char> = clean.chars().collect();
    let mut out = String::with_capacity(clean.len() + chars.len() * 3);
    for (i, c) in chars.iter().enumerate() {
        out.push(*c);
        if BREAK_AFTER.contains(c) && i + 1 < chars.len() {
            out.push(ZERO_WIDTH_BREAK);
        }
    }
    out
}

/// Wrap `text` only when the whole of it is a URL (used for link text).
fn wrap_if_url(text: &str, min_len: usize, wrapped: &mut usize) -> String {
    let trimmed: String = text.trim().chars().filter(|c| *c != ZERO_WIDTH_BREAK).collect();
    let looks_like_url = ["https://", "http://", "www."]
        .iter()
        .any(|p| trimmed.starts_with(p));
    if !looks_like_url {
        return text.to_string();
    }
    let out = wrap_url(text, min_len);
    if out != text {
        *wrapped += 1;
    }
    out
}

fn rewrite_line(line: &str, min_len: usize, wrapped: &mut usize) -> String {
    RE_URL_FORMS
        .replace_all(line, |caps: &Captures| {
            if let Some(body) = caps.name("url_body") {
                format!("\\url{{{}}}", wrap_if_url(body.as_str(), min_len, wrapped))
            } else if let (Some(target), Some(text)) = (caps.name("href_target"), caps.name("href_text")) {
                format!(
                    "\\href{{{}}}{{{}}}",
                    target.as_str(),
                    wrap_if_url(text.as_str(), min_len, wrapped)
                )
            } else if let (Some(text), Some(target)) = (caps.name("link_text"), caps.name("link_target")) {
                format!(
                    "[{}]({})",
                    wrap_if_url(text.as_str(), min_len, wrapped),
                    target.as_str()
                )
            } else if let Some(bare) = caps.name("bare") {
                let raw = bare.as_str();
                let url = raw.trim_end_matches(TRAILING_PUNCTUATION);
                let tail = &raw[url.len()..];
                format!("{}{}", wrap_if_url(url, min_len, wrapped), tail)
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

fn wrap_text(text: &str, min_len: usize) -> (String, usize) {
    let mut fences = FenceTracker::default();
    let mut wrapped = 0;
    let mut out = String::with_capacity(text.len());
    for piece in text.split_inclusive('\n') {
        let line = piece.trim_end_matches(['\n', '\r']);
        if fences.is_code(line) {
            out.push_str(piece);
            continue;
        }
        out.push_str(&rewrite_line(line, min_len, &mut wrapped));
        out.push_str(&piece[line.len()..]);
    }
    (out, wrapped)
}

/// Wrap URLs longer than `min_len` inside the candidate segments only.
///
/// Candidate spans must come from detection over this same `markup`.
/// Everything outside them is returned byte-for-byte.
pub fn wrap_long_urls(
    markup: &str,
    candidates: &[BibliographyCandidate],
    min_len: usize,
) -> WrapOutcome {
    let mut spans: Vec<_> = candidates.iter().map(|c| c.span.clone()).collect();
    spans.sort_by_key(|s| std::cmp::Reverse(s.start));

    let mut out = markup.to_string();
    let mut wrapped = 0;
    for span in spans {
        if span.end > out.len() || !out.is_char_boundary(span.start) || !out.is_char_boundary(span.end) {
            log::warn!("skipping bibliography span {:?} outside the document", span);
            continue;
        }
        let (text, count) = wrap_text(&out[span.clone()], min_len);
        wrapped += count;
        out.replace_range(span, &text);
    }
    WrapOutcome {
        markup: out,
        wrapped,
    }
}

/// Wrap URLs longer than `min_len` anywhere in the document.
pub fn wrap_all_long_urls(markup: &str, min_len: usize) -> WrapOutcome {
    let (markup, wrapped) = wrap_text(markup, min_len);
    WrapOutcome { markup, wrapped }
}
