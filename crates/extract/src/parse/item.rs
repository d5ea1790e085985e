use derive_more::Display;
use regex::Regex;

use crate::consts;

/// Which heuristic recognised the item number.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemRule {
    /// A prefix letter plus six digits, standing on its own (`K123456`).
    #[display("prefixed-letter")]
    PrefixedLetter,
    /// `H` plus six digits at the very start of the filename.
    #[display("leading-h")]
    LeadingH,
    /// `H` plus six digits anywhere, standing on its own.
    #[display("isolated-h")]
    IsolatedH,
    /// `H`, one separator, six digits (`H-478461`).
    #[display("separated-h")]
    SeparatedH,
    /// Six digits next to a `TSV` marker.
    #[display("tsv")]
    Tsv,
    /// A bare run of six or more digits between delimiters.
    #[display("numeric")]
    Numeric,
}
impl ItemRule {
    /// Letter-prefixed item numbers are only ever issued by the default company.
    pub fn implies_company(&self) -> bool {
        matches!(self, Self::PrefixedLetter | Self::LeadingH | Self::IsolatedH | Self::SeparatedH)
    }
}

pub(super) fn find(filename: &str) -> Option<(ItemRule, String)> {
    if let Some(item) = prefixed_letter(filename) {
        return Some((ItemRule::PrefixedLetter, item));
    }
    if let Some(found) = consts::LEADING_H_ITEM_REGEX.find(filename) {
        return Some((ItemRule::LeadingH, found.as_str().to_string()));
    }
    if let Some(item) = isolated(&consts::H_ITEM_REGEX, filename).next() {
        return Some((ItemRule::IsolatedH, item.to_string()));
    }
    if let Some(item) = isolated(&consts::SEPARATED_H_ITEM_REGEX, filename).next() {
        let item: String = item.chars().filter(char::is_ascii_alphanumeric).collect();
        return Some((ItemRule::SeparatedH, item));
    }
    if let Some(item) = tsv(filename) {
        return Some((ItemRule::Tsv, item));
    }
    numeric(filename).map(|item| (ItemRule::Numeric, item))
}

/// `H` is also a valid prefix letter, but an `H` number sitting next to a
/// number with any other prefix is treated as the secondary identifier.
fn prefixed_letter(filename: &str) -> Option<String> {
    let mut first_h = None;
    for candidate in isolated(&consts::PREFIXED_ITEM_REGEX, filename) {
        if !candidate.starts_with('H') {
            return Some(candidate.to_string());
        }
        first_h.get_or_insert(candidate);
    }
    first_h.map(str::to_string)
}

fn tsv(filename: &str) -> Option<String> {
    if !filename.to_ascii_uppercase().contains("TSV") {
        return None;
    }
    consts::AFTER_TSV_REGEX
        .captures(filename)
        .or_else(|| consts::BEFORE_TSV_REGEX.captures(filename))
        .and_then(|captures| captures.get(1))
        .map(|digits| digits.as_str().to_string())
}

fn numeric(filename: &str) -> Option<String> {
    consts::LEADING_NUMERIC_ITEM_REGEX
        .captures(filename)
        .or_else(|| consts::EMBEDDED_NUMERIC_ITEM_REGEX.captures(filename))
        .and_then(|captures| captures.get(1))
        .map(|digits| digits.as_str().to_string())
}

/// Every match of `regex` in `haystack` that has no ASCII letter or digit
/// immediately before or after it.
///
/// Matches are searched from every starting position rather than only after
/// the previous match, so a candidate hiding inside a longer rejected run is
/// still considered.
fn isolated<'h>(regex: &'h Regex, haystack: &'h str) -> impl Iterator<Item = &'h str> + 'h {
    let mut start = 0;
    std::iter::from_fn(move || {
        while start <= haystack.len() {
            let found = regex.find_at(haystack, start)?;
            start = next_boundary(haystack, found.start());
            let before = haystack[..found.start()].chars().next_back();
            let after = haystack[found.end()..].chars().next();
            if !before.is_some_and(|c| c.is_ascii_alphanumeric()) && !after.is_some_and(|c| c.is_ascii_alphanumeric())
            {
                return Some(found.as_str());
            }
        }
        None
    })
}

fn next_boundary(haystack: &str, index: usize) -> usize {
    haystack[index..].chars().next().map_or(haystack.len() + 1, |c| index + c.len_utf8())
}
