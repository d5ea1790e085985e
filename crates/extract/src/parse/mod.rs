//! The ordered heuristic chain.
//!
//! Parsing happens in three independent stages over the same (quote-stripped)
//! filename: the request ID, the item number and the sequence number. Within
//! the item-number and sequence stages the first rule to match wins and later
//! rules are never consulted, so the order of the rules *is* the behaviour.

mod item;
mod sequence;

use tracing::instrument;

pub use self::item::ItemRule;
pub use self::sequence::SequenceRule;
use crate::consts;
use crate::models::{Company, ParsedMetadata};

const QUOTE_CHARACTERS: [char; 2] = ['\'', '"'];

/// Parses a raw vendor filename into whatever metadata can be recognised.
///
/// Total and pure: every input produces a value, and the same input always
/// produces the same value. Fields that cannot be found are left as `None`.
///
/// The company is only set when something in the filename implies it; callers
/// that need a concrete company should fall back to [`Company::default`].
#[instrument(level = "debug", fields(company, description, request_id, sequence))]
pub fn parse(filename: &str) -> ParsedMetadata {
    let clean: String = filename.chars().filter(|c| !QUOTE_CHARACTERS.contains(c)).collect();
    let mut metadata = ParsedMetadata::default();

    if let Some((company, request_id)) = request_id(&clean) {
        metadata.company = Some(company);
        metadata.request_id = Some(request_id);
    }

    if let Some((rule, description)) = item::find(&clean) {
        if rule.implies_company() && metadata.company.is_none() {
            metadata.company = Some(Company::Qvc);
        }
        tracing::trace!(%rule, %description, "matched item number");
        metadata.description = Some(description);
        metadata.item_rule = Some(rule);
    }

    if let Some((rule, sequence)) = sequence::find(strip_extension(&clean)) {
        tracing::trace!(%rule, %sequence, "matched sequence number");
        metadata.sequence = Some(sequence);
        metadata.sequence_rule = Some(rule);
    }

    let span = tracing::Span::current();
    if let Some(company) = metadata.company {
        span.record("company", company.code());
    }
    if let Some(description) = metadata.description.as_deref() {
        span.record("description", description);
    }
    if let Some(request_id) = metadata.request_id.as_deref() {
        span.record("request_id", request_id);
    }
    if let Some(sequence) = metadata.sequence.as_deref() {
        span.record("sequence", sequence);
    }
    metadata
}

/// Removes the final `.ext` from a filename, if it has one.
///
/// A leading dot (`.hidden`) is part of the name, not an extension.
pub fn strip_extension(filename: &str) -> &str {
    match filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => filename,
    }
}

/// `MO` request IDs belong to the default company and are checked first;
/// `PH` request IDs belong to the other one. Only the prefix and its digit run
/// are kept, so `MO123456-2` yields `MO123456`.
fn request_id(filename: &str) -> Option<(Company, String)> {
    if let Some(found) = consts::MO_REQUEST_REGEX.find(filename) {
        return Some((Company::Qvc, found.as_str().to_string()));
    }
    consts::PH_REQUEST_REGEX.find(filename).map(|found| (Company::Hsn, found.as_str().to_string()))
}
