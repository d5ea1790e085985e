use std::fmt::{Display, Formatter, Result as FmtResult};

use super::Company;
use crate::parse::{ItemRule, SequenceRule};

/// Everything that could be inferred from a raw filename.
///
/// Every field is optional; an absent field means the filename simply did not
/// contain it, and is surfaced to the operator as "missing" rather than
/// treated as a fault.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParsedMetadata {
    pub company: Option<Company>,
    /// Item number, e.g. `K123456` or `123456`.
    pub description: Option<String>,
    /// `MO`/`PH` request identifier with any suffix removed.
    pub request_id: Option<String>,
    pub sequence: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub item_rule: Option<ItemRule>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub sequence_rule: Option<SequenceRule>,
}
impl ParsedMetadata {
    /// Whether a canonical filename could be generated from this metadata
    /// without any operator input.
    pub fn is_complete(&self) -> bool {
        self.description.is_some() && self.request_id.is_some()
    }
}
impl Display for ParsedMetadata {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        fn field(value: Option<&str>) -> &str {
            value.unwrap_or("-")
        }
        write!(
            f,
            "company={} description={} request_id={} sequence={}",
            self.company.map(|c| c.code()).unwrap_or("-"),
            field(self.description.as_deref()),
            field(self.request_id.as_deref()),
            field(self.sequence.as_deref()),
        )?;
        if let Some(rule) = self.item_rule {
            write!(f, " item_rule={rule}")?;
        }
        if let Some(rule) = self.sequence_rule {
            write!(f, " sequence_rule={rule}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_marks_missing_fields() {
        let metadata = ParsedMetadata {
            company: Some(Company::Hsn),
            request_id: Some("PH1234".to_string()),
            ..Default::default()
        };
        assert_eq!(metadata.to_string(), "company=HSN description=- request_id=PH1234 sequence=-");
        assert!(!metadata.is_complete());
    }

    #[test]
    fn test_display_includes_rules() {
        let metadata = ParsedMetadata {
            company: Some(Company::Qvc),
            description: Some("K123456".to_string()),
            request_id: Some("MO1".to_string()),
            sequence: Some("005".to_string()),
            item_rule: Some(ItemRule::PrefixedLetter),
            sequence_rule: Some(SequenceRule::TrailingDigits),
        };
        assert_eq!(
            metadata.to_string(),
            "company=QVC description=K123456 request_id=MO1 sequence=005 item_rule=prefixed-letter sequence_rule=trailing-digits"
        );
        assert!(metadata.is_complete());
    }
}
