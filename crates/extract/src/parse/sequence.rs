use std::sync::LazyLock;

use derive_more::Display;
use regex::Regex;

use crate::consts;

/// Which heuristic recognised the sequence number.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceRule {
    /// Three or four digits ending the name (`file_005`).
    #[display("trailing-digits")]
    TrailingDigits,
    /// A word ending in exactly four digits (`Ava0220`).
    #[display("word-four-digits")]
    WordFourDigits,
    /// A word ending in four or five digits (`Krystal34021`).
    #[display("word-digits")]
    WordDigits,
    /// A month abbreviation ending in three or four digits (`JUL1154`).
    #[display("month")]
    Month,
}
impl SequenceRule {
    /// Evaluation order. The first rule that matches wins, even where a later
    /// rule would also have matched the same text.
    pub const ORDER: [SequenceRule; 4] =
        [SequenceRule::TrailingDigits, SequenceRule::WordFourDigits, SequenceRule::WordDigits, SequenceRule::Month];

    fn regex(&self) -> &'static LazyLock<Regex> {
        match self {
            Self::TrailingDigits => &consts::TRAILING_SEQUENCE_REGEX,
            Self::WordFourDigits => &consts::WORD_FOUR_DIGIT_SEQUENCE_REGEX,
            Self::WordDigits => &consts::WORD_SEQUENCE_REGEX,
            Self::Month => &consts::MONTH_SEQUENCE_REGEX,
        }
    }

    /// Applies this single rule to an extension-stripped basename, returning
    /// only the digit run.
    pub fn apply(&self, basename: &str) -> Option<String> {
        self.regex().captures(basename).and_then(|captures| captures.get(1)).map(|digits| digits.as_str().to_string())
    }
}

pub(super) fn find(basename: &str) -> Option<(SequenceRule, String)> {
    SequenceRule::ORDER.into_iter().find_map(|rule| rule.apply(basename).map(|sequence| (rule, sequence)))
}
