use regex::Regex;
use std::sync::LazyLock;

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

// Request IDs. Only the prefix and the digit run are captured; suffixes such
// as `-2` never make it into the match.
regex!(MO_REQUEST_REGEX, r"MO[0-9]+");
regex!(PH_REQUEST_REGEX, r"PH[0-9]+");

// Item numbers. Letter/digit isolation is checked by hand in `parse::item`
// because the regex crate has no look-around.
regex!(PREFIXED_ITEM_REGEX, r"[ACEFHJKMQSTV][0-9]{6}");
regex!(LEADING_H_ITEM_REGEX, r"^H[0-9]{6}");
regex!(H_ITEM_REGEX, r"H[0-9]{6}");
regex!(SEPARATED_H_ITEM_REGEX, r"H[-_ ]?[0-9]{6}");
regex!(AFTER_TSV_REGEX, r"(?i)TSV[^0-9]*([0-9]{6})(?:[^0-9]|$)");
regex!(BEFORE_TSV_REGEX, r"(?i)(?:^|[^0-9])([0-9]{6})[^0-9]*TSV");
regex!(LEADING_NUMERIC_ITEM_REGEX, r"^([0-9]{6,})[_ ]");
regex!(EMBEDDED_NUMERIC_ITEM_REGEX, r"[_ ]([0-9]{6,})[_ ]");

// Sequence numbers, evaluated against the extension-stripped basename.
regex!(TRAILING_SEQUENCE_REGEX, r"[-_ ]?([0-9]{3,4})$");
regex!(WORD_FOUR_DIGIT_SEQUENCE_REGEX, r"[A-Za-z]+([0-9]{4})$");
regex!(WORD_SEQUENCE_REGEX, r"[A-Za-z]+([0-9]{4,5})$");
regex!(MONTH_SEQUENCE_REGEX, r"(?i)(?:JAN|FEB|MAR|APR|MAY|JUN|JUL|AUG|SEP|OCT|NOV|DEC)([0-9]{3,4})$");
