use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use super::sanitize;
use crate::error::{Error, ErrorKind};

/// The retail business a photograph was shot for.
///
/// Determines the company token in canonical filenames. When nothing in a
/// filename says otherwise, files are assumed to belong to [`Company::Qvc`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Company {
    /// Request IDs prefixed with `MO`; letter-prefixed item numbers.
    #[default]
    Qvc,
    /// Request IDs prefixed with `PH`; purely numeric item numbers.
    Hsn,
}
impl Company {
    pub const ALL: [Company; 2] = [Company::Qvc, Company::Hsn];

    /// The token written into canonical filenames.
    pub fn code(&self) -> &'static str {
        match self {
            Company::Qvc => "QVC",
            Company::Hsn => "HSN",
        }
    }

    /// Request-ID prefix used by this company's job tracking system.
    pub fn request_prefix(&self) -> &'static str {
        match self {
            Company::Qvc => "MO",
            Company::Hsn => "PH",
        }
    }
}
impl FromStr for Company {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match sanitize(s).as_str() {
            "qvc" | "a" => Self::Qvc,
            "hsn" | "b" => Self::Hsn,
            _ => exn::bail!(ErrorKind::UnknownCompany(s.to_string())),
        })
    }
}
impl Display for Company {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.code())
    }
}
