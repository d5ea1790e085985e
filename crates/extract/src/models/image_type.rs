use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use super::sanitize;
use crate::error::{Error, ErrorKind};

/// Kind of photograph, which decides both the destination folder and the
/// two-letter abbreviation used in canonical filenames.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum ImageType {
    #[default]
    Lifestyle,
    Product,
    Headshot,
    PdLifestyleLite,
    FoodShoot,
    Standard,
}
impl ImageType {
    pub const ALL: [ImageType; 6] = [
        ImageType::Lifestyle,
        ImageType::Product,
        ImageType::Headshot,
        ImageType::PdLifestyleLite,
        ImageType::FoodShoot,
        ImageType::Standard,
    ];

    /// Human-readable name, as shown to operators.
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageType::Lifestyle => "Lifestyle",
            ImageType::Product => "Product",
            ImageType::Headshot => "Headshot",
            ImageType::PdLifestyleLite => "PD Lifestyle Lite",
            ImageType::FoodShoot => "Food Shoot",
            ImageType::Standard => "Standard/Custom",
        }
    }

    /// Stable machine-readable identifier (persistence, CLI arguments).
    pub fn slug(&self) -> &'static str {
        match self {
            ImageType::Lifestyle => "lifestyle",
            ImageType::Product => "product",
            ImageType::Headshot => "headshot",
            ImageType::PdLifestyleLite => "pd-lifestyle-lite",
            ImageType::FoodShoot => "food-shoot",
            ImageType::Standard => "standard",
        }
    }

    /// Folder (relative to the destination root) that committed files of
    /// this type are copied into.
    pub fn default_destination(&self) -> &'static str {
        match self {
            ImageType::Lifestyle => "Lifestyle Images",
            ImageType::Product => "Product Images",
            ImageType::Headshot => "Headshots",
            ImageType::PdLifestyleLite | ImageType::FoodShoot | ImageType::Standard => {
                "Product Photographer > Master Images – Lifestyle"
            },
        }
    }

    /// Two-letter token written into canonical filenames.
    pub fn abbreviation(&self) -> &'static str {
        match self {
            ImageType::Lifestyle => "LS",
            ImageType::Product => "PR",
            ImageType::Headshot => "HS",
            ImageType::PdLifestyleLite => "PD",
            ImageType::FoodShoot => "QC",
            ImageType::Standard => "PD",
        }
    }

    /// Whether the sequence number takes part in the canonical filename.
    pub fn uses_sequence(&self) -> bool {
        matches!(self, ImageType::Lifestyle)
    }
}
impl FromStr for ImageType {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match sanitize(s).as_str() {
            "lifestyle" | "ls" => Self::Lifestyle,
            "product" | "pr" => Self::Product,
            "headshot" | "headshots" | "hs" => Self::Headshot,
            "pdlifestylelite" => Self::PdLifestyleLite,
            "foodshoot" | "food" => Self::FoodShoot,
            "standard" | "custom" | "standardcustom" => Self::Standard,
            _ => exn::bail!(ErrorKind::UnknownImageType(s.to_string())),
        })
    }
}
impl Display for ImageType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
