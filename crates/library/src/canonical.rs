//! Canonical filename generation.
//!
//! Every committed file is named
//! `IMG_<company>_PH_<type>_<request id>_<description>[_<sequence>][_RT].<ext>`.
//! The sequence only takes part for image types that
//! [use one](ImageType::uses_sequence).

use movr_extract::models::{Company, ImageType};

const PREFIX: &str = "IMG";
const PHOTO_TOKEN: &str = "PH";
const RETOUCHED_TOKEN: &str = "RT";
const SEPARATOR: &str = "_";

/// The inputs to [`canonical_name`], borrowed from whatever holds them.
#[derive(Debug, Clone, Copy)]
pub struct NameParts<'a> {
    pub description: &'a str,
    pub request_id: &'a str,
    pub company: Company,
    pub sequence: &'a str,
    pub retouched: bool,
    pub image_type: ImageType,
    /// Original extension, without the dot. Case is preserved.
    pub extension: &'a str,
}

/// Build the canonical filename for `parts`.
///
/// Returns `None` when the description or request ID is empty: there is no
/// valid name without them. Pure and total.
pub fn canonical_name(parts: &NameParts<'_>) -> Option<String> {
    if parts.description.is_empty() || parts.request_id.is_empty() {
        return None;
    }
    let mut components = vec![
        PREFIX,
        parts.company.code(),
        PHOTO_TOKEN,
        parts.image_type.abbreviation(),
        parts.request_id,
        parts.description,
    ];
    if parts.image_type.uses_sequence() && !parts.sequence.is_empty() {
        components.push(parts.sequence);
    }
    if parts.retouched {
        components.push(RETOUCHED_TOKEN);
    }
    Some(format!("{}.{}", components.join(SEPARATOR), parts.extension))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parts(image_type: ImageType) -> NameParts<'static> {
        NameParts {
            description: "K123456",
            request_id: "MO123456",
            company: Company::Qvc,
            sequence: "005",
            retouched: false,
            image_type,
            extension: "jpg",
        }
    }

    #[rstest]
    #[case(ImageType::Lifestyle, "IMG_QVC_PH_LS_MO123456_K123456_005.jpg")]
    #[case(ImageType::Product, "IMG_QVC_PH_PR_MO123456_K123456.jpg")]
    #[case(ImageType::Headshot, "IMG_QVC_PH_HS_MO123456_K123456.jpg")]
    #[case(ImageType::PdLifestyleLite, "IMG_QVC_PH_PD_MO123456_K123456.jpg")]
    #[case(ImageType::FoodShoot, "IMG_QVC_PH_QC_MO123456_K123456.jpg")]
    #[case(ImageType::Standard, "IMG_QVC_PH_PD_MO123456_K123456.jpg")]
    fn test_name_per_image_type(#[case] image_type: ImageType, #[case] expected: &str) {
        assert_eq!(canonical_name(&parts(image_type)).as_deref(), Some(expected));
    }

    #[test]
    fn test_retouched_and_company() {
        let name = canonical_name(&NameParts {
            company: Company::Hsn,
            request_id: "PH778899",
            retouched: true,
            ..parts(ImageType::Lifestyle)
        });
        assert_eq!(name.as_deref(), Some("IMG_HSN_PH_LS_PH778899_K123456_005_RT.jpg"));
    }

    #[test]
    fn test_empty_sequence_is_omitted() {
        let name = canonical_name(&NameParts { sequence: "", ..parts(ImageType::Lifestyle) });
        assert_eq!(name.as_deref(), Some("IMG_QVC_PH_LS_MO123456_K123456.jpg"));
    }

    #[test]
    fn test_extension_case_preserved() {
        let name = canonical_name(&NameParts { extension: "JPG", ..parts(ImageType::Product) });
        assert_eq!(name.as_deref(), Some("IMG_QVC_PH_PR_MO123456_K123456.JPG"));
    }

    #[rstest]
    #[case("", "MO123456")]
    #[case("K123456", "")]
    #[case("", "")]
    fn test_missing_required_fields(#[case] description: &str, #[case] request_id: &str) {
        let name = canonical_name(&NameParts { description, request_id, ..parts(ImageType::Lifestyle) });
        assert_eq!(name, None);
    }

    #[test]
    fn test_deterministic() {
        let input = parts(ImageType::Lifestyle);
        assert_eq!(canonical_name(&input), canonical_name(&input));
    }

    #[test]
    fn test_valid_name_shape() {
        for image_type in ImageType::ALL {
            let name = canonical_name(&parts(image_type)).unwrap();
            assert!(name.starts_with("IMG_QVC_PH_"));
            assert!(name.ends_with(".jpg"));
            assert!(!name.contains('/'));
        }
    }
}
