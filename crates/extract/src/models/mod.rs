mod company;
mod image_type;
mod metadata;

pub use self::company::Company;
pub use self::image_type::ImageType;
pub use self::metadata::ParsedMetadata;

fn sanitize(s: impl AsRef<str>) -> String {
    s.as_ref().trim().to_lowercase().replace('/', "").replace('-', "").replace('_', "").replace(' ', "")
}
