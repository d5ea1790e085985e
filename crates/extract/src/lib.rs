//! Metadata extraction from vendor photography filenames.
//!
//! Vendors name their files however they like. This crate runs an ordered
//! chain of heuristics over a raw filename and returns whatever it could
//! recognise as a [`ParsedMetadata`]: the company, the item number (the
//! "description"), the request ID and the lifestyle sequence number. Every
//! field is optional; a filename that yields nothing is perfectly valid.
//!
//! ```
//! use movr_extract::{parse, models::Company};
//!
//! let parsed = parse("MO123456-2_H478461.jpg");
//! assert_eq!(parsed.request_id.as_deref(), Some("MO123456"));
//! assert_eq!(parsed.description.as_deref(), Some("H478461"));
//! assert_eq!(parsed.company, Some(Company::Qvc));
//! ```

mod consts;
pub mod error;
pub mod models;
mod parse;

pub use crate::parse::{ItemRule, SequenceRule, parse, strip_extension};
