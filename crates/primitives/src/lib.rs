//! Core types shared by the assist crates: field identifiers, char-indexed
//! ranges and splicing, and terminology issues.

/// Field identifiers and the standard record field set.
pub mod field;
/// Terminology issues anchored to char ranges.
pub mod issue;
/// Text range types measured in chars.
pub mod range;
/// Rope-backed text helpers.
pub mod rope;

pub use field::{FieldId, RECORD_FIELDS};
pub use issue::Issue;
pub use range::{CharIdx, CharLen, CharRange};
pub use rope::{TextError, char_len, line_at_char, slice_chars, splice_chars};
