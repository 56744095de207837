use serde::{Deserialize, Serialize};

use crate::range::{CharIdx, CharRange};
use crate::rope::{char_len, slice_chars};

/// A flagged terminology span with a proposed replacement.
///
/// `[start, end)` addresses chars of the field text the issue was computed
/// against; `original` is the text found there at that time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Issue {
	/// Flagged text.
	pub original: String,
	/// Proposed replacement.
	pub suggestion: String,
	/// First flagged char.
	pub start: CharIdx,
	/// First char after the flagged span.
	pub end: CharIdx,
}

impl Issue {
	/// Creates an issue over `[start, end)`.
	pub fn new(original: impl Into<String>, suggestion: impl Into<String>, start: CharIdx, end: CharIdx) -> Self {
		Self {
			original: original.into(),
			suggestion: suggestion.into(),
			start,
			end,
		}
	}

	/// Returns the flagged range.
	pub fn range(&self) -> CharRange {
		CharRange::new(self.start, self.end)
	}

	/// Returns the length change applying this issue causes.
	pub fn len_delta(&self) -> isize {
		char_len(&self.suggestion) as isize - self.range().len() as isize
	}

	/// Returns true if `text` still holds `original` at `[start, end)`.
	pub fn anchors_in(&self, text: &str) -> bool {
		slice_chars(text, self.range()).is_ok_and(|found| found == self.original)
	}

	/// Returns true if both issues address the same span.
	pub fn same_span(&self, other: &Issue) -> bool {
		self.start == other.start && self.end == other.end
	}
}
