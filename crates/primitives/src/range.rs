/// A position in the text, measured in characters (not bytes).
///
/// This is the coordinate space shared with the terminology service.
pub type CharIdx = usize;

/// A length or count in the text, measured in characters (not bytes).
///
/// This is distinct from CharIdx to avoid accidentally passing an index
/// where a length is expected or vice versa.
pub type CharLen = usize;

/// Half-open char range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharRange {
	/// First char inside the range.
	pub start: CharIdx,
	/// First char after the range.
	pub end: CharIdx,
}

impl CharRange {
	/// Creates a range from `start` to `end`.
	pub const fn new(start: CharIdx, end: CharIdx) -> Self {
		Self { start, end }
	}

	/// Returns the number of chars covered, zero for inverted ranges.
	#[inline]
	pub const fn len(&self) -> CharLen {
		self.end.saturating_sub(self.start)
	}

	/// Returns true if the range covers no chars.
	#[inline]
	pub const fn is_empty(&self) -> bool {
		self.end <= self.start
	}

	/// Returns true if `start <= end`.
	#[inline]
	pub const fn is_ordered(&self) -> bool {
		self.start <= self.end
	}

	/// Moves both ends by `delta` chars, or `None` if the result would be negative.
	pub fn shifted(&self, delta: isize) -> Option<CharRange> {
		Some(CharRange {
			start: self.start.checked_add_signed(delta)?,
			end: self.end.checked_add_signed(delta)?,
		})
	}
}
