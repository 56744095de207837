//! Rope-backed text helpers.
//!
//! Field values are plain `String`s; these helpers go through a [`Rope`] so
//! every offset is a char index, never a byte index.

use ropey::Rope;

use crate::range::{CharIdx, CharLen, CharRange};

/// Error produced when a char range does not fit the text it addresses.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
	/// `start` is past `end`.
	#[error("range {start}..{end} is inverted")]
	Inverted { start: CharIdx, end: CharIdx },
	/// `end` is past the last char.
	#[error("range {start}..{end} exceeds text length {len}")]
	OutOfBounds { start: CharIdx, end: CharIdx, len: CharLen },
}

/// Returns the number of chars in `text`.
#[inline]
pub fn char_len(text: &str) -> CharLen {
	text.chars().count()
}

fn check_range(range: CharRange, len: CharLen) -> Result<(), TextError> {
	if !range.is_ordered() {
		return Err(TextError::Inverted {
			start: range.start,
			end: range.end,
		});
	}
	if range.end > len {
		return Err(TextError::OutOfBounds {
			start: range.start,
			end: range.end,
			len,
		});
	}
	Ok(())
}

/// Returns the chars of `text` covered by `range`.
pub fn slice_chars(text: &str, range: CharRange) -> Result<String, TextError> {
	let rope = Rope::from_str(text);
	check_range(range, rope.len_chars())?;
	Ok(rope.slice(range.start..range.end).to_string())
}

/// Replaces the chars of `text` covered by `range` with `replacement`.
pub fn splice_chars(text: &str, range: CharRange, replacement: &str) -> Result<String, TextError> {
	let mut rope = Rope::from_str(text);
	check_range(range, rope.len_chars())?;
	rope.remove(range.start..range.end);
	rope.insert(range.start, replacement);
	Ok(rope.to_string())
}

/// Returns the zero-based `\n`-separated line containing `pos`, clamped to the last line.
///
/// Only `\n` ends a line, so the index matches `text.split('\n')`. `\r` and
/// Unicode line separators stay inside the line.
pub fn line_at_char(text: &str, pos: CharIdx) -> usize {
	text.chars().take(pos).filter(|&c| c == '\n').count()
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use proptest::prelude::*;

	use super::*;

	#[test]
	fn splice_uses_char_offsets() {
		let text = "患者肚子疼3天，伴发烧";
		let out = splice_chars(text, CharRange::new(2, 5), "腹痛").unwrap();
		assert_eq!(out, "患者腹痛3天，伴发烧");
	}

	#[test]
	fn splice_rejects_out_of_bounds() {
		assert_eq!(
			splice_chars("abc", CharRange::new(1, 4), "x"),
			Err(TextError::OutOfBounds { start: 1, end: 4, len: 3 })
		);
		assert_eq!(splice_chars("abc", CharRange::new(2, 1), "x"), Err(TextError::Inverted { start: 2, end: 1 }));
	}

	#[test]
	fn slice_reads_multibyte_text() {
		assert_eq!(slice_chars("患者肚子疼", CharRange::new(2, 4)).unwrap(), "肚子");
	}

	#[test]
	fn line_lookup_clamps() {
		assert_eq!(line_at_char("a\nbc\nd", 0), 0);
		assert_eq!(line_at_char("a\nbc\nd", 3), 1);
		assert_eq!(line_at_char("a\nbc\nd", 99), 2);
	}

	#[test]
	fn line_lookup_only_breaks_on_newline() {
		assert_eq!(line_at_char("血常规\r尿常规\r心电图", 8), 0);
		assert_eq!(line_at_char("血常规\u{2028}尿常规", 5), 0);
		assert_eq!(line_at_char("a\r\nb", 3), 1);
		assert_eq!(line_at_char("a\r\nb", 2), 0);
	}

	proptest! {
		#[test]
		fn splice_length_matches_delta(text in "\\PC{0,40}", a in 0usize..40, b in 0usize..40, rep in "\\PC{0,8}") {
			let len = char_len(&text);
			let (start, end) = (a.min(b).min(len), a.max(b).min(len));
			let out = splice_chars(&text, CharRange::new(start, end), &rep).unwrap();
			prop_assert_eq!(char_len(&out), len - (end - start) + char_len(&rep));
			prop_assert_eq!(slice_chars(&out, CharRange::new(start, start + char_len(&rep))).unwrap(), rep);
		}
	}
}
