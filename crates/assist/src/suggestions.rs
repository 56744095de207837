//! Discrete suggestion items delivered alongside drafts.

use std::collections::HashMap;

use quill_primitives::{CharIdx, FieldId, char_len, line_at_char};

/// Pending suggestion items per field.
#[derive(Debug, Default)]
pub struct SuggestionItems {
	items: HashMap<FieldId, Vec<String>>,
}

impl SuggestionItems {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, field: &FieldId) -> &[String] {
		self.items.get(field).map_or(&[], Vec::as_slice)
	}

	pub fn set(&mut self, field: &FieldId, items: Vec<String>) {
		if items.is_empty() {
			self.items.remove(field);
		} else {
			self.items.insert(field.clone(), items);
		}
	}

	/// Removes and returns the item at `index`.
	pub fn take(&mut self, field: &FieldId, index: usize) -> Option<String> {
		let items = self.items.get_mut(field)?;
		if index >= items.len() {
			return None;
		}
		let item = items.remove(index);
		if items.is_empty() {
			self.items.remove(field);
		}
		Some(item)
	}

	/// Drops every list. Returns the fields that had items, sorted.
	pub fn clear(&mut self) -> Vec<FieldId> {
		let mut fields: Vec<FieldId> = self.items.drain().map(|(field, _)| field).collect();
		fields.sort();
		fields
	}
}

/// Strips a leading list number such as `3.`, `3、`, or `3 `.
pub fn strip_numbering(line: &str) -> &str {
	let trimmed = line.trim();
	let rest = trimmed.trim_start_matches(|c: char| c.is_ascii_digit());
	if rest.len() == trimmed.len() {
		return trimmed;
	}
	rest.trim_start_matches(|c: char| c == '.' || c == '、' || c.is_whitespace()).trim()
}

/// Inserts `item` as a new line after the caret's line and renumbers the list.
///
/// Every non-blank line becomes `N. content`; blank lines stay blank and
/// lines holding only a number are kept as they are. Returns the new text
/// and a caret at the end of the inserted line.
pub fn insert_item(text: &str, caret: CharIdx, item: &str) -> (String, CharIdx) {
	let item = strip_numbering(item);
	let mut lines: Vec<&str> = if text.trim().is_empty() { Vec::new() } else { text.split('\n').collect() };
	let inserted_at = if lines.is_empty() { 0 } else { line_at_char(text, caret) + 1 };
	lines.insert(inserted_at, item);

	let mut counter = 0;
	let numbered: Vec<String> = lines
		.into_iter()
		.map(|line| {
			if line.trim().is_empty() {
				return String::new();
			}
			let content = strip_numbering(line);
			if content.is_empty() {
				return line.to_string();
			}
			counter += 1;
			format!("{counter}. {content}")
		})
		.collect();

	let caret = numbered[..=inserted_at].iter().map(|line| char_len(line) + 1).sum::<usize>() - 1;
	(numbered.join("\n"), caret)
}
