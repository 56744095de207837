use quill_primitives::{CharIdx, char_len};

/// The coordinator's mirror of one field's host-side state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldState {
	pub text: String,
	/// Caret as a char index into `text`.
	pub caret: CharIdx,
	pub focused: bool,
	/// Set once the user edits the field; untouched fields may receive drafts.
	pub touched: bool,
}

impl FieldState {
	pub fn len_chars(&self) -> usize {
		char_len(&self.text)
	}

	pub fn caret_at_end(&self) -> bool {
		self.caret >= self.len_chars()
	}

	/// Sets text and caret, clamping the caret to the text.
	pub fn set_text(&mut self, text: String, caret: Option<CharIdx>) {
		let len = char_len(&text);
		self.caret = caret.map_or(len, |caret| caret.min(len));
		self.text = text;
	}

	/// True for a field that background drafting may fill.
	pub fn is_untouched_empty(&self) -> bool {
		!self.touched && self.text.trim().is_empty()
	}
}
