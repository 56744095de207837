//! Content policy for model output.
//!
//! Invalid output is never an error: it means "nothing to offer".

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use crate::config::{AssistConfig, ConfigError, DEFAULT_ITEM_REFUSAL_PATTERNS, DEFAULT_REFUSAL_PATTERNS};

const QUOTE_CHARS: &[char] = &['"', '\'', '`', '“', '”', '‘', '’', '「', '」', '『', '』'];

static DEFAULT_VALIDATOR: LazyLock<ContentValidator> = LazyLock::new(ContentValidator::default);

/// Compiled refusal patterns for drafts, completions, and suggestion items.
#[derive(Debug, Clone)]
pub struct ContentValidator {
	refusal: Option<Regex>,
	item_refusal: Option<Regex>,
}

impl Default for ContentValidator {
	fn default() -> Self {
		let refusal = owned(&DEFAULT_REFUSAL_PATTERNS);
		let mut item = refusal.clone();
		item.extend(owned(&DEFAULT_ITEM_REFUSAL_PATTERNS));
		Self {
			refusal: compile(&refusal).ok().flatten(),
			item_refusal: compile(&item).ok().flatten(),
		}
	}
}

impl ContentValidator {
	/// Compiles `refusals` for drafts and `refusals + item_extra` for items.
	pub fn new(refusals: &[String], item_extra: &[String]) -> Result<Self, ConfigError> {
		let item: Vec<String> = refusals.iter().chain(item_extra).cloned().collect();
		Ok(Self {
			refusal: compile(refusals)?,
			item_refusal: compile(&item)?,
		})
	}

	pub fn from_config(config: &AssistConfig) -> Result<Self, ConfigError> {
		Self::new(&config.refusal_patterns, &config.item_refusal_patterns)
	}

	/// Returns true if `text` is worth showing as ghost text.
	pub fn is_valid_draft(&self, text: &str) -> bool {
		let core = strip_wrapping_quotes(text);
		!core.is_empty() && !self.refusal.as_ref().is_some_and(|re| re.is_match(core))
	}

	/// Returns true if `item` is worth listing as a discrete suggestion.
	pub fn is_valid_item(&self, item: &str) -> bool {
		let core = strip_wrapping_quotes(item);
		!core.is_empty() && !self.item_refusal.as_ref().is_some_and(|re| re.is_match(core))
	}

	/// Keeps the valid items, trimmed, in order.
	pub fn filter_items(&self, items: Vec<String>) -> Vec<String> {
		items
			.into_iter()
			.map(|item| item.trim().to_string())
			.filter(|item| self.is_valid_item(item))
			.collect()
	}
}

/// Checks `text` against the default refusal patterns.
pub fn is_valid_draft(text: &str) -> bool {
	DEFAULT_VALIDATOR.is_valid_draft(text)
}

/// Trims whitespace and any run of quote characters at either end.
pub fn strip_wrapping_quotes(text: &str) -> &str {
	text.trim().trim_matches(QUOTE_CHARS).trim()
}

/// Removes a prefix of `completion` that repeats `prompt`.
///
/// Completion models sometimes answer with the full text instead of only the
/// continuation.
pub fn strip_echoed_prompt<'a>(prompt: &str, completion: &'a str) -> &'a str {
	if prompt.is_empty() {
		return completion;
	}
	completion.strip_prefix(prompt).unwrap_or(completion)
}

fn owned(patterns: &[&str]) -> Vec<String> {
	patterns.iter().map(|p| p.to_string()).collect()
}

/// Joins patterns into one case-insensitive alternation, or `None` if empty.
fn compile(patterns: &[String]) -> Result<Option<Regex>, ConfigError> {
	for pattern in patterns {
		Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
			pattern: pattern.clone(),
			source,
		})?;
	}
	if patterns.is_empty() {
		return Ok(None);
	}

	let joined = patterns.iter().map(|p| format!("(?:{p})")).collect::<Vec<_>>().join("|");
	RegexBuilder::new(&joined)
		.case_insensitive(true)
		.build()
		.map(Some)
		.map_err(|source| ConfigError::InvalidPattern { pattern: joined, source })
}
