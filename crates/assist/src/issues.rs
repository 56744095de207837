//! Terminology issues per field, with apply/ignore and re-indexing.

use std::collections::{HashMap, HashSet};

use quill_primitives::{FieldId, Issue, TextError, splice_chars};
use tokio::time::Instant;

/// Failure applying an issue to field text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IssueError {
	/// The issue span does not address chars of the current text.
	#[error("issue span does not fit the field text: {0}")]
	OutOfRange(#[from] TextError),
}

#[derive(Debug, Default)]
struct FieldIssues {
	issues: Vec<Issue>,
	ignored: HashSet<String>,
	last_check: Option<Instant>,
}

/// Current issue lists and ignored originals, keyed by field.
///
/// Ignored originals survive new check results and are only dropped by
/// [`IssueAnnotationStore::reset`].
#[derive(Debug, Default)]
pub struct IssueAnnotationStore {
	fields: HashMap<FieldId, FieldIssues>,
}

impl IssueAnnotationStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn issues(&self, field: &FieldId) -> &[Issue] {
		self.fields.get(field).map_or(&[], |entry| entry.issues.as_slice())
	}

	pub fn is_ignored(&self, field: &FieldId, original: &str) -> bool {
		self.fields.get(field).is_some_and(|entry| entry.ignored.contains(original))
	}

	/// Records when a check was sent for `field`.
	pub fn record_check(&mut self, field: &FieldId, now: Instant) {
		self.fields.entry(field.clone()).or_default().last_check = Some(now);
	}

	pub fn last_check(&self, field: &FieldId) -> Option<Instant> {
		self.fields.get(field).and_then(|entry| entry.last_check)
	}

	/// Replaces the issue list with a fresh check result.
	///
	/// Ignored originals are dropped and the rest sorted by start.
	pub fn accept_check(&mut self, field: &FieldId, issues: Vec<Issue>) -> &[Issue] {
		let entry = self.fields.entry(field.clone()).or_default();
		let mut kept: Vec<Issue> = issues.into_iter().filter(|issue| !entry.ignored.contains(&issue.original)).collect();
		kept.sort_by_key(|issue| issue.start);
		entry.issues = kept;
		&entry.issues
	}

	/// Empties the issue list. Returns true if it was non-empty.
	pub fn clear_issues(&mut self, field: &FieldId) -> bool {
		self.fields
			.get_mut(field)
			.is_some_and(|entry| !std::mem::take(&mut entry.issues).is_empty())
	}

	/// Empties every issue list, keeping ignored sets. Returns the fields that
	/// had issues, sorted.
	pub fn clear_all_issues(&mut self) -> Vec<FieldId> {
		let mut cleared: Vec<FieldId> = self
			.fields
			.iter_mut()
			.filter(|(_, entry)| !entry.issues.is_empty())
			.map(|(field, entry)| {
				entry.issues.clear();
				field.clone()
			})
			.collect();
		cleared.sort();
		cleared
	}

	/// Splices `issue.suggestion` into `text` and re-indexes the field's
	/// remaining issues. Returns the new text.
	///
	/// The applied original joins the ignored set so later checks do not
	/// flag it again. Nothing changes if the span does not fit `text`.
	pub fn apply(&mut self, field: &FieldId, text: &str, issue: &Issue) -> Result<String, IssueError> {
		let updated = splice_chars(text, issue.range(), &issue.suggestion)?;
		let entry = self.fields.entry(field.clone()).or_default();
		entry.ignored.insert(issue.original.clone());
		entry.issues = reindex_after_apply(std::mem::take(&mut entry.issues), issue);
		Ok(updated)
	}

	/// Ignores `original` and removes every issue carrying it. Returns how
	/// many were removed.
	pub fn ignore(&mut self, field: &FieldId, original: &str) -> usize {
		let entry = self.fields.entry(field.clone()).or_default();
		entry.ignored.insert(original.to_string());
		let before = entry.issues.len();
		entry.issues.retain(|issue| issue.original != original);
		before - entry.issues.len()
	}

	/// Fields with any recorded state, sorted.
	pub fn fields(&self) -> Vec<FieldId> {
		let mut fields: Vec<FieldId> = self.fields.keys().cloned().collect();
		fields.sort();
		fields
	}

	/// Drops everything, ignored sets included.
	pub fn reset(&mut self) {
		self.fields.clear();
	}
}

/// Re-indexes `issues` after `applied` was spliced into the text.
///
/// The applied span is removed. Issues starting at or after the applied end
/// shift by the length change; all others keep their offsets, including any
/// that overlap the applied span.
pub fn reindex_after_apply(issues: Vec<Issue>, applied: &Issue) -> Vec<Issue> {
	let delta = applied.len_delta();
	issues
		.into_iter()
		.filter(|issue| !issue.same_span(applied))
		.filter_map(|issue| {
			if issue.start < applied.end {
				return Some(issue);
			}
			let range = issue.range().shifted(delta)?;
			Some(Issue {
				start: range.start,
				end: range.end,
				..issue
			})
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;
	use proptest::prelude::*;

	use super::*;

	fn field() -> FieldId {
		FieldId::new("history_present_illness")
	}

	#[test]
	fn apply_shifts_following_issue() {
		let mut store = IssueAnnotationStore::new();
		let text = "Hello foo bar";
		let foo = Issue::new("foo", "ABC", 6, 9);
		let bar = Issue::new("bar", "baz", 10, 13);
		store.accept_check(&field(), vec![bar.clone(), foo.clone()]);

		let grown = Issue::new("foo", "ABCD", 6, 9);
		let updated = store.apply(&field(), text, &grown).unwrap();
		assert_eq!(updated, "Hello ABCD bar");
		assert_eq!(store.issues(&field()), &[Issue::new("bar", "baz", 11, 14)]);
		assert!(store.issues(&field())[0].anchors_in(&updated));
		assert!(store.is_ignored(&field(), "foo"));
	}

	#[test]
	fn equal_length_replacement_keeps_offsets() {
		let mut store = IssueAnnotationStore::new();
		let applied = Issue::new("foo", "ABC", 6, 9);
		store.accept_check(&field(), vec![applied.clone(), Issue::new("bar", "baz", 10, 13)]);

		let updated = store.apply(&field(), "Hello foo bar", &applied).unwrap();
		assert_eq!(updated, "Hello ABC bar");
		assert_eq!(store.issues(&field()), &[Issue::new("bar", "baz", 10, 13)]);
	}

	#[test]
	fn apply_counts_chars_not_bytes() {
		let mut store = IssueAnnotationStore::new();
		let text = "患者肚子疼3天，伴发烧";
		let belly = Issue::new("肚子疼3天", "腹痛3天", 2, 7);
		let fever = Issue::new("发烧", "发热", 9, 11);
		store.accept_check(&field(), vec![belly.clone(), fever]);

		let updated = store.apply(&field(), text, &belly).unwrap();
		assert_eq!(updated, "患者腹痛3天，伴发烧");
		let remaining = store.issues(&field());
		assert_eq!(remaining, &[Issue::new("发烧", "发热", 8, 10)]);
		assert!(remaining[0].anchors_in(&updated));
	}

	#[test]
	fn overlapping_issue_before_applied_end_is_left_alone() {
		let applied = Issue::new("abcd", "X", 2, 6);
		let overlapping = Issue::new("def", "D", 4, 7);
		let before = Issue::new("a", "A", 0, 1);
		let result = reindex_after_apply(vec![before.clone(), applied.clone(), overlapping.clone()], &applied);
		assert_eq!(result, vec![before, overlapping]);
	}

	#[test]
	fn out_of_range_apply_changes_nothing() {
		let mut store = IssueAnnotationStore::new();
		let issue = Issue::new("bar", "baz", 10, 13);
		store.accept_check(&field(), vec![issue.clone()]);

		let err = store.apply(&field(), "short", &issue).unwrap_err();
		assert!(matches!(err, IssueError::OutOfRange(_)));
		assert_eq!(store.issues(&field()), &[issue]);
		assert!(!store.is_ignored(&field(), "bar"));
	}

	#[test]
	fn ignored_original_is_filtered_from_later_checks() {
		let mut store = IssueAnnotationStore::new();
		store.accept_check(&field(), vec![Issue::new("发烧", "发热", 0, 2), Issue::new("发烧", "发热", 5, 7)]);
		assert_eq!(store.ignore(&field(), "发烧"), 2);
		assert!(store.issues(&field()).is_empty());

		let kept = store.accept_check(
			&field(),
			vec![Issue::new("肚子疼", "腹痛", 3, 6), Issue::new("发烧", "发热", 0, 2)],
		);
		assert_eq!(kept, &[Issue::new("肚子疼", "腹痛", 3, 6)]);
	}

	#[test]
	fn clearing_keeps_ignored_originals() {
		let mut store = IssueAnnotationStore::new();
		store.accept_check(&field(), vec![Issue::new("发烧", "发热", 0, 2)]);
		store.ignore(&field(), "咳漱");
		assert_eq!(store.clear_all_issues(), vec![field()]);
		assert!(store.is_ignored(&field(), "咳漱"));

		store.reset();
		assert!(!store.is_ignored(&field(), "咳漱"));
	}

	#[test]
	fn check_results_are_sorted_by_start() {
		let mut store = IssueAnnotationStore::new();
		let kept = store.accept_check(&field(), vec![Issue::new("b", "B", 4, 5), Issue::new("a", "A", 0, 1)]);
		let starts: Vec<_> = kept.iter().map(|issue| issue.start).collect();
		assert_eq!(starts, vec![0, 4]);
	}

	/// Text of ASCII letters plus sorted, non-overlapping issues anchored in it.
	fn anchored_issues() -> impl Strategy<Value = (String, Vec<Issue>)> {
		("[a-z]{8,40}", prop::collection::vec((1usize..4, 0usize..3, "[A-Z]{0,5}"), 1..6)).prop_map(|(text, specs)| {
			let len = text.chars().count();
			let mut issues = Vec::new();
			let mut cursor = 0;
			for (width, gap, suggestion) in specs {
				let start = cursor + gap;
				let end = start + width;
				if end > len {
					break;
				}
				issues.push(Issue::new(&text[start..end], suggestion, start, end));
				cursor = end;
			}
			(text, issues)
		})
	}

	proptest! {
		#[test]
		fn remaining_issues_stay_anchored((text, issues) in anchored_issues(), pick in any::<prop::sample::Index>()) {
			prop_assume!(!issues.is_empty());
			let applied = issues[pick.index(issues.len())].clone();

			let mut store = IssueAnnotationStore::new();
			store.accept_check(&field(), issues.clone());
			let updated = store.apply(&field(), &text, &applied).unwrap();

			let remaining = store.issues(&field());
			prop_assert_eq!(remaining.len(), issues.len() - 1);
			for issue in remaining {
				prop_assert!(issue.anchors_in(&updated), "{issue:?} not anchored in {updated:?}");
			}
			for pair in remaining.windows(2) {
				prop_assert!(pair[0].end <= pair[1].start);
			}
		}
	}
}
