//! Per-field hybrid debounce for terminology checks.
//!
//! Each field has a quiet-period timer, reset on every edit, and a max-wait
//! timer, started by the first edit of a burst and never reset. Whichever
//! deadline passes first fires the check and clears both.
//!
//! Deadlines are plain instants. The owner polls [`HybridDebounceScheduler::take_due`]
//! and sleeps until [`HybridDebounceScheduler::next_deadline`].

use std::collections::HashMap;
use std::time::Duration;

use quill_primitives::FieldId;
use tokio::time::Instant;

/// Which timer fired a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckTrigger {
	/// The field was quiet for the debounce period.
	Quiet,
	/// Edits kept coming until the max-wait ceiling.
	MaxWait,
}

/// A check that is due now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueCheck {
	pub field: FieldId,
	pub trigger: CheckTrigger,
	pub deadline: Instant,
}

#[derive(Debug, Clone, Copy)]
struct FieldTimers {
	quiet_at: Instant,
	max_wait_at: Instant,
}

impl FieldTimers {
	fn due(&self) -> (Instant, CheckTrigger) {
		if self.max_wait_at <= self.quiet_at {
			(self.max_wait_at, CheckTrigger::MaxWait)
		} else {
			(self.quiet_at, CheckTrigger::Quiet)
		}
	}
}

/// Hybrid debounce/max-wait scheduler keyed by field.
#[derive(Debug)]
pub struct HybridDebounceScheduler {
	debounce: Duration,
	max_wait: Duration,
	timers: HashMap<FieldId, FieldTimers>,
}

impl HybridDebounceScheduler {
	pub fn new(debounce: Duration, max_wait: Duration) -> Self {
		Self {
			debounce,
			max_wait,
			timers: HashMap::new(),
		}
	}

	/// Records a qualifying edit: resets the quiet timer and starts the
	/// max-wait timer if it is not already running.
	pub fn on_edit(&mut self, field: &FieldId, now: Instant) {
		let quiet_at = now + self.debounce;
		match self.timers.get_mut(field) {
			Some(timers) => timers.quiet_at = quiet_at,
			None => {
				self.timers.insert(
					field.clone(),
					FieldTimers {
						quiet_at,
						max_wait_at: now + self.max_wait,
					},
				);
			}
		}
	}

	/// Clears both timers for `field`. Returns true if any were running.
	pub fn cancel(&mut self, field: &FieldId) -> bool {
		self.timers.remove(field).is_some()
	}

	/// Clears every field's timers.
	pub fn clear(&mut self) {
		self.timers.clear();
	}

	pub fn is_scheduled(&self, field: &FieldId) -> bool {
		self.timers.contains_key(field)
	}

	/// Removes and returns every check whose earlier deadline is at or before
	/// `now`, ordered by deadline.
	pub fn take_due(&mut self, now: Instant) -> Vec<DueCheck> {
		let mut due: Vec<DueCheck> = self
			.timers
			.iter()
			.filter_map(|(field, timers)| {
				let (deadline, trigger) = timers.due();
				(deadline <= now).then(|| DueCheck {
					field: field.clone(),
					trigger,
					deadline,
				})
			})
			.collect();
		for check in &due {
			self.timers.remove(&check.field);
		}
		due.sort_by(|a, b| a.deadline.cmp(&b.deadline).then_with(|| a.field.cmp(&b.field)));
		due
	}

	/// Earliest pending deadline across all fields.
	pub fn next_deadline(&self) -> Option<Instant> {
		self.timers.values().map(|timers| timers.due().0).min()
	}
}
