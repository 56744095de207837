use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Usage counters comparing assisted and manual input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageMetrics {
	pub total_duration_seconds: u64,
	pub ghost_text_count: u64,
	pub ghost_text_chars: u64,
	pub manual_input_chars: u64,
	pub deleted_chars: u64,
	pub total_chars: u64,
}

/// Accumulates [`UsageMetrics`] for one session.
///
/// Only host-reported edits count as manual input; text inserted by accept,
/// apply, or suggestion items never does.
#[derive(Debug, Default)]
pub struct MetricsTracker {
	started_at: Option<Instant>,
	ghost_text_count: u64,
	ghost_text_chars: u64,
	manual_input_chars: u64,
	deleted_chars: u64,
}

impl MetricsTracker {
	pub fn new() -> Self {
		Self::default()
	}

	/// Starts the duration clock if it is not running.
	pub fn start(&mut self, now: Instant) {
		self.started_at.get_or_insert(now);
	}

	/// Records a manual edit from `before_chars` to `after_chars`.
	pub fn record_edit(&mut self, before_chars: usize, after_chars: usize, now: Instant) {
		self.start(now);
		if after_chars >= before_chars {
			self.manual_input_chars += (after_chars - before_chars) as u64;
		} else {
			self.deleted_chars += (before_chars - after_chars) as u64;
		}
	}

	/// Records an accepted ghost suggestion of `chars` chars.
	pub fn record_ghost(&mut self, chars: usize) {
		self.ghost_text_count += 1;
		self.ghost_text_chars += chars as u64;
	}

	pub fn snapshot(&self, now: Instant, total_chars: usize) -> UsageMetrics {
		UsageMetrics {
			total_duration_seconds: self.started_at.map_or(0, |start| now.saturating_duration_since(start).as_secs()),
			ghost_text_count: self.ghost_text_count,
			ghost_text_chars: self.ghost_text_chars,
			manual_input_chars: self.manual_input_chars,
			deleted_chars: self.deleted_chars,
			total_chars: total_chars as u64,
		}
	}

	pub fn reset(&mut self) {
		*self = Self::default();
	}
}
