//! Running transcript summary.
//!
//! While recording, a periodic tick sends the untranscribed tail of the
//! transcript together with the current summary to the summary service. The
//! processed length only advances when a reply is applied, so a failed call
//! resends the same tail on the next tick.

use std::time::Duration;

use tokio::time::Instant;

/// One summary call's inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryJob {
	pub current_summary: String,
	pub new_text: String,
	/// Transcript byte length covered once this job's reply is applied.
	pub processed_to: usize,
}

#[derive(Debug)]
pub struct SummaryTracker {
	interval: Duration,
	placeholders: Vec<String>,
	transcript: String,
	processed: usize,
	summary: String,
	recording: bool,
	next_tick: Option<Instant>,
	in_flight: bool,
}

impl SummaryTracker {
	pub fn new(interval: Duration, placeholders: Vec<String>) -> Self {
		Self {
			interval,
			placeholders,
			transcript: String::new(),
			processed: 0,
			summary: String::new(),
			recording: false,
			next_tick: None,
			in_flight: false,
		}
	}

	pub fn summary(&self) -> &str {
		&self.summary
	}

	/// Replaces the summary, e.g. when the host loads a case.
	pub fn set_summary(&mut self, summary: String) {
		self.summary = summary;
	}

	/// Replaces the transcript with the host's full current text.
	pub fn on_transcript(&mut self, transcript: String) {
		if transcript.len() < self.processed || !transcript.is_char_boundary(self.processed) {
			self.processed = 0;
		}
		self.transcript = transcript;
	}

	/// Starts or stops the periodic tick.
	pub fn set_recording(&mut self, recording: bool, now: Instant) {
		self.recording = recording;
		self.next_tick = recording.then(|| now + self.interval);
	}

	pub fn next_deadline(&self) -> Option<Instant> {
		self.next_tick
	}

	/// Advances the tick if due and returns a job when there is new text.
	///
	/// The tick keeps its period even when nothing is sent.
	pub fn take_due(&mut self, now: Instant, enabled: bool) -> Option<SummaryJob> {
		let tick = self.next_tick?;
		if tick > now {
			return None;
		}
		self.next_tick = Some(now + self.interval);
		if !enabled || self.in_flight {
			return None;
		}

		let tail = self.transcript.get(self.processed..)?;
		if tail.trim().is_empty() || self.placeholders.iter().any(|marker| tail.contains(marker.as_str())) {
			return None;
		}
		self.in_flight = true;
		Some(SummaryJob {
			current_summary: self.summary.clone(),
			new_text: tail.to_string(),
			processed_to: self.transcript.len(),
		})
	}

	/// Marks the in-flight job as finished, whatever its outcome.
	pub fn finish(&mut self) {
		self.in_flight = false;
	}

	/// Applies a reply. Blank summaries are ignored and leave the tail pending.
	pub fn apply(&mut self, processed_to: usize, updated: String) -> bool {
		if updated.trim().is_empty() {
			return false;
		}
		self.summary = updated;
		self.processed = processed_to.min(self.transcript.len());
		true
	}

	/// Forgets transcript, summary, and progress, and stops the tick.
	pub fn clear(&mut self) {
		self.transcript.clear();
		self.processed = 0;
		self.summary.clear();
		self.recording = false;
		self.next_tick = None;
		self.in_flight = false;
	}
}
