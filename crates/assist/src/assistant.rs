//! The assist coordinator.
//!
//! [`Assistant`] is owned by a single task. Host inputs mutate its field
//! mirrors synchronously; remote calls are spawned and report back through an
//! internal channel, and every reply is re-checked against the session epoch
//! and the field's current state before it is applied.

use std::collections::HashMap;
use std::sync::Arc;

use quill_primitives::{CharIdx, FieldId, Issue, char_len};
use quill_service::AssistService;
use quill_worker::{BoundedTaskQueue, SessionEpoch};
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::config::{AssistConfig, ConfigError, Settings};
use crate::debounce::HybridDebounceScheduler;
use crate::events::{AssistEvent, AssistResponse};
use crate::field::FieldState;
use crate::ghost::GhostSuggestionController;
use crate::issues::{IssueAnnotationStore, IssueError};
use crate::metrics::{MetricsTracker, UsageMetrics};
use crate::suggestions::{SuggestionItems, insert_item};
use crate::summary::SummaryTracker;
use crate::validate::ContentValidator;

mod kick;
mod responses;

/// Coordinates ghost text, terminology checks, drafts, and summaries for a
/// set of fields.
pub struct Assistant {
	config: AssistConfig,
	settings: Settings,
	service: Arc<dyn AssistService>,
	events: mpsc::UnboundedSender<AssistEvent>,
	responses_tx: mpsc::UnboundedSender<AssistResponse>,
	responses: mpsc::UnboundedReceiver<AssistResponse>,
	epoch: SessionEpoch,
	drafts: BoundedTaskQueue,
	validator: ContentValidator,
	fields: HashMap<FieldId, FieldState>,
	debounce: HybridDebounceScheduler,
	ghost: GhostSuggestionController,
	issues: IssueAnnotationStore,
	items: SuggestionItems,
	summary: SummaryTracker,
	metrics: MetricsTracker,
}

impl std::fmt::Debug for Assistant {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Assistant")
			.field("settings", &self.settings)
			.field("epoch", &self.epoch.stamp())
			.field("drafts", &self.drafts)
			.field("fields", &self.fields.len())
			.finish_non_exhaustive()
	}
}

impl Assistant {
	/// Creates a coordinator that emits renderer updates on `events`.
	pub fn new(config: AssistConfig, service: Arc<dyn AssistService>, events: mpsc::UnboundedSender<AssistEvent>) -> Result<Self, ConfigError> {
		config.validate()?;
		let validator = ContentValidator::from_config(&config)?;
		let (responses_tx, responses) = mpsc::unbounded_channel();
		Ok(Self {
			settings: config.settings,
			service,
			events,
			responses_tx,
			responses,
			epoch: SessionEpoch::new(),
			drafts: BoundedTaskQueue::new("drafts", config.draft_concurrency),
			validator,
			fields: HashMap::new(),
			debounce: HybridDebounceScheduler::new(config.timing.debounce(), config.timing.max_wait()),
			ghost: GhostSuggestionController::new(config.timing.ghost_delay()),
			issues: IssueAnnotationStore::new(),
			items: SuggestionItems::new(),
			summary: SummaryTracker::new(config.timing.summary_interval(), config.transcript_placeholders.clone()),
			metrics: MetricsTracker::new(),
			config,
		})
	}

	pub fn config(&self) -> &AssistConfig {
		&self.config
	}

	pub fn settings(&self) -> Settings {
		self.settings
	}

	pub fn epoch(&self) -> &SessionEpoch {
		&self.epoch
	}

	pub fn field(&self, field: &FieldId) -> Option<&FieldState> {
		self.fields.get(field)
	}

	/// The visible ghost suggestion for `field`.
	pub fn suggestion(&self, field: &FieldId) -> Option<&str> {
		self.ghost.suggestion(field)
	}

	pub fn issues(&self, field: &FieldId) -> &[Issue] {
		self.issues.issues(field)
	}

	pub fn suggestion_items(&self, field: &FieldId) -> &[String] {
		self.items.get(field)
	}

	pub fn summary(&self) -> &str {
		self.summary.summary()
	}

	/// Handles a user edit. `caret` defaults to the end of `text`.
	pub fn on_edit(&mut self, field: &FieldId, text: String, caret: Option<CharIdx>) {
		let now = Instant::now();
		self.focus(field);
		let state = self.fields.entry(field.clone()).or_default();
		let before = state.len_chars();
		state.set_text(text, caret);
		state.touched = true;
		let after = state.len_chars();
		self.metrics.record_edit(before, after, now);
		self.after_edit(field, now);
	}

	/// Handles a caret move without a text change.
	pub fn on_caret(&mut self, field: &FieldId, caret: CharIdx) {
		let Some(state) = self.fields.get_mut(field) else {
			return;
		};
		state.caret = caret.min(state.len_chars());
		if !state.caret_at_end() && self.ghost.invalidate(field) {
			self.emit_ghost_cleared(field);
		}
	}

	/// Marks `field` focused, blurring whichever field held focus.
	pub fn on_focus(&mut self, field: &FieldId, caret: Option<CharIdx>) {
		self.focus(field);
		if let Some(caret) = caret {
			self.on_caret(field, caret);
		}
	}

	pub fn on_blur(&mut self, field: &FieldId) {
		if let Some(state) = self.fields.get_mut(field) {
			state.focused = false;
		}
		if self.ghost.invalidate(field) {
			self.emit_ghost_cleared(field);
		}
	}

	/// Inserts the visible suggestion at the end of the field.
	///
	/// Returns false, changing nothing, unless ghost text is enabled, the
	/// caret is at the end, and a suggestion is visible.
	pub fn accept(&mut self, field: &FieldId) -> bool {
		if !self.settings.ghost_text || !self.fields.get(field).is_some_and(FieldState::caret_at_end) {
			return false;
		}
		let Some(suggestion) = self.ghost.accept(field) else {
			return false;
		};

		let state = self.fields.entry(field.clone()).or_default();
		let mut text = std::mem::take(&mut state.text);
		text.push_str(&suggestion);
		state.set_text(text, None);
		state.touched = true;
		self.metrics.record_ghost(char_len(&suggestion));
		tracing::debug!(field = %field, chars = char_len(&suggestion), "ghost.accept");

		self.emit_ghost_cleared(field);
		self.emit_text(field);
		self.after_edit(field, Instant::now());
		true
	}

	/// Splices `issue` into the field and re-indexes the remaining issues.
	///
	/// The issue list is re-emitted before the text change, and the edit then
	/// re-arms the check timers for the new text.
	pub fn apply_issue(&mut self, field: &FieldId, issue: &Issue) -> Result<(), IssueError> {
		self.debounce.cancel(field);
		let current = self.fields.get(field).map_or("", |state| state.text.as_str());
		let updated = self.issues.apply(field, current, issue)?;
		tracing::debug!(field = %field, original = %issue.original, "terminology.apply");
		self.emit_issues(field);

		let state = self.fields.entry(field.clone()).or_default();
		state.set_text(updated, None);
		state.touched = true;
		self.emit_text(field);
		self.after_edit(field, Instant::now());
		Ok(())
	}

	/// Dismisses every issue flagging `original`, now and in later checks.
	pub fn ignore_issue(&mut self, field: &FieldId, original: &str) {
		self.debounce.cancel(field);
		let removed = self.issues.ignore(field, original);
		tracing::debug!(field = %field, original, removed, "terminology.ignore");
		self.emit_issues(field);
	}

	/// Inserts suggestion item `index` after the caret's line.
	pub fn apply_suggestion_item(&mut self, field: &FieldId, index: usize) -> bool {
		let Some(item) = self.items.take(field, index) else {
			return false;
		};
		let state = self.fields.entry(field.clone()).or_default();
		let (text, caret) = insert_item(&state.text, state.caret, &item);
		state.set_text(text, Some(caret));
		state.touched = true;

		self.emit_text(field);
		self.emit(AssistEvent::SuggestionItemsAvailable {
			field_id: field.clone(),
			items: self.items.get(field).to_vec(),
		});
		self.after_edit(field, Instant::now());
		true
	}

	/// Replaces the running transcript.
	pub fn on_transcript(&mut self, transcript: String) {
		self.summary.on_transcript(transcript);
	}

	pub fn set_recording(&mut self, recording: bool) {
		let now = Instant::now();
		self.summary.set_recording(recording, now);
		if recording {
			self.metrics.start(now);
		}
		tracing::debug!(recording, "summary.recording");
	}

	/// Replaces the shared summary and drafts for empty fields.
	pub fn set_summary(&mut self, summary: String) {
		self.summary.set_summary(summary.clone());
		self.emit(AssistEvent::SummaryUpdated { summary });
		self.trigger_drafts();
	}

	/// Applies new feature toggles. Turning a feature off clears its state.
	pub fn update_settings(&mut self, settings: Settings) {
		let previous = std::mem::replace(&mut self.settings, settings);
		if previous.ghost_text && !settings.ghost_text {
			for field in self.ghost.clear() {
				self.emit_ghost_cleared(&field);
			}
		}
		if previous.terminology && !settings.terminology {
			self.debounce.clear();
			for field in self.issues.clear_all_issues() {
				self.emit_issues(&field);
			}
		}
		tracing::debug!(?settings, "assist.settings");
	}

	/// Starts a new session: in-flight results are invalidated and every
	/// field's assist state is cleared.
	pub fn reset_session(&mut self) {
		let epoch = self.epoch.begin_new_session();
		self.debounce.clear();
		let known = self.known_fields();

		self.ghost.clear();
		self.issues.reset();
		self.items.clear();
		self.summary.clear();
		self.metrics.reset();
		for state in self.fields.values_mut() {
			*state = FieldState {
				focused: state.focused,
				..FieldState::default()
			};
		}

		for field in known {
			self.emit(AssistEvent::ghost_cleared(field.clone(), ""));
			self.emit(AssistEvent::IssuesChanged {
				field_id: field.clone(),
				issues: Vec::new(),
			});
			self.emit(AssistEvent::SuggestionItemsAvailable {
				field_id: field,
				items: Vec::new(),
			});
		}
		self.emit(AssistEvent::SummaryUpdated { summary: String::new() });
		tracing::info!(epoch = epoch.get(), "assist.reset");
	}

	pub fn metrics_snapshot(&self) -> UsageMetrics {
		let total = self.fields.values().map(FieldState::len_chars).sum();
		self.metrics.snapshot(Instant::now(), total)
	}

	/// Fires every timer that is due.
	pub fn poll_timers(&mut self) {
		let now = Instant::now();
		for field in self.ghost.take_due(now) {
			self.kick_completion(&field);
		}
		for check in self.debounce.take_due(now) {
			tracing::trace!(field = %check.field, trigger = ?check.trigger, "terminology.due");
			self.kick_check(&check.field, now);
		}
		if let Some(job) = self.summary.take_due(now, self.settings.auto_summary) {
			self.kick_summary(job);
		}
	}

	/// Earliest timer deadline, if any timer is running.
	pub fn next_deadline(&self) -> Option<Instant> {
		[self.ghost.next_deadline(), self.debounce.next_deadline(), self.summary.next_deadline()]
			.into_iter()
			.flatten()
			.min()
	}

	/// Applies every reply that has already arrived. Returns how many.
	pub fn drain_responses(&mut self) -> usize {
		let mut handled = 0;
		while let Ok(response) = self.responses.try_recv() {
			self.handle_response(response);
			handled += 1;
		}
		handled
	}

	pub(crate) async fn next_response(&mut self) -> Option<AssistResponse> {
		self.responses.recv().await
	}

	fn focus(&mut self, field: &FieldId) {
		let blurred: Vec<FieldId> = self
			.fields
			.iter_mut()
			.filter(|(id, state)| state.focused && *id != field)
			.map(|(id, state)| {
				state.focused = false;
				id.clone()
			})
			.collect();
		for other in blurred {
			if self.ghost.invalidate(&other) {
				self.emit_ghost_cleared(&other);
			}
		}
		self.fields.entry(field.clone()).or_default().focused = true;
	}

	/// Common tail of every text change: resets ghost state and reschedules
	/// the terminology check.
	fn after_edit(&mut self, field: &FieldId, now: Instant) {
		let Some(state) = self.fields.get(field) else {
			return;
		};
		let arm = self.settings.ghost_text && state.caret_at_end();
		let long_enough = char_len(state.text.trim()) >= self.config.min_check_chars;

		if self.ghost.on_edit(field, arm, now) {
			self.emit_ghost_cleared(field);
		}

		if !self.settings.terminology {
			return;
		}
		if long_enough {
			self.debounce.on_edit(field, now);
		} else {
			self.debounce.cancel(field);
			if self.issues.clear_issues(field) {
				self.emit_issues(field);
			}
		}
	}

	/// Configured fields in order, then any other field seen this session.
	fn known_fields(&self) -> Vec<FieldId> {
		let mut known = self.config.fields.clone();
		let mut extra: Vec<FieldId> = self
			.fields
			.keys()
			.cloned()
			.chain(self.issues.fields())
			.filter(|field| !known.contains(field))
			.collect();
		extra.sort();
		extra.dedup();
		known.extend(extra);
		known
	}

	pub(crate) fn emit(&self, event: AssistEvent) {
		if self.events.send(event).is_err() {
			tracing::trace!("assist.event_dropped");
		}
	}

	fn emit_ghost_cleared(&self, field: &FieldId) {
		let text = self.fields.get(field).map_or("", |state| state.text.as_str());
		self.emit(AssistEvent::ghost_cleared(field.clone(), text));
	}

	fn emit_issues(&self, field: &FieldId) {
		self.emit(AssistEvent::IssuesChanged {
			field_id: field.clone(),
			issues: self.issues.issues(field).to_vec(),
		});
	}

	fn emit_text(&self, field: &FieldId) {
		if let Some(state) = self.fields.get(field) {
			self.emit(AssistEvent::TextChanged {
				field_id: field.clone(),
				text: state.text.clone(),
				caret: state.caret,
			});
		}
	}
}
