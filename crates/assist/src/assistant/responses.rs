//! Reply handling.
//!
//! A reply is applied only if it still describes the present: same session
//! epoch, and for field-scoped replies the same text (plus focus, caret, and
//! request generation for completions). Anything else is dropped silently.

use quill_primitives::{FieldId, Issue};
use quill_service::{CompletionResponse, DraftResponse, ServiceError, SummaryResponse, TerminologyResponse};
use quill_worker::{EpochStamp, QueueError};

use super::Assistant;
use crate::events::{AssistEvent, AssistResponse};
use crate::field::FieldState;
use crate::validate::strip_echoed_prompt;

impl Assistant {
	pub(crate) fn handle_response(&mut self, response: AssistResponse) {
		match response {
			AssistResponse::Completion {
				field,
				stamp,
				generation,
				prompt,
				result,
			} => self.handle_completion(field, stamp, generation, prompt, result),
			AssistResponse::Draft { field, stamp, outcome } => self.handle_draft(field, stamp, outcome),
			AssistResponse::Terminology { field, stamp, text, result } => self.handle_terminology(field, stamp, text, result),
			AssistResponse::Summary { stamp, processed_to, result } => self.handle_summary(stamp, processed_to, result),
		}
	}

	fn handle_completion(
		&mut self,
		field: FieldId,
		stamp: EpochStamp,
		generation: u64,
		prompt: String,
		result: Result<CompletionResponse, ServiceError>,
	) {
		if !self.epoch.is_current(stamp) {
			tracing::trace!(field = %field, epoch = stamp.get(), "ghost.stale_epoch");
			return;
		}
		let reply = match result {
			Ok(reply) => reply,
			Err(error) => {
				tracing::warn!(field = %field, generation, transport = error.is_transport(), error = %error, "ghost.request_failed");
				self.ghost.abandon(&field, generation);
				return;
			}
		};

		let current = self
			.fields
			.get(&field)
			.is_some_and(|state| state.focused && state.text == prompt && state.caret_at_end());
		if !current {
			tracing::trace!(field = %field, generation, "ghost.stale_field");
			self.ghost.abandon(&field, generation);
			return;
		}

		let suggestion = strip_echoed_prompt(&prompt, &reply.completion);
		if !self.settings.ghost_text || !self.validator.is_valid_draft(suggestion) {
			tracing::trace!(field = %field, generation, "ghost.rejected");
			self.ghost.abandon(&field, generation);
			return;
		}

		let suggestion = suggestion.to_string();
		if !self.ghost.resolve(&field, generation, suggestion.clone()) {
			tracing::trace!(field = %field, generation, "ghost.superseded");
			return;
		}
		self.emit(AssistEvent::GhostStateChanged {
			field_id: field,
			user_text: prompt,
			suggestion,
		});
	}

	fn handle_draft(&mut self, field: FieldId, stamp: EpochStamp, outcome: Result<Option<DraftResponse>, QueueError<ServiceError>>) {
		if !self.epoch.is_current(stamp) {
			tracing::trace!(field = %field, epoch = stamp.get(), "draft.stale_epoch");
			return;
		}
		let reply = match outcome {
			Ok(Some(reply)) => reply,
			Ok(None) => {
				tracing::trace!(field = %field, "draft.skipped");
				return;
			}
			Err(error) => {
				tracing::warn!(field = %field, error = %error, "draft.request_failed");
				return;
			}
		};
		if !self.fields.get(&field).is_none_or(FieldState::is_untouched_empty) {
			tracing::trace!(field = %field, "draft.field_touched");
			return;
		}

		if self.settings.ghost_text && self.validator.is_valid_draft(&reply.draft) && self.ghost.offer_draft(&field, reply.draft.clone()) {
			let user_text = self.fields.get(&field).map(|state| state.text.clone()).unwrap_or_default();
			self.emit(AssistEvent::GhostStateChanged {
				field_id: field.clone(),
				user_text,
				suggestion: reply.draft,
			});
		}

		let items = self.validator.filter_items(reply.suggestions);
		if !items.is_empty() {
			tracing::debug!(field = %field, items = items.len(), "draft.items");
			self.items.set(&field, items.clone());
			self.emit(AssistEvent::SuggestionItemsAvailable { field_id: field, items });
		}
	}

	fn handle_terminology(&mut self, field: FieldId, stamp: EpochStamp, text: String, result: Result<TerminologyResponse, ServiceError>) {
		if !self.epoch.is_current(stamp) {
			tracing::trace!(field = %field, epoch = stamp.get(), "terminology.stale_epoch");
			return;
		}
		let reply = match result {
			Ok(reply) => reply,
			Err(error) => {
				tracing::warn!(field = %field, transport = error.is_transport(), error = %error, "terminology.request_failed");
				return;
			}
		};
		if self.fields.get(&field).is_none_or(|state| state.text != text) {
			tracing::trace!(field = %field, "terminology.stale_text");
			return;
		}
		if !self.settings.terminology {
			return;
		}

		let received = reply.issues.len();
		let anchored: Vec<Issue> = reply.issues.into_iter().filter(|issue| issue.anchors_in(&text)).collect();
		if anchored.len() < received {
			tracing::debug!(field = %field, dropped = received - anchored.len(), "terminology.unanchored");
		}
		let kept = self.issues.accept_check(&field, anchored).len();
		tracing::debug!(field = %field, issues = kept, "terminology.result");
		self.emit_issues(&field);
	}

	fn handle_summary(&mut self, stamp: EpochStamp, processed_to: usize, result: Result<SummaryResponse, ServiceError>) {
		if !self.epoch.is_current(stamp) {
			tracing::trace!(epoch = stamp.get(), "summary.stale_epoch");
			return;
		}
		self.summary.finish();
		let reply = match result {
			Ok(reply) => reply,
			Err(error) => {
				tracing::warn!(transport = error.is_transport(), error = %error, "summary.request_failed");
				return;
			}
		};
		if !self.summary.apply(processed_to, reply.updated_summary) {
			return;
		}
		self.emit(AssistEvent::SummaryUpdated {
			summary: self.summary.summary().to_string(),
		});
		self.trigger_drafts();
	}
}
