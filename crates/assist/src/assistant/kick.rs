//! Remote call spawning.
//!
//! These methods spawn fire-and-forget tasks that send an [`AssistResponse`]
//! on completion. The owner drains responses and applies them to its state.

use std::sync::Arc;

use quill_primitives::{FieldId, char_len};
use quill_service::{CompletionRequest, DraftRequest, SummaryRequest, TerminologyRequest};
use quill_worker::{TaskClass, spawn};
use tokio::sync::mpsc;
use tokio::time::Instant;

use super::Assistant;
use crate::events::AssistResponse;
use crate::field::FieldState;
use crate::summary::SummaryJob;

impl Assistant {
	/// Requests drafts for every configured field that is empty and untouched.
	///
	/// Drafts go through the shared draft queue; a draft admitted after a
	/// session reset skips its remote call.
	pub fn trigger_drafts(&mut self) {
		if !self.settings.ghost_text {
			return;
		}
		let summary = self.summary.summary().to_string();
		if summary.trim().is_empty() {
			return;
		}
		let targets: Vec<FieldId> = self
			.config
			.fields
			.iter()
			.filter(|field| self.fields.get(*field).is_none_or(FieldState::is_untouched_empty))
			.cloned()
			.collect();
		tracing::debug!(fields = targets.len(), "draft.trigger");
		for field in targets {
			self.kick_draft(field, summary.clone());
		}
	}

	pub(super) fn kick_completion(&mut self, field: &FieldId) {
		if !self.settings.ghost_text {
			return;
		}
		let Some(state) = self.fields.get(field) else {
			return;
		};
		if !state.caret_at_end() || state.text.trim().is_empty() {
			return;
		}
		let prompt = state.text.clone();
		let generation = self.ghost.begin_request(field);
		let stamp = self.epoch.stamp();
		tracing::debug!(field = %field, generation, chars = char_len(&prompt), "ghost.request");

		let service = Arc::clone(&self.service);
		let tx = self.responses_tx.clone();
		let field = field.clone();
		spawn(TaskClass::Interactive, async move {
			let request = CompletionRequest {
				field_id: field.clone(),
				current_text: prompt.clone(),
			};
			let result = service.complete(request).await;
			send(
				&tx,
				AssistResponse::Completion {
					field,
					stamp,
					generation,
					prompt,
					result,
				},
			);
		});
	}

	pub(super) fn kick_check(&mut self, field: &FieldId, now: Instant) {
		if !self.settings.terminology {
			return;
		}
		let Some(state) = self.fields.get(field) else {
			return;
		};
		if char_len(state.text.trim()) < self.config.min_check_chars {
			return;
		}
		let text = state.text.clone();
		let stamp = self.epoch.stamp();
		self.issues.record_check(field, now);
		tracing::debug!(field = %field, chars = char_len(&text), "terminology.request");

		let service = Arc::clone(&self.service);
		let tx = self.responses_tx.clone();
		let field = field.clone();
		spawn(TaskClass::Background, async move {
			let result = service.check_terminology(TerminologyRequest { text: text.clone() }).await;
			send(&tx, AssistResponse::Terminology { field, stamp, text, result });
		});
	}

	pub(super) fn kick_draft(&self, field: FieldId, summary: String) {
		let stamp = self.epoch.stamp();
		let epoch = self.epoch.clone();
		let service = Arc::clone(&self.service);
		let request_field = field.clone();
		let queued = self.drafts.enqueue(async move {
			if !epoch.is_current(stamp) {
				return Ok(None);
			}
			service
				.draft(DraftRequest {
					summary,
					field_id: request_field,
				})
				.await
				.map(Some)
		});

		let tx = self.responses_tx.clone();
		spawn(TaskClass::Background, async move {
			let outcome = queued.await;
			send(&tx, AssistResponse::Draft { field, stamp, outcome });
		});
	}

	pub(super) fn kick_summary(&self, job: SummaryJob) {
		let stamp = self.epoch.stamp();
		let processed_to = job.processed_to;
		tracing::debug!(chars = char_len(&job.new_text), "summary.request");

		let service = Arc::clone(&self.service);
		let tx = self.responses_tx.clone();
		spawn(TaskClass::Background, async move {
			let request = SummaryRequest {
				current_summary: job.current_summary,
				new_text: job.new_text,
			};
			let result = service.summarize(request).await;
			send(&tx, AssistResponse::Summary { stamp, processed_to, result });
		});
	}
}

fn send(tx: &mpsc::UnboundedSender<AssistResponse>, response: AssistResponse) {
	if tx.send(response).is_err() {
		tracing::trace!("assist.response_dropped");
	}
}
