//! Single-task driver for an [`Assistant`].

use quill_primitives::{CharIdx, FieldId, Issue};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};

use crate::assistant::Assistant;
use crate::config::Settings;
use crate::events::AssistEvent;

/// One host-side input, serialized with an `op` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum HostInput {
	/// The user changed the field text. A missing caret means "at the end".
	Edit {
		field_id: FieldId,
		text: String,
		#[serde(default)]
		caret: Option<CharIdx>,
	},
	Caret { field_id: FieldId, caret: CharIdx },
	Focus {
		field_id: FieldId,
		#[serde(default)]
		caret: Option<CharIdx>,
	},
	Blur { field_id: FieldId },
	Accept { field_id: FieldId },
	ApplyIssue { field_id: FieldId, issue: Issue },
	IgnoreIssue { field_id: FieldId, original: String },
	ApplySuggestionItem { field_id: FieldId, index: usize },
	Transcript { text: String },
	Recording { active: bool },
	Summary { summary: String },
	Settings { settings: Settings },
	Reset,
	Metrics,
}

impl Assistant {
	/// Dispatches one host input.
	pub fn handle_input(&mut self, input: HostInput) {
		match input {
			HostInput::Edit { field_id, text, caret } => self.on_edit(&field_id, text, caret),
			HostInput::Caret { field_id, caret } => self.on_caret(&field_id, caret),
			HostInput::Focus { field_id, caret } => self.on_focus(&field_id, caret),
			HostInput::Blur { field_id } => self.on_blur(&field_id),
			HostInput::Accept { field_id } => {
				if !self.accept(&field_id) {
					tracing::trace!(field = %field_id, "ghost.accept_ignored");
				}
			}
			HostInput::ApplyIssue { field_id, issue } => {
				if let Err(error) = self.apply_issue(&field_id, &issue) {
					tracing::warn!(field = %field_id, error = %error, "terminology.apply_failed");
				}
			}
			HostInput::IgnoreIssue { field_id, original } => self.ignore_issue(&field_id, &original),
			HostInput::ApplySuggestionItem { field_id, index } => {
				if !self.apply_suggestion_item(&field_id, index) {
					tracing::debug!(field = %field_id, index, "suggestion_item.missing");
				}
			}
			HostInput::Transcript { text } => self.on_transcript(text),
			HostInput::Recording { active } => self.set_recording(active),
			HostInput::Summary { summary } => self.set_summary(summary),
			HostInput::Settings { settings } => self.update_settings(settings),
			HostInput::Reset => self.reset_session(),
			HostInput::Metrics => {
				let metrics = self.metrics_snapshot();
				self.emit(AssistEvent::Metrics { metrics });
			}
		}
	}
}

/// Drives `assistant` until `inputs` closes, then returns it.
///
/// Inputs, remote replies, and timer deadlines are handled one at a time, so
/// no per-field state is ever touched concurrently.
pub async fn run(mut assistant: Assistant, mut inputs: mpsc::Receiver<HostInput>) -> Assistant {
	tracing::debug!("assist.run");
	loop {
		let deadline = assistant.next_deadline();
		let wake_at = deadline.unwrap_or_else(Instant::now);
		tokio::select! {
			input = inputs.recv() => match input {
				Some(input) => assistant.handle_input(input),
				None => break,
			},
			Some(response) = assistant.next_response() => assistant.handle_response(response),
			() = sleep_until(wake_at), if deadline.is_some() => {}
		}
		assistant.poll_timers();
	}
	tracing::debug!("assist.stopped");
	assistant
}

#[cfg(test)]
mod tests;
