//! Events flowing out of and back into the coordinator.

use quill_primitives::{CharIdx, FieldId, Issue};
use quill_service::{CompletionResponse, DraftResponse, ServiceError, SummaryResponse, TerminologyResponse};
use quill_worker::{EpochStamp, QueueError};
use serde::{Deserialize, Serialize};

use crate::metrics::UsageMetrics;

/// Renderer-facing notification.
///
/// Serialized with an `event` tag, e.g. `{"event":"issues_changed",...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AssistEvent {
	/// Ghost text for a field changed. An empty `suggestion` means cleared.
	GhostStateChanged {
		field_id: FieldId,
		user_text: String,
		suggestion: String,
	},
	/// The field's issue list was replaced.
	IssuesChanged { field_id: FieldId, issues: Vec<Issue> },
	/// Discrete suggestion items for the field. Empty means none remain.
	SuggestionItemsAvailable { field_id: FieldId, items: Vec<String> },
	/// The coordinator changed the field text (accept, apply, item insertion).
	TextChanged { field_id: FieldId, text: String, caret: CharIdx },
	/// The shared transcript summary changed.
	SummaryUpdated { summary: String },
	/// Reply to a metrics request.
	Metrics { metrics: UsageMetrics },
}

impl AssistEvent {
	pub fn ghost_cleared(field_id: FieldId, user_text: impl Into<String>) -> Self {
		Self::GhostStateChanged {
			field_id,
			user_text: user_text.into(),
			suggestion: String::new(),
		}
	}

	/// The field this event concerns, if any.
	pub fn field_id(&self) -> Option<&FieldId> {
		match self {
			Self::GhostStateChanged { field_id, .. }
			| Self::IssuesChanged { field_id, .. }
			| Self::SuggestionItemsAvailable { field_id, .. }
			| Self::TextChanged { field_id, .. } => Some(field_id),
			Self::SummaryUpdated { .. } | Self::Metrics { .. } => None,
		}
	}
}

/// Completed remote call, delivered back to the coordinator.
///
/// Every variant carries what the coordinator needs to decide whether the
/// reply is still relevant.
#[derive(Debug)]
pub(crate) enum AssistResponse {
	Completion {
		field: FieldId,
		stamp: EpochStamp,
		generation: u64,
		prompt: String,
		result: Result<CompletionResponse, ServiceError>,
	},
	Draft {
		field: FieldId,
		stamp: EpochStamp,
		/// `Ok(None)` when the session moved on before the draft was admitted.
		outcome: Result<Option<DraftResponse>, QueueError<ServiceError>>,
	},
	Terminology {
		field: FieldId,
		stamp: EpochStamp,
		text: String,
		result: Result<TerminologyResponse, ServiceError>,
	},
	Summary {
		stamp: EpochStamp,
		processed_to: usize,
		result: Result<SummaryResponse, ServiceError>,
	},
}
