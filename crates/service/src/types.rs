use quill_primitives::{FieldId, Issue};
use serde::{Deserialize, Serialize};

/// Body of a completion call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRequest {
	pub field_id: FieldId,
	pub current_text: String,
}

/// Completion reply. `completion` may repeat `current_text` as a prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResponse {
	#[serde(default)]
	pub completion: String,
}

/// Body of a draft call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftRequest {
	pub summary: String,
	pub field_id: FieldId,
}

/// Draft reply, optionally carrying discrete suggestion items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftResponse {
	#[serde(default)]
	pub draft: String,
	#[serde(default)]
	pub suggestions: Vec<String>,
}

/// Body of a summary call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRequest {
	pub current_summary: String,
	pub new_text: String,
}

/// Summary reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResponse {
	#[serde(default)]
	pub updated_summary: String,
}

/// Body of a terminology check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminologyRequest {
	pub text: String,
}

/// Terminology reply: sorted, non-overlapping issues against the checked text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminologyResponse {
	#[serde(default)]
	pub issues: Vec<Issue>,
}
