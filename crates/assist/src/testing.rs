//! Scripted service and harness shared by the coordinator tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use quill_primitives::{FieldId, Issue};
use quill_service::{
	AssistService, CompletionRequest, CompletionResponse, DraftRequest, DraftResponse, ServiceError, SummaryRequest, SummaryResponse,
	TerminologyRequest, TerminologyResponse,
};
use tokio::sync::mpsc;

use crate::{AssistConfig, AssistEvent, Assistant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
	Complete { field: FieldId, text: String },
	Draft { field: FieldId, summary: String },
	Summarize { current: String, new_text: String },
	Check { text: String },
}

/// In-memory [`AssistService`] with scripted replies and an optional delay.
#[derive(Default)]
pub(crate) struct FakeService {
	calls: Mutex<Vec<Call>>,
	latency: Mutex<Duration>,
	completions: Mutex<VecDeque<Result<String, String>>>,
	drafts: Mutex<HashMap<FieldId, DraftResponse>>,
	summaries: Mutex<VecDeque<String>>,
	issues: Mutex<Vec<Issue>>,
}

impl FakeService {
	pub(crate) fn set_latency(&self, latency: Duration) {
		*self.latency.lock() = latency;
	}

	pub(crate) fn push_completion(&self, completion: &str) {
		self.completions.lock().push_back(Ok(completion.to_string()));
	}

	pub(crate) fn push_completion_error(&self, message: &str) {
		self.completions.lock().push_back(Err(message.to_string()));
	}

	pub(crate) fn set_draft(&self, field: &FieldId, draft: &str, suggestions: &[&str]) {
		self.drafts.lock().insert(
			field.clone(),
			DraftResponse {
				draft: draft.to_string(),
				suggestions: suggestions.iter().map(|s| s.to_string()).collect(),
			},
		);
	}

	pub(crate) fn push_summary(&self, summary: &str) {
		self.summaries.lock().push_back(summary.to_string());
	}

	pub(crate) fn set_issues(&self, issues: Vec<Issue>) {
		*self.issues.lock() = issues;
	}

	pub(crate) fn calls(&self) -> Vec<Call> {
		self.calls.lock().clone()
	}

	pub(crate) fn checks(&self) -> usize {
		self.calls().iter().filter(|call| matches!(call, Call::Check { .. })).count()
	}

	async fn record(&self, call: Call) {
		self.calls.lock().push(call);
		let latency = *self.latency.lock();
		if !latency.is_zero() {
			tokio::time::sleep(latency).await;
		}
	}
}

#[async_trait]
impl AssistService for FakeService {
	async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ServiceError> {
		self.record(Call::Complete {
			field: request.field_id,
			text: request.current_text,
		})
		.await;
		match self.completions.lock().pop_front() {
			Some(Ok(completion)) => Ok(CompletionResponse { completion }),
			Some(Err(message)) => Err(ServiceError::Other(message)),
			None => Ok(CompletionResponse::default()),
		}
	}

	async fn draft(&self, request: DraftRequest) -> Result<DraftResponse, ServiceError> {
		let reply = self.drafts.lock().get(&request.field_id).cloned().unwrap_or_default();
		self.record(Call::Draft {
			field: request.field_id,
			summary: request.summary,
		})
		.await;
		Ok(reply)
	}

	async fn summarize(&self, request: SummaryRequest) -> Result<SummaryResponse, ServiceError> {
		self.record(Call::Summarize {
			current: request.current_summary,
			new_text: request.new_text,
		})
		.await;
		let updated_summary = self.summaries.lock().pop_front().unwrap_or_default();
		Ok(SummaryResponse { updated_summary })
	}

	async fn check_terminology(&self, request: TerminologyRequest) -> Result<TerminologyResponse, ServiceError> {
		self.record(Call::Check { text: request.text }).await;
		let issues = self.issues.lock().clone();
		Ok(TerminologyResponse { issues })
	}
}

pub(crate) struct Harness {
	pub(crate) assistant: Assistant,
	pub(crate) service: Arc<FakeService>,
	pub(crate) events: mpsc::UnboundedReceiver<AssistEvent>,
}

impl Harness {
	pub(crate) fn new() -> Self {
		Self::with_config(AssistConfig::default())
	}

	pub(crate) fn with_config(config: AssistConfig) -> Self {
		let service = Arc::new(FakeService::default());
		let (tx, events) = mpsc::unbounded_channel();
		let assistant = Assistant::new(config, service.clone(), tx).unwrap();
		Self { assistant, service, events }
	}

	/// Lets spawned calls finish and applies their replies.
	pub(crate) async fn settle(&mut self) {
		for _ in 0..16 {
			tokio::task::yield_now().await;
			self.assistant.drain_responses();
		}
	}

	/// Moves paused time forward, fires due timers, and settles.
	pub(crate) async fn advance_ms(&mut self, ms: u64) {
		tokio::time::advance(Duration::from_millis(ms)).await;
		self.assistant.poll_timers();
		self.settle().await;
	}

	/// Everything emitted since the last call.
	pub(crate) fn take_events(&mut self) -> Vec<AssistEvent> {
		let mut events = Vec::new();
		while let Ok(event) = self.events.try_recv() {
			events.push(event);
		}
		events
	}
}
