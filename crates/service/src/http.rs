use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::{
	AssistService, CompletionRequest, CompletionResponse, DraftRequest, DraftResponse, ServiceError, SummaryRequest, SummaryResponse,
	TerminologyRequest, TerminologyResponse,
};

/// Base URLs and transport settings for the remote services.
///
/// Completion, draft, and summary live on the agent service; terminology
/// checks live on the main API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceEndpoints {
	/// Agent service base, e.g. `http://localhost:8001/api`.
	pub agent_url: String,
	/// Main API base, e.g. `http://localhost:8000/api`.
	pub api_url: String,
	/// Per-request timeout in milliseconds.
	pub timeout_ms: u64,
}

impl Default for ServiceEndpoints {
	fn default() -> Self {
		Self {
			agent_url: "http://localhost:8001/api".to_string(),
			api_url: "http://localhost:8000/api".to_string(),
			timeout_ms: 30_000,
		}
	}
}

impl ServiceEndpoints {
	/// Points both services at one base URL.
	pub fn single(base: impl Into<String>) -> Self {
		let base = base.into();
		Self {
			agent_url: base.clone(),
			api_url: base,
			..Self::default()
		}
	}
}

/// JSON-over-HTTP client for the assist services.
#[derive(Debug, Clone)]
pub struct HttpAssistService {
	client: Client,
	endpoints: ServiceEndpoints,
}

impl HttpAssistService {
	/// Builds a client from endpoint configuration.
	pub fn new(endpoints: ServiceEndpoints) -> Result<Self, ServiceError> {
		let client = Client::builder().timeout(Duration::from_millis(endpoints.timeout_ms)).build()?;
		Ok(Self { client, endpoints })
	}

	fn agent(&self, path: &str) -> String {
		format!("{}/{path}", self.endpoints.agent_url.trim_end_matches('/'))
	}

	fn api(&self, path: &str) -> String {
		format!("{}/{path}", self.endpoints.api_url.trim_end_matches('/'))
	}

	async fn post<Req, Resp>(&self, url: String, body: &Req) -> Result<Resp, ServiceError>
	where
		Req: Serialize + ?Sized,
		Resp: DeserializeOwned,
	{
		let start = Instant::now();
		let response = self.client.post(&url).json(body).send().await?;
		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(ServiceError::Status {
				status: status.as_u16(),
				body,
			});
		}

		let bytes = response.bytes().await?;
		tracing::debug!(url = %url, status = status.as_u16(), latency_ms = start.elapsed().as_millis() as u64, "service.reply");
		Ok(serde_json::from_slice(&bytes)?)
	}
}

#[async_trait]
impl AssistService for HttpAssistService {
	async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ServiceError> {
		self.post(self.agent("agent/complete"), &request).await
	}

	async fn draft(&self, request: DraftRequest) -> Result<DraftResponse, ServiceError> {
		self.post(self.agent("agent/draft"), &request).await
	}

	async fn summarize(&self, request: SummaryRequest) -> Result<SummaryResponse, ServiceError> {
		self.post(self.agent("agent/summary"), &request).await
	}

	async fn check_terminology(&self, request: TerminologyRequest) -> Result<TerminologyResponse, ServiceError> {
		self.post(self.api("terminology/check"), &request).await
	}
}
