//! Contract between the assist core and the remote inference services.
//!
//! The core only ever talks to an [`AssistService`]. [`HttpAssistService`] is
//! the production implementation; tests substitute in-process fakes.

mod error;
mod http;
mod types;

use async_trait::async_trait;
pub use error::ServiceError;
pub use http::{HttpAssistService, ServiceEndpoints};
pub use types::{
	CompletionRequest, CompletionResponse, DraftRequest, DraftResponse, SummaryRequest, SummaryResponse, TerminologyRequest,
	TerminologyResponse,
};

/// Remote inference calls consumed by the assist core.
///
/// Implementations must be cheap to share; the core holds one behind an `Arc`
/// and calls it from spawned tasks.
#[async_trait]
pub trait AssistService: Send + Sync + 'static {
	/// Continues the text of one field.
	async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ServiceError>;

	/// Drafts an empty field from the conversation summary.
	async fn draft(&self, request: DraftRequest) -> Result<DraftResponse, ServiceError>;

	/// Folds new transcript text into the running summary.
	async fn summarize(&self, request: SummaryRequest) -> Result<SummaryResponse, ServiceError>;

	/// Flags non-standard terminology in a field.
	async fn check_terminology(&self, request: TerminologyRequest) -> Result<TerminologyResponse, ServiceError>;
}
