/// Failure of one remote call.
///
/// The core never surfaces these to the user; every variant degrades to
/// "nothing to offer this round".
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
	/// Connection, timeout, or body transfer failure.
	#[error("HTTP request failed: {0}")]
	Http(#[from] reqwest::Error),

	/// Non-success status from the service.
	#[error("service error: HTTP {status} - {body}")]
	Status { status: u16, body: String },

	/// Reply body did not match the expected shape.
	#[error("malformed service reply: {0}")]
	Decode(#[from] serde_json::Error),

	/// Failure reported by a non-HTTP implementation.
	#[error("{0}")]
	Other(String),
}

impl ServiceError {
	/// Returns true for failures that never reached the service.
	pub fn is_transport(&self) -> bool {
		match self {
			Self::Http(err) => err.is_connect() || err.is_timeout() || err.is_request(),
			_ => false,
		}
	}
}
