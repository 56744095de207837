use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Epoch value captured when an async operation was submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EpochStamp(u64);

impl EpochStamp {
	/// Returns the raw epoch number.
	pub const fn get(self) -> u64 {
		self.0
	}
}

/// Monotonic counter naming the current editing session.
///
/// Clones share one counter, so a task holding a clone observes resets made
/// by the owner. In-flight work captures an [`EpochStamp`] at submission and
/// checks [`SessionEpoch::is_current`] right before applying its result.
#[derive(Debug, Default, Clone)]
pub struct SessionEpoch {
	current: Arc<AtomicU64>,
}

impl SessionEpoch {
	/// Creates a counter at epoch 0.
	pub fn new() -> Self {
		Self::default()
	}

	/// Captures the current epoch.
	pub fn stamp(&self) -> EpochStamp {
		EpochStamp(self.current.load(Ordering::Acquire))
	}

	/// Starts a new session and returns its epoch.
	///
	/// Must run before any per-field state is cleared so that callbacks
	/// already in flight hold the previous epoch.
	pub fn begin_new_session(&self) -> EpochStamp {
		let next = self.current.fetch_add(1, Ordering::AcqRel).wrapping_add(1);
		tracing::debug!(epoch = next, "session.begin");
		EpochStamp(next)
	}

	/// Returns true when `stamp` was captured in the current session.
	pub fn is_current(&self, stamp: EpochStamp) -> bool {
		self.stamp() == stamp
	}
}
