//! FIFO admission control for async tasks.
//!
//! A [`BoundedTaskQueue`] holds submitted futures unstarted until a slot is
//! free, then spawns them in submission order. Each submitter gets a
//! [`QueuedTask`] resolving to that task's own outcome; a failing or
//! panicking task never blocks the tasks queued behind it.
//!
//! There is no cancellation of started tasks. Callers that no longer want a
//! result drop the [`QueuedTask`] or ignore what it yields.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use parking_lot::Mutex;
use tokio::sync::oneshot;

use crate::{TaskClass, spawn};

type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Failure reported to the submitter of one queued task.
#[derive(Debug, thiserror::Error)]
pub enum QueueError<E> {
	/// The task ran and returned an error.
	#[error("queued task failed: {0}")]
	Task(E),
	/// The task panicked or was dropped before producing a result.
	#[error("queued task aborted before completion")]
	Aborted,
}

struct QueueState {
	active: usize,
	pending: VecDeque<Job>,
}

struct QueueInner {
	name: String,
	class: TaskClass,
	limit: usize,
	state: Mutex<QueueState>,
}

/// Bounded FIFO task queue.
///
/// Clones share the same queue.
#[derive(Clone)]
pub struct BoundedTaskQueue {
	inner: Arc<QueueInner>,
}

impl std::fmt::Debug for BoundedTaskQueue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let state = self.inner.state.lock();
		f.debug_struct("BoundedTaskQueue")
			.field("name", &self.inner.name)
			.field("limit", &self.inner.limit)
			.field("active", &state.active)
			.field("pending", &state.pending.len())
			.finish()
	}
}

impl BoundedTaskQueue {
	/// Creates a background queue running at most `limit` tasks at once.
	pub fn new(name: impl Into<String>, limit: usize) -> Self {
		Self::with_class(name, TaskClass::Background, limit)
	}

	/// Creates a queue whose tasks are spawned with `class`.
	pub fn with_class(name: impl Into<String>, class: TaskClass, limit: usize) -> Self {
		assert!(limit > 0, "queue concurrency limit must be > 0");
		Self {
			inner: Arc::new(QueueInner {
				name: name.into(),
				class,
				limit,
				state: Mutex::new(QueueState {
					active: 0,
					pending: VecDeque::new(),
				}),
			}),
		}
	}

	/// Returns the number of tasks currently executing.
	pub fn active(&self) -> usize {
		self.inner.state.lock().active
	}

	/// Returns the number of tasks waiting for admission.
	pub fn pending(&self) -> usize {
		self.inner.state.lock().pending.len()
	}

	/// Submits a task behind every task already queued.
	///
	/// The task is not polled until admitted. Must be called within a Tokio
	/// runtime for the task to be admitted.
	pub fn enqueue<F, T, E>(&self, task: F) -> QueuedTask<T, E>
	where
		F: Future<Output = Result<T, E>> + Send + 'static,
		T: Send + 'static,
		E: Send + 'static,
	{
		let (tx, rx) = oneshot::channel();
		let job: Job = Box::pin(async move {
			let _ = tx.send(task.await);
		});
		let queued = {
			let mut state = self.inner.state.lock();
			state.pending.push_back(job);
			state.pending.len()
		};
		tracing::trace!(queue = %self.inner.name, queued, "queue.enqueue");
		self.admit();
		QueuedTask { rx }
	}

	fn admit(&self) {
		if tokio::runtime::Handle::try_current().is_err() {
			tracing::warn!(queue = %self.inner.name, "queue.admit outside runtime; tasks stay pending");
			return;
		}
		loop {
			let job = {
				let mut state = self.inner.state.lock();
				if state.active >= self.inner.limit {
					return;
				}
				let Some(job) = state.pending.pop_front() else {
					return;
				};
				state.active += 1;
				job
			};
			let slot = AdmissionSlot { queue: self.clone() };
			spawn(self.inner.class, async move {
				let _slot = slot;
				job.await;
			});
		}
	}
}

/// Releases one concurrency slot when the admitted task ends, including by panic.
struct AdmissionSlot {
	queue: BoundedTaskQueue,
}

impl Drop for AdmissionSlot {
	fn drop(&mut self) {
		self.queue.inner.state.lock().active -= 1;
		self.queue.admit();
	}
}

/// Resolution of one queued task.
#[must_use = "dropping a QueuedTask discards its result but does not cancel it"]
pub struct QueuedTask<T, E> {
	rx: oneshot::Receiver<Result<T, E>>,
}

impl<T, E> Future for QueuedTask<T, E> {
	type Output = Result<T, QueueError<E>>;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		Pin::new(&mut self.rx).poll(cx).map(|received| match received {
			Ok(Ok(value)) => Ok(value),
			Ok(Err(err)) => Err(QueueError::Task(err)),
			Err(_) => Err(QueueError::Aborted),
		})
	}
}

#[cfg(test)]
mod tests;
