//! Worker primitives for the assist core.
//!
//! * [`spawn`] routes every async task through one place with a [`TaskClass`] tag.
//! * [`SessionEpoch`] invalidates in-flight results across a session reset.
//! * [`BoundedTaskQueue`] admits queued tasks in submission order under a concurrency bound.

mod class;
mod epoch;
mod queue;
mod spawn;

pub use class::TaskClass;
pub use epoch::{EpochStamp, SessionEpoch};
pub use queue::{BoundedTaskQueue, QueueError, QueuedTask};
pub use spawn::spawn;
