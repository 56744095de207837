//! Coordination core for AI-backed writing assistance in structured text fields.
//!
//! The [`Assistant`] owns every piece of per-field assist state and is driven
//! by one task: host inputs come in, remote calls go out as spawned tasks,
//! and their replies come back over a channel to be re-validated against the
//! current session epoch, field text, focus, and caret before anything is
//! applied. Renderer updates leave as [`AssistEvent`]s.

pub mod assistant;
pub mod config;
pub mod debounce;
pub mod events;
pub mod field;
pub mod ghost;
pub mod issues;
pub mod metrics;
pub mod runtime;
pub mod suggestions;
pub mod summary;
#[cfg(test)]
mod testing;
pub mod validate;

pub use assistant::Assistant;
pub use config::{AssistConfig, ConfigError, Settings, Timing};
pub use debounce::{CheckTrigger, DueCheck, HybridDebounceScheduler};
pub use events::AssistEvent;
pub use field::FieldState;
pub use ghost::{GhostPhase, GhostSuggestionController};
pub use issues::{IssueAnnotationStore, IssueError};
pub use metrics::{MetricsTracker, UsageMetrics};
pub use runtime::{HostInput, run};
pub use suggestions::{SuggestionItems, insert_item};
pub use summary::SummaryTracker;
pub use validate::{ContentValidator, is_valid_draft};
