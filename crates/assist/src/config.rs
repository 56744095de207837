//! Configuration for the assist coordinator.
//!
//! Every section is optional in TOML; missing keys fall back to defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use quill_primitives::FieldId;
use quill_service::ServiceEndpoints;
use serde::{Deserialize, Serialize};

use crate::validate::ContentValidator;

/// Refusal boilerplate rejected in drafts and completions.
pub const DEFAULT_REFUSAL_PATTERNS: [&str; 7] = ["空字符串", "没有相关信息", "无相关信息", "无法提取", "无法提供", "抱歉.*无法", "根据对话总结"];

/// Extra refusal patterns applied to discrete suggestion items.
pub const DEFAULT_ITEM_REFUSAL_PATTERNS: [&str; 2] = ["暂无相关", "暂无总结"];

/// Transcript markers that mean "nothing recorded yet".
pub const DEFAULT_TRANSCRIPT_PLACEHOLDERS: [&str; 2] = ["等待录音输入", "正在转录"];

/// Feature toggles the host can flip at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	/// Inline continuation suggestions and background drafts.
	pub ghost_text: bool,
	/// Terminology checks.
	pub terminology: bool,
	/// Periodic transcript summarization while recording.
	pub auto_summary: bool,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			ghost_text: true,
			terminology: true,
			auto_summary: true,
		}
	}
}

/// Timer constants in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
	/// Quiet period before a completion request.
	pub ghost_delay_ms: u64,
	/// Quiet period before a terminology check.
	pub debounce_ms: u64,
	/// Ceiling on how long a burst of edits can postpone a check.
	pub max_wait_ms: u64,
	/// Period of the transcript summary tick.
	pub summary_interval_ms: u64,
}

impl Default for Timing {
	fn default() -> Self {
		Self {
			ghost_delay_ms: 1000,
			debounce_ms: 3000,
			max_wait_ms: 3000,
			summary_interval_ms: 10_000,
		}
	}
}

impl Timing {
	pub fn ghost_delay(&self) -> Duration {
		Duration::from_millis(self.ghost_delay_ms)
	}

	pub fn debounce(&self) -> Duration {
		Duration::from_millis(self.debounce_ms)
	}

	pub fn max_wait(&self) -> Duration {
		Duration::from_millis(self.max_wait_ms)
	}

	pub fn summary_interval(&self) -> Duration {
		Duration::from_millis(self.summary_interval_ms)
	}
}

/// Top-level assist configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistConfig {
	/// Fields offered assistance, in display order.
	pub fields: Vec<FieldId>,
	/// Initial feature toggles.
	pub settings: Settings,
	pub timing: Timing,
	/// Remote service locations.
	pub services: ServiceEndpoints,
	/// Minimum trimmed char count before a terminology check is issued.
	pub min_check_chars: usize,
	/// How many background drafts may run at once.
	pub draft_concurrency: usize,
	/// Regex patterns marking a draft or completion as a refusal.
	pub refusal_patterns: Vec<String>,
	/// Additional patterns applied only to suggestion items.
	pub item_refusal_patterns: Vec<String>,
	/// Transcript tails containing any of these are not summarized.
	pub transcript_placeholders: Vec<String>,
}

impl Default for AssistConfig {
	fn default() -> Self {
		Self {
			fields: FieldId::record_fields(),
			settings: Settings::default(),
			timing: Timing::default(),
			services: ServiceEndpoints::default(),
			min_check_chars: 2,
			draft_concurrency: 1,
			refusal_patterns: DEFAULT_REFUSAL_PATTERNS.iter().map(|p| p.to_string()).collect(),
			item_refusal_patterns: DEFAULT_ITEM_REFUSAL_PATTERNS.iter().map(|p| p.to_string()).collect(),
			transcript_placeholders: DEFAULT_TRANSCRIPT_PLACEHOLDERS.iter().map(|p| p.to_string()).collect(),
		}
	}
}

impl AssistConfig {
	/// Parses and validates a TOML document.
	pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(source)?;
		config.validate()?;
		Ok(config)
	}

	/// Reads, parses, and validates a TOML file.
	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		Self::from_toml_str(&source)
	}

	/// Checks values that serde cannot.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.draft_concurrency == 0 {
			return Err(ConfigError::ZeroConcurrency);
		}
		ContentValidator::from_config(self).map(|_| ())
	}
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	/// The config file could not be read.
	#[error("failed to read {}: {source}", path.display())]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// TOML syntax or shape error.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// A refusal pattern is not a valid regex.
	#[error("invalid refusal pattern '{pattern}': {source}")]
	InvalidPattern {
		pattern: String,
		#[source]
		source: regex::Error,
	},

	/// `draft_concurrency` must admit at least one task.
	#[error("draft_concurrency must be at least 1")]
	ZeroConcurrency,
}
