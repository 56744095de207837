use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Structured record fields offered assistance by default, in display order.
pub const RECORD_FIELDS: [&str; 7] = [
	"main_complaint",
	"history_present_illness",
	"past_history",
	"physical_exam",
	"auxiliary_exam",
	"diagnosis",
	"orders",
];

/// Opaque identifier of one structured text input.
///
/// Cheap to clone; the name is shared behind an `Arc`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(Arc<str>);

impl FieldId {
	/// Creates a field identifier from its name.
	pub fn new(name: impl AsRef<str>) -> Self {
		Self(Arc::from(name.as_ref()))
	}

	/// Returns the field name.
	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Returns identifiers for [`RECORD_FIELDS`].
	pub fn record_fields() -> Vec<FieldId> {
		RECORD_FIELDS.iter().map(FieldId::new).collect()
	}
}

impl fmt::Debug for FieldId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "FieldId({})", self.0)
	}
}

impl fmt::Display for FieldId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for FieldId {
	fn from(name: &str) -> Self {
		Self::new(name)
	}
}

impl From<String> for FieldId {
	fn from(name: String) -> Self {
		Self(Arc::from(name))
	}
}

impl Borrow<str> for FieldId {
	fn borrow(&self) -> &str {
		&self.0
	}
}

impl AsRef<str> for FieldId {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl Serialize for FieldId {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.0)
	}
}

impl<'de> Deserialize<'de> for FieldId {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		String::deserialize(deserializer).map(FieldId::from)
	}
}
