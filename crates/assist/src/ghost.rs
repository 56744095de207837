//! Ghost-text suggestion state per field.
//!
//! Each field moves `Idle -> Pending -> Suggested -> Idle`. Requests carry a
//! generation number; a reply only lands if its generation is still the one
//! the field is waiting for, so any edit between request and reply discards
//! it without tracking the request itself.

use std::collections::HashMap;
use std::time::Duration;

use quill_primitives::FieldId;
use tokio::time::Instant;

/// Suggestion lifecycle of one field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GhostPhase {
	#[default]
	Idle,
	/// A completion request is in flight.
	Pending { generation: u64 },
	/// A validated suggestion is cached and visible.
	Suggested { text: String },
}

#[derive(Debug, Default)]
struct GhostSlot {
	phase: GhostPhase,
	fire_at: Option<Instant>,
}

static IDLE: GhostPhase = GhostPhase::Idle;

/// Owns the ghost phase and single-shot request timer of every field.
#[derive(Debug)]
pub struct GhostSuggestionController {
	delay: Duration,
	next_generation: u64,
	slots: HashMap<FieldId, GhostSlot>,
}

impl GhostSuggestionController {
	pub fn new(delay: Duration) -> Self {
		Self {
			delay,
			next_generation: 0,
			slots: HashMap::new(),
		}
	}

	pub fn phase(&self, field: &FieldId) -> &GhostPhase {
		self.slots.get(field).map_or(&IDLE, |slot| &slot.phase)
	}

	/// Returns the visible suggestion, if any.
	pub fn suggestion(&self, field: &FieldId) -> Option<&str> {
		match self.phase(field) {
			GhostPhase::Suggested { text } => Some(text),
			_ => None,
		}
	}

	/// Returns true if a request timer is running.
	pub fn is_armed(&self, field: &FieldId) -> bool {
		self.slots.get(field).is_some_and(|slot| slot.fire_at.is_some())
	}

	/// Returns the field to `Idle` and stops its timer.
	///
	/// Returns true if a suggestion was visible and the renderer must clear it.
	pub fn invalidate(&mut self, field: &FieldId) -> bool {
		let Some(slot) = self.slots.get_mut(field) else {
			return false;
		};
		slot.fire_at = None;
		matches!(std::mem::take(&mut slot.phase), GhostPhase::Suggested { .. })
	}

	/// Starts (or restarts) the request timer.
	pub fn arm(&mut self, field: &FieldId, now: Instant) {
		self.slots.entry(field.clone()).or_default().fire_at = Some(now + self.delay);
	}

	/// Handles an edit: always invalidates, then arms if the caret is at the end.
	///
	/// Returns true if a visible suggestion was cleared.
	pub fn on_edit(&mut self, field: &FieldId, caret_at_end: bool, now: Instant) -> bool {
		let cleared = self.invalidate(field);
		if caret_at_end {
			self.arm(field, now);
		}
		cleared
	}

	/// Disarms and returns the fields whose timers have fired, in deadline order.
	pub fn take_due(&mut self, now: Instant) -> Vec<FieldId> {
		let mut due: Vec<(Instant, FieldId)> = self
			.slots
			.iter_mut()
			.filter_map(|(field, slot)| match slot.fire_at {
				Some(at) if at <= now => {
					slot.fire_at = None;
					Some((at, field.clone()))
				}
				_ => None,
			})
			.collect();
		due.sort();
		due.into_iter().map(|(_, field)| field).collect()
	}

	/// Moves the field to `Pending` and returns the request generation.
	pub fn begin_request(&mut self, field: &FieldId) -> u64 {
		self.next_generation += 1;
		let generation = self.next_generation;
		let slot = self.slots.entry(field.clone()).or_default();
		slot.fire_at = None;
		slot.phase = GhostPhase::Pending { generation };
		generation
	}

	/// Caches `text` if the field is still waiting on `generation`.
	pub fn resolve(&mut self, field: &FieldId, generation: u64, text: String) -> bool {
		match self.slots.get_mut(field) {
			Some(slot) if slot.phase == (GhostPhase::Pending { generation }) => {
				slot.phase = GhostPhase::Suggested { text };
				true
			}
			_ => false,
		}
	}

	/// Returns to `Idle` if the field is still waiting on `generation`.
	pub fn abandon(&mut self, field: &FieldId, generation: u64) {
		if let Some(slot) = self.slots.get_mut(field)
			&& slot.phase == (GhostPhase::Pending { generation })
		{
			slot.phase = GhostPhase::Idle;
		}
	}

	/// Offers a background draft. Ignored while a completion is in flight.
	pub fn offer_draft(&mut self, field: &FieldId, text: String) -> bool {
		let slot = self.slots.entry(field.clone()).or_default();
		if matches!(slot.phase, GhostPhase::Pending { .. }) {
			return false;
		}
		slot.phase = GhostPhase::Suggested { text };
		true
	}

	/// Takes the visible suggestion for insertion, returning the field to `Idle`.
	pub fn accept(&mut self, field: &FieldId) -> Option<String> {
		let slot = self.slots.get_mut(field)?;
		match std::mem::take(&mut slot.phase) {
			GhostPhase::Suggested { text } => {
				slot.fire_at = None;
				Some(text)
			}
			other => {
				slot.phase = other;
				None
			}
		}
	}

	/// Drops all state. Returns the fields that had a visible suggestion, sorted.
	pub fn clear(&mut self) -> Vec<FieldId> {
		let mut visible: Vec<FieldId> = self
			.slots
			.drain()
			.filter(|(_, slot)| matches!(slot.phase, GhostPhase::Suggested { .. }))
			.map(|(field, _)| field)
			.collect();
		visible.sort();
		visible
	}

	/// Earliest running request timer.
	pub fn next_deadline(&self) -> Option<Instant> {
		self.slots.values().filter_map(|slot| slot.fire_at).min()
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	fn controller() -> GhostSuggestionController {
		GhostSuggestionController::new(Duration::from_millis(1000))
	}

	#[test]
	fn edit_at_end_arms_single_shot_timer() {
		let field = FieldId::new("main_complaint");
		let mut ghost = controller();
		let t0 = Instant::now();

		ghost.on_edit(&field, true, t0);
		ghost.on_edit(&field, true, t0 + Duration::from_millis(600));
		assert!(ghost.take_due(t0 + Duration::from_millis(1000)).is_empty());
		assert_eq!(ghost.take_due(t0 + Duration::from_millis(1600)), vec![field.clone()]);
		assert!(ghost.take_due(t0 + Duration::from_millis(5000)).is_empty());
	}

	#[test]
	fn edit_away_from_end_disarms() {
		let field = FieldId::new("main_complaint");
		let mut ghost = controller();
		let t0 = Instant::now();

		ghost.on_edit(&field, true, t0);
		ghost.on_edit(&field, false, t0 + Duration::from_millis(10));
		assert!(!ghost.is_armed(&field));
		assert_eq!(ghost.next_deadline(), None);
	}

	#[test]
	fn superseded_generation_is_dropped() {
		let field = FieldId::new("orders");
		let mut ghost = controller();

		let first = ghost.begin_request(&field);
		let second = ghost.begin_request(&field);
		assert!(!ghost.resolve(&field, first, "stale".to_string()));
		assert!(ghost.resolve(&field, second, "fresh".to_string()));
		assert_eq!(ghost.suggestion(&field), Some("fresh"));
	}

	#[test]
	fn invalidate_while_pending_drops_reply() {
		let field = FieldId::new("orders");
		let mut ghost = controller();

		let generation = ghost.begin_request(&field);
		assert!(!ghost.invalidate(&field));
		assert!(!ghost.resolve(&field, generation, "late".to_string()));
		assert_eq!(ghost.phase(&field), &GhostPhase::Idle);
	}

	#[test]
	fn accept_takes_suggestion_once() {
		let field = FieldId::new("diagnosis");
		let mut ghost = controller();

		assert!(ghost.offer_draft(&field, "急性胃肠炎".to_string()));
		assert_eq!(ghost.accept(&field).as_deref(), Some("急性胃肠炎"));
		assert_eq!(ghost.accept(&field), None);
		assert_eq!(ghost.phase(&field), &GhostPhase::Idle);
	}

	#[test]
	fn draft_does_not_override_pending_completion() {
		let field = FieldId::new("diagnosis");
		let mut ghost = controller();

		let generation = ghost.begin_request(&field);
		assert!(!ghost.offer_draft(&field, "draft".to_string()));
		ghost.abandon(&field, generation);
		assert_eq!(ghost.phase(&field), &GhostPhase::Idle);
	}

	#[test]
	fn clear_reports_visible_fields() {
		let a = FieldId::new("diagnosis");
		let b = FieldId::new("orders");
		let mut ghost = controller();

		ghost.offer_draft(&b, "x".to_string());
		ghost.begin_request(&a);
		assert_eq!(ghost.clear(), vec![b]);
		assert_eq!(ghost.phase(&a), &GhostPhase::Idle);
	}
}
