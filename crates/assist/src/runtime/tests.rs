use std::sync::Arc;

use pretty_assertions::assert_eq;
use quill_primitives::{FieldId, Issue};
use quill_worker::{TaskClass, spawn};
use tokio::sync::mpsc;

use super::*;
use crate::config::AssistConfig;
use crate::testing::FakeService;

#[test]
fn host_inputs_decode_from_json() {
	let edit: HostInput = serde_json::from_str(r#"{"op":"edit","field_id":"orders","text":"1. 血常规"}"#).unwrap();
	assert_eq!(
		edit,
		HostInput::Edit {
			field_id: FieldId::new("orders"),
			text: "1. 血常规".to_string(),
			caret: None,
		}
	);

	let apply: HostInput = serde_json::from_str(
		r#"{"op":"apply_issue","field_id":"diagnosis","issue":{"original":"发烧","suggestion":"发热","start":0,"end":2}}"#,
	)
	.unwrap();
	assert_eq!(
		apply,
		HostInput::ApplyIssue {
			field_id: FieldId::new("diagnosis"),
			issue: Issue::new("发烧", "发热", 0, 2),
		}
	);

	let settings: HostInput = serde_json::from_str(r#"{"op":"settings","settings":{"ghost_text":false}}"#).unwrap();
	assert_eq!(
		settings,
		HostInput::Settings {
			settings: Settings {
				ghost_text: false,
				terminology: true,
				auto_summary: true,
			},
		}
	);

	let reset: HostInput = serde_json::from_str(r#"{"op":"reset"}"#).unwrap();
	assert_eq!(reset, HostInput::Reset);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn run_loop_drives_timers_replies_and_inputs() {
	let field = FieldId::new("main_complaint");
	let service = Arc::new(FakeService::default());
	service.push_completion("肚子疼3天");
	service.set_issues(vec![Issue::new("肚子疼", "腹痛", 0, 3)]);

	let (event_tx, mut events) = mpsc::unbounded_channel();
	let assistant = Assistant::new(AssistConfig::default(), service.clone(), event_tx).unwrap();
	let (input_tx, input_rx) = mpsc::channel(8);
	let task = spawn(TaskClass::Interactive, run(assistant, input_rx));

	input_tx
		.send(HostInput::Edit {
			field_id: field.clone(),
			text: "肚子疼".to_string(),
			caret: None,
		})
		.await
		.unwrap();

	assert_eq!(
		events.recv().await.unwrap(),
		AssistEvent::GhostStateChanged {
			field_id: field.clone(),
			user_text: "肚子疼".to_string(),
			suggestion: "3天".to_string(),
		}
	);
	assert_eq!(
		events.recv().await.unwrap(),
		AssistEvent::IssuesChanged {
			field_id: field.clone(),
			issues: vec![Issue::new("肚子疼", "腹痛", 0, 3)],
		}
	);

	input_tx.send(HostInput::Accept { field_id: field.clone() }).await.unwrap();
	assert_eq!(events.recv().await.unwrap(), AssistEvent::ghost_cleared(field.clone(), "肚子疼3天"));
	assert_eq!(
		events.recv().await.unwrap(),
		AssistEvent::TextChanged {
			field_id: field.clone(),
			text: "肚子疼3天".to_string(),
			caret: 5,
		}
	);

	input_tx.send(HostInput::Metrics).await.unwrap();
	match events.recv().await.unwrap() {
		AssistEvent::Metrics { metrics } => {
			assert_eq!(metrics.ghost_text_count, 1);
			assert_eq!(metrics.manual_input_chars, 3);
		}
		other => panic!("expected metrics, got {other:?}"),
	}

	drop(input_tx);
	let assistant = task.await.unwrap();
	assert_eq!(assistant.field(&field).unwrap().text, "肚子疼3天");
}
