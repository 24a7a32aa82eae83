use super::*;

#[test]
fn step_serializes_type_and_camel_case() {
    let step = test_helpers::email_step("step-9-1", 2);
    let json = serde_json::to_value(&step).unwrap();
    assert_eq!(json["type"], "email");
    assert_eq!(json["delayDays"], 2);
    assert_eq!(json["usesSmartSendTime"], false);
    assert_eq!(json["time"], "9:00 AM");
    assert!(json.get("taskDescription").is_none());
    assert!(json.get("templateId").is_none());
}

#[test]
fn sequence_counter_is_not_serialized() {
    let seq = Sequence {
        id: "seq-9".into(),
        name: "n".into(),
        description: "d".into(),
        status: SequenceStatus::Paused,
        steps: vec![],
        step_counter: 7,
    };
    let json = serde_json::to_value(&seq).unwrap();
    assert_eq!(json["status"], "paused");
    assert!(json.get("stepCounter").is_none());
}

#[test]
fn chat_status_uses_camel_case() {
    assert_eq!(serde_json::to_value(ChatStatus::AwaitingReply).unwrap(), "awaitingReply");
    assert_eq!(serde_json::to_value(ChatRole::Assistant).unwrap(), "assistant");
}

#[test]
fn step_kind_parses_linkedin() {
    let kind: StepKind = serde_json::from_str("\"linkedin\"").unwrap();
    assert_eq!(kind, StepKind::Linkedin);
    assert_eq!(kind.as_str(), "linkedin");
}

#[tokio::test]
async fn new_state_is_seeded() {
    let state = test_helpers::test_app_state();

    let store = state.sequences.read().await;
    assert_eq!(store.sequences.len(), 3);
    assert_eq!(store.active_id.as_deref(), Some("seq-1"));

    let chat = state.chat.read().await;
    assert_eq!(chat.messages.len(), 1);
    assert_eq!(chat.messages[0].role, ChatRole::Assistant);
    assert_eq!(chat.status, ChatStatus::Idle);
}

#[test]
fn now_ms_is_positive() {
    assert!(now_ms() > 0);
}
