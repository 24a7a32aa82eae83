use super::*;
use crate::state::test_helpers::{self, email_step};

fn catalog() -> Catalog {
    Catalog::embedded().unwrap()
}

#[test]
fn default_form_is_email_at_nine() {
    let form = StepForm::default();
    assert_eq!(form.kind, StepKind::Email);
    assert_eq!(form.time, DEFAULT_SEND_TIME);
    assert!(form.can_submit());
}

#[test]
fn task_form_needs_description_to_submit() {
    let mut form = StepForm::default();
    form.set_kind(StepKind::Task);
    assert!(!form.can_submit());

    form.task_description = "   ".into();
    assert!(!form.can_submit());

    form.task_description = "Prep call notes".into();
    assert!(form.can_submit());
}

#[test]
fn set_kind_clears_foreign_fields() {
    let mut form = StepForm::default();
    form.select_template(Some("template-1"));
    form.set_kind(StepKind::Task);
    assert!(form.time.is_empty());
    assert!(form.template_id.is_none());

    form.task_description = "notes".into();
    form.set_kind(StepKind::Email);
    assert!(form.task_description.is_empty());
    assert_eq!(form.time, DEFAULT_SEND_TIME);
}

#[test]
fn to_draft_maps_blank_text_to_none() {
    let form = StepForm { name: "  ".into(), time: String::new(), template_id: Some(String::new()), ..StepForm::default() };
    let draft = form.to_draft();
    assert!(draft.name.is_none());
    assert!(draft.time.is_none());
    assert!(draft.template_id.is_none());
    assert!(draft.task_description.is_none());
}

#[test]
fn submit_adds_step_and_resets_form() {
    let mut store = SequenceStore::seeded();
    let mut form = StepForm { delay_days: Some(1), uses_smart_send_time: true, ..StepForm::default() };
    form.select_template(Some("template-2"));

    let step = form.submit(&mut store, "seq-2", &catalog()).unwrap();
    assert_eq!(step.template_name.as_deref(), Some("Follow-up"));
    assert_eq!(step.time.as_deref(), Some(DEFAULT_SEND_TIME));
    assert_eq!(step.delay_days, 1);
    assert!(step.uses_smart_send_time);
    assert_eq!(form, StepForm::default());
    assert_eq!(store.get("seq-2").unwrap().steps.len(), 3);
}

#[test]
fn submit_disallowed_task_keeps_form_and_store() {
    let mut store = SequenceStore::seeded();
    let mut form = StepForm { name: "Research".into(), ..StepForm::default() };
    form.set_kind(StepKind::Task);

    let err = form.submit(&mut store, "seq-1", &catalog()).unwrap_err();
    assert_eq!(err, SequenceError::MissingTaskDescription);
    assert_eq!(form.name, "Research");
    assert_eq!(store.get("seq-1").unwrap().steps.len(), 4);
}

#[test]
fn submit_to_unknown_sequence_keeps_form() {
    let mut store = SequenceStore::seeded();
    let mut form = StepForm { name: "Hello".into(), ..StepForm::default() };
    let err = form.submit(&mut store, "seq-404", &catalog()).unwrap_err();
    assert!(matches!(err, SequenceError::SequenceNotFound(_)));
    assert_eq!(form.name, "Hello");
}

#[test]
fn cancel_discards_draft() {
    let mut form = StepForm { name: "x".into(), delay_days: Some(4), ..StepForm::default() };
    form.set_kind(StepKind::Phone);
    form.cancel();
    assert_eq!(form, StepForm::default());
}

#[test]
fn form_deserializes_with_defaults() {
    let form: StepForm = serde_json::from_str(r#"{"type":"task","taskDescription":"Call"}"#).unwrap();
    assert_eq!(form.kind, StepKind::Task);
    assert_eq!(form.task_description, "Call");
    assert!(form.delay_days.is_none());

    let form: StepForm = serde_json::from_str("{}").unwrap();
    assert_eq!(form, StepForm::default());
}

// =============================================================================
// SEQUENCE VIEW
// =============================================================================

#[test]
fn view_computes_days_and_move_flags() {
    let store = SequenceStore::seeded();
    let view = SequenceView::build(store.get("seq-1").unwrap());

    let days: Vec<u32> = view.steps.iter().map(|s| s.day).collect();
    assert_eq!(days, vec![1, 3, 6, 10]);
    assert_eq!(view.total_days, 10);
    assert_eq!(view.total_steps, 4);

    let positions: Vec<usize> = view.steps.iter().map(|s| s.position).collect();
    assert_eq!(positions, vec![1, 2, 3, 4]);

    assert!(!view.steps[0].can_move_up);
    assert!(view.steps[0].can_move_down);
    assert!(view.steps[3].can_move_up);
    assert!(!view.steps[3].can_move_down);
}

#[test]
fn view_of_empty_sequence() {
    let mut store = SequenceStore::default();
    let seq = store.create_sequence("", "");
    let view = SequenceView::from(&seq);
    assert!(view.steps.is_empty());
    assert_eq!(view.total_days, 0);
    assert_eq!(view.total_steps, 0);
}

#[test]
fn single_step_cannot_move() {
    let mut seq = SequenceStore::default().create_sequence("one", "");
    seq.steps.push(email_step("step-1-1", 0));
    let view = SequenceView::build(&seq);
    assert!(!view.steps[0].can_move_up);
    assert!(!view.steps[0].can_move_down);
    assert_eq!(view.total_days, 1);
}

#[test]
fn view_serializes_flattened_step() {
    let store = SequenceStore::seeded();
    let json = serde_json::to_value(SequenceView::build(store.get("seq-1").unwrap())).unwrap();
    let first = &json["steps"][0];
    assert_eq!(first["id"], "step-1-1");
    assert_eq!(first["type"], "email");
    assert_eq!(first["day"], 1);
    assert_eq!(first["canMoveUp"], false);
    assert_eq!(json["totalDays"], 10);
}

#[tokio::test]
async fn submit_step_service_returns_step_and_sequence() {
    let state = test_helpers::test_app_state();
    let form = StepForm { kind: StepKind::Phone, time: String::new(), ..StepForm::default() };
    let (step, seq) = submit_step(&state, "seq-1", form).await.unwrap();
    assert_eq!(step.id, "step-1-5");
    assert_eq!(step.delay_days, 3);
    assert_eq!(seq.steps.last(), Some(&step));
}
