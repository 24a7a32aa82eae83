//! Editor service — the step form and the render projection of a sequence.
//!
//! DESIGN
//! ======
//! `StepForm` is the transient "add step" form: it owns nothing but
//! draft fields and is reset after a successful submit or a cancel.
//! `SequenceView` is what the shell renders: steps in order with their
//! position, the day they fire on, and whether they can move.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::services::catalog::Catalog;
use crate::services::sequence::{SequenceError, StepDraft, settle};
use crate::state::{AppState, Sequence, SequenceStatus, SequenceStore, Step, StepKind};

pub const DEFAULT_SEND_TIME: &str = "9:00 AM";

// =============================================================================
// STEP FORM
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StepForm {
    #[serde(rename = "type")]
    pub kind: StepKind,
    pub name: String,
    /// `None` keeps the positional default (0 first, 3 after).
    pub delay_days: Option<u32>,
    pub time: String,
    pub template_id: Option<String>,
    pub task_description: String,
    pub uses_smart_send_time: bool,
}

impl Default for StepForm {
    fn default() -> Self {
        Self {
            kind: StepKind::Email,
            name: String::new(),
            delay_days: None,
            time: DEFAULT_SEND_TIME.to_string(),
            template_id: None,
            task_description: String::new(),
            uses_smart_send_time: false,
        }
    }
}

impl StepForm {
    /// Switch step type, clearing fields the new type does not use.
    pub fn set_kind(&mut self, kind: StepKind) {
        self.kind = kind;
        if kind == StepKind::Email {
            if self.time.is_empty() {
                self.time = DEFAULT_SEND_TIME.to_string();
            }
        } else {
            self.time.clear();
            self.template_id = None;
        }
        if kind != StepKind::Task {
            self.task_description.clear();
        }
    }

    pub fn select_template(&mut self, template_id: Option<&str>) {
        self.template_id = template_id.map(str::to_string);
    }

    /// Mirrors the disabled submit button: a task needs a description.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.kind != StepKind::Task || !self.task_description.trim().is_empty()
    }

    #[must_use]
    pub fn to_draft(&self) -> StepDraft {
        let text = |s: &str| Some(s.trim().to_string()).filter(|s| !s.is_empty());
        StepDraft {
            kind: self.kind,
            name: text(&self.name),
            delay_days: self.delay_days,
            time: text(&self.time),
            template_id: self.template_id.as_deref().and_then(text),
            task_description: text(&self.task_description),
            uses_smart_send_time: self.uses_smart_send_time,
        }
    }

    /// Add the drafted step to `sequence_id` and reset the form on success.
    ///
    /// # Errors
    ///
    /// Returns the store's error and keeps the form as typed so it can be fixed.
    pub fn submit(&mut self, store: &mut SequenceStore, sequence_id: &str, catalog: &Catalog) -> Result<Step, SequenceError> {
        if !self.can_submit() {
            return Err(SequenceError::MissingTaskDescription);
        }
        let step = store.add_step(sequence_id, self.to_draft(), catalog)?;
        self.cancel();
        Ok(step)
    }

    /// Discard everything typed so far.
    pub fn cancel(&mut self) {
        *self = Self::default();
    }
}

// =============================================================================
// SEQUENCE VIEW
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepView {
    #[serde(flatten)]
    pub step: Step,
    /// 1-based position in the sequence.
    pub position: usize,
    /// Day the step fires on, counting the start as day 1.
    pub day: u32,
    pub can_move_up: bool,
    pub can_move_down: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: SequenceStatus,
    pub steps: Vec<StepView>,
    pub total_steps: usize,
    /// Day the last step fires on; 0 for an empty sequence.
    pub total_days: u32,
}

impl SequenceView {
    #[must_use]
    pub fn build(seq: &Sequence) -> Self {
        let last = seq.steps.len().saturating_sub(1);
        let mut day = 1u32;
        let steps: Vec<StepView> = seq
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| {
                day = day.saturating_add(step.delay_days);
                StepView {
                    step: step.clone(),
                    position: i + 1,
                    day,
                    can_move_up: i > 0,
                    can_move_down: i < last,
                }
            })
            .collect();
        let total_days = steps.last().map_or(0, |s| s.day);

        Self {
            id: seq.id.clone(),
            name: seq.name.clone(),
            description: seq.description.clone(),
            status: seq.status,
            total_steps: steps.len(),
            steps,
            total_days,
        }
    }
}

impl From<&Sequence> for SequenceView {
    fn from(seq: &Sequence) -> Self {
        Self::build(seq)
    }
}

// =============================================================================
// SERVICE ENTRY POINTS
// =============================================================================

/// Submit a step form against one sequence.
///
/// # Errors
///
/// Returns `SequenceNotFound` or a validation error; nothing is added on error.
pub async fn submit_step(state: &AppState, sequence_id: &str, mut form: StepForm) -> Result<(Step, Sequence), SequenceError> {
    let mut store = state.sequences.write().await;
    let step = form.submit(&mut store, sequence_id, &state.catalog)?;
    info!(%sequence_id, step_id = %step.id, kind = step.kind.as_str(), "sequence: step added");
    let sequence = settle(&store, sequence_id, Ok(()))?;
    Ok((step, sequence))
}

#[cfg(test)]
#[path = "editor_test.rs"]
mod tests;
