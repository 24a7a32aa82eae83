//! Sequence service — the outreach sequence store and its mutations.
//!
//! DESIGN
//! ======
//! `SequenceStore` methods are synchronous and return explicit errors for
//! unknown ids so every rule is testable without a runtime. The async
//! functions at the bottom are what routes call: they take the store lock
//! for the whole operation, log, and keep the dashboard's permissive
//! behaviour by answering step-level misses with the unchanged sequence.
//!
//! Step order is exactly insertion order as changed by add, remove and
//! move. Nothing re-sorts.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::services::catalog::Catalog;
use crate::state::{AppState, Sequence, SequenceStatus, SequenceStore, Step, StepKind};

pub const DEFAULT_SEQUENCE_NAME: &str = "Untitled Sequence";
pub const DEFAULT_SEQUENCE_DESCRIPTION: &str = "No description";
pub const FIRST_STEP_DELAY_DAYS: u32 = 0;
pub const FOLLOW_UP_DELAY_DAYS: u32 = 3;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SequenceError {
    #[error("sequence not found: {0}")]
    SequenceNotFound(String),
    #[error("step {step_id} not found in sequence {sequence_id}")]
    StepNotFound { sequence_id: String, step_id: String },
    #[error("task steps need a description")]
    MissingTaskDescription,
    #[error("invalid send time {0:?} (expected h:mm AM/PM)")]
    InvalidSendTime(String),
    #[error("unknown email template: {0}")]
    UnknownTemplate(String),
}

impl crate::error::ErrorCode for SequenceError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::SequenceNotFound(_) => "E_SEQUENCE_NOT_FOUND",
            Self::StepNotFound { .. } => "E_STEP_NOT_FOUND",
            Self::MissingTaskDescription => "E_MISSING_TASK_DESCRIPTION",
            Self::InvalidSendTime(_) => "E_INVALID_SEND_TIME",
            Self::UnknownTemplate(_) => "E_UNKNOWN_TEMPLATE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

/// Fields for a new step. Unset `delay_days` picks the positional default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDraft {
    #[serde(rename = "type")]
    pub kind: StepKind,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub delay_days: Option<u32>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub template_id: Option<String>,
    #[serde(default)]
    pub task_description: Option<String>,
    #[serde(default)]
    pub uses_smart_send_time: bool,
}

impl StepDraft {
    #[must_use]
    pub fn new(kind: StepKind) -> Self {
        Self {
            kind,
            name: None,
            delay_days: None,
            time: None,
            template_id: None,
            task_description: None,
            uses_smart_send_time: false,
        }
    }
}

/// Partial edit of an existing step. `Some("")` clears an optional text field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepPatch {
    pub name: Option<String>,
    pub delay_days: Option<u32>,
    pub time: Option<String>,
    pub template_id: Option<String>,
    pub task_description: Option<String>,
    pub uses_smart_send_time: Option<bool>,
}

/// Email-only fields after validation.
struct EmailFields {
    time: Option<String>,
    template_id: Option<String>,
    template_name: Option<String>,
}

// =============================================================================
// STORE: READS
// =============================================================================

impl SequenceStore {
    /// Store preloaded with the dashboard's sample sequences.
    #[must_use]
    pub fn seeded() -> Self {
        let sequences = seed_sequences();
        let sequence_counter = u32::try_from(sequences.len()).unwrap_or(u32::MAX);
        Self { active_id: sequences.first().map(|s| s.id.clone()), sequences, sequence_counter }
    }

    #[must_use]
    pub fn get(&self, sequence_id: &str) -> Option<&Sequence> {
        self.sequences.iter().find(|s| s.id == sequence_id)
    }

    /// The sequence under the shell's active selection, if it still exists.
    #[must_use]
    pub fn active(&self) -> Option<&Sequence> {
        self.active_id.as_deref().and_then(|id| self.get(id))
    }

    fn get_mut(&mut self, sequence_id: &str) -> Result<&mut Sequence, SequenceError> {
        self.sequences
            .iter_mut()
            .find(|s| s.id == sequence_id)
            .ok_or_else(|| SequenceError::SequenceNotFound(sequence_id.to_string()))
    }
}

// =============================================================================
// STORE: SEQUENCE OPERATIONS
// =============================================================================

impl SequenceStore {
    /// Append a draft sequence and make it the active selection. Never fails.
    pub fn create_sequence(&mut self, name: &str, description: &str) -> Sequence {
        let id = self.next_sequence_id();
        let sequence = Sequence {
            id: id.clone(),
            name: non_empty_or(name, DEFAULT_SEQUENCE_NAME),
            description: non_empty_or(description, DEFAULT_SEQUENCE_DESCRIPTION),
            status: SequenceStatus::Draft,
            steps: Vec::new(),
            step_counter: 0,
        };
        self.sequences.push(sequence.clone());
        self.active_id = Some(id);
        sequence
    }

    /// Point the active selection at an existing sequence.
    ///
    /// # Errors
    ///
    /// Returns `SequenceNotFound` and leaves the selection alone if the id is unknown.
    pub fn select(&mut self, sequence_id: &str) -> Result<(), SequenceError> {
        if self.get(sequence_id).is_none() {
            return Err(SequenceError::SequenceNotFound(sequence_id.to_string()));
        }
        self.active_id = Some(sequence_id.to_string());
        Ok(())
    }

    /// Set one sequence's status. Other sequences are untouched.
    ///
    /// # Errors
    ///
    /// Returns `SequenceNotFound` if the id is unknown.
    pub fn set_status(&mut self, sequence_id: &str, status: SequenceStatus) -> Result<SequenceStatus, SequenceError> {
        let seq = self.get_mut(sequence_id)?;
        let previous = seq.status;
        seq.status = status;
        Ok(previous)
    }

    fn next_sequence_id(&mut self) -> String {
        loop {
            self.sequence_counter += 1;
            let id = format!("seq-{}", self.sequence_counter);
            if self.get(&id).is_none() {
                return id;
            }
        }
    }
}

// =============================================================================
// STORE: STEP OPERATIONS
// =============================================================================

impl SequenceStore {
    /// Append a step built from `draft`.
    ///
    /// # Errors
    ///
    /// Returns `SequenceNotFound` for an unknown sequence, or a validation
    /// error if the draft breaks a step-type rule. Nothing is changed on error.
    pub fn add_step(&mut self, sequence_id: &str, draft: StepDraft, catalog: &Catalog) -> Result<Step, SequenceError> {
        let seq = self.get_mut(sequence_id)?;

        let task_description = match draft.kind {
            StepKind::Task => Some(require_task_description(draft.task_description.as_deref())?),
            _ => None,
        };
        let email = match draft.kind {
            StepKind::Email => email_fields(draft.time.as_deref(), draft.template_id.as_deref(), catalog)?,
            _ => EmailFields { time: None, template_id: None, template_name: None },
        };

        let default_delay = if seq.steps.is_empty() { FIRST_STEP_DELAY_DAYS } else { FOLLOW_UP_DELAY_DAYS };
        let name = match draft.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => default_step_name(draft.kind, email.template_name.as_deref()),
        };

        let step = Step {
            id: next_step_id(seq),
            kind: draft.kind,
            name,
            delay_days: draft.delay_days.unwrap_or(default_delay),
            time: email.time,
            template_id: email.template_id,
            template_name: email.template_name,
            task_description,
            uses_smart_send_time: draft.uses_smart_send_time,
        };
        seq.steps.push(step.clone());
        Ok(step)
    }

    /// Delete a step. Remaining steps keep their relative order.
    ///
    /// # Errors
    ///
    /// Returns `SequenceNotFound` or `StepNotFound`; the list is unchanged on error.
    pub fn remove_step(&mut self, sequence_id: &str, step_id: &str) -> Result<Step, SequenceError> {
        let seq = self.get_mut(sequence_id)?;
        let index = step_index(seq, step_id)?;
        Ok(seq.steps.remove(index))
    }

    /// Swap a step with its neighbour. Returns `false` at either boundary.
    ///
    /// # Errors
    ///
    /// Returns `SequenceNotFound` or `StepNotFound`.
    pub fn move_step(&mut self, sequence_id: &str, step_id: &str, direction: MoveDirection) -> Result<bool, SequenceError> {
        let seq = self.get_mut(sequence_id)?;
        let index = step_index(seq, step_id)?;
        let target = match direction {
            MoveDirection::Up if index > 0 => index - 1,
            MoveDirection::Down if index + 1 < seq.steps.len() => index + 1,
            _ => return Ok(false),
        };
        seq.steps.swap(index, target);
        Ok(true)
    }

    /// Flip the Smart Send-Time flag. Returns the new value.
    ///
    /// # Errors
    ///
    /// Returns `SequenceNotFound` or `StepNotFound`.
    pub fn toggle_smart_send_time(&mut self, sequence_id: &str, step_id: &str) -> Result<bool, SequenceError> {
        let seq = self.get_mut(sequence_id)?;
        let index = step_index(seq, step_id)?;
        let step = &mut seq.steps[index];
        step.uses_smart_send_time = !step.uses_smart_send_time;
        Ok(step.uses_smart_send_time)
    }

    /// Edit a step in place. Fields that do not apply to the step's type are ignored.
    ///
    /// # Errors
    ///
    /// Returns `SequenceNotFound`, `StepNotFound`, or a validation error.
    /// The step is untouched on error.
    pub fn update_step(
        &mut self,
        sequence_id: &str,
        step_id: &str,
        patch: StepPatch,
        catalog: &Catalog,
    ) -> Result<Step, SequenceError> {
        let seq = self.get_mut(sequence_id)?;
        let index = step_index(seq, step_id)?;
        let current = &seq.steps[index];
        let mut next = current.clone();

        match current.kind {
            StepKind::Email => {
                let time = match patch.time.as_deref() {
                    Some(raw) => raw,
                    None => current.time.as_deref().unwrap_or(""),
                };
                let template_id = match patch.template_id.as_deref() {
                    Some(raw) => raw,
                    None => current.template_id.as_deref().unwrap_or(""),
                };
                let email = email_fields(Some(time), Some(template_id), catalog)?;
                next.time = email.time;
                next.template_id = email.template_id;
                next.template_name = email.template_name;
            }
            StepKind::Task => {
                if let Some(desc) = patch.task_description.as_deref() {
                    next.task_description = Some(require_task_description(Some(desc))?);
                }
            }
            StepKind::Linkedin | StepKind::Phone => {}
        }

        if let Some(name) = patch.name.as_deref().map(str::trim) {
            next.name = if name.is_empty() {
                default_step_name(next.kind, next.template_name.as_deref())
            } else {
                name.to_string()
            };
        }
        if let Some(delay) = patch.delay_days {
            next.delay_days = delay;
        }
        if let Some(flag) = patch.uses_smart_send_time {
            next.uses_smart_send_time = flag;
        }

        seq.steps[index] = next.clone();
        Ok(next)
    }
}

// =============================================================================
// VALIDATION HELPERS
// =============================================================================

fn step_index(seq: &Sequence, step_id: &str) -> Result<usize, SequenceError> {
    seq.steps
        .iter()
        .position(|s| s.id == step_id)
        .ok_or_else(|| SequenceError::StepNotFound { sequence_id: seq.id.clone(), step_id: step_id.to_string() })
}

fn next_step_id(seq: &mut Sequence) -> String {
    seq.step_counter += 1;
    let suffix = seq.id.strip_prefix("seq-").unwrap_or(&seq.id);
    format!("step-{suffix}-{}", seq.step_counter)
}

fn non_empty_or(value: &str, placeholder: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() { placeholder.to_string() } else { trimmed.to_string() }
}

fn require_task_description(raw: Option<&str>) -> Result<String, SequenceError> {
    match raw.map(str::trim) {
        Some(desc) if !desc.is_empty() => Ok(desc.to_string()),
        _ => Err(SequenceError::MissingTaskDescription),
    }
}

/// Validate send time and template for an email step. Empty strings mean unset.
fn email_fields(time: Option<&str>, template_id: Option<&str>, catalog: &Catalog) -> Result<EmailFields, SequenceError> {
    let time = match time.map(str::trim) {
        Some(raw) if !raw.is_empty() => {
            Some(normalize_send_time(raw).ok_or_else(|| SequenceError::InvalidSendTime(raw.to_string()))?)
        }
        _ => None,
    };
    let (template_id, template_name) = match template_id.map(str::trim) {
        Some(id) if !id.is_empty() => {
            let template = catalog
                .template(id)
                .ok_or_else(|| SequenceError::UnknownTemplate(id.to_string()))?;
            (Some(template.id.to_string()), Some(template.name.to_string()))
        }
        _ => (None, None),
    };
    Ok(EmailFields { time, template_id, template_name })
}

/// Parse `h:mm AM/PM` and return it in canonical form (`9:05 AM`).
#[must_use]
pub fn normalize_send_time(raw: &str) -> Option<String> {
    let (clock, meridiem) = raw.trim().rsplit_once(' ')?;
    let meridiem = meridiem.to_ascii_uppercase();
    if meridiem != "AM" && meridiem != "PM" {
        return None;
    }
    let (hour, minute) = clock.trim().split_once(':')?;
    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !digits(hour) || hour.len() > 2 || !digits(minute) || minute.len() != 2 {
        return None;
    }
    let hour: u8 = hour.parse().ok()?;
    let minute: u8 = minute.parse().ok()?;
    if !(1..=12).contains(&hour) || minute > 59 {
        return None;
    }
    Some(format!("{hour}:{minute:02} {meridiem}"))
}

fn default_step_name(kind: StepKind, template_name: Option<&str>) -> String {
    match (kind, template_name) {
        (StepKind::Email, Some(template)) => format!("Email: {template}"),
        (StepKind::Email, None) => "Email".into(),
        (StepKind::Task, _) => "Manual Task".into(),
        (StepKind::Linkedin, _) => "LinkedIn Touch".into(),
        (StepKind::Phone, _) => "Phone Call".into(),
    }
}

// =============================================================================
// SEED DATA
// =============================================================================

fn seed_email(id: &str, name: &str, delay_days: u32, time: &str, template: (&str, &str), smart: bool) -> Step {
    Step {
        id: id.into(),
        kind: StepKind::Email,
        name: name.into(),
        delay_days,
        time: Some(time.into()),
        template_id: Some(template.0.into()),
        template_name: Some(template.1.into()),
        task_description: None,
        uses_smart_send_time: smart,
    }
}

fn seed_touch(id: &str, kind: StepKind, name: &str, delay_days: u32, task_description: Option<&str>) -> Step {
    Step {
        id: id.into(),
        kind,
        name: name.into(),
        delay_days,
        time: None,
        template_id: None,
        template_name: None,
        task_description: task_description.map(Into::into),
        uses_smart_send_time: false,
    }
}

fn seed_sequence(id: &str, name: &str, description: &str, status: SequenceStatus, steps: Vec<Step>) -> Sequence {
    let step_counter = u32::try_from(steps.len()).unwrap_or(u32::MAX);
    Sequence { id: id.into(), name: name.into(), description: description.into(), status, steps, step_counter }
}

fn seed_sequences() -> Vec<Sequence> {
    vec![
        seed_sequence(
            "seq-1",
            "Enterprise Outreach",
            "Multi-touch sequence for enterprise decision makers",
            SequenceStatus::Active,
            vec![
                seed_email("step-1-1", "Initial Outreach", 0, "9:00 AM", ("template-1", "Initial Outreach"), true),
                seed_touch("step-1-2", StepKind::Linkedin, "LinkedIn Connection Request", 2, None),
                seed_email("step-1-3", "Follow-up Email", 3, "10:30 AM", ("template-2", "Follow-up"), false),
                seed_touch(
                    "step-1-4",
                    StepKind::Task,
                    "Call Decision Maker",
                    4,
                    Some("Call to discuss the case study and book a demo"),
                ),
            ],
        ),
        seed_sequence(
            "seq-2",
            "Product Demo Follow-up",
            "Nurture prospects who attended a live demo",
            SequenceStatus::Draft,
            vec![
                seed_email("step-2-1", "Demo Recap", 0, "2:00 PM", ("template-4", "Meeting Request"), false),
                seed_touch("step-2-2", StepKind::Phone, "Check-in Call", 2, None),
            ],
        ),
        seed_sequence(
            "seq-3",
            "Re-engagement Campaign",
            "Win back prospects that went quiet",
            SequenceStatus::Paused,
            vec![
                seed_email("step-3-1", "Case Study", 0, "11:00 AM", ("template-3", "Case Study Share"), true),
                seed_touch("step-3-2", StepKind::Task, "Research Account Changes", 5, Some("Check for new funding or hires")),
                seed_email("step-3-3", "Break-up", 7, "4:00 PM", ("template-5", "Break-up Email"), false),
            ],
        ),
    ]
}

// =============================================================================
// SERVICE ENTRY POINTS
// =============================================================================

/// Snapshot of every sequence and the active selection.
pub async fn list_sequences(state: &AppState) -> (Vec<Sequence>, Option<String>) {
    let store = state.sequences.read().await;
    (store.sequences.clone(), store.active_id.clone())
}

/// # Errors
///
/// Returns `SequenceNotFound` if the id is unknown.
pub async fn get_sequence(state: &AppState, sequence_id: &str) -> Result<Sequence, SequenceError> {
    let store = state.sequences.read().await;
    store
        .get(sequence_id)
        .cloned()
        .ok_or_else(|| SequenceError::SequenceNotFound(sequence_id.to_string()))
}

pub async fn active_sequence(state: &AppState) -> Option<Sequence> {
    state.sequences.read().await.active().cloned()
}

pub async fn create_sequence(state: &AppState, name: &str, description: &str) -> Sequence {
    let sequence = state
        .sequences
        .write()
        .await
        .create_sequence(name, description);
    info!(sequence_id = %sequence.id, name = %sequence.name, "sequence: created");
    sequence
}

/// # Errors
///
/// Returns `SequenceNotFound` if the id is unknown.
pub async fn select_sequence(state: &AppState, sequence_id: &str) -> Result<Sequence, SequenceError> {
    let mut store = state.sequences.write().await;
    store.select(sequence_id)?;
    debug!(%sequence_id, "sequence: selected");
    settle(&store, sequence_id, Ok(()))
}

/// # Errors
///
/// Returns `SequenceNotFound` if the id is unknown.
pub async fn set_status(state: &AppState, sequence_id: &str, status: SequenceStatus) -> Result<Sequence, SequenceError> {
    let mut store = state.sequences.write().await;
    let previous = store.set_status(sequence_id, status)?;
    info!(%sequence_id, ?previous, ?status, "sequence: status changed");
    settle(&store, sequence_id, Ok(()))
}

/// # Errors
///
/// Returns `SequenceNotFound`, or a validation error from the patch.
pub async fn update_step(
    state: &AppState,
    sequence_id: &str,
    step_id: &str,
    patch: StepPatch,
) -> Result<Sequence, SequenceError> {
    let mut store = state.sequences.write().await;
    let result = store.update_step(sequence_id, step_id, patch, &state.catalog);
    settle(&store, sequence_id, result)
}

/// # Errors
///
/// Returns `SequenceNotFound`. An unknown step leaves the sequence as it was.
pub async fn remove_step(state: &AppState, sequence_id: &str, step_id: &str) -> Result<Sequence, SequenceError> {
    let mut store = state.sequences.write().await;
    let result = store.remove_step(sequence_id, step_id);
    if result.is_ok() {
        info!(%sequence_id, %step_id, "sequence: step removed");
    }
    settle(&store, sequence_id, result)
}

/// # Errors
///
/// Returns `SequenceNotFound`. An unknown step leaves the sequence as it was.
pub async fn move_step(
    state: &AppState,
    sequence_id: &str,
    step_id: &str,
    direction: MoveDirection,
) -> Result<Sequence, SequenceError> {
    let mut store = state.sequences.write().await;
    let result = store.move_step(sequence_id, step_id, direction);
    if let Ok(moved) = result {
        debug!(%sequence_id, %step_id, ?direction, moved, "sequence: step moved");
    }
    settle(&store, sequence_id, result)
}

/// # Errors
///
/// Returns `SequenceNotFound`. An unknown step leaves the sequence as it was.
pub async fn toggle_smart_send_time(state: &AppState, sequence_id: &str, step_id: &str) -> Result<Sequence, SequenceError> {
    let mut store = state.sequences.write().await;
    let result = store.toggle_smart_send_time(sequence_id, step_id);
    settle(&store, sequence_id, result)
}

/// Swallow step-level misses, propagate everything else, and return the
/// sequence as it now stands.
pub(crate) fn settle<T>(
    store: &SequenceStore,
    sequence_id: &str,
    result: Result<T, SequenceError>,
) -> Result<Sequence, SequenceError> {
    match result {
        Ok(_) => {}
        Err(e @ SequenceError::StepNotFound { .. }) => debug!(error = %e, "sequence: step operation ignored"),
        Err(e) => return Err(e),
    }
    store
        .get(sequence_id)
        .cloned()
        .ok_or_else(|| SequenceError::SequenceNotFound(sequence_id.to_string()))
}

#[cfg(test)]
#[path = "sequence_test.rs"]
mod tests;
