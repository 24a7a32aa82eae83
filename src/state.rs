//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It owns the sequence store, the support chat session, the read-only
//! reference catalog, and the reply delay. All mutable state is behind
//! its own `RwLock`; handlers never mutate records directly but go
//! through the named operations in `services`.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::services::catalog::Catalog;
use crate::services::support::ReplyDelay;

// =============================================================================
// STEP
// =============================================================================

/// Channel of a sequence step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Email,
    Task,
    Linkedin,
    Phone,
}

impl StepKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Task => "task",
            Self::Linkedin => "linkedin",
            Self::Phone => "phone",
        }
    }
}

/// One outreach touch inside a sequence.
///
/// `time`, `template_id` and `template_name` are only ever set on email
/// steps; `task_description` only on task steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: StepKind,
    pub name: String,
    /// Days to wait after the previous step.
    pub delay_days: u32,
    /// Send time, `h:mm AM/PM`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_description: Option<String>,
    pub uses_smart_send_time: bool,
}

// =============================================================================
// SEQUENCE
// =============================================================================

/// Lifecycle status of a sequence. Independent per sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceStatus {
    Draft,
    Active,
    Paused,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sequence {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: SequenceStatus,
    /// Steps in execution order.
    pub steps: Vec<Step>,
    /// Last step number handed out; step ids are never reused.
    #[serde(skip)]
    pub step_counter: u32,
}

// =============================================================================
// SEQUENCE STORE
// =============================================================================

/// Every sequence plus the shell's current selection.
/// Operations live in `services::sequence`.
#[derive(Debug, Clone, Default)]
pub struct SequenceStore {
    pub sequences: Vec<Sequence>,
    /// The sequence the editor is showing. A pointer, unrelated to `status`.
    pub active_id: Option<String>,
    /// Last sequence number handed out.
    pub sequence_counter: u32,
}

// =============================================================================
// CHAT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: ChatRole,
    pub content: String,
    /// Milliseconds since Unix epoch.
    pub timestamp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub helpful: Option<bool>,
    /// Knowledge article ids the reply draws on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
}

/// Chat UI state machine: `Idle -> AwaitingReply -> Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChatStatus {
    Idle,
    AwaitingReply,
}

/// Support chat transcript. Operations live in `services::support`.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub messages: Vec<ChatMessage>,
    pub status: ChatStatus,
    /// Bumped on every reset so late replies can tell they are stale.
    pub epoch: u64,
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub sequences: Arc<RwLock<SequenceStore>>,
    pub chat: Arc<RwLock<ChatSession>>,
    pub catalog: Arc<Catalog>,
    pub reply_delay: Arc<dyn ReplyDelay>,
}

impl AppState {
    /// Fresh state with the sample sequences and a greeting-only transcript.
    #[must_use]
    pub fn new(catalog: Catalog, reply_delay: Arc<dyn ReplyDelay>) -> Self {
        Self {
            sequences: Arc::new(RwLock::new(SequenceStore::seeded())),
            chat: Arc::new(RwLock::new(ChatSession::new())),
            catalog: Arc::new(catalog),
            reply_delay,
        }
    }
}

/// Current time as milliseconds since Unix epoch.
#[must_use]
pub fn now_ms() -> i64 {
    let Ok(dur) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    i64::try_from(dur.as_millis()).unwrap_or(0)
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
