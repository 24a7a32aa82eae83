//! Support service — canned-reply dispatcher and the support chat session.
//!
//! DESIGN
//! ======
//! Replies are data, not branches: an exact-match table of suggested
//! questions is checked first, then an ordered list of keyword rules where
//! the first case-insensitive substring hit wins, then a fallback. There
//! is no scoring and no merging of multiple hits.
//!
//! Sending moves the session `Idle -> AwaitingReply`, waits on the
//! injected `ReplyDelay` with no lock held, then appends the reply and
//! returns to `Idle`. A reset during the wait bumps the session epoch, so
//! the late reply is dropped instead of landing in the fresh transcript.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::state::{AppState, ChatMessage, ChatRole, ChatSession, ChatStatus, now_ms};

pub const GREETING: &str = "Hi there! I'm the KnoxEngage assistant. Ask me about pricing, getting started, \
     security, or integrations, or pick one of the suggested questions below.";

pub const FALLBACK_REPLY: &str = "Thanks for reaching out! I can help with pricing, getting started, security \
     and compliance, and CRM integrations. For anything else, our support team is available at \
     support@knoxengage.com and usually replies within one business day.";

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("message is empty")]
    EmptyMessage,
    #[error("still waiting for the previous reply")]
    ReplyPending,
    #[error("message not found: {0}")]
    MessageNotFound(Uuid),
    #[error("feedback only applies to assistant messages: {0}")]
    FeedbackNotAllowed(Uuid),
}

impl crate::error::ErrorCode for ChatError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyMessage => "E_EMPTY_MESSAGE",
            Self::ReplyPending => "E_REPLY_PENDING",
            Self::MessageNotFound(_) => "E_MESSAGE_NOT_FOUND",
            Self::FeedbackNotAllowed(_) => "E_FEEDBACK_NOT_ALLOWED",
        }
    }
}

/// Which rule produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyTopic {
    Suggested,
    Pricing,
    Onboarding,
    Security,
    Integration,
    Fallback,
}

/// Keyword group mapped to a canned reply.
#[derive(Debug)]
pub struct ReplyRule {
    pub topic: ReplyTopic,
    /// Lowercase substrings; any one matches.
    pub keywords: &'static [&'static str],
    pub reply: &'static str,
    pub sources: &'static [&'static str],
}

/// Bespoke answer for a literal suggested question.
#[derive(Debug)]
pub struct SuggestedAnswer {
    pub question: &'static str,
    pub answer: &'static str,
    pub sources: &'static [&'static str],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CannedReply {
    pub topic: ReplyTopic,
    pub content: &'static str,
    pub sources: &'static [&'static str],
}

// =============================================================================
// REPLY TABLES
// =============================================================================

/// Evaluated top to bottom; the first rule with a matching keyword wins.
pub const REPLY_RULES: &[ReplyRule] = &[
    ReplyRule {
        topic: ReplyTopic::Pricing,
        keywords: &["pricing", "cost"],
        reply: "KnoxEngage offers several pricing tiers to fit teams of any size. Starter is $49 per user \
                per month with core sequencing and enrichment. Professional is $99 per user per month and \
                adds AI email composition, Smart Send-Time and analytics. Enterprise includes custom \
                pricing, SSO and a dedicated success manager. Every plan starts with a 14-day free trial.",
        sources: &["kb-pricing"],
    },
    ReplyRule {
        topic: ReplyTopic::Onboarding,
        keywords: &["setup", "start", "begin"],
        reply: "Getting started takes about ten minutes. Connect your email inbox, generate your Ideal \
                Customer Profile from a few example customers, then pick a sequence template and add your \
                first leads. The onboarding checklist on your dashboard walks you through each step.",
        sources: &["kb-onboarding"],
    },
    ReplyRule {
        topic: ReplyTopic::Security,
        keywords: &["security", "protection", "compliance"],
        reply: "Security is built into KnoxEngage. We are SOC 2 Type II certified, support GDPR and CCPA \
                requests, and encrypt all data at rest and in transit. Our Responsible AI policies screen \
                generated content for unverified claims and personal data before anything is sent.",
        sources: &["kb-security"],
    },
    ReplyRule {
        topic: ReplyTopic::Integration,
        keywords: &["integration", "connect", "crm"],
        reply: "KnoxEngage integrates with Salesforce and HubSpot through a two-way sync, so contacts, \
                activities and replies stay in step with your CRM. Gmail and Outlook connect for sending, \
                and webhooks or Zapier cover everything else.",
        sources: &["kb-integrations"],
    },
];

/// Checked by exact string equality before the keyword rules.
pub const SUGGESTED_ANSWERS: &[SuggestedAnswer] = &[
    SuggestedAnswer {
        question: "How do I create my first sequence?",
        answer: "Open the Sequences tab and click New Sequence. Give it a name, then add steps one at a \
                 time: emails use a template and a send time, tasks need a short description, and LinkedIn \
                 or phone touches just need a delay. The first step goes out on day one and each following \
                 step waits three days by default. Reorder steps with the arrows, then set the sequence to \
                 Active when you are ready.",
        sources: &["kb-sequences", "kb-onboarding"],
    },
    SuggestedAnswer {
        question: "What is Smart Send-Time?",
        answer: "Smart Send-Time lets KnoxEngage choose the delivery time for an email step based on when \
                 each prospect is most likely to open. Turn it on per step in the sequence editor; steps \
                 without it go out at the time you set.",
        sources: &["kb-sequences"],
    },
    SuggestedAnswer {
        question: "How does lead enrichment work?",
        answer: "Enrichment fills in contact and company details for each lead. Providers are tried in order \
                 of cost until the missing fields are found, and results are refreshed every 30 days so your \
                 data stays current.",
        sources: &["kb-enrichment"],
    },
    SuggestedAnswer {
        question: "Can I connect KnoxEngage to Salesforce?",
        answer: "Yes. Go to Settings, then Integrations, and click Connect next to Salesforce. After you \
                 authorize access, contacts and activities sync both ways every five minutes, and replies \
                 are logged against the matching opportunity.",
        sources: &["kb-integrations"],
    },
];

/// Pick the canned reply for `input`.
#[must_use]
pub fn dispatch(input: &str) -> CannedReply {
    if let Some(suggested) = SUGGESTED_ANSWERS.iter().find(|s| s.question == input) {
        return CannedReply { topic: ReplyTopic::Suggested, content: suggested.answer, sources: suggested.sources };
    }

    let lowered = input.to_lowercase();
    REPLY_RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| lowered.contains(k)))
        .map_or(
            CannedReply { topic: ReplyTopic::Fallback, content: FALLBACK_REPLY, sources: &[] },
            |rule| CannedReply { topic: rule.topic, content: rule.reply, sources: rule.sources },
        )
}

/// The literal suggested questions, in display order.
#[must_use]
pub fn suggested_questions() -> Vec<&'static str> {
    SUGGESTED_ANSWERS.iter().map(|s| s.question).collect()
}

// =============================================================================
// REPLY DELAY
// =============================================================================

/// Cosmetic latency before a reply is delivered.
#[async_trait::async_trait]
pub trait ReplyDelay: Send + Sync {
    async fn wait(&self);
}

/// Sleeps for a fixed duration.
pub struct FixedDelay(pub Duration);

#[async_trait::async_trait]
impl ReplyDelay for FixedDelay {
    async fn wait(&self) {
        tokio::time::sleep(self.0).await;
    }
}

/// Replies immediately.
pub struct NoDelay;

#[async_trait::async_trait]
impl ReplyDelay for NoDelay {
    async fn wait(&self) {}
}

// =============================================================================
// SESSION
// =============================================================================

fn new_message(role: ChatRole, content: &str, sources: &[&str]) -> ChatMessage {
    ChatMessage {
        id: Uuid::new_v4(),
        role,
        content: content.to_string(),
        timestamp: now_ms(),
        helpful: None,
        sources: if sources.is_empty() { None } else { Some(sources.iter().map(|s| (*s).to_string()).collect()) },
    }
}

impl ChatSession {
    /// Transcript holding only the greeting.
    #[must_use]
    pub fn new() -> Self {
        Self { messages: vec![new_message(ChatRole::Assistant, GREETING, &[])], status: ChatStatus::Idle, epoch: 0 }
    }

    /// Replace the transcript with the greeting and orphan any pending reply.
    pub fn reset(&mut self) {
        self.messages = vec![new_message(ChatRole::Assistant, GREETING, &[])];
        self.status = ChatStatus::Idle;
        self.epoch += 1;
    }

    /// Append the user's message and start waiting. Returns the message and
    /// the epoch the reply must match.
    ///
    /// # Errors
    ///
    /// Returns `EmptyMessage` for blank input and `ReplyPending` if a reply
    /// is still on its way.
    pub fn begin_send(&mut self, content: &str) -> Result<(ChatMessage, u64), ChatError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if self.status == ChatStatus::AwaitingReply {
            return Err(ChatError::ReplyPending);
        }
        let message = new_message(ChatRole::User, content, &[]);
        self.messages.push(message.clone());
        self.status = ChatStatus::AwaitingReply;
        Ok((message, self.epoch))
    }

    /// Append the reply if the session has not been reset since `epoch`.
    pub fn deliver(&mut self, epoch: u64, reply: CannedReply) -> Option<ChatMessage> {
        if epoch != self.epoch {
            return None;
        }
        let message = new_message(ChatRole::Assistant, reply.content, reply.sources);
        self.messages.push(message.clone());
        self.status = ChatStatus::Idle;
        Some(message)
    }

    /// Give up on the reply for `epoch` and return to `Idle`. A session
    /// reset since then is left alone.
    pub fn abandon(&mut self, epoch: u64) {
        if epoch == self.epoch {
            self.status = ChatStatus::Idle;
        }
    }

    /// Mark an assistant message helpful or not, in place.
    ///
    /// # Errors
    ///
    /// Returns `MessageNotFound` for an unknown id and `FeedbackNotAllowed`
    /// for user messages.
    pub fn set_feedback(&mut self, message_id: Uuid, helpful: bool) -> Result<ChatMessage, ChatError> {
        let message = self
            .messages
            .iter_mut()
            .find(|m| m.id == message_id)
            .ok_or(ChatError::MessageNotFound(message_id))?;
        if message.role != ChatRole::Assistant {
            return Err(ChatError::FeedbackNotAllowed(message_id));
        }
        message.helpful = Some(helpful);
        Ok(message.clone())
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// SERVICE ENTRY POINTS
// =============================================================================

/// A user message and the reply it produced. `reply` is `None` when a
/// reset happened while the reply was pending.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub question: ChatMessage,
    pub reply: Option<ChatMessage>,
}

/// Send a message and wait for the canned reply.
///
/// Delivery runs on its own task so a dropped caller cannot leave the
/// session stuck in `AwaitingReply`.
///
/// # Errors
///
/// Returns `EmptyMessage` or `ReplyPending`; the transcript is unchanged on error.
pub async fn send_message(state: &AppState, content: &str) -> Result<Exchange, ChatError> {
    let (question, epoch) = state.chat.write().await.begin_send(content)?;
    let reply = dispatch(&question.content);
    info!(message_id = %question.id, topic = ?reply.topic, "support: message received");

    let chat = Arc::clone(&state.chat);
    let delay = Arc::clone(&state.reply_delay);
    let delivery = tokio::spawn(async move {
        delay.wait().await;
        chat.write().await.deliver(epoch, reply)
    });

    let reply = match delivery.await {
        Ok(Some(message)) => Some(message),
        Ok(None) => {
            debug!(message_id = %question.id, "support: session reset while replying, reply dropped");
            None
        }
        Err(e) => {
            warn!(error = %e, "support: reply task failed");
            state.chat.write().await.abandon(epoch);
            None
        }
    };
    Ok(Exchange { question, reply })
}

/// Current transcript and chat status.
pub async fn transcript(state: &AppState) -> (Vec<ChatMessage>, ChatStatus) {
    let chat = state.chat.read().await;
    (chat.messages.clone(), chat.status)
}

/// # Errors
///
/// Returns `MessageNotFound` or `FeedbackNotAllowed`.
pub async fn record_feedback(state: &AppState, message_id: Uuid, helpful: bool) -> Result<ChatMessage, ChatError> {
    let message = state.chat.write().await.set_feedback(message_id, helpful)?;
    info!(%message_id, helpful, "support: feedback recorded");
    Ok(message)
}

/// Reset to the greeting and return the new transcript.
pub async fn reset(state: &AppState) -> Vec<ChatMessage> {
    let mut chat = state.chat.write().await;
    chat.reset();
    info!(epoch = chat.epoch, "support: session reset");
    chat.messages.clone()
}

#[cfg(test)]
#[path = "support_test.rs"]
mod tests;
