//! Assistant: infallible front for a [`Collaborator`].
//!
//! Every call returns a usable value: collaborator errors are logged and
//! replaced by the matching static fallback. There are no retries.

use tracing::warn;

use crate::ai::{
    ChatContext, Collaborator, CollaboratorError, EmailSummary, GhostDraft, MorningBrief,
    ReflectionDraft, WeeklyInsight,
};
use crate::fallback::{self, StaticCollaborator};
use crate::task::Task;
use crate::user::User;

/// Context handed to ghost generation when the user asks for it from chat.
pub const GHOST_SCAN_CONTEXT: &str =
    "Analysis of recent Slack and Email activity showing unlogged requests.";

/// What a chat message turned into.
#[derive(Debug, Clone, PartialEq)]
pub enum AssistantReply {
    Text(String),
    /// Drafts the caller should insert as ghost tasks.
    Ghosts(Vec<GhostDraft>),
}

pub fn ghosts_added_message(count: usize) -> String {
    format!("I've detected and added {count} ghost tasks to your board.")
}

/// Messages mentioning ghost or ad-hoc work trigger ghost generation instead of chat.
pub fn wants_ghost_scan(message: &str) -> bool {
    let m = message.to_lowercase();
    m.contains("ghost") || m.contains("ad-hoc")
}

pub struct Assistant {
    collaborator: Box<dyn Collaborator>,
}

impl Assistant {
    pub fn new(collaborator: impl Collaborator + 'static) -> Self {
        Self {
            collaborator: Box::new(collaborator),
        }
    }

    pub fn offline() -> Self {
        Self::new(StaticCollaborator)
    }

    pub fn is_live(&self) -> bool {
        self.collaborator.is_live()
    }

    pub async fn handle_message(&self, message: &str, ctx: ChatContext<'_>) -> AssistantReply {
        if wants_ghost_scan(message) {
            return AssistantReply::Ghosts(self.generate_ghost_tasks(GHOST_SCAN_CONTEXT).await);
        }
        AssistantReply::Text(self.chat(message, ctx).await)
    }

    pub async fn chat(&self, message: &str, ctx: ChatContext<'_>) -> String {
        match self.collaborator.chat(message, ctx).await {
            Ok(text) if text.trim().is_empty() => fallback::EMPTY_CHAT_REPLY.to_string(),
            Ok(text) => text,
            Err(CollaboratorError::Unconfigured) => fallback::OFFLINE_CHAT_REPLY.to_string(),
            Err(e) => {
                warn!(error = %e, "chat failed; using fallback reply");
                fallback::FAILED_CHAT_REPLY.to_string()
            }
        }
    }

    pub async fn generate_ghost_tasks(&self, context: &str) -> Vec<GhostDraft> {
        self.collaborator
            .generate_ghost_tasks(context)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "ghost generation failed; using fallback drafts");
                fallback::ghost_drafts()
            })
    }

    pub async fn summarize_email_for_task(&self, email_body: &str) -> EmailSummary {
        match self.collaborator.summarize_email_for_task(email_body).await {
            Ok(s) => s,
            Err(CollaboratorError::Unconfigured) => fallback::email_summary_offline(),
            Err(e) => {
                warn!(error = %e, "email summary failed; using fallback");
                fallback::email_summary_failed()
            }
        }
    }

    pub async fn generate_morning_brief(&self, tasks: &[Task], user: &User) -> MorningBrief {
        self.collaborator
            .generate_morning_brief(tasks, user)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "morning brief failed; using fallback");
                fallback::morning_brief(user)
            })
    }

    pub async fn generate_weekly_report(&self, tasks: &[Task], user: &User) -> WeeklyInsight {
        self.collaborator
            .generate_weekly_report(tasks, user)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "weekly report failed; using fallback");
                fallback::weekly_report(user)
            })
    }

    pub async fn generate_reflection_draft(&self, tasks: &[Task], user: &User) -> ReflectionDraft {
        match self.collaborator.generate_reflection_draft(tasks, user).await {
            Ok(d) => d,
            Err(CollaboratorError::Unconfigured) => fallback::reflection_draft_offline(),
            Err(e) => {
                warn!(error = %e, "reflection draft failed; using fallback");
                fallback::reflection_draft_failed()
            }
        }
    }
}

impl Default for Assistant {
    fn default() -> Self {
        Self::offline()
    }
}

impl std::fmt::Debug for Assistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Assistant")
            .field("live", &self.is_live())
            .finish()
    }
}
