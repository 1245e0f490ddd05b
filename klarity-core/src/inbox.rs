//! Inbox: emails with read/archive flags and category tabs, plus conversion
//! of an email into a board task.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ai::EmailSummary;
use crate::fallback::FOLLOW_UP_EMAIL_TITLE;
use crate::task::{Priority, Task, TaskId, TaskStatus};
use crate::user::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmailCategory {
    Primary,
    Other,
    Later,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboxTab {
    Primary,
    Other,
    Later,
    /// Archived mail, whatever its category.
    Cleared,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    pub id: String,
    pub sender: String,
    pub subject: String,
    pub preview: String,
    pub body: String,
    pub date: String,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub archived: bool,
    pub category: EmailCategory,
}

impl Email {
    fn shown_in(&self, tab: InboxTab) -> bool {
        match tab {
            InboxTab::Cleared => self.archived,
            _ if self.archived => false,
            InboxTab::Primary => self.category == EmailCategory::Primary,
            InboxTab::Other => self.category == EmailCategory::Other,
            InboxTab::Later => self.category == EmailCategory::Later,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Inbox {
    emails: Vec<Email>,
}

impl Inbox {
    pub fn new(emails: Vec<Email>) -> Self {
        Self { emails }
    }

    pub fn emails(&self) -> &[Email] {
        &self.emails
    }

    pub fn get(&self, id: &str) -> Option<&Email> {
        self.emails.iter().find(|e| e.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Email> {
        self.emails.iter_mut().find(|e| e.id == id)
    }

    pub fn tab(&self, tab: InboxTab) -> Vec<&Email> {
        self.emails.iter().filter(|e| e.shown_in(tab)).collect()
    }

    pub fn unread_count(&self) -> usize {
        self.emails.iter().filter(|e| !e.read && !e.archived).count()
    }

    pub fn mark_read(&mut self, id: &str) {
        if let Some(e) = self.get_mut(id) {
            e.read = true;
        }
    }

    pub fn archive(&mut self, id: &str) {
        if let Some(e) = self.get_mut(id) {
            e.archived = true;
        }
    }

    pub fn restore(&mut self, id: &str) {
        if let Some(e) = self.get_mut(id) {
            e.archived = false;
        }
    }

    /// Recategorize; a moved email is always un-archived.
    pub fn move_to(&mut self, id: &str, category: EmailCategory) {
        if let Some(e) = self.get_mut(id) {
            e.category = category;
            e.archived = false;
        }
    }

    /// Emails are never dropped, only archived.
    pub fn delete(&mut self, id: &str) {
        self.archive(id);
    }

    /// Mark an email handled after it became a task.
    pub fn mark_converted(&mut self, id: &str) {
        if let Some(e) = self.get_mut(id) {
            e.read = true;
            e.archived = true;
        }
    }
}

/// Build the TODO task for an email from its AI summary.
///
/// A blank summary title falls back to the generic follow-up title.
pub fn convert_to_task(
    id: TaskId,
    summary: &EmailSummary,
    assignee: Option<UserId>,
    today: NaiveDate,
) -> Task {
    let title = match summary.title.trim() {
        "" => FOLLOW_UP_EMAIL_TITLE,
        t => t,
    };
    let mut task = Task::new(id, title, today)
        .with_status(TaskStatus::Todo)
        .with_priority(Priority::parse(&summary.priority).unwrap_or(Priority::Medium))
        .with_tags(["Email", "Ad-hoc"])
        .with_weight(30)
        .with_description(summary.description.clone());
    task.assignee = assignee;
    task
}
