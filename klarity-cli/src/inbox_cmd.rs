//! `klarity inbox`: triage a JSON file of emails and turn some into tasks.

use chrono::NaiveDate;
use klarity_core::{
    convert_to_task, Assistant, Board, EmailCategory, Inbox, InboxTab, TaskId, User,
};
use tracing::{info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum TabArg {
    Primary,
    Other,
    Later,
    Cleared,
}

impl From<TabArg> for InboxTab {
    fn from(t: TabArg) -> Self {
        match t {
            TabArg::Primary => InboxTab::Primary,
            TabArg::Other => InboxTab::Other,
            TabArg::Later => InboxTab::Later,
            TabArg::Cleared => InboxTab::Cleared,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum CategoryArg {
    Primary,
    Other,
    Later,
}

impl From<CategoryArg> for EmailCategory {
    fn from(c: CategoryArg) -> Self {
        match c {
            CategoryArg::Primary => EmailCategory::Primary,
            CategoryArg::Other => EmailCategory::Other,
            CategoryArg::Later => EmailCategory::Later,
        }
    }
}

/// Flag edits, applied in field order. Unknown ids are ignored.
#[derive(Debug, Default)]
pub struct Edits {
    pub read: Vec<String>,
    pub archive: Vec<String>,
    pub restore: Vec<String>,
    pub delete: Vec<String>,
    pub moves: Vec<(String, EmailCategory)>,
}

impl Edits {
    pub fn is_empty(&self) -> bool {
        self.read.is_empty()
            && self.archive.is_empty()
            && self.restore.is_empty()
            && self.delete.is_empty()
            && self.moves.is_empty()
    }
}

pub fn apply_edits(inbox: &mut Inbox, edits: &Edits) {
    for id in &edits.read {
        inbox.mark_read(id);
    }
    for id in &edits.archive {
        inbox.archive(id);
    }
    for id in &edits.restore {
        inbox.restore(id);
    }
    for id in &edits.delete {
        inbox.delete(id);
    }
    for (id, category) in &edits.moves {
        inbox.move_to(id, *category);
    }
}

/// Summarize each email, add the resulting task to the board and clear the
/// email. Returns the new task ids in conversion order.
pub async fn convert_emails(
    inbox: &mut Inbox,
    board: &mut Board,
    assistant: &Assistant,
    email_ids: &[String],
    user: &User,
    today: NaiveDate,
) -> Vec<TaskId> {
    let mut created = Vec::new();
    for email_id in email_ids {
        let Some(body) = inbox.get(email_id).map(|e| e.body.clone()) else {
            warn!(email = %email_id, "no such email");
            continue;
        };
        let summary = assistant.summarize_email_for_task(&body).await;
        let id = board.allocate_id("t-email");
        let id = board.add_task(convert_to_task(id, &summary, Some(user.id.clone()), today));
        inbox.mark_converted(email_id);
        info!(email = %email_id, task = %id, "converted email");
        created.push(id);
    }
    created
}

/// One line per email in the tab; `*` marks unread mail.
pub fn render_tab(inbox: &Inbox, tab: InboxTab) -> String {
    let mut out = format!("{:?} ({} unread)\n", tab, inbox.unread_count());
    for e in inbox.tab(tab) {
        let mark = if e.read { ' ' } else { '*' };
        out.push_str(&format!(
            "{} {:<6} {:<24} {} | {}\n",
            mark, e.id, e.sender, e.subject, e.preview
        ));
    }
    out
}
