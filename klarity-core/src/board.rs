//! Board: the task store and its lane state machine.
//!
//! Lanes are the four [`TaskStatus`] values. Any lane-to-lane move is legal;
//! there is no terminal state. The board is the single writer of its task
//! collection: views read lanes, and every mutation comes back through one of
//! the methods below.
//!
//! Nothing here fails. Blank titles and unknown ids are silently ignored,
//! which callers observe as a `false`/`None` return.
//!
//! Ordering: the collection is newest-first (creation prepends). Within a
//! lane, ghost tasks come first; otherwise collection order is kept.

use chrono::NaiveDate;
use tracing::debug;

use crate::ai::GhostDraft;
use crate::fallback::DEFAULT_GHOST_CONFIDENCE;
use crate::task::{Activity, Confidence, Priority, Task, TaskId, TaskStatus};
use crate::user::UserId;

pub const DEFAULT_TAG: &str = "General";
pub const DEFAULT_WEIGHT: u8 = 30;

/// Lane filters from the board toolbar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaneFilter {
    pub priority: Option<Priority>,
    pub assignee: Option<UserId>,
}

impl LaneFilter {
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(p) = self.priority {
            if task.priority != p {
                return false;
            }
        }
        if let Some(ref a) = self.assignee {
            if task.assignee.as_ref() != Some(a) {
                return false;
            }
        }
        true
    }

    pub fn is_active(&self) -> bool {
        self.priority.is_some() || self.assignee.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Board {
    tasks: Vec<Task>,
    selected: Option<TaskId>,
    filter: LaneFilter,
    next_seq: u64,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Board seeded with existing tasks, kept in the given order.
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            next_seq: tasks.len() as u64,
            tasks,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Every task, newest first, ignoring filters.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    fn next_id(&mut self, prefix: &str) -> TaskId {
        self.next_seq += 1;
        let mut id = format!("{prefix}-{}", self.next_seq);
        // Seeded tasks may already use this shape.
        while self.get(&id).is_some() {
            self.next_seq += 1;
            id = format!("{prefix}-{}", self.next_seq);
        }
        id
    }

    /// Move a task to `status`. Returns whether anything changed.
    pub fn move_task(&mut self, id: &str, status: TaskStatus) -> bool {
        let Some(task) = self.get_mut(id) else {
            return false;
        };
        if task.status == status {
            return false;
        }
        debug!(task = id, from = ?task.status, to = ?status, "move task");
        task.status = status;
        true
    }

    /// Detail-view "advance": TODO -> IN_PROGRESS -> REVIEW -> DONE -> TODO.
    pub fn advance(&mut self, id: &str) -> Option<TaskStatus> {
        let next = self.get(id)?.status.next();
        self.move_task(id, next);
        Some(next)
    }

    /// Create a task in `status` at the head of the collection.
    ///
    /// A title that is blank after trimming creates nothing.
    pub fn create_task(
        &mut self,
        status: TaskStatus,
        title: &str,
        today: NaiveDate,
        assignee: Option<UserId>,
    ) -> Option<TaskId> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        let id = self.next_id("t");
        let mut task = Task::new(id.clone(), title, today)
            .with_status(status)
            .with_priority(Priority::Medium)
            .with_tags([DEFAULT_TAG])
            .with_weight(DEFAULT_WEIGHT);
        task.assignee = assignee;

        debug!(task = %id, ?status, "create task");
        self.tasks.insert(0, task);
        Some(id)
    }

    /// Prepend a task built elsewhere (e.g. from an email).
    ///
    /// A task whose id is already on the board gets a fresh `t-N` id.
    /// Returns the id the task was stored under.
    pub fn add_task(&mut self, mut task: Task) -> TaskId {
        if self.get(&task.id).is_some() {
            let fresh = self.next_id("t");
            debug!(old = %task.id, new = %fresh, "re-id duplicate task");
            task.id = fresh;
        }
        let id = task.id.clone();
        debug!(task = %id, "add task");
        self.tasks.insert(0, task);
        id
    }

    /// Fresh id for a task built outside the board.
    pub fn allocate_id(&mut self, prefix: &str) -> TaskId {
        self.next_id(prefix)
    }

    /// Replace the whole record with the same id. Last write wins.
    pub fn update_task(&mut self, task: Task) -> bool {
        let Some(slot) = self.get_mut(&task.id) else {
            return false;
        };
        *slot = task;
        true
    }

    /// Remove a task. Closes the detail view if it was showing this task.
    pub fn delete_task(&mut self, id: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        let removed = self.tasks.len() != before;
        if removed {
            debug!(task = id, "delete task");
        }
        removed
    }

    /// Accept a ghost suggestion in place.
    pub fn promote_ghost(&mut self, id: &str) -> bool {
        match self.get_mut(id) {
            Some(task) if task.is_ghost() => {
                task.confirm();
                debug!(task = id, "promote ghost");
                true
            }
            _ => false,
        }
    }

    pub fn dismiss_ghost(&mut self, id: &str) -> bool {
        self.delete_task(id)
    }

    /// Insert AI drafts as ghost tasks in the TODO lane, ahead of everything else.
    pub fn add_ghost_tasks(
        &mut self,
        drafts: Vec<GhostDraft>,
        assignee: Option<UserId>,
        today: NaiveDate,
    ) -> Vec<TaskId> {
        // Pick a batch number none of whose ids are taken.
        let batch = loop {
            self.next_seq += 1;
            let batch = self.next_seq;
            if !(0..drafts.len()).any(|i| self.get(&format!("ghost-{batch}-{i}")).is_some()) {
                break batch;
            }
        };

        let mut ghosts = Vec::with_capacity(drafts.len());
        for (i, draft) in drafts.into_iter().enumerate() {
            let title = draft.title.trim();
            if title.is_empty() {
                continue;
            }
            let confidence = Confidence::new(draft.confidence.unwrap_or(DEFAULT_GHOST_CONFIDENCE));
            let mut task = Task::new(format!("ghost-{batch}-{i}"), title, today)
                .with_status(TaskStatus::Todo)
                .with_priority(draft.priority)
                .with_tags(draft.tags)
                .as_ghost(confidence);
            task.weight = draft.weight.map(|w| w.min(100));
            task.assignee = assignee.clone();
            ghosts.push(task);
        }

        let ids: Vec<TaskId> = ghosts.iter().map(|t| t.id.clone()).collect();
        debug!(count = ids.len(), "add ghost tasks");
        self.tasks.splice(0..0, ghosts);
        ids
    }

    /// Flip one subtask. Never touches the parent's status.
    pub fn toggle_subtask(&mut self, task_id: &str, subtask_id: &str) -> Option<bool> {
        let sub = self
            .get_mut(task_id)?
            .subtasks
            .iter_mut()
            .find(|s| s.id == subtask_id)?;
        sub.completed = !sub.completed;
        Some(sub.completed)
    }

    pub fn add_comment(&mut self, task_id: &str, activity: Activity) -> bool {
        match self.get_mut(task_id) {
            Some(task) => {
                task.push_activity(activity);
                true
            }
            None => false,
        }
    }

    pub fn select(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.selected = Some(id.to_string());
        true
    }

    pub fn close_detail(&mut self) {
        self.selected = None;
    }

    /// Task open in the detail view, if any.
    pub fn selected(&self) -> Option<&Task> {
        self.selected.as_deref().and_then(|id| self.get(id))
    }

    pub fn filter(&self) -> &LaneFilter {
        &self.filter
    }

    pub fn set_priority_filter(&mut self, priority: Option<Priority>) {
        self.filter.priority = priority;
    }

    pub fn set_assignee_filter(&mut self, assignee: Option<UserId>) {
        self.filter.assignee = assignee;
    }

    pub fn clear_filters(&mut self) {
        self.filter = LaneFilter::default();
    }

    /// Tasks shown in a lane: ghosts first, then collection order.
    pub fn lane(&self, status: TaskStatus) -> Vec<&Task> {
        let mut out: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|t| t.status == status && self.filter.matches(t))
            .collect();
        // Stable: ties keep collection order.
        out.sort_by_key(|t| !t.is_ghost());
        out
    }

    /// Count badge per lane, in [`TaskStatus::LANES`] order.
    pub fn lane_counts(&self) -> [usize; 4] {
        let mut counts = [0; 4];
        for t in self.tasks.iter().filter(|t| self.filter.matches(t)) {
            counts[t.status.lane_index()] += 1;
        }
        counts
    }

    pub fn ghost_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_ghost()).count()
    }
}
