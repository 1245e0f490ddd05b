//! Task model for the Klarity board.
//!
//! A task lives in exactly one lane (its [`TaskStatus`]). Ghost tasks are AI
//! suggestions awaiting confirmation; the ghost marker *is* the confidence
//! score, so a task cannot be a ghost without one (or carry one without being
//! a ghost).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::user::UserId;

pub type TaskId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Review,
    Done,
}

impl TaskStatus {
    /// Board lanes, left to right.
    pub const LANES: [TaskStatus; 4] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Review,
        TaskStatus::Done,
    ];

    /// Successor used by the detail view's "advance" control. DONE wraps to TODO.
    pub fn next(self) -> Self {
        match self {
            TaskStatus::Todo => TaskStatus::InProgress,
            TaskStatus::InProgress => TaskStatus::Review,
            TaskStatus::Review => TaskStatus::Done,
            TaskStatus::Done => TaskStatus::Todo,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Review => "REVIEW",
            TaskStatus::Done => "DONE",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Todo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Review => "Review",
            TaskStatus::Done => "Done",
        }
    }

    pub fn lane_index(self) -> usize {
        match self {
            TaskStatus::Todo => 0,
            TaskStatus::InProgress => 1,
            TaskStatus::Review => 2,
            TaskStatus::Done => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub const ALL: [Priority; 4] = [
        Priority::Low,
        Priority::Medium,
        Priority::High,
        Priority::Critical,
    ];

    /// Lenient parse for model output ("high", "HIGH", " High ").
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Some(Priority::Low),
            "MEDIUM" => Some(Priority::Medium),
            "HIGH" => Some(Priority::High),
            "CRITICAL" => Some(Priority::Critical),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Critical => "CRITICAL",
        }
    }
}

/// AI confidence in a ghost suggestion, clamped to 0..=1.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct Confidence(f32);

impl Confidence {
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            return Self(0.0);
        }
        Self(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f32 {
        self.0
    }
}

impl From<f32> for Confidence {
    fn from(value: f32) -> Self {
        Confidence::new(value)
    }
}

impl From<Confidence> for f32 {
    fn from(c: Confidence) -> Self {
        c.0
    }
}

/// Badge tone derived from a task's first tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagTone {
    Bug,
    Feature,
    Design,
    Neutral,
}

impl TagTone {
    pub fn for_tag(tag: &str) -> Self {
        let lower = tag.to_lowercase();
        if lower.contains("bug") {
            TagTone::Bug
        } else if lower.contains("feature") {
            TagTone::Feature
        } else if lower.contains("design") {
            TagTone::Design
        } else {
            TagTone::Neutral
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: String,
    pub title: String,
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityKind {
    Comment,
    History,
    Update,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttachmentKind {
    File,
    Link,
    Image,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

/// One entry of a task's audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub user: UserId,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    pub id: String,
    pub name: String,
}

/// Ghost state of a task: the AI confidence, if it is still a suggestion.
///
/// On the wire this is `aiConfidence` plus a derived `isGhost`. An incoming
/// `isGhost` is ignored; only the confidence decides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "GhostWire", into = "GhostWire")]
struct GhostMark(Option<Confidence>);

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GhostWire {
    #[serde(default)]
    is_ghost: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ai_confidence: Option<Confidence>,
}

impl From<GhostWire> for GhostMark {
    fn from(w: GhostWire) -> Self {
        GhostMark(w.ai_confidence)
    }
}

impl From<GhostMark> for GhostWire {
    fn from(m: GhostMark) -> Self {
        GhostWire {
            is_ghost: m.0.is_some(),
            ai_confidence: m.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub status: TaskStatus,
    pub priority: Priority,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<UserId>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub due_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,

    /// Present exactly when the task is an unconfirmed AI suggestion.
    #[serde(flatten)]
    ghost: GhostMark,

    /// 0-100 effort estimate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,

    // Append-only; see `push_activity`.
    #[serde(default)]
    activities: Vec<Activity>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectInfo>,
}

impl Task {
    pub fn new(id: impl Into<TaskId>, title: impl Into<String>, due_date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status: TaskStatus::Todo,
            priority: Priority::Medium,
            assignee: None,
            tags: Vec::new(),
            due_date,
            start_date: None,
            ghost: GhostMark::default(),
            weight: None,
            description: None,
            subtasks: Vec::new(),
            activities: Vec::new(),
            project: None,
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<UserId>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_weight(mut self, weight: u8) -> Self {
        self.weight = Some(weight.min(100));
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_subtasks(mut self, subtasks: Vec<Subtask>) -> Self {
        self.subtasks = subtasks;
        self
    }

    /// Mark as an AI suggestion.
    pub fn as_ghost(mut self, confidence: Confidence) -> Self {
        self.ghost = GhostMark(Some(confidence));
        self
    }

    pub fn is_ghost(&self) -> bool {
        self.ghost.0.is_some()
    }

    pub fn ai_confidence(&self) -> Option<Confidence> {
        self.ghost.0
    }

    /// Accept a ghost suggestion: the task becomes an ordinary task.
    pub fn confirm(&mut self) {
        self.ghost = GhostMark(None);
    }

    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    pub fn push_activity(&mut self, activity: Activity) {
        self.activities.push(activity);
    }

    pub fn badge_tone(&self) -> Option<TagTone> {
        self.tags.first().map(|t| TagTone::for_tag(t))
    }

    /// Rounded subtask completion percentage; 0 without subtasks.
    pub fn progress_percent(&self) -> u8 {
        if self.subtasks.is_empty() {
            return 0;
        }
        let done = self.subtasks.iter().filter(|s| s.completed).count();
        ((done as f64 / self.subtasks.len() as f64) * 100.0).round() as u8
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_date < today && self.status != TaskStatus::Done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn advance_cycles_through_every_lane() {
        let mut s = TaskStatus::Todo;
        let mut seen = vec![s];
        for _ in 0..3 {
            s = s.next();
            seen.push(s);
        }
        assert_eq!(seen, TaskStatus::LANES.to_vec());
        assert_eq!(TaskStatus::Done.next(), TaskStatus::Todo);
    }

    #[test]
    fn ghost_marker_and_confidence_are_one_field() {
        let mut t = Task::new("g1", "Check logs", day(2026, 3, 1)).as_ghost(Confidence::new(0.9));
        assert!(t.is_ghost());
        assert!(t.ai_confidence().is_some());

        t.confirm();
        assert!(!t.is_ghost());
        assert!(t.ai_confidence().is_none());
    }

    #[test]
    fn confidence_is_clamped() {
        assert_eq!(Confidence::new(1.7).value(), 1.0);
        assert_eq!(Confidence::new(-0.2).value(), 0.0);
        assert_eq!(Confidence::new(f32::NAN).value(), 0.0);
    }

    #[test]
    fn progress_rounds_and_ignores_status() {
        let subtasks = vec![
            Subtask { id: "s1".into(), title: "a".into(), completed: true },
            Subtask { id: "s2".into(), title: "b".into(), completed: false },
            Subtask { id: "s3".into(), title: "c".into(), completed: false },
        ];
        let t = Task::new("t1", "x", day(2026, 3, 1)).with_subtasks(subtasks);
        assert_eq!(t.progress_percent(), 33);
        assert_eq!(t.status, TaskStatus::Todo);

        let empty = Task::new("t2", "y", day(2026, 3, 1));
        assert_eq!(empty.progress_percent(), 0);
    }

    #[test]
    fn overdue_excludes_done() {
        let today = day(2026, 3, 10);
        let late = Task::new("t1", "late", day(2026, 3, 9));
        assert!(late.is_overdue(today));
        assert!(!late.clone().with_status(TaskStatus::Done).is_overdue(today));
        assert!(!Task::new("t2", "on time", today).is_overdue(today));
    }

    #[test]
    fn first_tag_drives_badge_tone() {
        let t = Task::new("t1", "x", day(2026, 3, 1)).with_tags(["Bugfix", "Design"]);
        assert_eq!(t.badge_tone(), Some(TagTone::Bug));
        assert_eq!(TagTone::for_tag("New Feature"), TagTone::Feature);
        assert_eq!(TagTone::for_tag("General"), TagTone::Neutral);
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let t = Task::new("g1", "Review", day(2026, 3, 1))
            .with_priority(Priority::High)
            .as_ghost(Confidence::new(0.5));
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v["dueDate"], "2026-03-01");
        assert_eq!(v["priority"], "HIGH");
        assert_eq!(v["status"], "TODO");
        assert_eq!(v["aiConfidence"], 0.5);
        assert_eq!(v["isGhost"], true);

        let back: Task = serde_json::from_value(v).unwrap();
        assert!(back.is_ghost());
    }

    #[test]
    fn is_ghost_is_derived_from_confidence() {
        let plain = serde_json::to_value(Task::new("t1", "Plan", day(2026, 3, 1))).unwrap();
        assert_eq!(plain["isGhost"], false);
        assert!(plain.get("aiConfidence").is_none());

        // A bare flag without a confidence is not a ghost.
        let flagged: Task = serde_json::from_str(
            r#"{"id":"t2","title":"Flagged","status":"TODO","priority":"LOW",
                "dueDate":"2026-03-01","isGhost":true}"#,
        )
        .unwrap();
        assert!(!flagged.is_ghost());
    }

    #[test]
    fn priority_parse_is_lenient() {
        assert_eq!(Priority::parse(" high "), Some(Priority::High));
        assert_eq!(Priority::parse("CRITICAL"), Some(Priority::Critical));
        assert_eq!(Priority::parse("urgent"), None);
    }
}
