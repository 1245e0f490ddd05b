//! klarity-core: board state machine, task model and the AI collaborator boundary

pub mod ai;
pub mod assistant;
pub mod board;
pub mod fallback;
pub mod inbox;
pub mod task;
pub mod time;
pub mod user;

pub use ai::{
    BriefSection, ChatContext, Collaborator, CollaboratorError, EmailSummary, GhostDraft,
    MorningBrief, ReflectionDraft, WeeklyInsight, WorkloadRating, parse_json_reply,
};
pub use assistant::{Assistant, AssistantReply, GHOST_SCAN_CONTEXT, ghosts_added_message};
pub use board::{Board, LaneFilter};
pub use fallback::StaticCollaborator;
pub use inbox::{Email, EmailCategory, Inbox, InboxTab, convert_to_task};
pub use task::{
    Activity, ActivityKind, Attachment, AttachmentKind, Confidence, Priority, ProjectInfo,
    Subtask, TagTone, Task, TaskId, TaskStatus,
};
pub use time::today_in;
pub use user::{LoadLevel, Role, User, UserId};
