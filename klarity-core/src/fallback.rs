//! Static answers used whenever the live collaborator is absent or fails.
//!
//! Everything here is deterministic so the UI always has something to show.

use async_trait::async_trait;

use crate::ai::{
    BriefSection, ChatContext, Collaborator, CollaboratorError, CountWithTrend, DayLoad,
    EmailSummary, GhostDraft, Level, LevelWithTrend, MorningBrief, RateWithTrend,
    ReflectionDraft, Trend, WeeklyInsight, WorkStyleAxis, WorkloadRating,
};
use crate::task::{Priority, Task};
use crate::user::User;

pub const OFFLINE_CHAT_REPLY: &str =
    "I'm running in offline mode (No API Key). I can't analyze your real data right now.";
pub const FAILED_CHAT_REPLY: &str = "Sorry, I encountered an error connecting to the AI service.";
pub const EMPTY_CHAT_REPLY: &str = "I couldn't generate a response.";

pub const FALLBACK_GHOST_TITLE: &str = "Review deployment logs";
/// Confidence given to ghost drafts that do not carry one.
pub const DEFAULT_GHOST_CONFIDENCE: f32 = 0.85;

pub fn ghost_drafts() -> Vec<GhostDraft> {
    vec![GhostDraft {
        title: FALLBACK_GHOST_TITLE.to_string(),
        priority: Priority::Medium,
        weight: Some(20),
        tags: vec!["DevOps".to_string(), "AI Detected".to_string()],
        confidence: None,
    }]
}

pub const FOLLOW_UP_EMAIL_TITLE: &str = "Follow up on email";

pub fn email_summary_offline() -> EmailSummary {
    EmailSummary {
        title: FOLLOW_UP_EMAIL_TITLE.to_string(),
        priority: "MEDIUM".to_string(),
        description: "Manual follow up".to_string(),
    }
}

pub fn email_summary_failed() -> EmailSummary {
    EmailSummary {
        description: "Error processing email".to_string(),
        ..email_summary_offline()
    }
}

pub fn morning_brief(user: &User) -> MorningBrief {
    MorningBrief {
        headline: format!("Good morning, {}!", user.first_name()),
        sub_headline: "Here's your morning brief for Today.".to_string(),
        calendar: BriefSection {
            narrative: "Your schedule focuses on balancing oversight of the marketing campaign with final quality check sessions for the upcoming release.".to_string(),
            count_label: "4 Review Sessions".to_string(),
        },
        mail: BriefSection {
            narrative: "You have several updates regarding the mobile compatibility fixes and new feedback on the user research initiative.".to_string(),
            count_label: "15 New Messages".to_string(),
        },
        tasks: BriefSection {
            narrative: "With database performance successfully optimized, today's priority shifts to addressing the payment bug and finalizing the design review.".to_string(),
            count_label: "9 Active Tasks".to_string(),
        },
    }
}

pub fn weekly_report(user: &User) -> WeeklyInsight {
    let axis = |subject: &str, score: f64| WorkStyleAxis {
        subject: subject.to_string(),
        score,
        full_mark: 100.0,
    };
    let day = |day: &str, deep: f64, shallow: f64, meetings: f64| DayLoad {
        day: day.to_string(),
        deep,
        shallow,
        meetings,
    };

    WeeklyInsight {
        summary: format!(
            "Performance this week was hindered by a low completion rate of 25%, suggesting difficulty in closing out managerial responsibilities. While the burnout score of {} is moderate, the high number of outstanding tasks indicates potential fragmentation in focus or external blockers.",
            user.burnout_score
        ),
        completion_rate: RateWithTrend { value: 25.0, trend: -15.0 },
        backlog: CountWithTrend { value: 9, trend: Trend::Increasing },
        cognitive_load_level: LevelWithTrend { status: Level::Moderate, trend: Trend::Stable },
        activity_level: LevelWithTrend { status: Level::Low, trend: Trend::Decreasing },
        work_style: vec![
            axis("Focus", 85.0),
            axis("Speed", 65.0),
            axis("Collab", 70.0),
            axis("Quality", 90.0),
            axis("Wellness", 60.0),
        ],
        cognitive_load_distribution: vec![
            day("Mon", 3.5, 3.0, 2.0),
            day("Tue", 4.0, 2.5, 2.5),
            day("Wed", 6.0, 1.0, 1.0),
            day("Thu", 1.5, 4.0, 4.5),
            day("Fri", 3.0, 3.0, 2.0),
        ],
        anomalies: vec![
            "Completion rate is significantly below average (25%)".to_string(),
            "High task backlog remaining at the end of the work week".to_string(),
        ],
        action_items: vec![
            "Audit the 9 incomplete tasks to delegate at least 3 to direct reports".to_string(),
            "Implement time-blocking for high-priority managerial decisions to improve focus score.".to_string(),
            "Schedule a mid-week review to address blockers before they stall task completion.".to_string(),
        ],
    }
}

pub fn reflection_draft_failed() -> ReflectionDraft {
    ReflectionDraft {
        workload_rating: WorkloadRating::Balanced,
        factors: vec!["Task complexity".to_string()],
        summary: "A standard week with steady progress.".to_string(),
        has_blockers: false,
        blocker_causes: Vec::new(),
    }
}

pub fn reflection_draft_offline() -> ReflectionDraft {
    ReflectionDraft {
        has_blockers: true,
        blocker_causes: vec!["External dependencies".to_string()],
        ..reflection_draft_failed()
    }
}

/// Collaborator used when no API key is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticCollaborator;

#[async_trait]
impl Collaborator for StaticCollaborator {
    fn is_live(&self) -> bool {
        false
    }

    async fn chat(&self, _message: &str, _ctx: ChatContext<'_>) -> Result<String, CollaboratorError> {
        Ok(OFFLINE_CHAT_REPLY.to_string())
    }

    async fn generate_ghost_tasks(&self, _context: &str) -> Result<Vec<GhostDraft>, CollaboratorError> {
        Ok(ghost_drafts())
    }

    async fn summarize_email_for_task(&self, _email_body: &str) -> Result<EmailSummary, CollaboratorError> {
        Ok(email_summary_offline())
    }

    async fn generate_morning_brief(&self, _tasks: &[Task], user: &User) -> Result<MorningBrief, CollaboratorError> {
        Ok(morning_brief(user))
    }

    async fn generate_weekly_report(&self, _tasks: &[Task], user: &User) -> Result<WeeklyInsight, CollaboratorError> {
        Ok(weekly_report(user))
    }

    async fn generate_reflection_draft(
        &self,
        _tasks: &[Task],
        _user: &User,
    ) -> Result<ReflectionDraft, CollaboratorError> {
        Ok(reflection_draft_offline())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::Role;

    #[test]
    fn fallback_ghost_list_is_single_review_item() {
        let drafts = ghost_drafts();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].title, "Review deployment logs");
        assert_eq!(drafts[0].priority, Priority::Medium);
        assert_eq!(drafts[0].weight, Some(20));
    }

    #[test]
    fn brief_greets_by_first_name() {
        let u = User::new("u1", "Alex Chen", Role::Manager);
        assert_eq!(morning_brief(&u).headline, "Good morning, Alex!");
    }

    #[test]
    fn weekly_summary_mentions_burnout() {
        let u = User::new("u1", "Alex Chen", Role::Manager).with_burnout(42);
        assert!(weekly_report(&u).summary.contains("burnout score of 42"));
    }

    #[test]
    fn offline_reflection_reports_blockers() {
        let offline = reflection_draft_offline();
        assert!(offline.has_blockers);
        assert_eq!(offline.blocker_causes, vec!["External dependencies".to_string()]);

        let failed = reflection_draft_failed();
        assert!(!failed.has_blockers);
        assert!(failed.blocker_causes.is_empty());
    }
}
