//! Collaborator boundary: the generative-AI service behind briefs, reports,
//! ghost tasks and chat.
//!
//! Two strategies implement [`Collaborator`]: the static fallback
//! ([`crate::fallback::StaticCollaborator`]) and a live client supplied by the
//! application. Callers go through [`crate::assistant::Assistant`], which never
//! lets a collaborator error escape.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::task::{Priority, Task};
use crate::user::User;

#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("collaborator is not configured (no API key)")]
    Unconfigured,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("collaborator returned {code}: {body}")]
    Status { code: u16, body: String },
    #[error("collaborator returned an empty response")]
    EmptyResponse,
    #[error("malformed collaborator response: {0}")]
    Malformed(String),
}

/// What the assistant sees when answering a chat message.
#[derive(Debug, Clone, Copy)]
pub struct ChatContext<'a> {
    pub tasks: &'a [Task],
    pub user: &'a User,
}

/// A task suggestion before the board turns it into a ghost task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GhostDraft {
    pub title: String,
    #[serde(default = "default_priority", deserialize_with = "lenient_priority")]
    pub priority: Priority,
    /// 0-100.
    #[serde(default, deserialize_with = "lenient_weight")]
    pub weight: Option<u8>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, alias = "aiConfidence")]
    pub confidence: Option<f32>,
}

fn default_priority() -> Priority {
    Priority::Medium
}

fn lenient_priority<'de, D: Deserializer<'de>>(d: D) -> Result<Priority, D::Error> {
    let raw = Option::<String>::deserialize(d)?;
    Ok(raw
        .as_deref()
        .and_then(Priority::parse)
        .unwrap_or(Priority::Medium))
}

/// Any JSON number, rounded into 0..=100. Anything else is no weight.
fn lenient_weight<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u8>, D::Error> {
    let raw = Option::<Value>::deserialize(d)?;
    Ok(raw
        .as_ref()
        .and_then(Value::as_f64)
        .filter(|w| w.is_finite())
        .map(|w| w.round().clamp(0.0, 100.0) as u8))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailSummary {
    pub title: String,
    pub priority: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BriefSection {
    pub narrative: String,
    /// e.g. "3 Tasks Due".
    pub count_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MorningBrief {
    pub headline: String,
    pub sub_headline: String,
    pub calendar: BriefSection,
    pub mail: BriefSection,
    pub tasks: BriefSection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateWithTrend {
    pub value: f64,
    pub trend: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountWithTrend {
    pub value: u32,
    pub trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelWithTrend {
    pub status: Level,
    pub trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkStyleAxis {
    pub subject: String,
    #[serde(rename = "A")]
    pub score: f64,
    pub full_mark: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayLoad {
    pub day: String,
    pub deep: f64,
    pub shallow: f64,
    pub meetings: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyInsight {
    pub summary: String,
    pub completion_rate: RateWithTrend,
    pub backlog: CountWithTrend,
    pub cognitive_load_level: LevelWithTrend,
    pub activity_level: LevelWithTrend,
    pub work_style: Vec<WorkStyleAxis>,
    pub cognitive_load_distribution: Vec<DayLoad>,
    pub anomalies: Vec<String>,
    pub action_items: Vec<String>,
}

impl WeeklyInsight {
    /// Overlay a (possibly partial) model answer on `base`, key by key.
    ///
    /// Top-level keys present in `patch` replace the base value; everything
    /// else, typically the chart series, comes from `base`.
    pub fn merged_over(base: &WeeklyInsight, patch: Value) -> Result<WeeklyInsight, CollaboratorError> {
        let Value::Object(patch) = patch else {
            return Err(CollaboratorError::Malformed("weekly report is not a JSON object".into()));
        };
        let mut merged = serde_json::to_value(base)
            .map_err(|e| CollaboratorError::Malformed(e.to_string()))?;
        if let Value::Object(ref mut fields) = merged {
            for (k, v) in patch {
                fields.insert(k, v);
            }
        }
        serde_json::from_value(merged).map_err(|e| CollaboratorError::Malformed(e.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkloadRating {
    Light,
    Balanced,
    Heavy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReflectionDraft {
    pub workload_rating: WorkloadRating,
    pub factors: Vec<String>,
    pub summary: String,
    pub has_blockers: bool,
    #[serde(default)]
    pub blocker_causes: Vec<String>,
}

/// The generative-AI service as the rest of the app sees it.
#[async_trait]
pub trait Collaborator: Send + Sync {
    /// Whether answers come from a live model.
    fn is_live(&self) -> bool;

    async fn chat(&self, message: &str, ctx: ChatContext<'_>) -> Result<String, CollaboratorError>;

    async fn generate_ghost_tasks(&self, context: &str) -> Result<Vec<GhostDraft>, CollaboratorError>;

    async fn summarize_email_for_task(&self, email_body: &str) -> Result<EmailSummary, CollaboratorError>;

    async fn generate_morning_brief(&self, tasks: &[Task], user: &User) -> Result<MorningBrief, CollaboratorError>;

    async fn generate_weekly_report(&self, tasks: &[Task], user: &User) -> Result<WeeklyInsight, CollaboratorError>;

    async fn generate_reflection_draft(
        &self,
        tasks: &[Task],
        user: &User,
    ) -> Result<ReflectionDraft, CollaboratorError>;
}

fn fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)^\s*```[A-Za-z]*\s*\n?(.*?)\n?\s*```\s*$").expect("valid fence regex"))
}

/// Strip a Markdown code fence around a JSON reply, if present.
pub fn strip_code_fence(text: &str) -> &str {
    match fence_re().captures(text).and_then(|c| c.get(1)) {
        Some(m) => m.as_str().trim(),
        None => text.trim(),
    }
}

/// Parse a model reply that should be JSON.
pub fn parse_json_reply<T: DeserializeOwned>(text: &str) -> Result<T, CollaboratorError> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err(CollaboratorError::EmptyResponse);
    }
    serde_json::from_str(body).map_err(|e| CollaboratorError::Malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback;
    use crate::user::Role;

    #[test]
    fn strips_json_fence() {
        let raw = "```json\n[{\"title\": \"x\"}]\n```";
        assert_eq!(strip_code_fence(raw), "[{\"title\": \"x\"}]");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn ghost_drafts_tolerate_loose_priority() {
        let drafts: Vec<GhostDraft> = parse_json_reply(
            r#"[{"title":"Reply to vendor","priority":"high","weight":40},
                {"title":"Sync with design","priority":"someday"},
                {"title":"Patch CVE"}]"#,
        )
        .unwrap();
        assert_eq!(drafts.len(), 3);
        assert_eq!(drafts[0].priority, Priority::High);
        assert_eq!(drafts[0].weight, Some(40));
        assert_eq!(drafts[1].priority, Priority::Medium);
        assert_eq!(drafts[2].priority, Priority::Medium);
        assert!(drafts[2].tags.is_empty());
    }

    #[test]
    fn ghost_draft_weight_is_rounded_and_clamped() {
        let drafts: Vec<GhostDraft> = parse_json_reply(
            r#"[{"title":"Audit logs","weight":40.5},
                {"title":"Rotate keys","weight":900},
                {"title":"Update docs","weight":-3},
                {"title":"Triage","weight":"heavy"}]"#,
        )
        .unwrap();
        assert_eq!(drafts.len(), 4);
        assert_eq!(drafts[0].weight, Some(41));
        assert_eq!(drafts[1].weight, Some(100));
        assert_eq!(drafts[2].weight, Some(0));
        assert_eq!(drafts[3].weight, None);
    }

    #[test]
    fn empty_and_garbage_replies_are_errors() {
        assert!(matches!(
            parse_json_reply::<EmailSummary>("   "),
            Err(CollaboratorError::EmptyResponse)
        ));
        assert!(matches!(
            parse_json_reply::<EmailSummary>("not json"),
            Err(CollaboratorError::Malformed(_))
        ));
    }

    #[test]
    fn weekly_merge_keeps_base_chart_data() {
        let user = User::new("u1", "Alex Chen", Role::Manager).with_burnout(42);
        let base = fallback::weekly_report(&user);
        let patch = serde_json::json!({
            "summary": "Strong week.",
            "completionRate": { "value": 80.0, "trend": 10.0 }
        });
        let merged = WeeklyInsight::merged_over(&base, patch).unwrap();
        assert_eq!(merged.summary, "Strong week.");
        assert_eq!(merged.completion_rate.value, 80.0);
        assert_eq!(merged.work_style, base.work_style);
        assert_eq!(merged.cognitive_load_distribution.len(), 5);
    }

    #[test]
    fn weekly_merge_rejects_non_objects() {
        let user = User::new("u1", "Alex", Role::Manager);
        let base = fallback::weekly_report(&user);
        assert!(WeeklyInsight::merged_over(&base, serde_json::json!([1, 2])).is_err());
    }
}
