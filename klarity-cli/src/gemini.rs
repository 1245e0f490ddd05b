//! Live collaborator backed by the Gemini `generateContent` REST API.

use anyhow::{Context, Result};
use async_trait::async_trait;
use klarity_core::fallback;
use klarity_core::{
    ChatContext, Collaborator, CollaboratorError, EmailSummary, GhostDraft, MorningBrief,
    ReflectionDraft, Task, User, WeeklyInsight, parse_json_reply,
};
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::AiSection;
use crate::prompts;

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Req {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Deserialize)]
struct Resp {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<RespContent>,
}

#[derive(Deserialize)]
struct RespContent {
    #[serde(default)]
    parts: Vec<RespPart>,
}

#[derive(Deserialize)]
struct RespPart {
    text: Option<String>,
}

/// Concatenated text of the first candidate.
fn reply_text(body: &str) -> Result<String, CollaboratorError> {
    let out: Resp = serde_json::from_str(body).map_err(|e| CollaboratorError::Malformed(e.to_string()))?;
    let mut s = String::new();
    if let Some(content) = out.candidates.into_iter().next().and_then(|c| c.content) {
        for p in content.parts {
            if let Some(t) = p.text {
                s.push_str(&t);
            }
        }
    }
    Ok(s.trim().to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Text,
    Json,
}

pub struct GeminiCollaborator {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
    temperature: f32,
}

impl GeminiCollaborator {
    pub fn new(cfg: &AiSection, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            api_key,
            model: cfg.model.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            temperature: cfg.temperature,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    async fn generate(&self, prompt: String, format: Format) -> Result<String, CollaboratorError> {
        let key = self.api_key.as_deref().ok_or(CollaboratorError::Unconfigured)?;

        let body = Req {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                response_mime_type: (format == Format::Json).then_some("application/json"),
            },
        };

        debug!(model = %self.model, ?format, "gemini request");
        let resp = self
            .client
            .post(self.endpoint())
            .query(&[("key", key)])
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| CollaboratorError::Transport(e.to_string()))?;

        let status = resp.status();
        let txt = resp
            .text()
            .await
            .map_err(|e| CollaboratorError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(CollaboratorError::Status {
                code: status.as_u16(),
                body: txt,
            });
        }
        reply_text(&txt)
    }
}

#[async_trait]
impl Collaborator for GeminiCollaborator {
    fn is_live(&self) -> bool {
        self.api_key.is_some()
    }

    async fn chat(&self, message: &str, ctx: ChatContext<'_>) -> Result<String, CollaboratorError> {
        self.generate(prompts::chat(message, ctx), Format::Text).await
    }

    async fn generate_ghost_tasks(&self, context: &str) -> Result<Vec<GhostDraft>, CollaboratorError> {
        let text = self.generate(prompts::ghost_tasks(context), Format::Json).await?;
        if text.is_empty() {
            return Ok(Vec::new());
        }
        parse_json_reply(&text)
    }

    async fn summarize_email_for_task(&self, email_body: &str) -> Result<EmailSummary, CollaboratorError> {
        let text = self.generate(prompts::email_summary(email_body), Format::Json).await?;
        if text.is_empty() {
            return Ok(fallback::email_summary_offline());
        }
        parse_json_reply(&text)
    }

    async fn generate_morning_brief(&self, tasks: &[Task], user: &User) -> Result<MorningBrief, CollaboratorError> {
        let text = self.generate(prompts::morning_brief(tasks, user), Format::Json).await?;
        parse_json_reply(&text)
    }

    async fn generate_weekly_report(&self, tasks: &[Task], user: &User) -> Result<WeeklyInsight, CollaboratorError> {
        let text = self.generate(prompts::weekly_report(tasks, user), Format::Json).await?;
        let patch: Value = parse_json_reply(&text)?;
        WeeklyInsight::merged_over(&fallback::weekly_report(user), patch)
    }

    async fn generate_reflection_draft(
        &self,
        tasks: &[Task],
        user: &User,
    ) -> Result<ReflectionDraft, CollaboratorError> {
        let text = self.generate(prompts::reflection_draft(tasks, user), Format::Json).await?;
        parse_json_reply(&text)
    }
}
