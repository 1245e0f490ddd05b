//! Background AI requests for the terminal board.
//!
//! The board loop sends requests and keeps drawing; replies come back as
//! events it drains once per frame. In-flight requests are never cancelled,
//! so a late reply is still applied.

use std::sync::Arc;

use klarity_core::{Assistant, AssistantReply, ChatContext, GhostDraft, MorningBrief, Task, User};
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, Clone)]
pub enum AiRequest {
    /// A message typed into the assistant prompt.
    Chat {
        request_id: u64,
        message: String,
        tasks: Vec<Task>,
        user: User,
    },
    GhostScan {
        request_id: u64,
        context: String,
    },
    Brief {
        request_id: u64,
        tasks: Vec<Task>,
        user: User,
    },
}

impl AiRequest {
    pub fn request_id(&self) -> u64 {
        match self {
            AiRequest::Chat { request_id, .. }
            | AiRequest::GhostScan { request_id, .. }
            | AiRequest::Brief { request_id, .. } => *request_id,
        }
    }
}

#[derive(Debug, Clone)]
pub enum AiEvent {
    Started { request_id: u64 },
    Reply { request_id: u64, text: String },
    Ghosts { request_id: u64, drafts: Vec<GhostDraft> },
    Brief { request_id: u64, brief: MorningBrief },
}

impl AiEvent {
    pub fn request_id(&self) -> u64 {
        match self {
            AiEvent::Started { request_id }
            | AiEvent::Reply { request_id, .. }
            | AiEvent::Ghosts { request_id, .. }
            | AiEvent::Brief { request_id, .. } => *request_id,
        }
    }
}

pub async fn run_worker(
    assistant: Arc<Assistant>,
    mut rx: mpsc::UnboundedReceiver<AiRequest>,
    tx: std::sync::mpsc::Sender<AiEvent>,
) {
    while let Some(req) = rx.recv().await {
        let assistant = Arc::clone(&assistant);
        let tx2 = tx.clone();
        tokio::spawn(async move {
            let request_id = req.request_id();
            debug!(request_id, "ai request");
            let _ = tx2.send(AiEvent::Started { request_id });
            let ev = answer(&assistant, req).await;
            let _ = tx2.send(ev);
        });
    }
}

async fn answer(assistant: &Assistant, req: AiRequest) -> AiEvent {
    match req {
        AiRequest::Chat {
            request_id,
            message,
            tasks,
            user,
        } => {
            let ctx = ChatContext { tasks: &tasks, user: &user };
            match assistant.handle_message(&message, ctx).await {
                AssistantReply::Text(text) => AiEvent::Reply { request_id, text },
                AssistantReply::Ghosts(drafts) => AiEvent::Ghosts { request_id, drafts },
            }
        }
        AiRequest::GhostScan { request_id, context } => AiEvent::Ghosts {
            request_id,
            drafts: assistant.generate_ghost_tasks(&context).await,
        },
        AiRequest::Brief {
            request_id,
            tasks,
            user,
        } => AiEvent::Brief {
            request_id,
            brief: assistant.generate_morning_brief(&tasks, &user).await,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use klarity_core::Role;
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn worker_answers_every_request() {
        let (req_tx, req_rx) = mpsc::unbounded_channel();
        let (ev_tx, ev_rx) = std::sync::mpsc::channel();
        tokio::spawn(run_worker(Arc::new(Assistant::offline()), req_rx, ev_tx));

        let user = User::new("u1", "Alex Chen", Role::Manager);
        req_tx
            .send(AiRequest::Chat {
                request_id: 1,
                message: "any ghost work?".into(),
                tasks: Vec::new(),
                user: user.clone(),
            })
            .unwrap();
        req_tx
            .send(AiRequest::Brief { request_id: 2, tasks: Vec::new(), user })
            .unwrap();

        let mut finals = tokio::task::spawn_blocking(move || {
            let mut out = Vec::new();
            while out.len() < 2 {
                let ev = ev_rx.recv_timeout(Duration::from_secs(5)).unwrap();
                if !matches!(ev, AiEvent::Started { .. }) {
                    out.push(ev);
                }
            }
            out
        })
        .await
        .unwrap();

        finals.sort_by_key(|e| e.request_id());
        assert!(matches!(&finals[0], AiEvent::Ghosts { drafts, .. } if drafts.len() == 1));
        assert!(matches!(&finals[1], AiEvent::Brief { brief, .. } if brief.headline == "Good morning, Alex!"));
    }
}
