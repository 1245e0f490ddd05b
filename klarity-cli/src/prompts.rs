//! Prompt text sent to the live collaborator.

use klarity_core::{ChatContext, Task, TaskStatus, User};

pub fn chat(message: &str, ctx: ChatContext<'_>) -> String {
    let task_summary = ctx
        .tasks
        .iter()
        .map(|t| {
            format!(
                "- [{}] {} ({}) due {}",
                t.status.as_str(),
                t.title,
                t.priority.as_str(),
                t.due_date
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are Klarity AI, a professional task management assistant.\n\
User Context: {name} (Role: {role}).\n\
Current Burnout Score: {burnout}/100.\n\
\n\
Current Active Tasks:\n\
{task_summary}\n\
\n\
User Query: \"{message}\"\n\
\n\
Answer concisely. If the user asks about their workload, reference the tasks. \
If they seem stressed, offer helpful prioritization advice.",
        name = ctx.user.name,
        role = ctx.user.role.as_str(),
        burnout = ctx.user.burnout_score,
    )
}

pub fn ghost_tasks(context: &str) -> String {
    format!(
        "Based on this work context, identify potential tasks.\n\
Context: \"{context}\"\n\
Return a JSON array of task objects with 'title', 'priority' (LOW, MEDIUM, HIGH, CRITICAL), \
'weight' (0-100) and 'confidence' (0-1)."
    )
}

pub fn email_summary(email_body: &str) -> String {
    format!(
        "Analyze this email. Create a concise task title, suggest priority (LOW, MEDIUM, HIGH, CRITICAL), \
and a 1-sentence description.\n\
Email: \"{email_body}\"\n\
Return JSON format: {{ \"title\": \"string\", \"priority\": \"string\", \"description\": \"string\" }}"
    )
}

pub fn morning_brief(tasks: &[Task], user: &User) -> String {
    let task_summary = tasks
        .iter()
        .take(10)
        .map(|t| format!("{} ({})", t.title, t.status.as_str()))
        .collect::<Vec<_>>()
        .join("; ");

    format!(
        "Generate a structured \"Start-of-Day Brief\" for {name}.\n\
\n\
Context:\n\
- Tasks: {task_summary}\n\
- Role: {role}\n\
\n\
OUTPUT FORMAT (JSON):\n\
{{\n\
  \"headline\": \"Good morning, [Name]!\",\n\
  \"subHeadline\": \"Here's your morning brief for Today.\",\n\
  \"calendar\": {{ \"narrative\": \"One sentence summary of the schedule\", \"countLabel\": \"e.g. '5 Meetings'\" }},\n\
  \"mail\": {{ \"narrative\": \"One sentence summary of communication load\", \"countLabel\": \"e.g. '12 New Emails'\" }},\n\
  \"tasks\": {{ \"narrative\": \"One sentence summary of key tasks\", \"countLabel\": \"e.g. '3 Tasks Due'\" }}\n\
}}\n\
\n\
Tone: Professional, calm, narrative.",
        name = user.name,
        role = user.role.as_str(),
    )
}

pub fn weekly_report(tasks: &[Task], user: &User) -> String {
    let done = tasks.iter().filter(|t| t.status == TaskStatus::Done).count();
    format!(
        "Analyze this user's work week based on tasks: {total} tasks, {done} completed.\n\
User Role: {role}. Burnout Score: {burnout}.\n\
\n\
Return a JSON object with this exact structure:\n\
{{\n\
  \"summary\": \"2-3 sentences summarizing performance, focus, and stress.\",\n\
  \"completionRate\": {{ \"value\": number, \"trend\": number }},\n\
  \"backlog\": {{ \"value\": number, \"trend\": \"Increasing\" | \"Decreasing\" | \"Stable\" }},\n\
  \"cognitiveLoadLevel\": {{ \"status\": \"Low\" | \"Moderate\" | \"High\", \"trend\": \"Stable\" | \"Increasing\" | \"Decreasing\" }},\n\
  \"activityLevel\": {{ \"status\": \"Low\" | \"Moderate\" | \"High\", \"trend\": \"Decreasing\" | \"Increasing\" | \"Stable\" }},\n\
  \"workStyle\": [{{\"subject\": \"Focus\", \"A\": number, \"fullMark\": 100}}, ... Speed, Collab, Quality, Wellness],\n\
  \"cognitiveLoadDistribution\": [{{ \"day\": \"Mon\", \"deep\": number, \"shallow\": number, \"meetings\": number }}, ... Tue-Fri],\n\
  \"anomalies\": [\"string\", \"string\"],\n\
  \"actionItems\": [\"string\", \"string\", \"string\"]\n\
}}",
        total = tasks.len(),
        role = user.role.as_str(),
        burnout = user.burnout_score,
    )
}

pub fn reflection_draft(tasks: &[Task], user: &User) -> String {
    format!(
        "Analyze the user's weekly workload for a self-reflection check-in.\n\
Data: {total} tasks, {burnout} burnout score.\n\
\n\
1. Identify 3 key factors (e.g., 'Meetings', 'Context switching', 'Unplanned work') that likely influenced them.\n\
2. Determine if workload was 'Light', 'Balanced', or 'Heavy'.\n\
3. Determine if there are potential blockers (true/false) based on overdue tasks or low completion rate.\n\
4. If blockers exist, suggest 1-2 probable causes (e.g. 'Waiting on review', 'Unclear requirements', 'Technical debt').\n\
\n\
Return JSON: {{\n\
  \"workloadRating\": \"Light\" | \"Balanced\" | \"Heavy\",\n\
  \"factors\": [\"string\", \"string\"],\n\
  \"summary\": \"string\",\n\
  \"hasBlockers\": boolean,\n\
  \"blockerCauses\": [\"string\"]\n\
}}",
        total = tasks.len(),
        burnout = user.burnout_score,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use klarity_core::{Priority, Role};

    fn tasks() -> Vec<Task> {
        let due = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        vec![
            Task::new("t1", "Fix payment bug", due)
                .with_status(TaskStatus::InProgress)
                .with_priority(Priority::Critical),
            Task::new("t2", "Release notes", due).with_status(TaskStatus::Done),
        ]
    }

    #[test]
    fn chat_prompt_lists_tasks_and_user() {
        let u = User::new("u1", "Alex Chen", Role::Manager).with_burnout(42);
        let ts = tasks();
        let p = chat("what first?", ChatContext { tasks: &ts, user: &u });
        assert!(p.contains("Alex Chen (Role: Manager)"));
        assert!(p.contains("Current Burnout Score: 42/100."));
        assert!(p.contains("- [IN_PROGRESS] Fix payment bug (CRITICAL) due 2026-10-18"));
        assert!(p.contains("User Query: \"what first?\""));
    }

    #[test]
    fn weekly_prompt_counts_completed() {
        let u = User::new("u1", "Alex Chen", Role::Manager);
        let p = weekly_report(&tasks(), &u);
        assert!(p.starts_with("Analyze this user's work week based on tasks: 2 tasks, 1 completed."));
    }

    #[test]
    fn brief_prompt_caps_task_list() {
        let due = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let many: Vec<Task> = (0..15).map(|i| Task::new(format!("t{i}"), format!("Task {i}"), due)).collect();
        let u = User::new("u1", "Alex Chen", Role::Manager);
        let p = morning_brief(&many, &u);
        assert!(p.contains("Task 9 (TODO)"));
        assert!(!p.contains("Task 10 (TODO)"));
    }
}
