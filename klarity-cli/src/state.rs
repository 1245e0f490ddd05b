use anyhow::{Context, Result};
use klarity_core::{Email, Task};
use std::fs;
use std::path::{Path, PathBuf};

pub fn klarity_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".klarity"))
}

pub fn ensure_klarity_home() -> Result<PathBuf> {
    let dir = klarity_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn log_path() -> Result<PathBuf> {
    Ok(ensure_klarity_home()?.join("klarity.log"))
}

/// Read a JSON array of tasks used to seed the in-memory board.
pub fn read_seed_tasks(path: &Path) -> Result<Vec<Task>> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_seed_tasks(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn parse_seed_tasks(s: &str) -> Result<Vec<Task>> {
    Ok(serde_json::from_str(s)?)
}

pub fn seed_tasks(path: Option<&Path>) -> Result<Vec<Task>> {
    match path {
        Some(p) => read_seed_tasks(p),
        None => Ok(Vec::new()),
    }
}

/// Read a JSON array of emails for the inbox.
pub fn read_emails(path: &Path) -> Result<Vec<Email>> {
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    parse_emails(&s).with_context(|| format!("parse {}", path.display()))
}

pub fn parse_emails(s: &str) -> Result<Vec<Email>> {
    Ok(serde_json::from_str(s)?)
}

pub fn write_emails(path: &Path, emails: &[Email]) -> Result<()> {
    let s = serde_json::to_string_pretty(emails).context("serialize emails")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use klarity_core::{Priority, TaskStatus};

    #[test]
    fn parses_camel_case_seed() {
        let tasks = parse_seed_tasks(
            r#"[
              {"id":"t1","title":"Fix payment bug","status":"IN_PROGRESS","priority":"CRITICAL",
               "tags":["Bug"],"dueDate":"2026-10-17","assignee":"u2"},
              {"id":"g1","title":"Reply to Sarah","status":"TODO","priority":"LOW",
               "dueDate":"2026-10-18","aiConfidence":0.92}
            ]"#,
        )
        .unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].status, TaskStatus::InProgress);
        assert_eq!(tasks[0].priority, Priority::Critical);
        assert!(!tasks[0].is_ghost());
        assert!(tasks[1].is_ghost());
    }

    #[test]
    fn parses_emails_with_default_flags() {
        let emails = parse_emails(
            r#"[{"id":"e1","sender":"Sarah Connor","subject":"Q3 numbers","preview":"Quick one",
                 "body":"Can you send the Q3 numbers?","date":"9:12 AM","category":"PRIMARY"}]"#,
        )
        .unwrap();
        assert_eq!(emails[0].category, klarity_core::EmailCategory::Primary);
        assert!(!emails[0].read);
        assert!(!emails[0].archived);
    }

    #[test]
    fn rejects_bad_status() {
        assert!(parse_seed_tasks(r#"[{"id":"t1","title":"x","status":"BLOCKED","priority":"LOW","dueDate":"2026-10-18"}]"#).is_err());
    }
}
