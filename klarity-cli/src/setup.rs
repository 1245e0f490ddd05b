use anyhow::Result;
use klarity_core::Role;
use std::io::{self, Write};

use crate::config::{config_path, load_config_or_default, save_config, Config};

fn prompt(label: &str, current: &str) -> Result<String> {
    print!("{} [{}]: ", label, current);
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

pub fn run_setup() -> Result<()> {
    println!("Klarity setup (press enter to keep the value in brackets)\n");
    let mut cfg = load_config_or_default()?;

    let name = prompt("Your name", &cfg.user.name)?;
    let role = prompt("Role (manager/employee)", cfg.user.role.as_str())?;
    let burnout = prompt("Burnout score 0-100", &cfg.user.burnout_score.to_string())?;
    let timezone = prompt("Timezone (IANA, e.g. Europe/Berlin)", &cfg.user.timezone)?;

    apply_answers(&mut cfg, &name, &role, &burnout, &timezone);
    save_config(&cfg)?;

    println!("\nWrote {}", config_path()?.display());
    println!("\nNext recommended steps:");
    println!("- export GEMINI_API_KEY=...   (optional; without it Klarity runs offline)");
    println!("- klarity board");

    Ok(())
}

/// Blank or unparseable answers keep the current value.
fn apply_answers(cfg: &mut Config, name: &str, role: &str, burnout: &str, timezone: &str) {
    if !name.is_empty() {
        cfg.user.name = name.to_string();
    }
    match role.to_ascii_lowercase().as_str() {
        "manager" | "m" => cfg.user.role = Role::Manager,
        "employee" | "e" => cfg.user.role = Role::Employee,
        _ => {}
    }
    if let Ok(score) = burnout.parse::<u8>() {
        cfg.user.burnout_score = score.min(100);
    }
    if !timezone.is_empty() && klarity_core::time::parse_timezone(timezone).is_ok() {
        cfg.user.timezone = timezone.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answers_override_defaults() {
        let mut cfg = Config::default();
        apply_answers(&mut cfg, "Sam Rivera", "employee", "65", "Europe/Berlin");
        assert_eq!(cfg.user.name, "Sam Rivera");
        assert_eq!(cfg.user.role, Role::Employee);
        assert_eq!(cfg.user.burnout_score, 65);
        assert_eq!(cfg.user.timezone, "Europe/Berlin");
    }

    #[test]
    fn blank_and_bad_answers_keep_current() {
        let mut cfg = Config::default();
        apply_answers(&mut cfg, "", "boss", "lots", "Mars/Olympus");
        assert_eq!(cfg.user.name, "Alex Chen");
        assert_eq!(cfg.user.role, Role::Manager);
        assert_eq!(cfg.user.burnout_score, 42);
        assert_eq!(cfg.user.timezone, "UTC");
    }
}
