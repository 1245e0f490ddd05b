use anyhow::{Context, Result};
use klarity_core::{Role, User};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::state::ensure_klarity_home;

/// Environment variables checked for the collaborator credential, in order.
pub const API_KEY_VARS: [&str; 2] = ["API_KEY", "GEMINI_API_KEY"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ai: AiSection,
    #[serde(default)]
    pub user: UserSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSection {
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for AiSection {
    fn default() -> Self {
        Self {
            model: "gemini-3-flash-preview".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            temperature: 0.4,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSection {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub burnout_score: u8,
    /// IANA name; "today" for new tasks is computed here.
    pub timezone: String,
}

impl Default for UserSection {
    fn default() -> Self {
        Self {
            id: "u1".to_string(),
            name: "Alex Chen".to_string(),
            role: Role::Manager,
            burnout_score: 42,
            timezone: "UTC".to_string(),
        }
    }
}

impl Config {
    pub fn user(&self) -> User {
        User::new(self.user.id.clone(), self.user.name.clone(), self.user.role)
            .with_burnout(self.user.burnout_score)
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_klarity_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    load_config_at(&config_path()?)
}

fn load_config_at(p: &Path) -> Result<Config> {
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s)
}

pub fn parse_config(s: &str) -> Result<Config> {
    toml::from_str(s).context("parse config.toml")
}

/// Like [`load_config`], but an unreadable file yields defaults. Used by the
/// commands that rewrite the config.
pub fn load_config_or_default() -> Result<Config> {
    Ok(config_or_default_at(&config_path()?))
}

fn config_or_default_at(p: &Path) -> Config {
    load_config_at(p).unwrap_or_else(|e| {
        warn!(error = %format!("{e:#}"), "ignoring unreadable config");
        Config::default()
    })
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
        if parse_config(&s).is_ok() {
            println!("Config already exists: {}", p.display());
            return Ok(());
        }
        let bak = p.with_extension("toml.bak");
        fs::rename(&p, &bak).with_context(|| format!("move {} aside", p.display()))?;
        println!("Moved unreadable config to {}", bak.display());
    }
    let cfg = Config::default();
    save_config(&cfg)?;
    println!("Wrote {}", p.display());
    Ok(())
}

/// The collaborator credential, if any. Blank values count as unset.
pub fn api_key_from_env() -> Option<String> {
    api_key_from(|name| std::env::var(name).ok())
}

fn api_key_from(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    API_KEY_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_fills_defaults() {
        let cfg = parse_config(
            r#"
            [user]
            name = "Priya Patel"
            role = "Employee"
            burnout_score = 60
            "#,
        )
        .unwrap();
        assert_eq!(cfg.ai.model, "gemini-3-flash-preview");
        assert_eq!(cfg.user.timezone, "UTC");
        let u = cfg.user();
        assert_eq!(u.first_name(), "Priya");
        assert_eq!(u.role, Role::Employee);
        assert_eq!(u.burnout_score, 60);
    }

    #[test]
    fn malformed_config_falls_back_to_defaults_for_repair() {
        let p = std::env::temp_dir().join(format!("klarity-bad-config-{}.toml", std::process::id()));
        fs::write(&p, "[user]\nburnout_score = \"very\"").unwrap();

        let err = load_config_at(&p).unwrap_err();
        assert!(format!("{err:#}").contains("parse config.toml"));
        let cfg = config_or_default_at(&p);
        assert_eq!(cfg.user.name, "Alex Chen");

        fs::remove_file(&p).unwrap();
        assert_eq!(load_config_at(&p).unwrap().user.id, "u1");
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let s = toml::to_string_pretty(&Config::default()).unwrap();
        let back = parse_config(&s).unwrap();
        assert_eq!(back.ai.base_url, AiSection::default().base_url);
        assert_eq!(back.user.id, "u1");
    }

    #[test]
    fn api_key_prefers_first_non_blank_var() {
        let key = api_key_from(|name| match name {
            "API_KEY" => Some("  ".to_string()),
            "GEMINI_API_KEY" => Some("g-123".to_string()),
            _ => None,
        });
        assert_eq!(key.as_deref(), Some("g-123"));
        assert_eq!(api_key_from(|_| None), None);
    }
}
