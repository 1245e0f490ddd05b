//! Users are referenced by id from tasks and activities; nothing owns them.

use serde::{Deserialize, Serialize};

pub type UserId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Role {
    Manager,
    Employee,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Manager => "Manager",
            Role::Employee => "Employee",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub role: Role,
    /// 0-100.
    pub burnout_score: u8,
}

impl User {
    pub fn new(id: impl Into<UserId>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
            burnout_score: 0,
        }
    }

    pub fn with_burnout(mut self, score: u8) -> Self {
        self.burnout_score = score.min(100);
        self
    }

    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("")
    }

    pub fn load_level(&self) -> LoadLevel {
        match self.burnout_score {
            s if s > 70 => LoadLevel::High,
            s if s < 30 => LoadLevel::Low,
            _ => LoadLevel::Medium,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_name_and_load_level() {
        let u = User::new("u1", "Alex Chen", Role::Manager).with_burnout(42);
        assert_eq!(u.first_name(), "Alex");
        assert_eq!(u.load_level(), LoadLevel::Medium);
        assert_eq!(u.clone().with_burnout(78).load_level(), LoadLevel::High);
        assert_eq!(u.with_burnout(15).load_level(), LoadLevel::Low);
    }

    #[test]
    fn burnout_is_capped() {
        let u = User::new("u2", "Sam", Role::Employee).with_burnout(250);
        assert_eq!(u.burnout_score, 100);
        assert_eq!(User::new("u3", "", Role::Employee).first_name(), "");
    }
}
