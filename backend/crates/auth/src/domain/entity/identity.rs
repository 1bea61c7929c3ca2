//! Identity Entity
//!
//! The signed-in user as stored in the backend's auth collection.

use chrono::{DateTime, Utc};
use kernel::id::AccountId;
use platform::pocketbase::time::deserialize_optional;
use serde::{Deserialize, Serialize};

use crate::domain::value_object::{learning_streak::LearningStreak, user_role::UserRole};

/// User identity and profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: AccountId,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub avatar: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub website: String,
    #[serde(default, rename = "linkedIn")]
    pub linked_in: String,
    #[serde(default)]
    pub learning_streak: u32,
    #[serde(default, deserialize_with = "deserialize_optional")]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional")]
    pub updated: Option<DateTime<Utc>>,
}

impl Identity {
    pub fn new(id: AccountId, email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            name: name.into(),
            username: String::new(),
            role: UserRole::default(),
            verified: false,
            avatar: String::new(),
            bio: String::new(),
            position: String::new(),
            company: String::new(),
            website: String::new(),
            linked_in: String::new(),
            learning_streak: 0,
            last_login: None,
            created: None,
            updated: None,
        }
    }

    pub fn streak(&self) -> LearningStreak {
        LearningStreak::new(self.learning_streak, self.last_login)
    }

    pub fn apply_streak(&mut self, streak: &LearningStreak) {
        self.learning_streak = streak.count;
        self.last_login = streak.last_login;
    }

    /// Name to show in the UI, falling back to the username
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.username
        } else {
            &self.name
        }
    }
}

/// Profile fields editable from the settings page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: String,
    pub bio: String,
    pub position: String,
    pub company: String,
    pub website: String,
    #[serde(rename = "linkedIn")]
    pub linked_in: String,
}

impl ProfileUpdate {
    pub fn apply_to(&self, identity: &mut Identity) {
        identity.name = self.name.clone();
        identity.bio = self.bio.clone();
        identity.position = self.position.clone();
        identity.company = self.company.clone();
        identity.website = self.website.clone();
        identity.linked_in = self.linked_in.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_backend_record() {
        let identity: Identity = serde_json::from_str(
            r#"{
                "id": "abc123def456ghi",
                "collectionName": "users",
                "email": "jane@gmail.com",
                "name": "Jane Doe",
                "role": "admin",
                "verified": true,
                "linkedIn": "https://linkedin.com/in/jane",
                "learningStreak": 3,
                "lastLogin": "",
                "created": "2024-05-01 09:30:00.123Z"
            }"#,
        )
        .unwrap();

        assert_eq!(identity.id.as_str(), "abc123def456ghi");
        assert_eq!(identity.role, UserRole::Admin);
        assert_eq!(identity.linked_in, "https://linkedin.com/in/jane");
        assert_eq!(identity.learning_streak, 3);
        assert!(identity.last_login.is_none());
        assert!(identity.created.is_some());
    }

    #[test]
    fn test_display_name_fallback() {
        let mut identity = Identity::new(AccountId::new(), "jane@gmail.com", " ");
        identity.username = "jane".into();
        assert_eq!(identity.display_name(), "jane");
    }
}
