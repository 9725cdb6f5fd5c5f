use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repository::Resource;
use crate::types::{Id, Summary};

/// Per-user account preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub id: Id,
    pub user_id: Id,
    #[serde(flatten)]
    pub preferences: Preferences,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub theme: String,
    pub language: String,
    pub email_notifications: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: "light".to_owned(),
            language: "en".to_owned(),
            email_notifications: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsDraft {
    pub user_id: Id,
    pub preferences: Preferences,
}

impl Resource for Settings {
    type Draft = SettingsDraft;
    type Changes = Preferences;

    const KIND: &'static str = "settings";

    fn id(&self) -> Id {
        self.id
    }

    fn parent_id(&self) -> Id {
        self.user_id
    }

    fn summary(&self) -> Summary {
        Summary {
            id: self.id,
            code: String::new(),
            name: format!("{} / {}", self.preferences.theme, self.preferences.language),
        }
    }

    fn from_draft(id: Id, draft: SettingsDraft, _now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: draft.user_id,
            preferences: draft.preferences,
            updated_at: None,
        }
    }

    fn apply_changes(&mut self, changes: Preferences, now: DateTime<Utc>) {
        self.preferences = changes;
        self.updated_at = Some(now);
    }
}
