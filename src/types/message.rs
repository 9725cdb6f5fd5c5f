use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repository::Resource;
use crate::types::{Id, Summary};

/// A chat message, scoped by its author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Id,
    pub author_id: Id,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDraft {
    pub author_id: Id,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageChanges {
    pub body: String,
}

impl Resource for Message {
    type Draft = MessageDraft;
    type Changes = MessageChanges;

    const KIND: &'static str = "message";

    fn id(&self) -> Id {
        self.id
    }

    fn parent_id(&self) -> Id {
        self.author_id
    }

    fn summary(&self) -> Summary {
        Summary {
            id: self.id,
            code: String::new(),
            name: self.body.clone(),
        }
    }

    fn from_draft(id: Id, draft: MessageDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            author_id: draft.author_id,
            body: draft.body,
            sent_at: now,
        }
    }

    fn apply_changes(&mut self, changes: MessageChanges, _now: DateTime<Utc>) {
        self.body = changes.body;
    }
}
