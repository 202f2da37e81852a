use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::attachment::Attachment;
use crate::identity::Identity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub id: String,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

impl Author {
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.handle.as_deref())
            .unwrap_or(&self.id)
    }
}

impl From<&Identity> for Author {
    fn from(identity: &Identity) -> Self {
        Author {
            id: identity.id.clone(),
            handle: Some(identity.handle.clone()),
            display_name: Some(identity.display_name.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub task_id: String,
    pub author: Author,
    pub content: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub parent_id: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Comment {
    /// Normalizes one wire comment into the canonical shape. Everything past
    /// this point sees exactly one parent field and one author shape.
    pub fn from_raw(raw: RawComment) -> Comment {
        let parent_id = raw
            .parent_id
            .or(raw.in_reply_to)
            .map(RawRef::into_id);
        Comment {
            id: raw.id,
            task_id: raw.task_id,
            author: raw.author.into(),
            content: raw.content,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
            parent_id,
            attachments: raw.attachments,
        }
    }
}

/// Wire shape for a comment as stored data may deliver it: the parent
/// reference appears under `parent_id` or under the older `in_reply_to`, and
/// both the author and the parent may be an embedded object or a bare id.
#[derive(Debug, Clone, Deserialize)]
pub struct RawComment {
    pub id: String,
    pub task_id: String,
    pub author: RawActor,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub parent_id: Option<RawRef>,
    #[serde(default)]
    pub in_reply_to: Option<RawRef>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawRef {
    Id(String),
    Embedded { id: String },
}

impl RawRef {
    pub fn id(&self) -> &str {
        match self {
            RawRef::Id(id) => id,
            RawRef::Embedded { id } => id,
        }
    }

    fn into_id(self) -> String {
        match self {
            RawRef::Id(id) => id,
            RawRef::Embedded { id } => id,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawActor {
    Embedded {
        id: String,
        #[serde(default)]
        handle: Option<String>,
        #[serde(default)]
        display_name: Option<String>,
    },
    Id(String),
}

impl From<RawActor> for Author {
    fn from(actor: RawActor) -> Self {
        match actor {
            RawActor::Embedded {
                id,
                handle,
                display_name,
            } => Author {
                id,
                handle,
                display_name,
            },
            RawActor::Id(id) => Author {
                id,
                handle: None,
                display_name: None,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateComment {
    pub task_id: String,
    pub content: String,
    pub author_id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateComment {
    pub content: Option<String>,
}
