use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentEventKind {
    Created,
    Updated,
    Deleted,
}

impl CommentEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentEventKind::Created => "comment_created",
            CommentEventKind::Updated => "comment_updated",
            CommentEventKind::Deleted => "comment_deleted",
        }
    }
}

impl fmt::Display for CommentEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pushed to thread viewers whenever a comment changes somewhere else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentEvent {
    pub kind: CommentEventKind,
    pub task_id: String,
    pub comment_id: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl CommentEvent {
    /// Notification text: the publisher's message when it sent one, else a
    /// generic line per event kind.
    pub fn notice(&self) -> String {
        match &self.message {
            Some(message) => message.clone(),
            None => match self.kind {
                CommentEventKind::Created => "New comment on this task".to_string(),
                CommentEventKind::Updated => "A comment was updated".to_string(),
                CommentEventKind::Deleted => "A comment was removed".to_string(),
            },
        }
    }
}
