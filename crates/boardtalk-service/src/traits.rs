use async_trait::async_trait;
use boardtalk_core::attachment::{Attachment, FileUpload};
use boardtalk_core::comment::{Comment, CreateComment, UpdateComment};
use boardtalk_core::identity::Identity;
use boardtalk_core::summary::ThreadSummary;
use boardtalk_core::task::{CreateTask, Task};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Abstraction over board discussion operations.
///
/// The TUI and the HTTP server program against this trait.
/// `LocalService` holds the board in memory and publishes push events.
/// `HttpService` wraps an async HTTP client talking to a remote board.
#[async_trait]
pub trait DiscussionService: Send + Sync {
    // -- Tasks --
    async fn list_tasks(&self) -> Result<Vec<Task>, ServiceError>;
    async fn get_task(&self, id: &str) -> Result<Task, ServiceError>;
    async fn create_task(&self, input: &CreateTask) -> Result<Task, ServiceError>;

    // -- Comments --
    async fn list_comments(&self, task_id: &str) -> Result<Vec<Comment>, ServiceError>;
    async fn create_comment(&self, input: &CreateComment) -> Result<Comment, ServiceError>;
    async fn update_comment(
        &self,
        id: &str,
        update: &UpdateComment,
    ) -> Result<Comment, ServiceError>;
    async fn delete_comment(&self, id: &str) -> Result<(), ServiceError>;

    // -- Attachments --
    async fn upload_attachment(
        &self,
        comment_id: &str,
        upload: &FileUpload,
    ) -> Result<Attachment, ServiceError>;
    async fn delete_attachment(&self, comment_id: &str, index: usize) -> Result<(), ServiceError>;

    // -- Board members --
    async fn list_board_members(&self, task_id: &str) -> Result<Vec<Identity>, ServiceError>;

    // -- Summaries --
    async fn summarize_thread(&self, task_id: &str) -> Result<ThreadSummary, ServiceError>;
}
