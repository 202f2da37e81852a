use std::sync::Arc;

use boardtalk_core::attachment::{Attachment, FileUpload};
use boardtalk_core::comment::{Comment, CreateComment, UpdateComment};
use boardtalk_core::identity::Identity;
use boardtalk_core::summary::ThreadSummary;
use boardtalk_core::thread::{build_thread, Thread};
use boardtalk_service::{DiscussionService, ServiceError};

/// Invoked with the freshly loaded, flattened comment collection after every
/// load, so sibling panels can derive their own view without fetching.
pub type LoadedCallback = Box<dyn Fn(&[Comment]) + Send + Sync>;

/// Orchestrates one task's discussion against the service.
///
/// Holds nothing authoritative beyond the last-loaded snapshot: every
/// mutation goes confirm-then-reload, and each reload replaces the snapshot
/// wholesale. A reload raced by a push event is resolved by whichever load
/// finishes last; there is no merge and no version guard.
pub struct DiscussionController {
    service: Arc<dyn DiscussionService>,
    task_id: String,
    author_id: String,
    comments: Vec<Comment>,
    members: Vec<Identity>,
    on_loaded: Option<LoadedCallback>,
}

impl DiscussionController {
    pub fn new(service: Arc<dyn DiscussionService>, task_id: &str, author_id: &str) -> Self {
        Self {
            service,
            task_id: task_id.to_string(),
            author_id: author_id.to_string(),
            comments: Vec::new(),
            members: Vec::new(),
            on_loaded: None,
        }
    }

    pub fn set_on_loaded(&mut self, callback: LoadedCallback) {
        self.on_loaded = Some(callback);
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn members(&self) -> &[Identity] {
        &self.members
    }

    /// The derived root/reply structure for the current snapshot.
    pub fn thread(&self) -> Thread {
        build_thread(&self.comments)
    }

    /// Fetch the full comment collection and replace the snapshot wholesale.
    pub async fn reload(&mut self) -> Result<(), ServiceError> {
        let comments = self.service.list_comments(&self.task_id).await?;
        self.comments = comments;
        if let Some(on_loaded) = &self.on_loaded {
            on_loaded(&self.comments);
        }
        Ok(())
    }

    pub async fn load_members(&mut self) -> Result<(), ServiceError> {
        self.members = self.service.list_board_members(&self.task_id).await?;
        Ok(())
    }

    /// Create a root comment, or a reply when `parent_id` is given.
    pub async fn create(
        &mut self,
        content: &str,
        parent_id: Option<&str>,
    ) -> Result<Comment, ServiceError> {
        if content.trim().is_empty() {
            return Err(ServiceError::InvalidInput(
                "comment content cannot be empty".into(),
            ));
        }
        let comment = self
            .service
            .create_comment(&CreateComment {
                task_id: self.task_id.clone(),
                content: content.to_string(),
                author_id: self.author_id.clone(),
                parent_id: parent_id.map(String::from),
            })
            .await?;
        self.reload().await?;
        Ok(comment)
    }

    pub async fn edit(&mut self, comment_id: &str, content: &str) -> Result<(), ServiceError> {
        if content.trim().is_empty() {
            return Err(ServiceError::InvalidInput(
                "comment content cannot be empty".into(),
            ));
        }
        self.service
            .update_comment(
                comment_id,
                &UpdateComment {
                    content: Some(content.to_string()),
                },
            )
            .await?;
        self.reload().await
    }

    /// Delete a comment. The caller gates this behind a confirmation prompt.
    pub async fn delete(&mut self, comment_id: &str) -> Result<(), ServiceError> {
        self.service.delete_comment(comment_id).await?;
        self.reload().await
    }

    /// Attach a file, creating a carrier comment first.
    ///
    /// Two sequential steps: create the comment (content = the given text, or
    /// a placeholder naming the file when the text is blank), then upload the
    /// file to it. If the upload fails the just-created comment is deleted
    /// best-effort, and the upload error is what reaches the caller; a failed
    /// rollback is logged, never surfaced.
    pub async fn attach(
        &mut self,
        text: &str,
        file: FileUpload,
    ) -> Result<Attachment, ServiceError> {
        if file.file_name.trim().is_empty() {
            return Err(ServiceError::InvalidInput(
                "attachment needs a file name".into(),
            ));
        }
        let content = if text.trim().is_empty() {
            format!("Attached file: {}", file.file_name)
        } else {
            text.to_string()
        };
        let comment = self
            .service
            .create_comment(&CreateComment {
                task_id: self.task_id.clone(),
                content,
                author_id: self.author_id.clone(),
                parent_id: None,
            })
            .await?;

        match self.service.upload_attachment(&comment.id, &file).await {
            Ok(attachment) => {
                self.reload().await?;
                Ok(attachment)
            }
            Err(upload_err) => {
                if let Err(rollback_err) = self.service.delete_comment(&comment.id).await {
                    tracing::warn!(
                        comment_id = %comment.id,
                        error = %rollback_err,
                        "failed to roll back carrier comment after upload error"
                    );
                }
                Err(upload_err)
            }
        }
    }

    /// Remove an attachment by its position. The caller gates this behind a
    /// confirmation prompt. The index has no version guard; see delete
    /// semantics in the service.
    pub async fn detach(&mut self, comment_id: &str, index: usize) -> Result<(), ServiceError> {
        self.service.delete_attachment(comment_id, index).await?;
        self.reload().await
    }

    pub async fn summarize(&self) -> Result<ThreadSummary, ServiceError> {
        self.service.summarize_thread(&self.task_id).await
    }
}
