use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use boardtalk_core::attachment::{content_type_for, Attachment, FileUpload};
use boardtalk_core::comment::{Author, Comment, CreateComment, UpdateComment};
use boardtalk_core::event::{CommentEvent, CommentEventKind};
use boardtalk_core::identity::Identity;
use boardtalk_core::summary::{digest, ThreadSummary};
use boardtalk_core::task::{CreateTask, Task, TaskStatus};
use chrono::Utc;
use uuid::Uuid;

use crate::{DiscussionService, EventBus, ServiceError};

#[derive(Default)]
struct BoardState {
    tasks: Vec<Task>,
    comments: Vec<Comment>,
    members: Vec<Identity>,
    blobs: HashMap<String, Vec<u8>>,
}

/// In-memory board. All state sits behind one mutex; every comment mutation
/// publishes a push event on the shared bus, including mutations arriving
/// through the HTTP API when a server wraps this service.
#[derive(Clone)]
pub struct LocalService {
    state: Arc<Mutex<BoardState>>,
    bus: EventBus,
}

impl LocalService {
    pub fn new() -> Self {
        Self::with_bus(EventBus::default())
    }

    pub fn with_bus(bus: EventBus) -> Self {
        Self {
            state: Arc::new(Mutex::new(BoardState::default())),
            bus,
        }
    }

    pub fn bus(&self) -> EventBus {
        self.bus.clone()
    }

    fn with_state<F, T>(&self, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&mut BoardState) -> Result<T, ServiceError>,
    {
        let mut state = self
            .state
            .lock()
            .map_err(|_| ServiceError::Internal("board state lock poisoned".into()))?;
        f(&mut state)
    }

    fn publish(&self, kind: CommentEventKind, task_id: &str, comment_id: &str, message: Option<String>) {
        self.bus.publish(CommentEvent {
            kind,
            task_id: task_id.to_string(),
            comment_id: comment_id.to_string(),
            message,
        });
    }

    /// Returns the member with this handle, creating one if the board does
    /// not know it yet.
    pub fn ensure_member(&self, handle: &str) -> Result<Identity, ServiceError> {
        let handle = handle.trim();
        if handle.is_empty() {
            return Err(ServiceError::InvalidInput("member handle cannot be empty".into()));
        }
        self.with_state(|state| {
            if let Some(member) = state.members.iter().find(|m| m.handle == handle) {
                return Ok(member.clone());
            }
            let member = Identity {
                id: Uuid::new_v4().to_string(),
                handle: handle.to_string(),
                display_name: capitalize(handle),
                full_name: None,
                avatar_url: None,
            };
            state.members.push(member.clone());
            Ok(member)
        })
    }

    /// Raw bytes of a stored attachment, for the download endpoint.
    pub fn attachment_bytes(&self, attachment_id: &str) -> Result<Vec<u8>, ServiceError> {
        self.with_state(|state| {
            state
                .blobs
                .get(attachment_id)
                .cloned()
                .ok_or_else(|| ServiceError::NotFound(format!("attachment {attachment_id}")))
        })
    }

    /// Provisions a small demo board: three members, two tasks and a threaded
    /// discussion with one attachment, so a fresh TUI has something to show.
    pub fn seed_demo(&self) -> Result<(), ServiceError> {
        self.with_state(|state| {
            if !state.tasks.is_empty() {
                return Ok(());
            }
            let members = [
                ("alice", "Alice", Some("Alice Moreau")),
                ("bob", "Bob", Some("Bob Okafor")),
                ("carol", "Carol", None),
            ];
            for (handle, display, full) in members {
                state.members.push(Identity {
                    id: Uuid::new_v4().to_string(),
                    handle: handle.to_string(),
                    display_name: display.to_string(),
                    full_name: full.map(String::from),
                    avatar_url: None,
                });
            }
            let base = Utc::now() - chrono::Duration::hours(3);
            let task = Task {
                id: Uuid::new_v4().to_string(),
                title: "Design the onboarding flow".to_string(),
                status: TaskStatus::InProgress,
                created_at: base,
                updated_at: base,
            };
            let quiet = Task {
                id: Uuid::new_v4().to_string(),
                title: "Upgrade CI runners".to_string(),
                status: TaskStatus::Todo,
                created_at: base,
                updated_at: base,
            };
            let alice = Author::from(&state.members[0]);
            let bob = Author::from(&state.members[1]);
            let root = Comment {
                id: Uuid::new_v4().to_string(),
                task_id: task.id.clone(),
                author: alice,
                content: "Kickoff notes for the onboarding flow.\n\
                          Decision: we start with the invite-link variant.\n\
                          Should the tour be skippable on mobile?"
                    .to_string(),
                created_at: Some(base + chrono::Duration::minutes(5)),
                updated_at: Some(base + chrono::Duration::minutes(5)),
                parent_id: None,
                attachments: Vec::new(),
            };
            let mut reply = Comment {
                id: Uuid::new_v4().to_string(),
                task_id: task.id.clone(),
                author: bob,
                content: "TODO: bring wireframes to the Thursday review.".to_string(),
                created_at: Some(base + chrono::Duration::minutes(25)),
                updated_at: Some(base + chrono::Duration::minutes(25)),
                parent_id: Some(root.id.clone()),
                attachments: Vec::new(),
            };
            let bytes = b"onboarding flow sketch, v1".to_vec();
            let attachment_id = Uuid::new_v4().to_string();
            let uploader = reply.author.id.clone();
            reply.attachments.push(Attachment {
                id: attachment_id.clone(),
                comment_id: reply.id.clone(),
                file_name: "sketch.txt".to_string(),
                stored_name: format!("{attachment_id}_sketch.txt"),
                content_type: "text/plain".to_string(),
                size_bytes: bytes.len() as i64,
                uploaded_by: uploader,
                uploaded_at: base + chrono::Duration::minutes(26),
                url: format!("/api/attachments/{attachment_id}/download"),
            });
            state.blobs.insert(attachment_id, bytes);
            state.comments.push(root);
            state.comments.push(reply);
            state.tasks.push(task);
            state.tasks.push(quiet);
            Ok(())
        })
    }
}

impl Default for LocalService {
    fn default() -> Self {
        Self::new()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[async_trait]
impl DiscussionService for LocalService {
    async fn list_tasks(&self) -> Result<Vec<Task>, ServiceError> {
        self.with_state(|state| Ok(state.tasks.clone()))
    }

    async fn get_task(&self, id: &str) -> Result<Task, ServiceError> {
        self.with_state(|state| {
            state
                .tasks
                .iter()
                .find(|t| t.id == id)
                .cloned()
                .ok_or_else(|| ServiceError::NotFound(format!("task {id}")))
        })
    }

    async fn create_task(&self, input: &CreateTask) -> Result<Task, ServiceError> {
        if input.title.trim().is_empty() {
            return Err(ServiceError::InvalidInput("task title cannot be empty".into()));
        }
        self.with_state(|state| {
            let now = Utc::now();
            let task = Task {
                id: Uuid::new_v4().to_string(),
                title: input.title.trim().to_string(),
                status: input.status,
                created_at: now,
                updated_at: now,
            };
            state.tasks.push(task.clone());
            Ok(task)
        })
    }

    async fn list_comments(&self, task_id: &str) -> Result<Vec<Comment>, ServiceError> {
        self.with_state(|state| {
            Ok(state
                .comments
                .iter()
                .filter(|c| c.task_id == task_id)
                .cloned()
                .collect())
        })
    }

    async fn create_comment(&self, input: &CreateComment) -> Result<Comment, ServiceError> {
        if input.content.trim().is_empty() {
            return Err(ServiceError::InvalidInput("comment content cannot be empty".into()));
        }
        let comment = self.with_state(|state| {
            if !state.tasks.iter().any(|t| t.id == input.task_id) {
                return Err(ServiceError::NotFound(format!("task {}", input.task_id)));
            }
            if let Some(parent_id) = &input.parent_id {
                let parent_ok = state
                    .comments
                    .iter()
                    .any(|c| c.id == *parent_id && c.task_id == input.task_id);
                if !parent_ok {
                    return Err(ServiceError::InvalidInput(format!(
                        "parent comment {parent_id} does not belong to task {}",
                        input.task_id
                    )));
                }
            }
            let author = state
                .members
                .iter()
                .find(|m| m.id == input.author_id)
                .map(Author::from)
                .unwrap_or_else(|| Author {
                    id: input.author_id.clone(),
                    handle: None,
                    display_name: None,
                });
            let now = Utc::now();
            let comment = Comment {
                id: Uuid::new_v4().to_string(),
                task_id: input.task_id.clone(),
                author,
                content: input.content.clone(),
                created_at: Some(now),
                updated_at: Some(now),
                parent_id: input.parent_id.clone(),
                attachments: Vec::new(),
            };
            state.comments.push(comment.clone());
            Ok(comment)
        })?;
        self.publish(
            CommentEventKind::Created,
            &comment.task_id,
            &comment.id,
            Some(format!("New comment from {}", comment.author.label())),
        );
        Ok(comment)
    }

    async fn update_comment(
        &self,
        id: &str,
        update: &UpdateComment,
    ) -> Result<Comment, ServiceError> {
        if let Some(content) = &update.content {
            if content.trim().is_empty() {
                return Err(ServiceError::InvalidInput("comment content cannot be empty".into()));
            }
        }
        let comment = self.with_state(|state| {
            let comment = state
                .comments
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| ServiceError::NotFound(format!("comment {id}")))?;
            if let Some(content) = &update.content {
                comment.content = content.clone();
            }
            comment.updated_at = Some(Utc::now());
            Ok(comment.clone())
        })?;
        self.publish(CommentEventKind::Updated, &comment.task_id, &comment.id, None);
        Ok(comment)
    }

    async fn delete_comment(&self, id: &str) -> Result<(), ServiceError> {
        // Replies are not cascaded; they become orphans the thread builder
        // files away and rendering never reaches.
        let (task_id, comment_id) = self.with_state(|state| {
            let index = state
                .comments
                .iter()
                .position(|c| c.id == id)
                .ok_or_else(|| ServiceError::NotFound(format!("comment {id}")))?;
            let comment = state.comments.remove(index);
            for attachment in &comment.attachments {
                state.blobs.remove(&attachment.id);
            }
            Ok((comment.task_id, comment.id))
        })?;
        self.publish(CommentEventKind::Deleted, &task_id, &comment_id, None);
        Ok(())
    }

    async fn upload_attachment(
        &self,
        comment_id: &str,
        upload: &FileUpload,
    ) -> Result<Attachment, ServiceError> {
        if upload.file_name.trim().is_empty() {
            return Err(ServiceError::InvalidInput("attachment needs a file name".into()));
        }
        let (task_id, attachment) = self.with_state(|state| {
            let comment = state
                .comments
                .iter_mut()
                .find(|c| c.id == comment_id)
                .ok_or_else(|| ServiceError::NotFound(format!("comment {comment_id}")))?;
            let id = Uuid::new_v4().to_string();
            let attachment = Attachment {
                id: id.clone(),
                comment_id: comment_id.to_string(),
                file_name: upload.file_name.clone(),
                stored_name: format!("{id}_{}", upload.file_name),
                content_type: upload
                    .content_type
                    .clone()
                    .unwrap_or_else(|| content_type_for(&upload.file_name).to_string()),
                size_bytes: upload.bytes.len() as i64,
                uploaded_by: upload.uploaded_by.clone(),
                uploaded_at: Utc::now(),
                url: format!("/api/attachments/{id}/download"),
            };
            comment.attachments.push(attachment.clone());
            comment.updated_at = Some(Utc::now());
            let task_id = comment.task_id.clone();
            state.blobs.insert(id, upload.bytes.clone());
            Ok((task_id, attachment))
        })?;
        self.publish(
            CommentEventKind::Updated,
            &task_id,
            comment_id,
            Some(format!("{} attached", attachment.file_name)),
        );
        Ok(attachment)
    }

    async fn delete_attachment(&self, comment_id: &str, index: usize) -> Result<(), ServiceError> {
        let task_id = self.with_state(|state| {
            let comment = state
                .comments
                .iter_mut()
                .find(|c| c.id == comment_id)
                .ok_or_else(|| ServiceError::NotFound(format!("comment {comment_id}")))?;
            if index >= comment.attachments.len() {
                return Err(ServiceError::NotFound(format!(
                    "attachment {index} on comment {comment_id}"
                )));
            }
            let removed = comment.attachments.remove(index);
            comment.updated_at = Some(Utc::now());
            let task_id = comment.task_id.clone();
            state.blobs.remove(&removed.id);
            Ok(task_id)
        })?;
        self.publish(CommentEventKind::Updated, &task_id, comment_id, None);
        Ok(())
    }

    async fn list_board_members(&self, task_id: &str) -> Result<Vec<Identity>, ServiceError> {
        self.with_state(|state| {
            if !state.tasks.iter().any(|t| t.id == task_id) {
                return Err(ServiceError::NotFound(format!("task {task_id}")));
            }
            Ok(state.members.clone())
        })
    }

    async fn summarize_thread(&self, task_id: &str) -> Result<ThreadSummary, ServiceError> {
        self.with_state(|state| {
            if !state.tasks.iter().any(|t| t.id == task_id) {
                return Err(ServiceError::NotFound(format!("task {task_id}")));
            }
            let comments: Vec<Comment> = state
                .comments
                .iter()
                .filter(|c| c.task_id == task_id)
                .cloned()
                .collect();
            Ok(digest(&comments, &state.members))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use boardtalk_core::thread::build_thread;
    use tokio::time::timeout;

    use super::*;

    const TEST_TIMEOUT: Duration = Duration::from_secs(1);

    async fn service_with_task() -> (LocalService, Task) {
        let service = LocalService::new();
        let task = service
            .create_task(&CreateTask {
                title: "Test task".to_string(),
                status: Default::default(),
            })
            .await
            .unwrap();
        (service, task)
    }

    fn create(task_id: &str, content: &str, parent: Option<&str>) -> CreateComment {
        CreateComment {
            task_id: task_id.to_string(),
            content: content.to_string(),
            author_id: "u1".to_string(),
            parent_id: parent.map(String::from),
        }
    }

    fn upload(name: &str) -> FileUpload {
        FileUpload {
            file_name: name.to_string(),
            content_type: None,
            uploaded_by: "u1".to_string(),
            bytes: b"data".to_vec(),
        }
    }

    #[tokio::test]
    async fn create_root_comment_and_reload() {
        let (service, task) = service_with_task().await;
        let created = service.create_comment(&create(&task.id, "Hello", None)).await.unwrap();
        assert!(created.parent_id.is_none());

        let comments = service.list_comments(&task.id).await.unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].content, "Hello");
        let thread = build_thread(&comments);
        assert_eq!(thread.roots.len(), 1);
    }

    #[tokio::test]
    async fn reply_lands_in_parent_bucket() {
        let (service, task) = service_with_task().await;
        let root = service.create_comment(&create(&task.id, "Root", None)).await.unwrap();
        service
            .create_comment(&create(&task.id, "Ack", Some(&root.id)))
            .await
            .unwrap();

        let comments = service.list_comments(&task.id).await.unwrap();
        let thread = build_thread(&comments);
        assert_eq!(thread.replies(&root.id).len(), 1);
        assert_eq!(thread.replies(&root.id)[0].content, "Ack");
    }

    #[tokio::test]
    async fn empty_content_is_rejected_locally() {
        let (service, task) = service_with_task().await;
        let err = service.create_comment(&create(&task.id, "   ", None)).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        assert!(service.list_comments(&task.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_on_unknown_task_is_not_found() {
        let service = LocalService::new();
        let err = service.create_comment(&create("nope", "Hello", None)).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn reply_to_foreign_parent_is_rejected() {
        let (service, task) = service_with_task().await;
        let other = service
            .create_task(&CreateTask {
                title: "Other".to_string(),
                status: Default::default(),
            })
            .await
            .unwrap();
        let foreign_root = service.create_comment(&create(&other.id, "Elsewhere", None)).await.unwrap();

        let err = service
            .create_comment(&create(&task.id, "Cross", Some(&foreign_root.id)))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn update_changes_content_only() {
        let (service, task) = service_with_task().await;
        let comment = service.create_comment(&create(&task.id, "Before", None)).await.unwrap();
        let updated = service
            .update_comment(
                &comment.id,
                &UpdateComment {
                    content: Some("After".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.content, "After");
        assert_eq!(updated.id, comment.id);
        assert_eq!(updated.created_at, comment.created_at);
    }

    #[tokio::test]
    async fn deleting_a_parent_orphans_its_replies() {
        let (service, task) = service_with_task().await;
        let root = service.create_comment(&create(&task.id, "Root", None)).await.unwrap();
        service
            .create_comment(&create(&task.id, "Reply", Some(&root.id)))
            .await
            .unwrap();

        service.delete_comment(&root.id).await.unwrap();

        let comments = service.list_comments(&task.id).await.unwrap();
        assert_eq!(comments.len(), 1);
        let thread = build_thread(&comments);
        assert!(thread.roots.is_empty());
        assert_eq!(thread.replies(&root.id).len(), 1);
    }

    #[tokio::test]
    async fn attachments_append_in_order_and_delete_by_index() {
        let (service, task) = service_with_task().await;
        let comment = service.create_comment(&create(&task.id, "Files", None)).await.unwrap();
        service.upload_attachment(&comment.id, &upload("a.txt")).await.unwrap();
        service.upload_attachment(&comment.id, &upload("b.txt")).await.unwrap();

        service.delete_attachment(&comment.id, 0).await.unwrap();

        let comments = service.list_comments(&task.id).await.unwrap();
        let remaining = &comments[0].attachments;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].file_name, "b.txt");
    }

    #[tokio::test]
    async fn attachment_metadata_is_filled_in() {
        let (service, task) = service_with_task().await;
        let comment = service.create_comment(&create(&task.id, "Files", None)).await.unwrap();
        let attachment = service
            .upload_attachment(&comment.id, &upload("report.pdf"))
            .await
            .unwrap();
        assert_eq!(attachment.content_type, "application/pdf");
        assert_eq!(attachment.size_bytes, 4);
        assert!(attachment.stored_name.ends_with("_report.pdf"));
        assert_eq!(
            service.attachment_bytes(&attachment.id).unwrap(),
            b"data".to_vec()
        );
    }

    #[tokio::test]
    async fn delete_attachment_out_of_range_is_not_found() {
        let (service, task) = service_with_task().await;
        let comment = service.create_comment(&create(&task.id, "Files", None)).await.unwrap();
        let err = service.delete_attachment(&comment.id, 3).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn mutations_publish_events_on_the_bus() {
        let (service, task) = service_with_task().await;
        let mut rx = service.bus().subscribe();

        let comment = service.create_comment(&create(&task.id, "Hello", None)).await.unwrap();
        let event = timeout(TEST_TIMEOUT, rx.recv()).await.unwrap().unwrap();
        assert_eq!(event.kind, CommentEventKind::Created);
        assert_eq!(event.task_id, task.id);
        assert_eq!(event.comment_id, comment.id);

        service
            .update_comment(
                &comment.id,
                &UpdateComment {
                    content: Some("Edited".to_string()),
                },
            )
            .await
            .unwrap();
        let event = timeout(TEST_TIMEOUT, rx.recv()).await.unwrap().unwrap();
        assert_eq!(event.kind, CommentEventKind::Updated);

        service.delete_comment(&comment.id).await.unwrap();
        let event = timeout(TEST_TIMEOUT, rx.recv()).await.unwrap().unwrap();
        assert_eq!(event.kind, CommentEventKind::Deleted);
    }

    #[tokio::test]
    async fn known_author_is_embedded_on_create() {
        let (service, task) = service_with_task().await;
        let member = service.ensure_member("alice").unwrap();
        let comment = service
            .create_comment(&CreateComment {
                task_id: task.id.clone(),
                content: "Hi".to_string(),
                author_id: member.id.clone(),
                parent_id: None,
            })
            .await
            .unwrap();
        assert_eq!(comment.author.label(), "Alice");
    }

    #[tokio::test]
    async fn ensure_member_reuses_existing_handle() {
        let service = LocalService::new();
        let first = service.ensure_member("alice").unwrap();
        let second = service.ensure_member("alice").unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn summary_reflects_the_thread() {
        let (service, task) = service_with_task().await;
        let member = service.ensure_member("alice").unwrap();
        service
            .create_comment(&CreateComment {
                task_id: task.id.clone(),
                content: "Decision: ship it\nAnything left open?".to_string(),
                author_id: member.id,
                parent_id: None,
            })
            .await
            .unwrap();

        let summary = service.summarize_thread(&task.id).await.unwrap();
        assert_eq!(summary.total_comments, 1);
        assert_eq!(summary.participants, vec!["Alice"]);
        assert_eq!(summary.decisions, vec!["Decision: ship it"]);
        assert_eq!(summary.unresolved_issues, vec!["Anything left open?"]);
    }

    #[tokio::test]
    async fn seed_demo_is_idempotent() {
        let service = LocalService::new();
        service.seed_demo().unwrap();
        let before = service.list_tasks().await.unwrap().len();
        service.seed_demo().unwrap();
        assert_eq!(service.list_tasks().await.unwrap().len(), before);
        assert!(before > 0);
    }
}
