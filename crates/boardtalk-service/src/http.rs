use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use boardtalk_core::attachment::{Attachment, FileUpload, UploadAttachment};
use boardtalk_core::comment::{Comment, CreateComment, RawComment, UpdateComment};
use boardtalk_core::identity::Identity;
use boardtalk_core::summary::ThreadSummary;
use boardtalk_core::task::{CreateTask, Task};
use reqwest::{Client, StatusCode};

use crate::{DiscussionService, ServiceError};

/// Async HTTP client implementation of DiscussionService.
/// Connects to a running boardtalk-server.
pub struct HttpService {
    base_url: String,
    client: Client,
}

impl HttpService {
    pub fn new(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            base_url,
            client: Client::new(),
        }
    }

    /// Check if the server is reachable.
    pub async fn health_check(&self) -> Result<(), ServiceError> {
        let resp = self
            .client
            .get(format!("{}/api/health", self.base_url))
            .send()
            .await
            .map_err(|e| ServiceError::Network(format!("connection failed: {e}")))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ServiceError::Internal(format!(
                "health check failed: {}",
                resp.status()
            )))
        }
    }

    /// Fetch the raw bytes of a stored attachment. Not part of the trait;
    /// the store interface addresses attachments through their comment.
    pub async fn download_attachment(&self, attachment_id: &str) -> Result<Vec<u8>, ServiceError> {
        let resp = self
            .client
            .get(format!(
                "{}/api/attachments/{attachment_id}/download",
                self.base_url
            ))
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;
        let status = resp.status();
        if status.is_success() {
            let bytes = resp
                .bytes()
                .await
                .map_err(|e| ServiceError::Internal(format!("read body: {e}")))?;
            Ok(bytes.to_vec())
        } else {
            Err(parse_error_with_status(status, resp).await)
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ServiceError> {
        let resp = self
            .client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;
        handle_response(resp).await
    }

    async fn post_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        let resp = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;
        handle_response(resp).await
    }

    async fn put_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        let resp = self
            .client
            .put(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;
        handle_response(resp).await
    }

    async fn delete_req(&self, path: &str) -> Result<(), ServiceError> {
        let resp = self
            .client
            .delete(format!("{}{path}", self.base_url))
            .send()
            .await
            .map_err(|e| ServiceError::Network(e.to_string()))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(parse_error(resp).await)
        }
    }
}

async fn handle_response<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ServiceError> {
    let status = resp.status();
    if status.is_success() {
        resp.json::<T>()
            .await
            .map_err(|e| ServiceError::Internal(format!("json decode: {e}")))
    } else {
        Err(parse_error_with_status(status, resp).await)
    }
}

async fn parse_error(resp: reqwest::Response) -> ServiceError {
    let status = resp.status();
    parse_error_with_status(status, resp).await
}

/// Maps a non-2xx response to a ServiceError, preferring the server's own
/// `{"error": …}` message and falling back to a generic line when the body
/// carries none.
async fn parse_error_with_status(status: StatusCode, resp: reqwest::Response) -> ServiceError {
    let body = resp.text().await.unwrap_or_default();
    let msg = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v["error"].as_str().map(String::from))
        .unwrap_or(body);
    let msg = if msg.trim().is_empty() {
        format!("server returned {status}")
    } else {
        msg
    };

    if status == StatusCode::NOT_FOUND {
        ServiceError::NotFound(msg)
    } else if status == StatusCode::BAD_REQUEST {
        ServiceError::InvalidInput(msg)
    } else {
        ServiceError::Internal(msg)
    }
}

#[async_trait]
impl DiscussionService for HttpService {
    async fn list_tasks(&self) -> Result<Vec<Task>, ServiceError> {
        self.get_json("/api/tasks").await
    }

    async fn get_task(&self, id: &str) -> Result<Task, ServiceError> {
        self.get_json(&format!("/api/tasks/{id}")).await
    }

    async fn create_task(&self, input: &CreateTask) -> Result<Task, ServiceError> {
        self.post_json("/api/tasks", input).await
    }

    async fn list_comments(&self, task_id: &str) -> Result<Vec<Comment>, ServiceError> {
        // Stored data is inconsistent about parent/author shape, so decode
        // through the tolerant wire type and normalize here, once.
        let raw: Vec<RawComment> = self
            .get_json(&format!("/api/tasks/{task_id}/comments"))
            .await?;
        Ok(raw.into_iter().map(Comment::from_raw).collect())
    }

    async fn create_comment(&self, input: &CreateComment) -> Result<Comment, ServiceError> {
        let raw: RawComment = self
            .post_json(&format!("/api/tasks/{}/comments", input.task_id), input)
            .await?;
        Ok(Comment::from_raw(raw))
    }

    async fn update_comment(
        &self,
        id: &str,
        update: &UpdateComment,
    ) -> Result<Comment, ServiceError> {
        let raw: RawComment = self.put_json(&format!("/api/comments/{id}"), update).await?;
        Ok(Comment::from_raw(raw))
    }

    async fn delete_comment(&self, id: &str) -> Result<(), ServiceError> {
        self.delete_req(&format!("/api/comments/{id}")).await
    }

    async fn upload_attachment(
        &self,
        comment_id: &str,
        upload: &FileUpload,
    ) -> Result<Attachment, ServiceError> {
        let body = UploadAttachment {
            file_name: upload.file_name.clone(),
            content_type: upload.content_type.clone(),
            uploaded_by: upload.uploaded_by.clone(),
            data: B64.encode(&upload.bytes),
        };
        self.post_json(&format!("/api/comments/{comment_id}/attachments"), &body)
            .await
    }

    async fn delete_attachment(&self, comment_id: &str, index: usize) -> Result<(), ServiceError> {
        self.delete_req(&format!("/api/comments/{comment_id}/attachments/{index}"))
            .await
    }

    async fn list_board_members(&self, task_id: &str) -> Result<Vec<Identity>, ServiceError> {
        self.get_json(&format!("/api/tasks/{task_id}/members")).await
    }

    async fn summarize_thread(&self, task_id: &str) -> Result<ThreadSummary, ServiceError> {
        self.get_json(&format!("/api/tasks/{task_id}/summary")).await
    }
}
