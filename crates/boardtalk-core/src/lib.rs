pub mod attachment;
pub mod comment;
pub mod event;
pub mod identity;
pub mod summary;
pub mod task;
pub mod thread;

pub use attachment::{Attachment, FileUpload, UploadAttachment};
pub use comment::{Author, Comment, CreateComment, RawComment, UpdateComment};
pub use event::{CommentEvent, CommentEventKind};
pub use identity::Identity;
pub use summary::ThreadSummary;
pub use task::{CreateTask, Task, TaskStatus};
pub use thread::{build_thread, Thread};
