use std::sync::Arc;

use boardtalk_core::task::{CreateTask, Task, TaskStatus};
use boardtalk_service::{DiscussionService, LocalService};
use boardtalk_tui::app::{App, Mode, NoticeLevel};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::backend::TestBackend;
use ratatui::Terminal;

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

async fn type_str(app: &mut App, text: &str) {
    for ch in text.chars() {
        app.handle_key(key(KeyCode::Char(ch))).await;
    }
}

/// Let spawned forwarding tasks run on the current-thread runtime.
async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

async fn setup() -> (App, LocalService, Task) {
    let local = LocalService::new();
    let task = local
        .create_task(&CreateTask {
            title: "Ship the release".into(),
            status: TaskStatus::Todo,
        })
        .await
        .unwrap();
    local.ensure_member("alice").unwrap();
    local.ensure_member("bob").unwrap();
    let author = local.ensure_member("me").unwrap();
    let app = App::new(Arc::new(local.clone()), author, Some(local.bus()))
        .await
        .unwrap();
    (app, local, task)
}

async fn open_task(app: &mut App) {
    app.handle_key(key(KeyCode::Enter)).await;
    assert!(matches!(app.mode(), Mode::Thread));
}

#[tokio::test]
async fn enter_opens_the_selected_thread() {
    let (mut app, _local, task) = setup().await;
    assert!(matches!(app.mode(), Mode::TaskList));

    open_task(&mut app).await;

    let discussion = app.discussion().unwrap();
    assert_eq!(discussion.task_id(), task.id);
    // Board members became mention candidates.
    assert!(discussion.members().iter().any(|m| m.handle == "alice"));
}

#[tokio::test]
async fn esc_returns_to_the_task_list() {
    let (mut app, _local, _task) = setup().await;
    open_task(&mut app).await;

    app.handle_key(key(KeyCode::Esc)).await;

    assert!(matches!(app.mode(), Mode::TaskList));
    assert!(app.discussion().is_none());
}

#[tokio::test]
async fn compose_flow_creates_a_root_comment() {
    let (mut app, local, task) = setup().await;
    open_task(&mut app).await;

    app.handle_key(key(KeyCode::Char('c'))).await;
    assert!(matches!(app.mode(), Mode::Compose { parent_id: None }));

    type_str(&mut app, "First!").await;
    app.handle_key(key(KeyCode::Enter)).await;

    assert!(matches!(app.mode(), Mode::Thread));
    let notice = app.notice().unwrap();
    assert_eq!(notice.level, NoticeLevel::Success);

    let comments = local.list_comments(&task.id).await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].content, "First!");
    assert!(comments[0].parent_id.is_none());
}

#[tokio::test]
async fn empty_compose_surfaces_an_error_and_stays_in_compose() {
    let (mut app, local, task) = setup().await;
    open_task(&mut app).await;

    app.handle_key(key(KeyCode::Char('c'))).await;
    app.handle_key(key(KeyCode::Enter)).await;

    assert_eq!(app.notice().unwrap().level, NoticeLevel::Error);
    assert!(matches!(app.mode(), Mode::Compose { .. }));
    assert!(local.list_comments(&task.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn reply_is_offered_on_roots_only() {
    let (mut app, local, task) = setup().await;
    open_task(&mut app).await;

    // One root with one reply, created out of band.
    app.handle_key(key(KeyCode::Char('c'))).await;
    type_str(&mut app, "root").await;
    app.handle_key(key(KeyCode::Enter)).await;
    let root_id = local.list_comments(&task.id).await.unwrap()[0].id.clone();

    // Reply from the root row.
    app.handle_key(key(KeyCode::Char('r'))).await;
    match app.mode() {
        Mode::Compose { parent_id } => assert_eq!(parent_id.as_deref(), Some(root_id.as_str())),
        other => panic!("expected compose mode, got {other:?}"),
    }
    type_str(&mut app, "ack").await;
    app.handle_key(key(KeyCode::Enter)).await;

    // From the reply row, 'r' refuses.
    app.handle_key(key(KeyCode::Char('j'))).await;
    app.handle_key(key(KeyCode::Char('r'))).await;
    assert!(matches!(app.mode(), Mode::Thread));
    assert_eq!(app.notice().unwrap().level, NoticeLevel::Info);
}

#[tokio::test]
async fn mention_commit_splices_into_the_composer() {
    let (mut app, _local, _task) = setup().await;
    open_task(&mut app).await;

    app.handle_key(key(KeyCode::Char('c'))).await;
    type_str(&mut app, "ping @al").await;
    assert!(app.mention_engine().is_suggesting());

    // Enter goes to the picker, not the submit path.
    app.handle_key(key(KeyCode::Enter)).await;
    assert_eq!(app.composer_text(), "ping @alice ");
    assert!(matches!(app.mode(), Mode::Compose { .. }));
    assert!(!app.mention_engine().is_suggesting());

    type_str(&mut app, "ready?").await;
    app.handle_key(key(KeyCode::Enter)).await;
    assert!(matches!(app.mode(), Mode::Thread));
}

#[tokio::test]
async fn mention_escape_keeps_text_and_stays_composing() {
    let (mut app, _local, _task) = setup().await;
    open_task(&mut app).await;

    app.handle_key(key(KeyCode::Char('c'))).await;
    type_str(&mut app, "cc @bo").await;
    assert!(app.mention_engine().is_suggesting());

    app.handle_key(key(KeyCode::Esc)).await;
    assert!(!app.mention_engine().is_suggesting());
    assert_eq!(app.composer_text(), "cc @bo");
    assert!(matches!(app.mode(), Mode::Compose { .. }));
}

#[tokio::test]
async fn edit_prefills_and_updates() {
    let (mut app, local, task) = setup().await;
    open_task(&mut app).await;

    app.handle_key(key(KeyCode::Char('c'))).await;
    type_str(&mut app, "draft").await;
    app.handle_key(key(KeyCode::Enter)).await;

    app.handle_key(key(KeyCode::Char('e'))).await;
    assert!(matches!(app.mode(), Mode::EditComment { .. }));
    assert_eq!(app.composer_text(), "draft");

    type_str(&mut app, " v2").await;
    app.handle_key(key(KeyCode::Enter)).await;

    let comments = local.list_comments(&task.id).await.unwrap();
    assert_eq!(comments[0].content, "draft v2");
}

#[tokio::test]
async fn delete_goes_through_confirmation() {
    let (mut app, local, task) = setup().await;
    open_task(&mut app).await;

    app.handle_key(key(KeyCode::Char('c'))).await;
    type_str(&mut app, "oops").await;
    app.handle_key(key(KeyCode::Enter)).await;

    // Any key but 'y' cancels.
    app.handle_key(key(KeyCode::Char('d'))).await;
    assert!(matches!(app.mode(), Mode::ConfirmDeleteComment { .. }));
    app.handle_key(key(KeyCode::Char('n'))).await;
    assert!(matches!(app.mode(), Mode::Thread));
    assert_eq!(local.list_comments(&task.id).await.unwrap().len(), 1);

    // 'y' deletes.
    app.handle_key(key(KeyCode::Char('d'))).await;
    app.handle_key(key(KeyCode::Char('y'))).await;
    assert!(local.list_comments(&task.id).await.unwrap().is_empty());
    assert_eq!(app.notice().unwrap().level, NoticeLevel::Success);
}

#[tokio::test]
async fn attach_flow_creates_carrier_comment_and_clears_composer() {
    let (mut app, local, task) = setup().await;
    open_task(&mut app).await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    std::fs::write(&path, b"meeting notes").unwrap();

    app.handle_key(key(KeyCode::Char('a'))).await;
    assert!(matches!(app.mode(), Mode::AttachPath { .. }));
    type_str(&mut app, path.to_str().unwrap()).await;
    app.handle_key(key(KeyCode::Enter)).await;

    assert!(matches!(app.mode(), Mode::Thread));
    assert_eq!(app.notice().unwrap().level, NoticeLevel::Success);
    assert_eq!(app.composer_text(), "");

    let comments = local.list_comments(&task.id).await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].content, "Attached file: notes.txt");
    assert_eq!(comments[0].attachments.len(), 1);
    assert_eq!(comments[0].attachments[0].file_name, "notes.txt");

    // The sibling panel aggregated it off the load callback.
    assert_eq!(app.attachment_panel().attachments().len(), 1);
}

#[tokio::test]
async fn attach_with_a_bad_path_reports_and_creates_nothing() {
    let (mut app, local, task) = setup().await;
    open_task(&mut app).await;

    app.handle_key(key(KeyCode::Char('a'))).await;
    type_str(&mut app, "/no/such/file.bin").await;
    app.handle_key(key(KeyCode::Enter)).await;

    assert_eq!(app.notice().unwrap().level, NoticeLevel::Error);
    assert!(local.list_comments(&task.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn detach_goes_through_confirmation() {
    let (mut app, local, task) = setup().await;
    open_task(&mut app).await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scan.png");
    std::fs::write(&path, b"png bytes").unwrap();

    app.handle_key(key(KeyCode::Char('a'))).await;
    type_str(&mut app, path.to_str().unwrap()).await;
    app.handle_key(key(KeyCode::Enter)).await;

    // Move onto the attachment row and remove it.
    app.handle_key(key(KeyCode::Char('j'))).await;
    app.handle_key(key(KeyCode::Char('d'))).await;
    match app.mode() {
        Mode::ConfirmDetach { file_name, index, .. } => {
            assert_eq!(file_name, "scan.png");
            assert_eq!(*index, 0);
        }
        other => panic!("expected detach confirmation, got {other:?}"),
    }
    app.handle_key(key(KeyCode::Char('y'))).await;

    let comments = local.list_comments(&task.id).await.unwrap();
    assert!(comments[0].attachments.is_empty());
}

#[tokio::test]
async fn summary_popup_opens_and_closes() {
    let (mut app, _local, _task) = setup().await;
    open_task(&mut app).await;

    app.handle_key(key(KeyCode::Char('c'))).await;
    type_str(&mut app, "Decision: ship on Friday").await;
    app.handle_key(key(KeyCode::Enter)).await;

    app.handle_key(key(KeyCode::Char('s'))).await;
    match app.mode() {
        Mode::Summary { summary, .. } => {
            assert_eq!(summary.total_comments, 1);
            assert_eq!(summary.decisions, vec!["Decision: ship on Friday"]);
        }
        other => panic!("expected summary mode, got {other:?}"),
    }

    app.handle_key(key(KeyCode::Esc)).await;
    assert!(matches!(app.mode(), Mode::Thread));
}

#[tokio::test]
async fn push_event_from_another_writer_reloads_on_tick() {
    let (mut app, local, task) = setup().await;
    open_task(&mut app).await;
    assert!(app.discussion().unwrap().comments().is_empty());

    // Another client of the same in-process board comments.
    local
        .create_comment(&boardtalk_core::comment::CreateComment {
            task_id: task.id.clone(),
            content: "news from elsewhere".into(),
            author_id: "alice".into(),
            parent_id: None,
        })
        .await
        .unwrap();

    settle().await;
    app.tick().await;

    assert_eq!(app.discussion().unwrap().comments().len(), 1);
    assert_eq!(app.notice().unwrap().level, NoticeLevel::Info);
}

#[tokio::test]
async fn stale_notice_from_the_previous_task_is_dropped_after_a_switch() {
    let (mut app, local, task) = setup().await;
    local
        .create_task(&CreateTask {
            title: "Second task".into(),
            status: TaskStatus::Todo,
        })
        .await
        .unwrap();
    app.handle_key(key(KeyCode::Char('R'))).await;
    open_task(&mut app).await;

    // The event for the first task is forwarded while we are switching away.
    local
        .create_comment(&boardtalk_core::comment::CreateComment {
            task_id: task.id.clone(),
            content: "left behind".into(),
            author_id: "alice".into(),
            parent_id: None,
        })
        .await
        .unwrap();
    settle().await;

    app.handle_key(key(KeyCode::Esc)).await;
    app.handle_key(key(KeyCode::Char('j'))).await;
    app.handle_key(key(KeyCode::Enter)).await;
    assert!(matches!(app.mode(), Mode::Thread));
    assert_ne!(app.discussion().unwrap().task_id(), task.id);

    app.tick().await;

    assert!(app.notice().is_none());
    assert!(app.discussion().unwrap().comments().is_empty());
}

#[tokio::test]
async fn stale_notice_after_closing_the_thread_is_dropped() {
    let (mut app, local, task) = setup().await;
    open_task(&mut app).await;

    local
        .create_comment(&boardtalk_core::comment::CreateComment {
            task_id: task.id.clone(),
            content: "late arrival".into(),
            author_id: "bob".into(),
            parent_id: None,
        })
        .await
        .unwrap();
    settle().await;

    app.handle_key(key(KeyCode::Esc)).await;
    app.tick().await;

    assert!(matches!(app.mode(), Mode::TaskList));
    assert!(app.notice().is_none());
}

#[tokio::test]
async fn events_for_other_tasks_are_ignored() {
    let (mut app, local, _task) = setup().await;
    let other = local
        .create_task(&CreateTask {
            title: "Unrelated".into(),
            status: TaskStatus::Todo,
        })
        .await
        .unwrap();
    open_task(&mut app).await;

    local
        .create_comment(&boardtalk_core::comment::CreateComment {
            task_id: other.id.clone(),
            content: "elsewhere".into(),
            author_id: "bob".into(),
            parent_id: None,
        })
        .await
        .unwrap();

    settle().await;
    app.tick().await;

    assert!(app.notice().is_none());
    assert!(app.discussion().unwrap().comments().is_empty());
}

#[tokio::test]
async fn renders_every_mode_without_panicking() {
    let (mut app, _local, _task) = setup().await;
    let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();

    terminal.draw(|f| app.render(f)).unwrap();
    assert!(buffer_text(&terminal).contains("Ship the release"));

    open_task(&mut app).await;
    terminal.draw(|f| app.render(f)).unwrap();
    assert!(buffer_text(&terminal).contains("No comments yet"));

    app.handle_key(key(KeyCode::Char('c'))).await;
    type_str(&mut app, "hey @al").await;
    terminal.draw(|f| app.render(f)).unwrap();
    // Composer and mention picker are both on screen.
    let text = buffer_text(&terminal);
    assert!(text.contains("hey @al"));
    assert!(text.contains("@alice"));

    app.handle_key(key(KeyCode::Enter)).await;
    app.handle_key(key(KeyCode::Enter)).await;
    app.handle_key(key(KeyCode::Char('s'))).await;
    terminal.draw(|f| app.render(f)).unwrap();
    assert!(buffer_text(&terminal).contains("Thread summary"));
}

fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
    terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect()
}
