use std::sync::Arc;

use boardtalk_core::attachment::FileUpload;
use boardtalk_core::summary::ThreadSummary;
use boardtalk_core::task::{CreateTask, Task, TaskStatus};
use boardtalk_core::Identity;
use boardtalk_service::{DiscussionService, EventBus, ServiceError};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use tokio::sync::mpsc;

use crate::components::attachment_panel::AttachmentPanel;
use crate::components::mention_picker;
use crate::components::task_list::TaskList;
use crate::components::thread_view::{Entry, ThreadView};
use crate::discussion::DiscussionController;
use crate::input::TextInput;
use crate::mention::MentionEngine;
use crate::sync::{SyncController, SyncNotice};

/// What the app is currently doing
#[derive(Debug, Clone)]
pub enum Mode {
    /// Picking a task on the board
    TaskList,
    /// Typing a new task title
    NewTask { input: String },
    /// Viewing the active task's thread
    Thread,
    /// Typing a comment; a reply when parent_id is set
    Compose { parent_id: Option<String> },
    /// Rewording an existing comment
    EditComment { comment_id: String },
    /// Typing the path of a file to attach
    AttachPath { path: String },
    /// Confirm comment deletion
    ConfirmDeleteComment { comment_id: String, preview: String },
    /// Confirm attachment removal
    ConfirmDetach {
        comment_id: String,
        index: usize,
        file_name: String,
    },
    /// Viewing the thread digest (scrollable)
    Summary { summary: ThreadSummary, scroll: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

/// One status-line notification. Replaced by the next one; the next
/// keypress clears it.
#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

pub struct App {
    service: Arc<dyn DiscussionService>,
    author: Identity,
    task_list: TaskList,
    active_task: Option<Task>,
    discussion: Option<DiscussionController>,
    thread_view: ThreadView,
    attachment_panel: AttachmentPanel,
    show_attachments: bool,
    sync: Option<SyncController>,
    sync_rx: Option<mpsc::UnboundedReceiver<SyncNotice>>,
    mention: MentionEngine,
    input: TextInput,
    mode: Mode,
    notice: Option<Notice>,
}

impl App {
    /// Build the app over a service. A bus is present when the board lives
    /// in-process; without one, push sync is simply inactive.
    pub async fn new(
        service: Arc<dyn DiscussionService>,
        author: Identity,
        bus: Option<EventBus>,
    ) -> Result<Self, ServiceError> {
        let tasks = service.list_tasks().await?;
        let (sync, sync_rx) = match bus {
            Some(bus) => {
                let (sync, rx) = SyncController::new(bus);
                (Some(sync), Some(rx))
            }
            None => (None, None),
        };
        Ok(Self {
            service,
            author,
            task_list: TaskList::new(tasks),
            active_task: None,
            discussion: None,
            thread_view: ThreadView::new(),
            attachment_panel: AttachmentPanel::new(),
            show_attachments: false,
            sync,
            sync_rx,
            mention: MentionEngine::new(),
            input: TextInput::new(),
            mode: Mode::TaskList,
            notice: None,
        })
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn composer_text(&self) -> &str {
        self.input.text()
    }

    pub fn mention_engine(&self) -> &MentionEngine {
        &self.mention
    }

    pub fn discussion(&self) -> Option<&DiscussionController> {
        self.discussion.as_ref()
    }

    pub fn attachment_panel(&self) -> &AttachmentPanel {
        &self.attachment_panel
    }

    pub fn is_input_mode(&self) -> bool {
        matches!(
            self.mode,
            Mode::NewTask { .. }
                | Mode::Compose { .. }
                | Mode::EditComment { .. }
                | Mode::AttachPath { .. }
        )
    }

    // -- Notification sink --

    fn notify_success(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            level: NoticeLevel::Success,
            text: text.into(),
        });
    }

    fn notify_error(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            level: NoticeLevel::Error,
            text: text.into(),
        });
    }

    fn notify_info(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            level: NoticeLevel::Info,
            text: text.into(),
        });
    }

    // -- Lifecycle --

    async fn refresh_tasks(&mut self) {
        match self.service.list_tasks().await {
            Ok(tasks) => self.task_list.set_tasks(tasks),
            Err(e) => self.notify_error(e.to_string()),
        }
    }

    /// Activate the selected task's thread: load comments and mention
    /// candidates, register the sibling-panel callback and scope the push
    /// subscription to this task.
    async fn open_selected_task(&mut self) {
        let Some(task) = self.task_list.selected_task().cloned() else {
            return;
        };
        let mut discussion =
            DiscussionController::new(self.service.clone(), &task.id, &self.author.id);
        discussion.set_on_loaded(Box::new(self.attachment_panel.on_loaded()));

        if let Err(e) = discussion.reload().await {
            self.notify_error(e.to_string());
            return;
        }
        if let Err(e) = discussion.load_members().await {
            self.notify_error(e.to_string());
            return;
        }
        self.mention.set_candidates(discussion.members().to_vec());
        self.thread_view.rebuild(&discussion.thread());
        if let Some(sync) = &mut self.sync {
            sync.activate(&task.id);
        }
        self.active_task = Some(task);
        self.discussion = Some(discussion);
        self.mode = Mode::Thread;
    }

    fn close_thread(&mut self) {
        if let Some(sync) = &mut self.sync {
            sync.deactivate();
        }
        self.discussion = None;
        self.active_task = None;
        self.thread_view = ThreadView::new();
        self.input.clear();
        self.mention.cancel();
        self.mode = Mode::TaskList;
    }

    async fn reload_thread(&mut self) {
        if let Some(discussion) = &mut self.discussion {
            if let Err(e) = discussion.reload().await {
                self.notify_error(e.to_string());
                return;
            }
            self.thread_view.rebuild(&discussion.thread());
        }
    }

    /// Drain push notices between frames: each one surfaces a transient
    /// notification, and any at all triggers one full reload.
    ///
    /// Notices are re-checked against the active task: the forward task is
    /// aborted on a switch, but a notice it already enqueued for the previous
    /// task can still sit in the channel. Those drain away silently.
    pub async fn tick(&mut self) {
        let active = self.discussion.as_ref().map(|d| d.task_id().to_string());
        let mut last: Option<SyncNotice> = None;
        if let Some(rx) = &mut self.sync_rx {
            for _ in 0..64 {
                match rx.try_recv() {
                    Ok(notice) => {
                        if active.as_deref() == Some(notice.task_id.as_str()) {
                            last = Some(notice);
                        }
                    }
                    Err(_) => break,
                }
            }
        }
        if let Some(notice) = last {
            self.notify_info(notice.message);
            self.reload_thread().await;
        }
    }

    // -- Key dispatch --

    pub async fn handle_key(&mut self, key: KeyEvent) {
        self.notice = None;

        match self.mode.clone() {
            Mode::TaskList => self.handle_task_list(key).await,
            Mode::NewTask { input } => self.handle_new_task(key, input).await,
            Mode::Thread => self.handle_thread(key).await,
            Mode::Compose { parent_id } => self.handle_compose(key, parent_id).await,
            Mode::EditComment { comment_id } => self.handle_edit_comment(key, comment_id).await,
            Mode::AttachPath { path } => self.handle_attach_path(key, path).await,
            Mode::ConfirmDeleteComment { comment_id, .. } => {
                self.handle_confirm_delete(key, comment_id).await
            }
            Mode::ConfirmDetach {
                comment_id, index, ..
            } => self.handle_confirm_detach(key, comment_id, index).await,
            Mode::Summary { summary, scroll } => self.handle_summary(key, summary, scroll),
        }
    }

    async fn handle_task_list(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.open_selected_task().await,
            KeyCode::Char('n') => {
                self.mode = Mode::NewTask {
                    input: String::new(),
                };
            }
            KeyCode::Char('R') => self.refresh_tasks().await,
            _ => self.task_list.handle_key(key),
        }
    }

    async fn handle_new_task(&mut self, key: KeyEvent, mut input: String) {
        match key.code {
            KeyCode::Enter => {
                let title = input.trim().to_string();
                if !title.is_empty() {
                    match self
                        .service
                        .create_task(&CreateTask {
                            title,
                            status: TaskStatus::Todo,
                        })
                        .await
                    {
                        Ok(_) => {
                            self.refresh_tasks().await;
                            self.notify_success("Task created");
                        }
                        Err(e) => self.notify_error(e.to_string()),
                    }
                }
                self.mode = Mode::TaskList;
            }
            KeyCode::Esc => self.mode = Mode::TaskList,
            KeyCode::Backspace => {
                input.pop();
                self.mode = Mode::NewTask { input };
            }
            KeyCode::Char(c) => {
                input.push(c);
                self.mode = Mode::NewTask { input };
            }
            _ => {}
        }
    }

    async fn handle_thread(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.close_thread(),
            KeyCode::Char('c') => {
                self.input.clear();
                self.mention.cancel();
                self.mode = Mode::Compose { parent_id: None };
            }
            KeyCode::Char('r') => {
                if self.thread_view.selected_is_root() {
                    let parent_id = self.thread_view.selected_comment_id().map(String::from);
                    self.input.clear();
                    self.mention.cancel();
                    self.mode = Mode::Compose { parent_id };
                } else if self.thread_view.selected_entry().is_some() {
                    self.notify_info("Replies start from top-level comments only");
                }
            }
            KeyCode::Char('e') => {
                if let Some(Entry::Comment { id, .. }) = self.thread_view.selected_entry().cloned()
                {
                    let content = self
                        .discussion
                        .as_ref()
                        .and_then(|d| d.comments().iter().find(|c| c.id == id))
                        .map(|c| c.content.clone())
                        .unwrap_or_default();
                    let caret = content.len();
                    self.input.set(content, caret);
                    self.mention.cancel();
                    self.mode = Mode::EditComment { comment_id: id };
                }
            }
            KeyCode::Char('d') => match self.thread_view.selected_entry().cloned() {
                Some(Entry::Comment { id, .. }) => {
                    let preview = self
                        .discussion
                        .as_ref()
                        .and_then(|d| d.comments().iter().find(|c| c.id == id))
                        .map(|c| first_line(&c.content))
                        .unwrap_or_default();
                    self.mode = Mode::ConfirmDeleteComment {
                        comment_id: id,
                        preview,
                    };
                }
                Some(Entry::Attachment {
                    comment_id,
                    index,
                    file_name,
                    ..
                }) => {
                    self.mode = Mode::ConfirmDetach {
                        comment_id,
                        index,
                        file_name,
                    };
                }
                None => {}
            },
            KeyCode::Char('a') => {
                self.mode = Mode::AttachPath {
                    path: String::new(),
                };
            }
            KeyCode::Char('s') => {
                if let Some(discussion) = &self.discussion {
                    match discussion.summarize().await {
                        Ok(summary) => self.mode = Mode::Summary { summary, scroll: 0 },
                        Err(e) => self.notify_error(e.to_string()),
                    }
                }
            }
            KeyCode::Char('t') => self.show_attachments = !self.show_attachments,
            KeyCode::Char('R') => self.reload_thread().await,
            _ => self.thread_view.handle_key(key),
        }
    }

    /// Shared editing behavior for the comment composer and the editor:
    /// the mention engine sees every text change and caret movement, and
    /// while it is suggesting it captures the navigation keys.
    ///
    /// Returns true when the key was consumed.
    fn handle_text_key(&mut self, key: KeyEvent) -> bool {
        if self.mention.is_suggesting() {
            match key.code {
                KeyCode::Down => {
                    self.mention.select_next();
                    return true;
                }
                KeyCode::Up => {
                    self.mention.select_prev();
                    return true;
                }
                KeyCode::Enter | KeyCode::Tab => {
                    if let Some(splice) =
                        self.mention.commit(self.input.text(), self.input.caret())
                    {
                        self.input.set(splice.text, splice.caret);
                        self.mention.evaluate(self.input.text(), self.input.caret());
                    }
                    return true;
                }
                KeyCode::Esc => {
                    self.mention.cancel();
                    return true;
                }
                _ => {}
            }
        }

        let consumed = match key.code {
            KeyCode::Char(c) => {
                self.input.insert(c);
                true
            }
            KeyCode::Backspace => {
                self.input.backspace();
                true
            }
            KeyCode::Delete => {
                self.input.delete();
                true
            }
            KeyCode::Left => {
                self.input.move_left();
                true
            }
            KeyCode::Right => {
                self.input.move_right();
                true
            }
            KeyCode::Home => {
                self.input.move_home();
                true
            }
            KeyCode::End => {
                self.input.move_end();
                true
            }
            _ => false,
        };
        if consumed {
            self.mention.evaluate(self.input.text(), self.input.caret());
        }
        consumed
    }

    async fn handle_compose(&mut self, key: KeyEvent, parent_id: Option<String>) {
        if self.handle_text_key(key) {
            return;
        }
        match key.code {
            KeyCode::Enter => {
                let content = self.input.text().to_string();
                if let Some(discussion) = &mut self.discussion {
                    match discussion.create(&content, parent_id.as_deref()).await {
                        Ok(_) => {
                            self.input.clear();
                            self.mention.cancel();
                            self.thread_view.rebuild(&discussion.thread());
                            self.mode = Mode::Thread;
                            self.notify_success(if parent_id.is_some() {
                                "Reply added"
                            } else {
                                "Comment added"
                            });
                        }
                        Err(e) => self.notify_error(e.to_string()),
                    }
                }
            }
            KeyCode::Esc => {
                self.mention.cancel();
                self.mode = Mode::Thread;
            }
            _ => {}
        }
    }

    async fn handle_edit_comment(&mut self, key: KeyEvent, comment_id: String) {
        if self.handle_text_key(key) {
            return;
        }
        match key.code {
            KeyCode::Enter => {
                let content = self.input.text().to_string();
                if let Some(discussion) = &mut self.discussion {
                    match discussion.edit(&comment_id, &content).await {
                        Ok(()) => {
                            self.input.clear();
                            self.mention.cancel();
                            self.thread_view.rebuild(&discussion.thread());
                            self.mode = Mode::Thread;
                            self.notify_success("Comment updated");
                        }
                        Err(e) => self.notify_error(e.to_string()),
                    }
                }
            }
            KeyCode::Esc => {
                self.input.clear();
                self.mention.cancel();
                self.mode = Mode::Thread;
            }
            _ => {}
        }
    }

    async fn handle_attach_path(&mut self, key: KeyEvent, mut path: String) {
        match key.code {
            KeyCode::Enter => {
                let path = path.trim().to_string();
                if path.is_empty() {
                    self.notify_error("attachment needs a file path");
                    self.mode = Mode::Thread;
                    return;
                }
                self.attach_file(&path).await;
                self.mode = Mode::Thread;
            }
            KeyCode::Esc => self.mode = Mode::Thread,
            KeyCode::Backspace => {
                path.pop();
                self.mode = Mode::AttachPath { path };
            }
            KeyCode::Char(c) => {
                path.push(c);
                self.mode = Mode::AttachPath { path };
            }
            _ => {}
        }
    }

    /// The attachment flow: the composer text (possibly empty) rides along
    /// as the carrier comment's content, and is cleared only on success.
    async fn attach_file(&mut self, path: &str) {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.notify_error(format!("cannot read {path}: {e}"));
                return;
            }
        };
        let file_name = std::path::Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string());
        let upload = FileUpload {
            file_name: file_name.clone(),
            content_type: None,
            uploaded_by: self.author.id.clone(),
            bytes,
        };
        let text = self.input.text().to_string();
        if let Some(discussion) = &mut self.discussion {
            match discussion.attach(&text, upload).await {
                Ok(_) => {
                    self.input.clear();
                    self.mention.cancel();
                    self.thread_view.rebuild(&discussion.thread());
                    self.notify_success(format!("{file_name} attached"));
                }
                Err(e) => self.notify_error(e.to_string()),
            }
        }
    }

    async fn handle_confirm_delete(&mut self, key: KeyEvent, comment_id: String) {
        if key.code == KeyCode::Char('y') {
            if let Some(discussion) = &mut self.discussion {
                match discussion.delete(&comment_id).await {
                    Ok(()) => {
                        self.thread_view.rebuild(&discussion.thread());
                        self.notify_success("Comment deleted");
                    }
                    Err(e) => self.notify_error(e.to_string()),
                }
            }
        }
        self.mode = Mode::Thread;
    }

    async fn handle_confirm_detach(&mut self, key: KeyEvent, comment_id: String, index: usize) {
        if key.code == KeyCode::Char('y') {
            if let Some(discussion) = &mut self.discussion {
                match discussion.detach(&comment_id, index).await {
                    Ok(()) => {
                        self.thread_view.rebuild(&discussion.thread());
                        self.notify_success("Attachment removed");
                    }
                    Err(e) => self.notify_error(e.to_string()),
                }
            }
        }
        self.mode = Mode::Thread;
    }

    fn handle_summary(&mut self, key: KeyEvent, summary: ThreadSummary, scroll: u16) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.mode = Mode::Thread,
            KeyCode::Char('j') | KeyCode::Down => {
                self.mode = Mode::Summary {
                    summary,
                    scroll: scroll.saturating_add(1),
                };
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.mode = Mode::Summary {
                    summary,
                    scroll: scroll.saturating_sub(1),
                };
            }
            _ => {}
        }
    }

    // -- Rendering --

    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        self.render_title_bar(frame, layout[0]);
        self.render_main(frame, layout[1]);
        self.render_status_bar(frame, layout[2]);

        match &self.mode {
            Mode::TaskList | Mode::Thread => {}
            Mode::NewTask { input } => self.render_input_bar(frame, " New task ", input, area),
            Mode::Compose { parent_id } => {
                let label = if parent_id.is_some() { " Reply " } else { " Comment " };
                self.render_composer(frame, label, area);
            }
            Mode::EditComment { .. } => self.render_composer(frame, " Edit comment ", area),
            Mode::AttachPath { path } => {
                self.render_input_bar(frame, " Attach file (path) ", path, area)
            }
            Mode::ConfirmDeleteComment { preview, .. } => self.render_confirm(
                frame,
                " Delete comment ",
                &format!("Delete \"{preview}\"?\nIts replies will be hidden."),
                area,
            ),
            Mode::ConfirmDetach { file_name, .. } => self.render_confirm(
                frame,
                " Remove attachment ",
                &format!("Remove \"{file_name}\" from this comment?"),
                area,
            ),
            Mode::Summary { summary, scroll } => self.render_summary(frame, summary, *scroll, area),
        }
    }

    fn render_title_bar(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled(" boardtalk ", Style::default().bold().fg(Color::Cyan)),
            Span::raw("| "),
            Span::styled(
                format!("@{}", self.author.handle),
                Style::default().fg(Color::Yellow),
            ),
        ];
        if let Some(task) = &self.active_task {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(
                task.title.clone(),
                Style::default().fg(Color::Magenta),
            ));
        }
        frame.render_widget(Line::from(spans), area);
    }

    fn render_main(&self, frame: &mut Frame, area: Rect) {
        if self.discussion.is_none() {
            self.task_list.render(frame, area);
            return;
        }
        let title = self
            .active_task
            .as_ref()
            .map(|t| t.title.as_str())
            .unwrap_or("Thread");
        if self.show_attachments {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
                .split(area);
            self.thread_view.render(frame, chunks[0], title);
            self.attachment_panel.render(frame, chunks[1]);
        } else {
            self.thread_view.render(frame, area, title);
        }
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        if let Some(notice) = &self.notice {
            let style = match notice.level {
                NoticeLevel::Success => Style::default().fg(Color::Green),
                NoticeLevel::Error => Style::default().fg(Color::Red),
                NoticeLevel::Info => Style::default().fg(Color::Cyan),
            };
            frame.render_widget(
                Line::from(Span::styled(format!(" {}", notice.text), style)),
                area,
            );
            return;
        }

        let hints: Vec<(&str, &str)> = match &self.mode {
            Mode::TaskList => vec![
                ("q", "quit"),
                ("j/k", "tasks"),
                ("Enter", "open"),
                ("n", "new task"),
                ("R", "refresh"),
            ],
            Mode::NewTask { .. } => vec![("Enter", "create"), ("Esc", "cancel")],
            Mode::Thread => vec![
                ("j/k", "rows"),
                ("c", "comment"),
                ("r", "reply"),
                ("e", "edit"),
                ("d", "delete"),
                ("a", "attach"),
                ("s", "summary"),
                ("t", "files"),
                ("Esc", "back"),
            ],
            Mode::Compose { .. } | Mode::EditComment { .. } => vec![
                ("Enter", "send"),
                ("@", "mention"),
                ("Esc", "cancel"),
            ],
            Mode::AttachPath { .. } => vec![("Enter", "attach"), ("Esc", "cancel")],
            Mode::ConfirmDeleteComment { .. } | Mode::ConfirmDetach { .. } => {
                vec![("y", "confirm"), ("any", "cancel")]
            }
            Mode::Summary { .. } => vec![("j/k", "scroll"), ("Esc", "back")],
        };

        let spans: Vec<Span> = hints
            .into_iter()
            .flat_map(|(key, desc)| {
                vec![
                    Span::styled(format!(" {key}"), Style::default().fg(Color::Yellow).bold()),
                    Span::raw(format!(" {desc} ")),
                ]
            })
            .collect();
        frame.render_widget(Line::from(spans), area);
    }

    fn render_input_bar(&self, frame: &mut Frame, label: &str, input: &str, area: Rect) {
        let input_area = bottom_bar(area);
        frame.render_widget(Clear, input_area);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(label);
        frame.render_widget(Paragraph::new(input).block(block), input_area);
    }

    /// The comment composer: the shared text input plus, while suggesting,
    /// the mention picker anchored near the "@".
    fn render_composer(&self, frame: &mut Frame, label: &str, area: Rect) {
        let input_area = bottom_bar(area);
        self.render_input_bar(frame, label, self.input.text(), area);
        mention_picker::render(frame, &self.mention, input_area, self.input.text());
    }

    fn render_confirm(&self, frame: &mut Frame, title: &str, message: &str, area: Rect) {
        let popup = centered_rect(50, 20, area);
        frame.render_widget(Clear, popup);
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red));
        let text = format!("{message}\n\n(y)es / (any key) cancel");
        frame.render_widget(
            Paragraph::new(text)
                .block(block)
                .wrap(Wrap { trim: false })
                .alignment(Alignment::Center),
            popup,
        );
    }

    fn render_summary(&self, frame: &mut Frame, summary: &ThreadSummary, scroll: u16, area: Rect) {
        let popup = centered_rect(70, 70, area);
        frame.render_widget(Clear, popup);
        let block = Block::default()
            .title(" Thread summary ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let mut lines = vec![Line::from(Span::raw(summary.summary.clone())), Line::from("")];
        let sections: [(&str, &Vec<String>); 5] = [
            ("Key points", &summary.key_points),
            ("Decisions", &summary.decisions),
            ("Action items", &summary.action_items),
            ("Unresolved", &summary.unresolved_issues),
            ("Participants", &summary.participants),
        ];
        for (heading, entries) in sections {
            if entries.is_empty() {
                continue;
            }
            lines.push(Line::from(Span::styled(
                format!("{heading}:"),
                Style::default().bold(),
            )));
            for entry in entries {
                lines.push(Line::from(Span::raw(format!("  - {entry}"))));
            }
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            format!("{} comments total", summary.total_comments),
            Style::default().fg(Color::DarkGray),
        )));

        frame.render_widget(
            Paragraph::new(lines)
                .block(block)
                .wrap(Wrap { trim: false })
                .scroll((scroll, 0)),
            popup,
        );
    }
}

fn first_line(content: &str) -> String {
    content.lines().next().unwrap_or("").chars().take(40).collect()
}

fn bottom_bar(area: Rect) -> Rect {
    Rect {
        x: area.x,
        y: area.y + area.height.saturating_sub(3),
        width: area.width,
        height: 3,
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
