use boardtalk_core::comment::Comment;
use boardtalk_core::thread::Thread;
use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

/// One selectable row of the thread: a comment, or one of its attachments.
///
/// Attachment rows carry the position index the delete call will use, fixed
/// at render time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Comment {
        id: String,
        depth: usize,
        is_root: bool,
    },
    Attachment {
        comment_id: String,
        index: usize,
        file_name: String,
        depth: usize,
    },
}

/// Renders one task's thread: roots in order, replies nested beneath their
/// parent, attachments under their comment. Reply buckets whose parent is
/// not reachable from a root are never walked.
pub struct ThreadView {
    entries: Vec<Entry>,
    items: Vec<ListItem<'static>>,
    list_state: ListState,
}

impl ThreadView {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            items: Vec::new(),
            list_state: ListState::default(),
        }
    }

    /// Rebuild rows from a freshly derived thread, keeping the selection on
    /// the same row where possible.
    pub fn rebuild(&mut self, thread: &Thread) {
        let selected = self.selected_entry().cloned();
        self.entries.clear();
        self.items.clear();
        for root in &thread.roots {
            self.push_comment(thread, root, 0, true);
        }
        let index = selected
            .and_then(|prev| self.entries.iter().position(|e| *e == prev))
            .or(if self.entries.is_empty() { None } else { Some(0) });
        self.list_state.select(index);
    }

    fn push_comment(&mut self, thread: &Thread, comment: &Comment, depth: usize, is_root: bool) {
        self.entries.push(Entry::Comment {
            id: comment.id.clone(),
            depth,
            is_root,
        });
        self.items.push(comment_item(comment, depth));
        for (index, attachment) in comment.attachments.iter().enumerate() {
            self.entries.push(Entry::Attachment {
                comment_id: comment.id.clone(),
                index,
                file_name: attachment.file_name.clone(),
                depth,
            });
            self.items.push(attachment_item(
                &attachment.file_name,
                attachment.size_bytes,
                depth,
            ));
        }
        for reply in thread.replies(&comment.id) {
            self.push_comment(thread, reply, depth + 1, false);
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn selected_entry(&self) -> Option<&Entry> {
        self.entries.get(self.list_state.selected()?)
    }

    /// Id of the selected comment, whether the row is the comment itself or
    /// one of its attachments.
    pub fn selected_comment_id(&self) -> Option<&str> {
        match self.selected_entry()? {
            Entry::Comment { id, .. } => Some(id),
            Entry::Attachment { comment_id, .. } => Some(comment_id),
        }
    }

    /// Only root comments offer the reply affordance.
    pub fn selected_is_root(&self) -> bool {
        matches!(self.selected_entry(), Some(Entry::Comment { is_root: true, .. }))
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let len = self.entries.len();
        if len == 0 {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0);
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if current + 1 < len {
                    self.list_state.select(Some(current + 1));
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if current > 0 {
                    self.list_state.select(Some(current - 1));
                }
            }
            KeyCode::Char('g') => self.list_state.select(Some(0)),
            KeyCode::Char('G') => self.list_state.select(Some(len - 1)),
            _ => {}
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, title: &str) {
        let block = Block::default()
            .title(format!(" {title} "))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        if self.entries.is_empty() {
            let empty = List::new(vec![ListItem::new(Line::from(Span::styled(
                "No comments yet. Press c to start the discussion.",
                Style::default().fg(Color::DarkGray),
            )))])
            .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let list = List::new(self.items.clone())
            .block(block)
            .highlight_style(Style::default().bg(Color::Rgb(40, 40, 60)))
            .highlight_symbol("> ");

        let mut state = self.list_state.clone();
        frame.render_stateful_widget(list, area, &mut state);
    }
}

impl Default for ThreadView {
    fn default() -> Self {
        Self::new()
    }
}

fn comment_item(comment: &Comment, depth: usize) -> ListItem<'static> {
    let pad = "  ".repeat(depth);
    let marker = if depth == 0 { "" } else { "└ " };
    let mut lines = vec![Line::from(vec![
        Span::raw(format!("{pad}{marker}")),
        Span::styled(
            comment.author.label().to_string(),
            Style::default().fg(Color::Yellow).bold(),
        ),
        Span::styled(
            format!("  {}", format_time(comment.created_at)),
            Style::default().fg(Color::DarkGray),
        ),
    ])];
    for text in comment.content.lines() {
        lines.push(Line::from(Span::raw(format!("{pad}  {text}"))));
    }
    ListItem::new(lines)
}

fn attachment_item(file_name: &str, size_bytes: i64, depth: usize) -> ListItem<'static> {
    let pad = "  ".repeat(depth);
    ListItem::new(Line::from(vec![
        Span::raw(format!("{pad}  ")),
        Span::styled(
            format!("[file] {file_name} ({size_bytes} B)"),
            Style::default().fg(Color::Green),
        ),
    ]))
}

fn format_time(at: Option<DateTime<Utc>>) -> String {
    match at {
        Some(at) => at.format("%Y-%m-%d %H:%M").to_string(),
        None => "-".to_string(),
    }
}
