use std::sync::{Arc, Mutex};

use boardtalk_core::attachment::Attachment;
use boardtalk_core::comment::Comment;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem};

/// Sibling panel aggregating every attachment in the thread.
///
/// It never fetches anything itself: the discussion controller's load
/// callback feeds it the flattened comment collection, and it derives its
/// rows from that.
#[derive(Clone, Default)]
pub struct AttachmentPanel {
    attachments: Arc<Mutex<Vec<Attachment>>>,
}

impl AttachmentPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// The callback to register on the discussion controller.
    pub fn on_loaded(&self) -> impl Fn(&[Comment]) + Send + Sync {
        let sink = self.attachments.clone();
        move |comments: &[Comment]| {
            let aggregated: Vec<Attachment> = comments
                .iter()
                .flat_map(|c| c.attachments.iter().cloned())
                .collect();
            *sink.lock().unwrap_or_else(|e| e.into_inner()) = aggregated;
        }
    }

    pub fn attachments(&self) -> Vec<Attachment> {
        // The aggregate is write-once-per-load; a poisoned lock still holds
        // a coherent snapshot.
        self.attachments
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let attachments = self.attachments();
        let block = Block::default()
            .title(format!(" Attachments ({}) ", attachments.len()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green));

        let items: Vec<ListItem> = if attachments.is_empty() {
            vec![ListItem::new(Line::from(Span::styled(
                "none",
                Style::default().fg(Color::DarkGray),
            )))]
        } else {
            attachments
                .iter()
                .map(|a| {
                    ListItem::new(Line::from(vec![
                        Span::raw(a.file_name.clone()),
                        Span::styled(
                            format!("  {} B  {}", a.size_bytes, a.content_type),
                            Style::default().fg(Color::DarkGray),
                        ),
                    ]))
                })
                .collect()
        };

        frame.render_widget(List::new(items).block(block), area);
    }
}

#[cfg(test)]
mod tests {
    use boardtalk_core::comment::Author;
    use chrono::Utc;

    use super::*;

    fn comment_with_files(id: &str, names: &[&str]) -> Comment {
        Comment {
            id: id.to_string(),
            task_id: "t1".to_string(),
            author: Author {
                id: "u1".to_string(),
                handle: None,
                display_name: None,
            },
            content: "files".to_string(),
            created_at: None,
            updated_at: None,
            parent_id: None,
            attachments: names
                .iter()
                .map(|name| Attachment {
                    id: format!("a-{name}"),
                    comment_id: id.to_string(),
                    file_name: name.to_string(),
                    stored_name: format!("s_{name}"),
                    content_type: "text/plain".to_string(),
                    size_bytes: 1,
                    uploaded_by: "u1".to_string(),
                    uploaded_at: Utc::now(),
                    url: String::new(),
                })
                .collect(),
        }
    }

    #[test]
    fn aggregates_across_comments_in_order() {
        let panel = AttachmentPanel::new();
        let on_loaded = panel.on_loaded();
        on_loaded(&[
            comment_with_files("c1", &["a.txt", "b.txt"]),
            comment_with_files("c2", &["c.txt"]),
        ]);
        let names: Vec<String> = panel.attachments().iter().map(|a| a.file_name.clone()).collect();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
    }

    #[test]
    fn survives_a_poisoned_lock() {
        let panel = AttachmentPanel::new();
        let poisoner = panel.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.attachments.lock().unwrap();
            panic!("poison the panel lock");
        })
        .join();

        let on_loaded = panel.on_loaded();
        on_loaded(&[comment_with_files("c1", &["a.txt"])]);
        assert_eq!(panel.attachments().len(), 1);
    }

    #[test]
    fn each_load_replaces_the_aggregate() {
        let panel = AttachmentPanel::new();
        let on_loaded = panel.on_loaded();
        on_loaded(&[comment_with_files("c1", &["a.txt"])]);
        on_loaded(&[]);
        assert!(panel.attachments().is_empty());
    }
}
