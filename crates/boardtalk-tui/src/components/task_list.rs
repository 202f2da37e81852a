use boardtalk_core::task::Task;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

/// The host board's task list; picking a task opens its thread.
pub struct TaskList {
    tasks: Vec<Task>,
    list_state: ListState,
}

impl TaskList {
    pub fn new(tasks: Vec<Task>) -> Self {
        let mut list_state = ListState::default();
        if !tasks.is_empty() {
            list_state.select(Some(0));
        }
        Self { tasks, list_state }
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.tasks.get(self.list_state.selected()?)
    }

    /// Replace the tasks, keeping the selection on the same task id where
    /// possible.
    pub fn set_tasks(&mut self, tasks: Vec<Task>) {
        let selected_id = self.selected_task().map(|t| t.id.clone());
        self.tasks = tasks;
        let index = selected_id
            .and_then(|id| self.tasks.iter().position(|t| t.id == id))
            .or(if self.tasks.is_empty() { None } else { Some(0) });
        self.list_state.select(index);
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        let len = self.tasks.len();
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

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(format!(" Tasks ({}) ", self.tasks.len()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let items: Vec<ListItem> = self
            .tasks
            .iter()
            .map(|task| {
                let status = Span::styled(
                    format!("[{}] ", task.status.display_name()),
                    Style::default().fg(Color::Yellow),
                );
                ListItem::new(Line::from(vec![status, Span::raw(&task.title)]))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan).bold())
            .highlight_symbol("> ");

        let mut state = self.list_state.clone();
        frame.render_stateful_widget(list, area, &mut state);
    }
}
