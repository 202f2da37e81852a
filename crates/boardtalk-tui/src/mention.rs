use boardtalk_core::Identity;

/// Result of committing a suggestion: the replacement text and the caret
/// position immediately after the inserted mention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    pub text: String,
    pub caret: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Idle,
    Suggesting { trigger: usize, selected: usize },
}

/// Caret-aware "@mention" autocomplete.
///
/// Feed it the current text and caret through [`MentionEngine::evaluate`]
/// after every text change or caret movement. It goes to Suggesting when the
/// nearest "@" left of the caret has no whitespace before the caret and at
/// least one candidate matches the text between them. Committing splices
/// "@handle " over exactly that span and touches nothing else.
pub struct MentionEngine {
    candidates: Vec<Identity>,
    matches: Vec<Identity>,
    state: State,
}

impl MentionEngine {
    pub fn new() -> Self {
        Self {
            candidates: Vec::new(),
            matches: Vec::new(),
            state: State::Idle,
        }
    }

    pub fn set_candidates(&mut self, candidates: Vec<Identity>) {
        self.candidates = candidates;
        self.matches.clear();
        self.state = State::Idle;
    }

    pub fn is_suggesting(&self) -> bool {
        matches!(self.state, State::Suggesting { .. })
    }

    /// Candidates matching the current query, empty while Idle.
    pub fn suggestions(&self) -> &[Identity] {
        match self.state {
            State::Suggesting { .. } => &self.matches,
            State::Idle => &[],
        }
    }

    pub fn selected_index(&self) -> Option<usize> {
        match self.state {
            State::Suggesting { selected, .. } => Some(selected),
            State::Idle => None,
        }
    }

    /// Byte offset of the "@" that opened the current suggestion.
    pub fn trigger_offset(&self) -> Option<usize> {
        match self.state {
            State::Suggesting { trigger, .. } => Some(trigger),
            State::Idle => None,
        }
    }

    /// Re-derive the suggestion state from the current text and caret. Called
    /// on every text change and caret movement, including the text a commit
    /// itself produced.
    pub fn evaluate(&mut self, text: &str, caret: usize) {
        let Some(trigger) = find_trigger(text, caret) else {
            self.state = State::Idle;
            self.matches.clear();
            return;
        };
        let query = &text[trigger + 1..caret];
        let matches: Vec<Identity> = self
            .candidates
            .iter()
            .filter(|c| c.matches(query))
            .cloned()
            .collect();
        if matches.is_empty() {
            self.state = State::Idle;
            self.matches.clear();
            return;
        }
        // Keep the selection when the same trigger is still open, clamped to
        // the refreshed match list.
        let selected = match self.state {
            State::Suggesting {
                trigger: prev,
                selected,
            } if prev == trigger => selected.min(matches.len() - 1),
            _ => 0,
        };
        self.matches = matches;
        self.state = State::Suggesting { trigger, selected };
    }

    /// ArrowDown: advance the selection, wrapping past the end.
    pub fn select_next(&mut self) {
        if let State::Suggesting { trigger, selected } = self.state {
            self.state = State::Suggesting {
                trigger,
                selected: (selected + 1) % self.matches.len(),
            };
        }
    }

    /// ArrowUp: retreat the selection, wrapping past the start.
    pub fn select_prev(&mut self) {
        if let State::Suggesting { trigger, selected } = self.state {
            let len = self.matches.len();
            self.state = State::Suggesting {
                trigger,
                selected: (selected + len - 1) % len,
            };
        }
    }

    /// Enter/Tab: replace the span [trigger, caret) with "@handle " and put
    /// the caret right after the trailing space.
    pub fn commit(&mut self, text: &str, caret: usize) -> Option<Splice> {
        let index = self.selected_index()?;
        self.commit_pick(index, text, caret)
    }

    /// Explicit pick of a visible suggestion by index.
    pub fn commit_pick(&mut self, index: usize, text: &str, caret: usize) -> Option<Splice> {
        let State::Suggesting { trigger, .. } = self.state else {
            return None;
        };
        let handle = &self.matches.get(index)?.handle;
        let inserted = format!("@{handle} ");
        let mut spliced = String::with_capacity(text.len() + inserted.len());
        spliced.push_str(&text[..trigger]);
        spliced.push_str(&inserted);
        spliced.push_str(&text[caret..]);
        let new_caret = trigger + inserted.len();
        self.state = State::Idle;
        self.matches.clear();
        Some(Splice {
            text: spliced,
            caret: new_caret,
        })
    }

    /// Escape, or activation moving outside the input: drop the suggestion
    /// without touching the text.
    pub fn cancel(&mut self) {
        self.state = State::Idle;
        self.matches.clear();
    }
}

impl Default for MentionEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Byte offset of the nearest "@" scanning left from the caret with no
/// whitespace between it and the caret.
fn find_trigger(text: &str, caret: usize) -> Option<usize> {
    for (i, ch) in text[..caret].char_indices().rev() {
        if ch == '@' {
            return Some(i);
        }
        if ch.is_whitespace() {
            return None;
        }
    }
    None
}
