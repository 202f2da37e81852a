/// Free-text input buffer with a byte-offset caret.
///
/// The caret always sits on a char boundary; every mutation keeps it there.
/// The mention engine consumes `(text, caret)` pairs and hands back spliced
/// replacements, which re-enter through [`TextInput::set`].
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    text: String,
    caret: usize,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Replace the whole buffer, clamping the caret to a valid boundary.
    pub fn set(&mut self, text: String, caret: usize) {
        self.caret = clamp_to_boundary(&text, caret);
        self.text = text;
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.caret = 0;
    }

    pub fn insert(&mut self, ch: char) {
        self.text.insert(self.caret, ch);
        self.caret += ch.len_utf8();
    }

    /// Remove the char before the caret, if any.
    pub fn backspace(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.text.replace_range(prev..self.caret, "");
            self.caret = prev;
        }
    }

    /// Remove the char under the caret, if any.
    pub fn delete(&mut self) {
        if let Some(next) = self.next_boundary() {
            self.text.replace_range(self.caret..next, "");
        }
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.caret = prev;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(next) = self.next_boundary() {
            self.caret = next;
        }
    }

    pub fn move_home(&mut self) {
        self.caret = 0;
    }

    pub fn move_end(&mut self) {
        self.caret = self.text.len();
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.text[..self.caret]
            .chars()
            .next_back()
            .map(|ch| self.caret - ch.len_utf8())
    }

    fn next_boundary(&self) -> Option<usize> {
        self.text[self.caret..]
            .chars()
            .next()
            .map(|ch| self.caret + ch.len_utf8())
    }
}

fn clamp_to_boundary(text: &str, caret: usize) -> usize {
    if caret >= text.len() {
        return text.len();
    }
    let mut at = caret;
    while !text.is_char_boundary(at) {
        at -= 1;
    }
    at
}
