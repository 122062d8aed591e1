//! Text input field handling.
//!
//! The cursor counts characters, not bytes, so multi-byte input edits
//! cleanly.

use unicode_width::UnicodeWidthStr;

/// Character used to mask secret input.
const MASK: char = '•';

/// State for a text input field.
#[derive(Clone, Debug, Default)]
pub struct TextInput {
    content: String,
    /// Cursor position (character index).
    cursor: usize,
}

impl TextInput {
    /// Creates a new empty text input.
    pub fn new() -> Self {
        Self::default()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }

    fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    /// Inserts a character at the cursor position.
    pub fn insert(&mut self, c: char) {
        let idx = self.byte_index(self.cursor);
        self.content.insert(idx, c);
        self.cursor += 1;
    }

    /// Deletes the character before the cursor (backspace).
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let idx = self.byte_index(self.cursor);
            self.content.remove(idx);
        }
    }

    /// Deletes the character at the cursor position (delete).
    pub fn delete(&mut self) {
        if self.cursor < self.char_len() {
            let idx = self.byte_index(self.cursor);
            self.content.remove(idx);
        }
    }

    /// Moves the cursor left.
    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Moves the cursor right.
    pub fn move_right(&mut self) {
        if self.cursor < self.char_len() {
            self.cursor += 1;
        }
    }

    /// Moves the cursor to the beginning.
    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    /// Moves the cursor to the end.
    pub fn move_end(&mut self) {
        self.cursor = self.char_len();
    }

    /// Empties the input.
    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    /// Returns the current content as a string slice.
    pub fn as_str(&self) -> &str {
        &self.content
    }

    /// Returns whether the input is empty.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Text to draw, masked when `secret`.
    pub fn display(&self, secret: bool) -> String {
        if secret {
            MASK.to_string().repeat(self.char_len())
        } else {
            self.content.clone()
        }
    }

    /// Terminal column of the cursor relative to the start of the text.
    pub fn cursor_column(&self, secret: bool) -> u16 {
        if secret {
            return self.cursor as u16;
        }
        let before = &self.content[..self.byte_index(self.cursor)];
        before.width() as u16
    }
}
