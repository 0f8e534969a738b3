//! Single-line entry field with a character cursor.

#[derive(Debug, Default, Clone)]
pub struct InputField {
    value: String,
    /// Cursor position in chars, `0..=value.chars().count()`.
    cursor: usize,
}

impl InputField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    /// Text left of the cursor, used to place the terminal cursor.
    pub fn before_cursor(&self) -> &str {
        &self.value[..self.byte_index(self.cursor)]
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.value.remove(at);
    }

    pub fn delete(&mut self) {
        if self.cursor < self.len() {
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.len());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.len();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    fn len(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> InputField {
        let mut input = InputField::new();
        text.chars().for_each(|c| input.insert(c));
        input
    }

    #[test]
    fn test_insert_appends_at_cursor() {
        let mut input = typed("helo");
        input.move_left();
        input.insert('l');
        assert_eq!(input.value(), "hello");
        assert_eq!(input.before_cursor(), "hell");
    }

    #[test]
    fn test_backspace_and_delete() {
        let mut input = typed("abc");
        input.backspace();
        assert_eq!(input.value(), "ab");

        input.move_home();
        input.delete();
        assert_eq!(input.value(), "b");

        input.move_home();
        input.backspace();
        assert_eq!(input.value(), "b");
    }

    #[test]
    fn test_multibyte_characters() {
        let mut input = typed("héllo");
        input.move_home();
        input.move_right();
        input.move_right();
        assert_eq!(input.before_cursor(), "hé");

        input.backspace();
        assert_eq!(input.value(), "hllo");
    }

    #[test]
    fn test_cursor_stays_in_bounds() {
        let mut input = typed("ab");
        input.move_right();
        assert_eq!(input.cursor(), 2);
        input.move_home();
        input.move_left();
        assert_eq!(input.cursor(), 0);
        input.move_end();
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn test_clear_and_blank() {
        let mut input = typed("   ");
        assert!(input.is_blank());

        input.clear();
        assert_eq!(input.value(), "");
        assert_eq!(input.cursor(), 0);
    }
}
