use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};
use tracing::trace;

/// Single line editor behind the focused form input.
#[derive(Default)]
pub struct Inputter {
    current_input: String,
    cursor_pos: usize, // in chars, not bytes
}

#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct InputResult {
    pub input: String,
    pub changed: bool,
}

impl Inputter {
    pub fn read(&mut self, key: event::KeyEvent) -> InputResult {
        match (key.code, key.modifiers) {
            (KeyCode::Backspace, _) => self.backspace(),
            (KeyCode::Delete, _) => self.delete(),
            (KeyCode::Left, _) => self.move_to(self.cursor_pos.saturating_sub(1)),
            (KeyCode::Right, _) => self.move_to(self.cursor_pos + 1),
            (KeyCode::Home, _) => self.move_to(0),
            (KeyCode::End, _) => self.move_to(usize::MAX),
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => self.clear_line(),
            (kc, km) if km.difference(KeyModifiers::SHIFT).is_empty() => self.key(kc),
            _ => self.result(false),
        }
    }

    /// Replaces the content and puts the cursor at its end.
    pub fn load(&mut self, s: &str) {
        self.current_input = s.to_string();
        self.cursor_pos = s.chars().count();
    }

    pub fn cursor_pos(&self) -> usize {
        self.cursor_pos
    }

    fn result(&self, changed: bool) -> InputResult {
        InputResult {
            input: self.current_input.clone(),
            changed,
        }
    }

    fn clear_line(&mut self) -> InputResult {
        self.current_input.clear();
        self.cursor_pos = 0;
        self.result(true)
    }

    fn backspace(&mut self) -> InputResult {
        if self.cursor_pos == 0 {
            return self.result(false);
        }
        self.cursor_pos -= 1;
        let at = self.byte_pos();
        self.current_input.remove(at);
        self.result(true)
    }

    fn delete(&mut self) -> InputResult {
        if self.cursor_pos >= self.current_input.chars().count() {
            return self.result(false);
        }
        let at = self.byte_pos();
        self.current_input.remove(at);
        self.result(true)
    }

    fn move_to(&mut self, pos: usize) -> InputResult {
        self.cursor_pos = pos.min(self.current_input.chars().count());
        self.result(false)
    }

    fn key(&mut self, code: KeyCode) -> InputResult {
        if let Some(chr) = code.as_char() {
            let at = self.byte_pos();
            self.current_input.insert(at, chr);
            self.cursor_pos += 1;
            trace!("Input now {:?}", self.current_input);
            return self.result(true);
        }
        self.result(false)
    }

    fn byte_pos(&self) -> usize {
        self.current_input
            .char_indices()
            .nth(self.cursor_pos)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.current_input.len())
    }
}
