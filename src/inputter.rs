use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};
use tracing::trace;

// Single line text input backing the rows per page panel.
// The value is not validated here, that happens when it is submitted.
#[derive(Default)]
pub struct Inputter {
    current_input: String,
    curser_pos: usize,
    finished: bool,
    canceled: bool,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct InputResult {
    pub input: String,
    pub finished: bool,
    pub canceled: bool,
    pub curser_pos: usize,
}

impl Inputter {
    pub fn read(&mut self, key: event::KeyEvent) -> InputResult {
        match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => self.enter(),
            (KeyCode::Esc, _) => self.escape(),
            (KeyCode::Backspace, _) => self.backspace(),
            (KeyCode::Delete, _) => self.delete(),
            (KeyCode::Left, _) => self.left(),
            (KeyCode::Right, _) => self.right(),
            (KeyCode::Home, _) => self.home(),
            (KeyCode::End, _) => self.end(),
            (kc, km) => self.key(kc, km),
        }
    }

    // Replace the content and put the curser behind it
    pub fn set(&mut self, s: &str) {
        self.clear();
        self.current_input = s.to_string();
        self.curser_pos = s.chars().count();
    }

    pub fn get(&self) -> InputResult {
        InputResult {
            canceled: self.canceled,
            finished: self.finished,
            input: self.current_input.clone(),
            curser_pos: self.curser_pos,
        }
    }

    pub fn clear(&mut self) {
        self.canceled = false;
        self.finished = false;
        self.current_input.clear();
        self.curser_pos = 0;
    }

    fn enter(&mut self) -> InputResult {
        self.finished = true;
        self.get()
    }

    fn escape(&mut self) -> InputResult {
        self.canceled = true;
        self.finished = true;
        self.get()
    }

    fn backspace(&mut self) -> InputResult {
        if self.curser_pos > 0 {
            self.curser_pos -= 1;
            let idx = self.getbytepos();
            self.current_input.remove(idx);
        }
        self.get()
    }

    fn delete(&mut self) -> InputResult {
        if self.curser_pos < self.current_input.chars().count() {
            let idx = self.getbytepos();
            self.current_input.remove(idx);
        }
        self.get()
    }

    fn left(&mut self) -> InputResult {
        self.curser_pos = self.curser_pos.saturating_sub(1);
        self.get()
    }

    fn right(&mut self) -> InputResult {
        if self.curser_pos < self.current_input.chars().count() {
            self.curser_pos += 1;
        }
        self.get()
    }

    fn home(&mut self) -> InputResult {
        self.curser_pos = 0;
        self.get()
    }

    fn end(&mut self) -> InputResult {
        self.curser_pos = self.current_input.chars().count();
        self.get()
    }

    fn key(&mut self, code: KeyCode, modifier: KeyModifiers) -> InputResult {
        if modifier.contains(KeyModifiers::CONTROL) {
            return self.get();
        }
        if let Some(chr) = code.as_char() {
            let idx = self.getbytepos();
            self.current_input.insert(idx, chr);
            self.curser_pos += 1;
            trace!("Input: {:?}", self.current_input);
        }
        self.get()
    }

    fn getbytepos(&self) -> usize {
        self.current_input
            .char_indices()
            .nth(self.curser_pos)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.current_input.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyEvent;

    fn press(inputter: &mut Inputter, code: KeyCode) -> InputResult {
        inputter.read(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn typing_and_submitting() {
        let mut input = Inputter::default();
        input.set("10");
        press(&mut input, KeyCode::Backspace);
        press(&mut input, KeyCode::Char('5'));
        let res = press(&mut input, KeyCode::Enter);
        assert_eq!(res.input, "15");
        assert!(res.finished);
        assert!(!res.canceled);
    }

    #[test]
    fn editing_in_the_middle() {
        let mut input = Inputter::default();
        input.set("25");
        press(&mut input, KeyCode::Left);
        press(&mut input, KeyCode::Char('0'));
        assert_eq!(input.get().input, "205");
        press(&mut input, KeyCode::Home);
        press(&mut input, KeyCode::Delete);
        let res = press(&mut input, KeyCode::End);
        assert_eq!(res.input, "05");
        assert_eq!(res.curser_pos, 2);
    }

    #[test]
    fn escape_cancels() {
        let mut input = Inputter::default();
        input.set("7");
        let res = press(&mut input, KeyCode::Esc);
        assert!(res.finished && res.canceled);
        input.clear();
        assert_eq!(input.get(), InputResult::default());
    }

    #[test]
    fn backspace_at_start_is_a_noop() {
        let mut input = Inputter::default();
        let res = press(&mut input, KeyCode::Backspace);
        assert_eq!(res.input, "");
        assert_eq!(res.curser_pos, 0);
    }
}
