use std::time::Duration;
use tracing::trace;

use crate::domain::{AppConfig, AppError, Message, Panel};
use crate::model::Model;
use crate::table::ColumnId;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyModifiers};

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &AppConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    // Polls so the loop keeps running while fetches complete in the background
    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, AppError> {
        if event::poll(Duration::from_millis(self.event_poll_time))?
            && let Event::Key(key) = event::read()?
            && key.kind == event::KeyEventKind::Press
        {
            if model.raw_keyevents() {
                return Ok(Some(self.handle_raw_key(key)));
            }
            return Ok(self.handle_key(key));
        }
        Ok(None)
    }

    // The rows input only takes digits, so the panel keys and ctrl-c keep their meaning
    fn handle_raw_key(&self, key: event::KeyEvent) -> Message {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let message = match key.code {
            KeyCode::Char('c') if ctrl => Message::Quit,
            KeyCode::Char('c') => Message::TogglePanel(Panel::Columns),
            KeyCode::Char('r') if !ctrl => Message::TogglePanel(Panel::RowsPerPage),
            _ => Message::RawKey(key),
        };
        trace!("Mapped raw: {key:?} => {message:?}");
        message
    }

    fn handle_key(&self, key: event::KeyEvent) -> Option<Message> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => Some(Message::Quit),
                _ => None,
            };
        }
        let message = match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Up | KeyCode::Char('k') => Some(Message::MoveUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Message::MoveDown),
            KeyCode::Char(' ') => Some(Message::ToggleRow),
            KeyCode::Char('a') => Some(Message::ToggleAllRows),
            KeyCode::Char('y') => Some(Message::CopySelection),
            KeyCode::Char('R') => Some(Message::Reload),
            KeyCode::Right | KeyCode::Char('n') => Some(Message::NextPage),
            KeyCode::Left | KeyCode::Char('p') => Some(Message::PrevPage),
            KeyCode::Home | KeyCode::Char('g') => Some(Message::FirstPage),
            KeyCode::End | KeyCode::Char('G') => Some(Message::LastPage),
            KeyCode::Char('c') => Some(Message::TogglePanel(Panel::Columns)),
            KeyCode::Char('r') => Some(Message::TogglePanel(Panel::RowsPerPage)),
            KeyCode::Char(d @ '1'..='4') => {
                ColumnId::from_index(d as usize - '1' as usize).map(Message::ToggleColumn)
            }
            KeyCode::Enter => Some(Message::Enter),
            KeyCode::Esc => Some(Message::Exit),
            KeyCode::Char('?') => Some(Message::Help),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}
