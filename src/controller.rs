use std::time::Duration;
use tracing::trace;

use crate::domain::{Message, PTError, TableConfig};
use crate::model::{Model, Modus};
use crate::render::RenderTarget;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &TableConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event<T: RenderTarget>(
        &self,
        model: &Model<T>,
    ) -> Result<Option<Message>, PTError> {
        if event::poll(Duration::from_millis(self.event_poll_time))?
            && let Event::Key(key) = event::read()?
            && key.kind == event::KeyEventKind::Press
        {
            return Ok(self.handle_key(model.modus(), key));
        }
        Ok(None)
    }

    pub fn handle_key(&self, modus: Modus, key: KeyEvent) -> Option<Message> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Message::Quit);
        }
        let message = match modus {
            Modus::Table => Self::table_key(key),
            Modus::Form => Self::form_key(key),
            Modus::Popup => match key.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => Some(Message::Exit),
                _ => None,
            },
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }

    fn table_key(key: KeyEvent) -> Option<Message> {
        match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Char('?') => Some(Message::Help),
            KeyCode::Esc => Some(Message::Exit),
            KeyCode::Up | KeyCode::Char('k') => Some(Message::MoveUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Message::MoveDown),
            KeyCode::Left => Some(Message::MoveLeft),
            KeyCode::Right => Some(Message::MoveRight),
            KeyCode::PageUp | KeyCode::Char('[') => Some(Message::PreviousPage),
            KeyCode::PageDown | KeyCode::Char(']') => Some(Message::NextPage),
            KeyCode::Char(c @ '1'..='9') => {
                c.to_digit(10).map(|d| Message::JumpToPageSlot(d as usize))
            }
            KeyCode::Char('s') => Some(Message::SortColumn),
            KeyCode::Char('h') => Some(Message::ToggleColumn),
            KeyCode::Enter => Some(Message::EditCell),
            _ => None,
        }
    }

    fn form_key(key: KeyEvent) -> Option<Message> {
        match (key.code, key.modifiers) {
            (KeyCode::Esc, _) => Some(Message::CloseForm),
            (KeyCode::Enter, _) => Some(Message::SaveForm),
            (KeyCode::Char('s'), KeyModifiers::CONTROL) => Some(Message::SaveForm),
            (KeyCode::Tab, _) | (KeyCode::Down, _) => Some(Message::NextInput),
            (KeyCode::BackTab, _) | (KeyCode::Up, _) => Some(Message::PreviousInput),
            _ => Some(Message::RawKey(key)),
        }
    }
}
