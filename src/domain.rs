use std::fmt;
use std::io::Error;
use std::time::Duration;

use derive_setters::Setters;
use ratatui::crossterm::event::KeyEvent;

use crate::form::ValidationError;
use crate::pagination::{DEFAULT_PAGE_SIZE, DEFAULT_WINDOW_SIZE, PageTarget};
use crate::record::Field;

pub const HELP_TEXT: &str = "\
Navigation
  ←/→/↑/↓       move the cell cursor
  PgUp / [      previous page
  PgDn / ]      next page
  1-9           jump to a page shown in the pagination bar

Table
  s             sort by the selected column (again to reverse)
  h             hide / show the selected column
  Enter         edit the selected record

Edit form
  Tab / ↓       next input
  S-Tab / ↑     previous input
  Enter, C-s    save
  Esc           close without saving

  ?             this help
  q             quit";

#[derive(Debug)]
pub enum PTError {
    IoError(Error),
    JsonError(serde_json::Error),
    LoadingFailed(String),
    LoggingFailed(String),
    FileNotFound,
    PermissionDenied,
}

impl fmt::Display for PTError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PTError::IoError(e) => write!(f, "io error: {e}"),
            PTError::JsonError(e) => write!(f, "invalid dataset: {e}"),
            PTError::LoadingFailed(msg) => write!(f, "loading failed: {msg}"),
            PTError::LoggingFailed(msg) => write!(f, "could not set up logging: {msg}"),
            PTError::FileNotFound => write!(f, "file not found"),
            PTError::PermissionDenied => write!(f, "permission denied"),
        }
    }
}

impl std::error::Error for PTError {}

impl From<Error> for PTError {
    fn from(err: Error) -> Self {
        PTError::IoError(err)
    }
}

impl From<serde_json::Error> for PTError {
    fn from(err: serde_json::Error) -> Self {
        PTError::JsonError(err)
    }
}

/// Everything the model reacts to.
///
/// The pointer-style variants carry what a click on the rendered table would
/// carry; the rest are keyboard conveniences that the model resolves into them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Quit,
    Exit,
    Help,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    PreviousPage,
    NextPage,
    JumpToPageSlot(usize),
    SortColumn,
    ToggleColumn,
    EditCell,
    NextInput,
    PreviousInput,
    RawKey(KeyEvent),
    BodyClick {
        row: Option<String>,
        cell: Option<Field>,
    },
    PageClick(PageTarget),
    HeaderClick(Option<Field>),
    FooterClick(Option<usize>),
    CloseForm,
    SaveForm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Locale {
    #[default]
    En,
    Ru,
}

impl Locale {
    pub fn field_label(self, field: Field) -> &'static str {
        match (self, field) {
            (Locale::En, Field::FirstName) => "First name",
            (Locale::En, Field::LastName) => "Last name",
            (Locale::En, Field::About) => "About",
            (Locale::En, Field::EyeColor) => "Eye color",
            (Locale::Ru, Field::FirstName) => "Имя",
            (Locale::Ru, Field::LastName) => "Фамилия",
            (Locale::Ru, Field::About) => "Описание",
            (Locale::Ru, Field::EyeColor) => "Цвет глаз",
        }
    }

    /// Caption of a footer toggle, depending on whether its column is hidden.
    pub fn toggle_caption(self, hidden: bool) -> &'static str {
        match (self, hidden) {
            (_, true) => "+",
            (Locale::En, false) => "Hide",
            (Locale::Ru, false) => "Скрыть",
        }
    }

    pub fn page_title(self, page: usize) -> String {
        match self {
            Locale::En => format!("Go to page {page}"),
            Locale::Ru => format!("Перейти на {page} страницу"),
        }
    }

    pub fn previous_title(self) -> &'static str {
        match self {
            Locale::En => "Go to previous page",
            Locale::Ru => "Перейти на предыдущую страницу",
        }
    }

    pub fn next_title(self) -> &'static str {
        match self {
            Locale::En => "Go to next page",
            Locale::Ru => "Перейти на следующую страницу",
        }
    }

    pub fn validation_message(self, err: &ValidationError) -> &'static str {
        match (self, err) {
            (Locale::En, _) => err.message(),
            (Locale::Ru, ValidationError::EmptyField(_)) => "Поля не должны быть пустыми.",
            (Locale::Ru, ValidationError::UnknownEyeColor(_)) => {
                "Невозможно добавить этот цвет глаз."
            }
        }
    }
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct TableConfig {
    pub page_size: usize,
    pub window_size: usize,
    pub event_poll_time: u64,
    pub fade_in: Duration,
    pub fade_out: Duration,
    pub locale: Locale,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            window_size: DEFAULT_WINDOW_SIZE,
            event_poll_time: 100,
            fade_in: Duration::from_millis(500),
            fade_out: Duration::from_millis(350),
            locale: Locale::En,
        }
    }
}
