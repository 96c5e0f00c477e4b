use std::fmt;
use std::io::Error;
use std::path::PathBuf;

use derive_setters::Setters;
use ratatui::crossterm::event::KeyEvent;

use crate::fetcher::FetchOutcome;
use crate::table::ColumnId;

pub const DEFAULT_API_URL: &str = "https://api.artic.edu/api/v1";

pub const HELP_TEXT: &str = "\
artable - Art Institute of Chicago artworks

Table
  up/down, k/j   move the cursor
  space          select / deselect row
  a              select / deselect all rows on page
  y              copy selected rows as csv
  R              reload current page

Paging
  right/n        next page
  left/p         previous page
  home/g         first page
  end/G          last page

Panels
  c              show/hide column panel
  r              show/hide rows per page panel
  1-4            toggle column (column panel)
  enter          submit rows per page
  esc            close panel / popup

  ?              this help
  q              quit";

// Fetching a page fails for one reason only as far as the UI is concerned.
// The message keeps the underlying cause for the log.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchFailure {
    pub message: String,
}

impl FetchFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fetch failed: {}", self.message)
    }
}

impl From<reqwest::Error> for FetchFailure {
    fn from(err: reqwest::Error) -> Self {
        FetchFailure::new(err.to_string())
    }
}

impl From<serde_json::Error> for FetchFailure {
    fn from(err: serde_json::Error) -> Self {
        FetchFailure::new(format!("malformed response: {err}"))
    }
}

impl From<url::ParseError> for FetchFailure {
    fn from(err: url::ParseError) -> Self {
        FetchFailure::new(format!("bad url: {err}"))
    }
}

#[derive(Debug)]
pub enum AppError {
    IoError(Error),
    Fetch(FetchFailure),
    InvalidUrl(String),
    InvalidConfig(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::IoError(e) => write!(f, "io error: {e}"),
            AppError::Fetch(e) => write!(f, "{e}"),
            AppError::InvalidUrl(u) => write!(f, "invalid api url: {u}"),
            AppError::InvalidConfig(m) => write!(f, "invalid configuration: {m}"),
        }
    }
}

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        AppError::IoError(err)
    }
}

impl From<FetchFailure> for AppError {
    fn from(err: FetchFailure) -> Self {
        AppError::Fetch(err)
    }
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct AppConfig {
    pub api_url: String,
    pub start_page: usize,
    pub rows_per_page: usize,
    pub request_timeout_secs: u64,
    pub event_poll_time: u64,
    pub max_column_width: usize,
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            start_page: 1,
            rows_per_page: 10,
            request_timeout_secs: 10,
            event_poll_time: 100,
            max_column_width: 60,
            log_file: None,
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.rows_per_page == 0 {
            return Err(AppError::InvalidConfig("rows per page must be at least 1".into()));
        }
        if self.start_page == 0 {
            return Err(AppError::InvalidConfig("pages start at 1".into()));
        }
        url::Url::parse(&self.api_url).map_err(|_| AppError::InvalidUrl(self.api_url.clone()))?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Columns,
    RowsPerPage,
}

#[derive(Debug)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    ToggleRow,
    ToggleAllRows,
    CopySelection,
    Reload,
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    // Zero based page index, as reported by the paginator
    PageChange(usize),
    TogglePanel(Panel),
    ToggleColumn(ColumnId),
    Enter,
    Exit,
    Help,
    RawKey(KeyEvent),
    Fetched(FetchOutcome),
}
