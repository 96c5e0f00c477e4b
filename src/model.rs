use std::time::Instant;

use arboard::Clipboard;
use ratatui::crossterm::event::KeyEvent;
use tracing::{debug, error, info, trace};

use crate::domain::{AppConfig, AppError, Message, Panel};
use crate::fetcher::{FetchOutcome, FetchRequest};
use crate::inputter::{InputResult, Inputter};
use crate::paginator::PageState;
use crate::table::{ColumnId, ColumnVisibility, Row, SelectionSet};

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    LOADING,
    QUITTING,
}

pub struct Model {
    pub status: Status,
    page: PageState,
    rows: Vec<Row>,
    columns: ColumnVisibility,
    selection: SelectionSet,
    curser_row: usize,
    column_curser: usize,
    // Open panels in the order they were opened, the last one has the key focus
    panels: Vec<Panel>,
    input: Inputter,
    last_input: InputResult,
    show_help: bool,
    latest_seq: u64,
    outbox: Vec<FetchRequest>,
    clipboard: Option<Clipboard>,
    status_message: String,
    last_status_message_update: Instant,
}

impl Model {
    pub fn init(config: &AppConfig) -> Result<Self, AppError> {
        config.validate()?;
        let mut model = Self {
            status: Status::READY,
            page: PageState::new(config.start_page, config.rows_per_page),
            rows: Vec::new(),
            columns: ColumnVisibility::default(),
            selection: SelectionSet::default(),
            curser_row: 0,
            column_curser: 0,
            panels: Vec::new(),
            input: Inputter::default(),
            last_input: InputResult::default(),
            show_help: false,
            latest_seq: 0,
            outbox: Vec::new(),
            clipboard: None,
            status_message: "Started artable!".to_string(),
            last_status_message_update: Instant::now(),
        };
        model.request_fetch();
        Ok(model)
    }

    // ------------------------- Accessors for the UI ------------------------ //

    pub fn page(&self) -> &PageState {
        &self.page
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn columns(&self) -> &ColumnVisibility {
        &self.columns
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn curser_row(&self) -> usize {
        self.curser_row
    }

    pub fn column_curser(&self) -> usize {
        self.column_curser
    }

    pub fn is_open(&self, panel: Panel) -> bool {
        self.panels.contains(&panel)
    }

    pub fn focus(&self) -> Option<Panel> {
        self.panels.last().copied()
    }

    pub fn input(&self) -> &InputResult {
        &self.last_input
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn last_status_message_update(&self) -> Instant {
        self.last_status_message_update
    }

    // The rows per page input takes the keys while it has the focus, see Controller::handle_raw_key
    pub fn raw_keyevents(&self) -> bool {
        !self.show_help && self.focus() == Some(Panel::RowsPerPage)
    }

    // Requests issued since the last call, to be handed to the fetcher
    pub fn take_requests(&mut self) -> Vec<FetchRequest> {
        std::mem::take(&mut self.outbox)
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.last_status_message_update = Instant::now();
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), AppError> {
        let Some(msg) = message else {
            return Ok(());
        };

        match msg {
            Message::Fetched(outcome) => {
                self.apply_outcome(outcome);
                return Ok(());
            }
            Message::Quit => {
                self.quit();
                return Ok(());
            }
            _ => {}
        }

        if self.show_help {
            if matches!(msg, Message::Exit | Message::Help | Message::Enter) {
                self.show_help = false;
            }
            return Ok(());
        }

        match self.focus() {
            Some(Panel::RowsPerPage) => match msg {
                Message::RawKey(key) => self.raw_input(key),
                Message::TogglePanel(panel) => self.toggle_panel(panel),
                _ => (),
            },
            Some(Panel::Columns) => match msg {
                Message::MoveUp => {
                    self.column_curser = self.column_curser.saturating_sub(1);
                }
                Message::MoveDown => {
                    self.column_curser = (self.column_curser + 1).min(ColumnId::ALL.len() - 1);
                }
                Message::ToggleRow | Message::Enter => {
                    if let Some(column) = ColumnId::from_index(self.column_curser) {
                        self.columns.toggle(column);
                    }
                }
                Message::Exit => self.close_panel(Panel::Columns),
                other => self.update_table(other),
            },
            None => self.update_table(msg),
        }
        Ok(())
    }

    fn update_table(&mut self, msg: Message) {
        match msg {
            Message::MoveUp => self.curser_row = self.curser_row.saturating_sub(1),
            Message::MoveDown => {
                self.curser_row = (self.curser_row + 1).min(self.rows.len().saturating_sub(1))
            }
            Message::ToggleRow => self.toggle_curser_row(),
            Message::ToggleAllRows => self.selection.toggle_all(&self.rows),
            Message::CopySelection => self.copy_selection(),
            Message::Reload => self.request_fetch(),
            Message::NextPage => self.go_to_page(self.page.next_index()),
            Message::PrevPage => self.go_to_page(self.page.prev_index()),
            Message::FirstPage => self.go_to_page(self.page.first_index()),
            Message::LastPage => self.go_to_page(self.page.last_index()),
            Message::PageChange(idx) => self.go_to_page(idx),
            Message::ToggleColumn(column) => self.columns.toggle(column),
            Message::TogglePanel(panel) => self.toggle_panel(panel),
            Message::Help => self.show_help = true,
            Message::Exit => {
                if let Some(panel) = self.focus() {
                    self.close_panel(panel);
                }
            }
            _ => (),
        }
    }

    // -------------------------- Paging and fetching ------------------------ //

    fn request_fetch(&mut self) {
        self.latest_seq += 1;
        let (page, rows) = self.page.window();
        let request = FetchRequest {
            seq: self.latest_seq,
            page,
            rows,
        };
        trace!("Queued {:?}", request);
        self.outbox.push(request);
        self.status = Status::LOADING;
    }

    fn go_to_page(&mut self, zero_based: usize) {
        if zero_based == self.page.page_index() {
            return;
        }
        self.page.on_page_change(zero_based);
        self.request_fetch();
    }

    fn submit_rows_per_page(&mut self, raw: &str) -> bool {
        let before = self.page.window();
        if !self.page.on_rows_per_page_input(raw) {
            return false;
        }
        if self.page.window() != before {
            self.request_fetch();
        }
        true
    }

    fn apply_outcome(&mut self, outcome: FetchOutcome) {
        let FetchOutcome { request, result } = outcome;
        if request.seq != self.latest_seq {
            debug!(
                "Discarding stale response #{} (latest is #{})",
                request.seq, self.latest_seq
            );
            return;
        }

        self.status = Status::READY;
        match result {
            Ok(data) => {
                self.rows = data.rows;
                self.page.total_records = data.total_records;
                self.selection.clear();
                self.curser_row = 0;
                info!(
                    "Showing page {} ({} rows, {} records in total)",
                    request.page,
                    self.rows.len(),
                    self.page.total_records
                );
                self.set_status_message(format!(
                    "Page {} of {}",
                    self.page.current_page,
                    self.page.page_count()
                ));
            }
            // Already reported by the fetcher, the current table stays as it is
            Err(e) => trace!("Keeping previous page after failure: {e}"),
        }
    }

    // ------------------------------- Panels -------------------------------- //

    fn toggle_panel(&mut self, panel: Panel) {
        if self.is_open(panel) {
            self.close_panel(panel);
        } else {
            if panel == Panel::RowsPerPage {
                self.input.set(&self.page.rows_per_page.to_string());
                self.last_input = self.input.get();
            }
            self.panels.push(panel);
            trace!("Opened panel {:?}", panel);
        }
    }

    fn close_panel(&mut self, panel: Panel) {
        self.panels.retain(|p| *p != panel);
        if panel == Panel::RowsPerPage {
            self.input.clear();
            self.last_input = self.input.get();
        }
        trace!("Closed panel {:?}", panel);
    }

    fn raw_input(&mut self, key: KeyEvent) {
        self.last_input = self.input.read(key);
        if !self.last_input.finished {
            return;
        }
        if self.last_input.canceled {
            self.close_panel(Panel::RowsPerPage);
            return;
        }

        let raw = self.last_input.input.clone();
        if self.submit_rows_per_page(&raw) {
            self.close_panel(Panel::RowsPerPage);
        } else {
            // Rejected, show the value that is still in effect
            self.input.set(&self.page.rows_per_page.to_string());
            self.last_input = self.input.get();
        }
    }

    // ------------------------------ Selection ------------------------------ //

    fn toggle_curser_row(&mut self) {
        if let Some(row) = self.rows.get(self.curser_row) {
            self.selection.toggle(row.id);
        }
    }

    fn wrap_cell_content(c: &str) -> String {
        let needs_escaping = c.contains('"');
        let needs_wrapping = c.chars().any(|c| c == ' ' || c == '\t' || c == ',' || c == '\n');
        let mut out = String::from(c);

        if needs_escaping {
            out = out.replace('"', "\"\"");
        }
        if needs_escaping || needs_wrapping {
            out = format!("\"{out}\"");
        }
        out
    }

    // Selected rows as csv together with the number of exported rows, or the row under
    // the curser when nothing is selected.
    // Only visible columns are exported, unless all of them are hidden.
    pub fn selection_as_csv(&self) -> Option<(usize, String)> {
        let rows: Vec<&Row> = if self.selection.is_empty() {
            self.rows.get(self.curser_row).into_iter().collect()
        } else {
            self.selection.selected_rows(&self.rows)
        };
        if rows.is_empty() {
            return None;
        }

        let mut columns = self.columns.visible_columns();
        if columns.is_empty() {
            columns = ColumnId::ALL.to_vec();
        }

        let nrows = rows.len();
        let mut lines = Vec::with_capacity(nrows + 1);
        lines.push(
            columns
                .iter()
                .map(|c| c.header())
                .collect::<Vec<_>>()
                .join(","),
        );
        for row in rows {
            lines.push(
                columns
                    .iter()
                    .map(|c| Self::wrap_cell_content(&c.cell(row)))
                    .collect::<Vec<_>>()
                    .join(","),
            );
        }
        Some((nrows, lines.join("\n")))
    }

    fn copy_selection(&mut self) {
        let Some((nrows, content)) = self.selection_as_csv() else {
            return;
        };

        if self.clipboard.is_none() {
            match Clipboard::new() {
                Ok(cb) => self.clipboard = Some(cb),
                Err(e) => {
                    error!("Clipboard not available: {e:?}");
                    self.set_status_message("Clipboard not available!");
                    return;
                }
            }
        }
        if let Some(clipboard) = self.clipboard.as_mut() {
            match clipboard.set_text(content) {
                Ok(_) => {
                    trace!("Copied {nrows} rows to clipboard.");
                    self.set_status_message(format!("Copied {nrows} rows"));
                }
                Err(e) => error!("Error copying to clipboard: {:?}", e),
            }
        }
    }
}
