use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Style, Stylize},
    symbols::border,
    text::{Line, Span, Text},
    widgets::{Block, Cell, Clear, Paragraph, Row as TableRow, Table, TableState, Wrap},
};

use crate::domain::{AppConfig, HELP_TEXT, Panel};
use crate::model::{Model, Status};
use crate::table::ColumnId;

pub const HEADER_HEIGHT: u16 = 1;
pub const PAGINATOR_HEIGHT: u16 = 1;
pub const STATUSLINE_HEIGHT: u16 = 1;
pub const CHECKBOX_WIDTH: u16 = 3;
pub const ID_COLUMN_WIDTH: u16 = 8;
const COLUMN_PANEL_WIDTH: u16 = 22;
const ROWS_PANEL_WIDTH: u16 = 26;
const STATUS_MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);

pub struct TableUI {
    max_column_width: usize,
    table_state: TableState,
}

fn checkbox(checked: bool) -> &'static str {
    if checked { "[x]" } else { "[ ]" }
}

// Cut a cell to the column budget, marking the cut with an ellipsis
fn clip(content: String, width: usize) -> String {
    if content.chars().count() <= width || width < 3 {
        return content;
    }
    let mut reduced: String = content.chars().take(width - 1).collect();
    reduced.push('…');
    reduced
}

impl TableUI {
    pub fn new(cfg: &AppConfig) -> Self {
        Self {
            max_column_width: cfg.max_column_width,
            table_state: TableState::default(),
        }
    }

    pub fn draw(&mut self, model: &Model, frame: &mut Frame) {
        let [header, body, paginator, statusline] = Layout::vertical([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Fill(1),
            Constraint::Length(PAGINATOR_HEIGHT),
            Constraint::Length(STATUSLINE_HEIGHT),
        ])
        .areas(frame.area());

        self.render_header(model, frame, header);
        self.render_table(model, frame, body);
        self.render_paginator(model, frame, paginator);
        self.render_statusline(model, frame, statusline);

        if model.is_open(Panel::Columns) {
            self.render_column_panel(model, frame, body);
        }
        if model.is_open(Panel::RowsPerPage) {
            self.render_rows_panel(model, frame, body);
        }
        if model.show_help() {
            self.render_help(frame);
        }
    }

    fn render_header(&self, model: &Model, frame: &mut Frame, area: Rect) {
        let button = |label: &'static str, key: &'static str, open: bool| {
            let style = if open {
                Style::new().reversed()
            } else {
                Style::new().bold()
            };
            vec![
                Span::styled(format!(" {label} "), style),
                Span::from(format!("<{key}>  ")).blue(),
            ]
        };
        let mut spans = button("Hide Categories", "c", model.is_open(Panel::Columns));
        spans.extend(button(
            "Select Rows no.",
            "r",
            model.is_open(Panel::RowsPerPage),
        ));
        spans.push(Span::from(" Help ").dim());
        spans.push(Span::from("<?>").blue());
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_table(&mut self, model: &Model, frame: &mut Frame, area: Rect) {
        let columns = model.columns().visible_columns();
        let rows = model.rows();
        let selection = model.selection();

        let mut widths = vec![Constraint::Length(CHECKBOX_WIDTH)];
        widths.extend(columns.iter().map(|c| match c {
            ColumnId::Id => Constraint::Length(ID_COLUMN_WIDTH),
            _ => Constraint::Fill(1),
        }));

        let mut header_cells = vec![Cell::from(checkbox(selection.all_selected(rows)))];
        header_cells.extend(columns.iter().map(|c| Cell::from(c.header())));
        let header = TableRow::new(header_cells).style(Style::new().bold().underlined());

        let table_rows = rows.iter().map(|row| {
            let mut cells = vec![Cell::from(checkbox(selection.is_selected(row.id)))];
            cells.extend(
                columns
                    .iter()
                    .map(|c| Cell::from(clip(c.cell(row), self.max_column_width))),
            );
            let r = TableRow::new(cells);
            if selection.is_selected(row.id) {
                r.style(Style::new().yellow())
            } else {
                r
            }
        });

        let title = Line::from(" Artworks ".bold());
        let table = Table::new(table_rows, widths)
            .header(header)
            .column_spacing(1)
            .block(Block::bordered().title(title.centered()).border_set(border::PLAIN))
            .row_highlight_style(Style::new().reversed());

        if rows.is_empty() {
            self.table_state.select(None);
        } else {
            self.table_state.select(Some(model.curser_row()));
        }
        frame.render_stateful_widget(table, area, &mut self.table_state);
    }

    fn render_paginator(&self, model: &Model, frame: &mut Frame, area: Rect) {
        let page = model.page();
        let range = match page.record_range(model.rows().len()) {
            Some((first, last)) => format!("{first}-{last} of {}", page.total_records),
            None => format!("0 of {}", page.total_records),
        };
        let line = Line::from(vec![
            "« ‹ ".blue(),
            format!(" Page {}/{} ", page.current_page, page.page_count()).bold(),
            " › »".blue(),
            format!("   {range}   {} per page", page.rows_per_page).into(),
        ]);
        frame.render_widget(Paragraph::new(line).centered(), area);
    }

    fn render_statusline(&self, model: &Model, frame: &mut Frame, area: Rect) {
        let mut spans = Vec::new();
        if model.status == Status::LOADING {
            spans.push(" Loading ... ".yellow().bold());
        }
        if !model.selection().is_empty() {
            spans.push(format!(" {} selected ", model.selection().len()).green());
        }
        if model.last_status_message_update().elapsed() < STATUS_MESSAGE_TIMEOUT {
            spans.push(Span::from(format!(" {}", model.status_message())).dim());
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    // Panels hang below their header button, clipped to the table area
    fn panel_area(anchor: Rect, x_offset: u16, width: u16, height: u16) -> Rect {
        Rect::new(anchor.x + x_offset, anchor.y, width, height).intersection(anchor)
    }

    fn render_column_panel(&self, model: &Model, frame: &mut Frame, body: Rect) {
        let focused = model.focus() == Some(Panel::Columns);
        let lines: Vec<Line> = ColumnId::ALL
            .iter()
            .enumerate()
            .map(|(idx, c)| {
                let text = format!(
                    "{} {} {}",
                    idx + 1,
                    checkbox(model.columns().is_visible(*c)),
                    c.header()
                );
                if focused && idx == model.column_curser() {
                    Line::from(text).reversed()
                } else {
                    Line::from(text)
                }
            })
            .collect();

        let height = ColumnId::ALL.len() as u16 + 2;
        let area = Self::panel_area(body, 1, COLUMN_PANEL_WIDTH, height);
        let block = Block::bordered()
            .title(" Columns ")
            .border_set(if focused { border::THICK } else { border::PLAIN });
        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_rows_panel(&self, model: &Model, frame: &mut Frame, body: Rect) {
        let focused = model.focus() == Some(Panel::RowsPerPage);
        let area = Self::panel_area(body, COLUMN_PANEL_WIDTH + 2, ROWS_PANEL_WIDTH, 3);
        let label = "Rows per page: ";
        let input = &model.input().input;
        let block = Block::bordered()
            .title(" Select Rows no. ")
            .border_set(if focused { border::THICK } else { border::PLAIN });
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(Line::from(vec![label.into(), input.clone().bold()])).block(block),
            area,
        );

        if focused && area.width > 2 && area.height > 2 {
            let x = area.x + 1 + (label.len() + model.input().curser_pos) as u16;
            frame.set_cursor_position((x.min(area.right() - 2), area.y + 1));
        }
    }

    fn render_help(&self, frame: &mut Frame) {
        let outer = frame.area();
        let width = 50.min(outer.width);
        let height = (HELP_TEXT.lines().count() as u16 + 2).min(outer.height);
        let area = Rect::new(
            outer.x + (outer.width - width) / 2,
            outer.y + (outer.height - height) / 2,
            width,
            height,
        );
        let block = Block::bordered()
            .title(Line::from(" Help ".bold()).centered())
            .title_bottom(Line::from(" <esc> to close ").centered())
            .border_set(border::THICK);
        frame.render_widget(Clear, area);
        frame.render_widget(
            Paragraph::new(Text::from(HELP_TEXT))
                .wrap(Wrap { trim: false })
                .block(block),
            area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FetchFailure, Message};
    use crate::fetcher::{FetchOutcome, PageData};
    use crate::table::Row;
    use ratatui::{Terminal, backend::TestBackend};

    fn loaded() -> Model {
        let mut model = Model::init(&AppConfig::default()).unwrap();
        let request = model.take_requests().pop().unwrap();
        let rows = vec![
            Row {
                id: 27992,
                title: "A Sunday on La Grande Jatte".into(),
                place_of_origin: "France".into(),
                artist_display: "Georges Seurat".into(),
            },
            Row {
                id: 111628,
                title: "Nighthawks".into(),
                place_of_origin: "United States".into(),
                artist_display: "Edward Hopper".into(),
            },
        ];
        model
            .update(Some(Message::Fetched(FetchOutcome {
                request,
                result: Ok(PageData {
                    rows,
                    total_records: 42,
                }),
            })))
            .unwrap();
        model
    }

    fn render(model: &Model) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 20)).unwrap();
        let mut ui = TableUI::new(&AppConfig::default());
        terminal.draw(|f| ui.draw(model, f)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|line| line.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn renders_rows_and_headers() {
        let screen = render(&loaded());
        for text in ["ID", "Name", "Country", "Company", "Nighthawks", "Edward Hopper"] {
            assert!(screen.contains(text), "missing {text}");
        }
        assert!(screen.contains("Page 1/5"));
        assert!(screen.contains("1-2 of 42"));
    }

    #[test]
    fn hidden_columns_are_not_rendered() {
        let mut model = loaded();
        model.update(Some(Message::ToggleColumn(ColumnId::Country))).unwrap();
        let screen = render(&model);
        assert!(!screen.contains("Country"));
        assert!(!screen.contains("United States"));
        assert!(screen.contains("Nighthawks"));
    }

    #[test]
    fn all_columns_hidden_leaves_checkboxes() {
        let mut model = loaded();
        for c in ColumnId::ALL {
            model.update(Some(Message::ToggleColumn(c))).unwrap();
        }
        let screen = render(&model);
        assert!(!screen.contains("Nighthawks"));
        assert!(screen.contains("[ ]"));
    }

    #[test]
    fn selected_rows_show_checked_boxes() {
        let mut model = loaded();
        model.update(Some(Message::ToggleAllRows)).unwrap();
        let screen = render(&model);
        assert!(!screen.contains("[ ]"));
        assert!(screen.contains("2 selected"));
    }

    #[test]
    fn both_panels_can_be_shown() {
        let mut model = loaded();
        model.update(Some(Message::TogglePanel(Panel::Columns))).unwrap();
        model.update(Some(Message::TogglePanel(Panel::RowsPerPage))).unwrap();
        let screen = render(&model);
        assert!(screen.contains("Columns"));
        assert!(screen.contains("Rows per page: 10"));
    }

    #[test]
    fn loading_indicator_follows_requests() {
        let mut model = loaded();
        assert!(!render(&model).contains("Loading"));
        model.update(Some(Message::NextPage)).unwrap();
        assert!(render(&model).contains("Loading"));
        let request = model.take_requests().pop().unwrap();
        model
            .update(Some(Message::Fetched(FetchOutcome {
                request,
                result: Err(FetchFailure::new("timeout")),
            })))
            .unwrap();
        let screen = render(&model);
        assert!(!screen.contains("Loading"));
        assert!(screen.contains("Nighthawks"));
    }

    #[test]
    fn long_cells_are_clipped() {
        assert_eq!(clip("abcdefgh".to_string(), 5), "abcd…");
        assert_eq!(clip("abc".to_string(), 5), "abc");
    }
}
