use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Style, Stylize},
    symbols::border,
    text::{Line, Span, Text},
    widgets::{Block, Cell, Clear, Paragraph, Row, Table, TableState, Wrap},
};

use crate::form::FormPhase;
use crate::model::{Model, Modus};
use crate::pagination::{PageTarget, PageWindow};
use crate::record::{EyeColor, Field};
use crate::render::{CellContent, FormView, ViewBuffer};
use crate::sort::SortDirection;

pub const COLUMN_WIDTH_COLLAPSED_COLUMN: u16 = 3;
pub const COLUMN_WIDTH_EYE_COLOR: u16 = 11;
pub const FORM_WIDTH: u16 = 64;
pub const POPUP_WIDTH: u16 = 66;
pub const STATUS_MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);
const COLLAPSED: &str = "⋮";
const SWATCH: &str = "■■■";

#[derive(Debug)]
pub struct TableUI {
    name: String,
}

impl TableUI {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn draw(&self, model: &Model<ViewBuffer>, frame: &mut Frame<'_>) {
        let [title_area, table_area, pagination_area, status_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        let view = model.target();
        frame.render_widget(
            Line::from(format!(" {} ", self.name).bold()).centered(),
            title_area,
        );
        self.draw_table(model, frame, table_area);
        let pagination = Self::pagination_line(view.pagination.as_ref());
        frame.render_widget(pagination, pagination_area);

        let status = if model.last_status_message_update().elapsed() < STATUS_MESSAGE_TIMEOUT {
            model.status_message()
        } else {
            ""
        };
        let (current, pages) = (model.current_page(), model.number_of_pages());
        let page = format!(" page {current}/{pages} ");
        frame.render_widget(
            Line::from(vec![
                format!(" {status} ").into(),
                page.dark_gray(),
                " ? help ".dark_gray(),
            ]),
            status_area,
        );

        if let Some(form) = view.form.as_ref()
            && form.phase != FormPhase::Hidden
        {
            self.draw_form(model, form, frame, table_area);
        }
        if model.modus() == Modus::Popup {
            Self::draw_popup(model.popup_message(), frame);
        }
    }

    fn draw_table(&self, model: &Model<ViewBuffer>, frame: &mut Frame<'_>, area: Rect) {
        let view = model.target();

        let widths = view.header.iter().map(|cell| {
            if cell.hidden {
                Constraint::Length(COLUMN_WIDTH_COLLAPSED_COLUMN)
            } else {
                match cell.field {
                    Field::About => Constraint::Fill(3),
                    Field::EyeColor => Constraint::Length(COLUMN_WIDTH_EYE_COLOR),
                    _ => Constraint::Fill(1),
                }
            }
        });

        let header = Row::new(view.header.iter().map(|cell| {
            if cell.hidden {
                return Cell::from(COLLAPSED.dark_gray());
            }
            let arrow = match cell.sort {
                Some(SortDirection::Ascending) => " ▲",
                Some(SortDirection::Descending) => " ▼",
                None => "",
            };
            let label = Span::from(format!("{}{}", cell.label, arrow)).bold();
            if cell.sort.is_some() {
                Cell::from(label.yellow())
            } else {
                Cell::from(label)
            }
        }));

        let rows = view.body.iter().map(|row| {
            Row::new(row.cells.iter().map(|cell| {
                if cell.hidden {
                    return Cell::from(COLLAPSED.dark_gray());
                }
                match &cell.content {
                    CellContent::Text(text) => Cell::from(text.as_str()),
                    CellContent::Swatch(color) => {
                        Cell::from(Span::styled(SWATCH, Style::new().fg(swatch_color(*color))))
                    }
                }
            }))
        });

        let footer = Row::new(view.footer.iter().map(|cell| {
            let caption = Span::from(cell.caption);
            if cell.hidden {
                Cell::from(caption.reversed())
            } else {
                Cell::from(caption.dark_gray())
            }
        }));

        let table = Table::new(rows, widths)
            .header(header)
            .footer(footer)
            .column_spacing(1)
            .row_highlight_style(Style::new().bg(Color::DarkGray))
            .cell_highlight_style(Style::new().reversed())
            .block(Block::bordered().border_set(border::PLAIN));

        let (row, column) = model.cursor();
        let mut state = TableState::default()
            .with_selected(Some(row))
            .with_selected_column(Some(column));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn pagination_line(window: Option<&PageWindow>) -> Line<'static> {
        let Some(window) = window else {
            return Line::default();
        };
        let arrow = |target: &PageTarget, symbol: &'static str| {
            if target.disabled {
                symbol.dark_gray()
            } else {
                symbol.bold()
            }
        };
        let mut spans = vec![arrow(&window.previous, " ‹ ")];
        for link in window.pages.iter() {
            let text = format!(" {} ", link.number);
            if link.active {
                spans.push(text.reversed());
            } else {
                spans.push(text.into());
            }
        }
        spans.push(arrow(&window.next, " › "));
        Line::from(spans).centered()
    }

    fn draw_form(
        &self,
        model: &Model<ViewBuffer>,
        form: &FormView,
        frame: &mut Frame<'_>,
        area: Rect,
    ) {
        let height = form.inputs.len() as u16 + 4;
        let area = centered_rect(area, FORM_WIDTH, height);
        let label_width = form
            .inputs
            .iter()
            .map(|i| i.label.chars().count())
            .max()
            .unwrap_or(0);

        let border_style = match form.phase {
            FormPhase::Visible => Style::new().yellow(),
            _ => Style::new().dark_gray(),
        };
        let block = Block::bordered()
            .title(Line::from(" Edit record ".bold()).centered())
            .title_bottom(Line::from(" <Enter> save  <Esc> close ").centered())
            .border_set(border::THICK)
            .border_style(border_style);

        let lines: Vec<Line<'_>> = form
            .inputs
            .iter()
            .map(|input| {
                let label = format!("{:<label_width$}: ", input.label);
                let value = if input.focused {
                    input.value.as_str().underlined()
                } else {
                    input.value.as_str().into()
                };
                Line::from(vec![label.dark_gray(), value])
            })
            .collect();

        let inner = block.inner(area);
        frame.render_widget(Clear, area);
        frame.render_widget(Paragraph::new(Text::from(lines)).block(block), area);

        if form.phase == FormPhase::Visible
            && let Some(idx) = form.inputs.iter().position(|i| i.focused)
        {
            // Long values push the cursor past the border; pin it to the last column.
            let offset = label_width + 2 + model.input_cursor();
            let column = u16::try_from(offset).unwrap_or(u16::MAX);
            let right = inner.right().saturating_sub(1);
            let x = inner.x.saturating_add(column).min(right);
            let y = inner.y.saturating_add(idx as u16);
            frame.set_cursor_position((x, y));
        }
    }

    fn draw_popup(message: &str, frame: &mut Frame<'_>) {
        let height = message.lines().count() as u16 + 2;
        let area = centered_rect(frame.area(), POPUP_WIDTH, height);
        let block = Block::bordered()
            .title_bottom(Line::from(" <Esc> ").centered())
            .border_set(border::THICK);
        let wrap = Wrap { trim: false };
        let popup = Paragraph::new(message).wrap(wrap).block(block);
        frame.render_widget(Clear, area);
        frame.render_widget(popup, area);
    }
}

fn swatch_color(color: EyeColor) -> Color {
    match color {
        EyeColor::Blue => Color::Blue,
        EyeColor::Red => Color::Red,
        EyeColor::Brown => Color::Rgb(139, 69, 19),
        EyeColor::Green => Color::Green,
    }
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let [area] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    area
}
