use crate::columns::{COLUMN_COUNT, ColumnVisibility};
use crate::domain::Locale;
use crate::form::{EditForm, FormPhase};
use crate::pagination::PageWindow;
use crate::record::{EyeColor, Field, Record};
use crate::sort::{SortDirection, SortState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub field: Field,
    pub label: &'static str,
    pub hidden: bool,
    pub sort: Option<SortDirection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellContent {
    Text(String),
    Swatch(EyeColor),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyCell {
    pub field: Field,
    pub content: CellContent,
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyRow {
    pub id: String,
    pub cells: Vec<BodyCell>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterCell {
    /// 1 based, as carried by footer clicks.
    pub column: usize,
    pub hidden: bool,
    pub caption: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormInput {
    pub field: Field,
    pub label: &'static str,
    pub value: String,
    pub focused: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub phase: FormPhase,
    pub record_id: Option<String>,
    pub inputs: Vec<FormInput>,
}

/// Anything that can display the table.
///
/// The model only ever pushes complete fragments; a target never has to
/// diff or patch what it got before.
pub trait RenderTarget {
    fn render_header(&mut self, cells: &[HeaderCell]);
    fn render_body(&mut self, rows: &[BodyRow]);
    fn render_footer(&mut self, cells: &[FooterCell]);
    fn render_pagination(&mut self, window: Option<&PageWindow>);
    fn render_form(&mut self, form: &FormView);
    /// Blocking notification, e.g. a rejected save.
    fn alert(&mut self, message: &str);
}

/// Projects table state into render fragments.
#[derive(Debug, Clone, Copy)]
pub struct TableRenderer {
    locale: Locale,
}

impl TableRenderer {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn header(&self, columns: &ColumnVisibility, sort: &SortState) -> Vec<HeaderCell> {
        Field::ALL
            .into_iter()
            .map(|field| HeaderCell {
                field,
                label: self.locale.field_label(field),
                hidden: columns.is_hidden(field),
                sort: sort.direction_for(field),
            })
            .collect()
    }

    pub fn body(&self, page: &[Record], columns: &ColumnVisibility) -> Vec<BodyRow> {
        page.iter()
            .map(|record| BodyRow {
                id: record.id.clone(),
                cells: Field::ALL
                    .into_iter()
                    .map(|field| BodyCell {
                        field,
                        content: match field {
                            Field::EyeColor => CellContent::Swatch(record.eye_color),
                            _ => CellContent::Text(record.value(field).to_string()),
                        },
                        hidden: columns.is_hidden(field),
                    })
                    .collect(),
            })
            .collect()
    }

    pub fn footer(&self, columns: &ColumnVisibility) -> Vec<FooterCell> {
        (1..=COLUMN_COUNT)
            .zip(columns.flags())
            .map(|(column, hidden)| FooterCell {
                column,
                hidden,
                caption: self.locale.toggle_caption(hidden),
            })
            .collect()
    }

    pub fn form(&self, form: &EditForm) -> FormView {
        FormView {
            phase: form.phase(),
            record_id: form.bound_id().map(str::to_string),
            inputs: Field::FORM_ORDER
                .into_iter()
                .map(|field| FormInput {
                    field,
                    label: self.locale.field_label(field),
                    value: form.values().get(field).to_string(),
                    focused: form.phase() == FormPhase::Visible && form.focus() == field,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenderCounts {
    pub header: usize,
    pub body: usize,
    pub footer: usize,
    pub pagination: usize,
    pub form: usize,
}

/// Keeps the latest fragments in memory. The terminal UI draws from it.
#[derive(Debug, Default)]
pub struct ViewBuffer {
    pub header: Vec<HeaderCell>,
    pub body: Vec<BodyRow>,
    pub footer: Vec<FooterCell>,
    pub pagination: Option<PageWindow>,
    pub form: Option<FormView>,
    pub alert: Option<String>,
    pub counts: RenderCounts,
}

impl RenderTarget for ViewBuffer {
    fn render_header(&mut self, cells: &[HeaderCell]) {
        self.header = cells.to_vec();
        self.counts.header += 1;
    }

    fn render_body(&mut self, rows: &[BodyRow]) {
        self.body = rows.to_vec();
        self.counts.body += 1;
    }

    fn render_footer(&mut self, cells: &[FooterCell]) {
        self.footer = cells.to_vec();
        self.counts.footer += 1;
    }

    fn render_pagination(&mut self, window: Option<&PageWindow>) {
        self.pagination = window.cloned();
        self.counts.pagination += 1;
    }

    fn render_form(&mut self, form: &FormView) {
        self.form = Some(form.clone());
        self.counts.form += 1;
    }

    fn alert(&mut self, message: &str) {
        self.alert = Some(message.to_string());
    }
}
