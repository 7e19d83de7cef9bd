use std::time::{Duration, Instant};

use ratatui::crossterm::event::KeyEvent;
use tracing::{debug, info, trace, warn};

use crate::columns::{COLUMN_COUNT, ColumnVisibility};
use crate::domain::{HELP_TEXT, Message, PTError, TableConfig};
use crate::form::{EditForm, FormPhase, FormTimer, SaveOutcome};
use crate::inputter::Inputter;
use crate::pagination::{PageTarget, PageWindow, clamp_page, page_bounds, page_count, page_window};
use crate::record::{Field, Record, find_record};
use crate::render::{RenderTarget, TableRenderer};
use crate::scheduler::Scheduler;
use crate::sort::{SortState, apply_sort};

#[derive(Debug, PartialEq)]
pub enum Status {
    Ready,
    Quitting,
}

/// Which part of the UI receives key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modus {
    Table,
    Form,
    Popup,
}

/// Application state of one table.
///
/// Every user action ends up in `update`, which mutates the state and pushes
/// the affected fragments into the render target.
pub struct Model<T: RenderTarget> {
    config: TableConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    records: Vec<Record>,
    current_page: usize,
    sort: SortState,
    columns: ColumnVisibility,
    form: EditForm,
    scheduler: Scheduler<FormTimer>,
    renderer: TableRenderer,
    target: T,
    cursor_row: usize,
    cursor_column: usize,
    input: Inputter,
    popup_message: String,
    status_message: String,
    last_status_message_update: Instant,
}

impl<T: RenderTarget> Model<T> {
    pub fn new(config: &TableConfig, records: Vec<Record>, target: T) -> Self {
        let mut model = Self {
            config: config.clone(),
            status: Status::Ready,
            modus: Modus::Table,
            previous_modus: Modus::Table,
            records,
            current_page: 1,
            sort: SortState::default(),
            columns: ColumnVisibility::default(),
            form: EditForm::new(config.fade_in, config.fade_out),
            scheduler: Scheduler::new(),
            renderer: TableRenderer::new(config.locale),
            target,
            cursor_row: 0,
            cursor_column: 0,
            input: Inputter::default(),
            popup_message: String::new(),
            status_message: String::new(),
            last_status_message_update: Instant::now(),
        };
        model.render_all();
        model.set_status_message(format!("{} records", model.records.len()));
        model
    }

    // -------------------- Accessors ---------------------- //

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn number_of_pages(&self) -> usize {
        page_count(self.records.len(), self.config.page_size).max(1)
    }

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    pub fn columns(&self) -> &ColumnVisibility {
        &self.columns
    }

    pub fn form(&self) -> &EditForm {
        &self.form
    }

    pub fn modus(&self) -> Modus {
        self.modus
    }

    /// Cursor as (row within the page, column).
    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor_row, self.cursor_column)
    }

    pub fn input_cursor(&self) -> usize {
        self.input.cursor_pos()
    }

    pub fn popup_message(&self) -> &str {
        &self.popup_message
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn last_status_message_update(&self) -> Instant {
        self.last_status_message_update
    }

    pub fn page_records(&self) -> &[Record] {
        &self.records[page_bounds(self.records.len(), self.config.page_size, self.current_page)]
    }

    pub fn page_window(&self) -> Option<PageWindow> {
        page_window(
            self.records.len(),
            self.config.page_size,
            self.current_page,
            self.config.window_size,
        )
    }

    pub fn quit(&mut self) {
        self.status = Status::Quitting;
    }

    // -------------------- Update entry points ---------------------- //

    pub fn update(&mut self, message: Message) -> Result<(), PTError> {
        trace!("Update: Modus {:?}, Message {:?}", self.modus, message);
        match message {
            Message::Quit => self.quit(),
            Message::Exit => self.exit(),
            Message::Help => self.show_help(),
            Message::MoveUp => self.move_cursor_row(-1),
            Message::MoveDown => self.move_cursor_row(1),
            Message::MoveLeft => self.move_cursor_column(-1),
            Message::MoveRight => self.move_cursor_column(1),
            Message::PreviousPage => {
                if let Some(window) = self.page_window() {
                    self.page_click(window.previous);
                }
            }
            Message::NextPage => {
                if let Some(window) = self.page_window() {
                    self.page_click(window.next);
                }
            }
            Message::JumpToPageSlot(slot) => {
                let target = self
                    .page_window()
                    .and_then(|w| slot.checked_sub(1).and_then(|idx| w.slot(idx)));
                self.page_click(target.unwrap_or_default());
            }
            Message::SortColumn => self.header_click(Field::from_column(self.cursor_column)),
            Message::ToggleColumn => self.footer_click(Some(self.cursor_column + 1)),
            Message::EditCell => {
                let row = self
                    .page_records()
                    .get(self.cursor_row)
                    .map(|r| r.id.clone());
                self.body_click(row, Field::from_column(self.cursor_column));
            }
            Message::NextInput => self.move_input_focus(true),
            Message::PreviousInput => self.move_input_focus(false),
            Message::RawKey(key) => self.raw_input(key),
            Message::BodyClick { row, cell } => self.body_click(row, cell),
            Message::PageClick(target) => self.page_click(target),
            Message::HeaderClick(field) => self.header_click(field),
            Message::FooterClick(column) => self.footer_click(column),
            Message::CloseForm => self.close_form(),
            Message::SaveForm => self.save_form(),
        }
        Ok(())
    }

    /// Feeds elapsed wall time to the form transitions.
    pub fn advance(&mut self, elapsed: Duration) {
        let until = self.scheduler.now() + elapsed;
        while let Some(timer) = self.scheduler.pop_due(until) {
            if self.form.on_timer(timer, &mut self.scheduler) {
                if self.form.phase() == FormPhase::Visible {
                    self.input.load(self.form.values().get(self.form.focus()));
                }
                self.render_form();
            }
        }
        self.scheduler.settle(until);
    }

    // -------------------- Click handlers ---------------------- //

    fn page_click(&mut self, target: PageTarget) {
        match target {
            PageTarget {
                page: Some(page),
                disabled: false,
            } => self.change_page(page),
            _ => trace!("Ignoring pagination click on {:?}", target),
        }
    }

    fn header_click(&mut self, field: Option<Field>) {
        let Some(field) = field else {
            trace!("Ignoring header click without a field");
            return;
        };
        if self.columns.is_hidden(field) {
            trace!("Ignoring sort on hidden column {}", field.id());
            return;
        }
        let direction = self.sort.activate(field);
        apply_sort(&mut self.records, field, direction);
        info!("Sorted by {} {}", field.id(), direction.as_str());
        self.render_header();
        self.change_page(1);
        self.set_status_message(format!(
            "Sorted by {} ({})",
            self.renderer.locale().field_label(field),
            direction.as_str()
        ));
    }

    fn footer_click(&mut self, column: Option<usize>) {
        let Some(hidden) = column.and_then(|c| self.columns.toggle_column(c)) else {
            trace!("Ignoring footer click on {:?}", column);
            return;
        };
        debug!("Column {:?} hidden: {}", column, hidden);
        self.render_header();
        self.render_body();
        self.render_footer();
    }

    fn body_click(&mut self, row: Option<String>, cell: Option<Field>) {
        let Some(id) = row else {
            trace!("Ignoring body click outside of a row");
            return;
        };
        let focus = cell.unwrap_or(Field::FirstName);
        let record = find_record(&self.records, &id);
        self.form.open(record, focus, &mut self.scheduler);
        self.modus = Modus::Form;
        self.render_form();
    }

    fn close_form(&mut self) {
        if self.form.close(&mut self.scheduler) {
            self.render_form();
        }
        if self.modus == Modus::Form {
            self.modus = Modus::Table;
        }
    }

    fn save_form(&mut self) {
        match self.form.save(&mut self.records, &mut self.scheduler) {
            Ok(SaveOutcome::Saved(id)) => {
                self.render_body();
                self.render_form();
                self.modus = Modus::Table;
                self.set_status_message(format!("Saved {id}"));
            }
            Ok(SaveOutcome::Ignored) => {}
            Err(err) => {
                warn!("Rejected edit: {err}");
                let message = self.renderer.locale().validation_message(&err);
                self.target.alert(message);
                self.show_popup(message.to_string());
                // Put the input cursor on the offending field.
                while self.form.focus() != err.field() {
                    self.form.cycle_focus(true);
                }
                self.input.load(self.form.values().get(err.field()));
                self.render_form();
            }
        }
    }

    fn change_page(&mut self, page: usize) {
        self.close_form();
        self.current_page = clamp_page(page, self.records.len(), self.config.page_size);
        self.cursor_row = self
            .cursor_row
            .min(self.page_records().len().saturating_sub(1));
        debug!("Page {}/{}", self.current_page, self.number_of_pages());
        self.render_body();
        self.render_pagination();
    }

    // -------------------- Keyboard helpers ---------------------- //

    fn move_cursor_row(&mut self, step: isize) {
        let rows = self.page_records().len();
        if rows > 0 {
            self.cursor_row = self.cursor_row.saturating_add_signed(step).min(rows - 1);
        }
    }

    fn move_cursor_column(&mut self, step: isize) {
        self.cursor_column = self
            .cursor_column
            .saturating_add_signed(step)
            .min(COLUMN_COUNT - 1);
    }

    fn move_input_focus(&mut self, forward: bool) {
        if self.form.phase() != FormPhase::Visible {
            return;
        }
        let field = self.form.cycle_focus(forward);
        self.input.load(self.form.values().get(field));
        self.render_form();
    }

    fn raw_input(&mut self, key: KeyEvent) {
        if self.form.phase() != FormPhase::Visible {
            return;
        }
        let result = self.input.read(key);
        if result.changed {
            self.form.set_value(self.form.focus(), result.input);
            self.render_form();
        }
    }

    fn show_help(&mut self) {
        self.show_popup(HELP_TEXT.to_string());
    }

    fn show_popup(&mut self, message: String) {
        if self.modus != Modus::Popup {
            self.previous_modus = self.modus;
        }
        self.modus = Modus::Popup;
        self.popup_message = message;
    }

    fn exit(&mut self) {
        match self.modus {
            Modus::Popup => {
                trace!("Close popup ...");
                self.modus = self.previous_modus;
                self.previous_modus = Modus::Popup;
                self.popup_message.clear();
            }
            Modus::Form => self.close_form(),
            Modus::Table => {}
        }
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.last_status_message_update = Instant::now();
    }

    // -------------------- Rendering ---------------------- //

    fn render_all(&mut self) {
        self.render_header();
        self.render_body();
        self.render_footer();
        self.render_pagination();
        self.render_form();
    }

    fn render_header(&mut self) {
        let cells = self.renderer.header(&self.columns, &self.sort);
        self.target.render_header(&cells);
    }

    fn render_body(&mut self) {
        let rows = self.renderer.body(self.page_records(), &self.columns);
        self.target.render_body(&rows);
    }

    fn render_footer(&mut self) {
        let cells = self.renderer.footer(&self.columns);
        self.target.render_footer(&cells);
    }

    fn render_pagination(&mut self) {
        let window = self.page_window();
        self.target.render_pagination(window.as_ref());
    }

    fn render_form(&mut self) {
        let view = self.renderer.form(&self.form);
        self.target.render_form(&view);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Locale;
    use crate::record::EyeColor;
    use crate::record::tests::people;
    use crate::render::{CellContent, ViewBuffer};
    use crate::sort::SortDirection;
    use ratatui::crossterm::event::{KeyCode, KeyModifiers};

    fn model() -> Model<ViewBuffer> {
        Model::new(&TableConfig::default(), people(), ViewBuffer::default())
    }

    fn send(model: &mut Model<ViewBuffer>, message: Message) {
        model.update(message).unwrap();
    }

    fn ids(model: &Model<ViewBuffer>) -> Vec<String> {
        model.records().iter().map(|r| r.id.clone()).collect()
    }

    fn settle(model: &mut Model<ViewBuffer>) {
        model.advance(Duration::from_secs(2));
    }

    fn open_first_row(model: &mut Model<ViewBuffer>, cell: Option<Field>) -> String {
        let id = model.target().body[0].id.clone();
        let row = Some(id.clone());
        send(model, Message::BodyClick { row, cell });
        settle(model);
        id
    }

    fn type_into(model: &mut Model<ViewBuffer>, text: &str) {
        let clear = KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL);
        send(model, Message::RawKey(clear));
        for c in text.chars() {
            let key = KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
            send(model, Message::RawKey(key));
        }
    }

    #[test]
    fn initial_render_fills_every_fragment() {
        let model = model();
        let view = model.target();
        assert_eq!(view.header.len(), 4);
        assert_eq!(view.body.len(), 10);
        assert_eq!(view.footer.len(), 4);
        assert_eq!(view.pagination.as_ref().unwrap().numbers(), vec![1, 2, 3]);
        assert_eq!(view.form.as_ref().unwrap().phase, FormPhase::Hidden);
    }

    #[test]
    fn last_page_shows_the_remaining_three_records() {
        let mut model = model();
        send(&mut model, Message::PageClick(PageTarget::page(3)));
        assert_eq!(model.current_page(), 3);
        let view = model.target();
        assert_eq!(view.body.len(), 3);
        assert_eq!(view.body[0].id, model.records()[20].id);
        let window = view.pagination.as_ref().unwrap();
        assert!(window.next.disabled);
        assert!(!window.previous.disabled);

        // The disabled next arrow does nothing.
        send(&mut model, Message::NextPage);
        assert_eq!(model.current_page(), 3);
        send(&mut model, Message::PreviousPage);
        assert_eq!(model.current_page(), 2);
    }

    #[test]
    fn malformed_pagination_clicks_are_ignored() {
        let mut model = model();
        let before = model.target().counts;
        send(&mut model, Message::PageClick(PageTarget::default()));
        let disabled = PageTarget {
            page: Some(2),
            disabled: true,
        };
        send(&mut model, Message::PageClick(disabled));
        send(&mut model, Message::JumpToPageSlot(9));
        assert_eq!(model.current_page(), 1);
        assert_eq!(model.target().counts, before);
    }

    #[test]
    fn out_of_range_pages_are_clamped() {
        let mut model = model();
        send(&mut model, Message::PageClick(PageTarget::page(42)));
        assert_eq!(model.current_page(), 3);
    }

    #[test]
    fn sorting_twice_reverses_and_returns_to_first_page() {
        let mut model = model();
        send(&mut model, Message::PageClick(PageTarget::page(2)));
        send(&mut model, Message::HeaderClick(Some(Field::About)));
        assert_eq!(model.current_page(), 1);
        assert_eq!(model.sort().direction(), Some(SortDirection::Ascending));
        let ascending = ids(&model);

        send(&mut model, Message::HeaderClick(Some(Field::About)));
        assert_eq!(model.sort().direction(), Some(SortDirection::Descending));
        let mut descending = ids(&model);
        descending.reverse();
        assert_eq!(ascending, descending);
        let about = &model.target().header[2];
        assert_eq!(about.sort, Some(SortDirection::Descending));
    }

    #[test]
    fn sorting_a_hidden_column_is_a_no_op() {
        let mut model = model();
        send(&mut model, Message::FooterClick(Some(3)));
        let records = model.records().to_vec();
        let counts = model.target().counts;

        send(&mut model, Message::HeaderClick(Some(Field::About)));
        assert_eq!(model.sort().field(), None);
        assert_eq!(model.records(), records.as_slice());
        assert_eq!(model.target().counts, counts);
    }

    #[test]
    fn toggling_a_column_twice_restores_the_view() {
        let mut model = model();
        let header = model.target().header.clone();
        let footer = model.target().footer.clone();

        send(&mut model, Message::FooterClick(Some(2)));
        assert!(model.target().body.iter().all(|r| r.cells[1].hidden));
        assert_eq!(model.target().footer[1].caption, "+");

        send(&mut model, Message::FooterClick(Some(2)));
        assert_eq!(model.target().header, header);
        assert_eq!(model.target().footer, footer);
        assert!(model.target().body.iter().all(|r| !r.cells[1].hidden));
    }

    #[test]
    fn page_change_rerenders_body_and_pagination() {
        let mut model = model();
        let before = model.target().counts;

        send(&mut model, Message::PageClick(PageTarget::page(2)));
        let after = model.target().counts;
        assert_eq!(after.body, before.body + 1);
        assert_eq!(after.pagination, before.pagination + 1);
        assert_eq!(after.header, before.header);
        assert_eq!(after.footer, before.footer);
        assert_eq!(after.form, before.form);
    }

    #[test]
    fn toggling_a_column_rerenders_header_body_and_footer() {
        let mut model = model();
        let before = model.target().counts;

        send(&mut model, Message::FooterClick(Some(4)));
        let after = model.target().counts;
        assert_eq!(after.header, before.header + 1);
        assert_eq!(after.body, before.body + 1);
        assert_eq!(after.footer, before.footer + 1);
        assert_eq!(after.pagination, before.pagination);
        assert_eq!(after.form, before.form);
    }

    #[test]
    fn sorting_rerenders_header_body_and_pagination() {
        let mut model = model();
        let before = model.target().counts;

        send(&mut model, Message::HeaderClick(Some(Field::FirstName)));
        let after = model.target().counts;
        assert_eq!(after.header, before.header + 1);
        assert_eq!(after.body, before.body + 1);
        assert_eq!(after.pagination, before.pagination + 1);
        assert_eq!(after.footer, before.footer);
        assert_eq!(after.form, before.form);
    }

    #[test]
    fn row_click_focuses_first_field_and_cell_click_its_own() {
        let mut model = model();
        open_first_row(&mut model, None);
        assert_eq!(model.form().focus(), Field::FirstName);
        assert_eq!(model.modus(), Modus::Form);

        send(&mut model, Message::CloseForm);
        settle(&mut model);
        open_first_row(&mut model, Some(Field::About));
        assert_eq!(model.form().focus(), Field::About);
        let view = model.target().form.as_ref().unwrap();
        let focused: Vec<Field> = view
            .inputs
            .iter()
            .filter(|i| i.focused)
            .map(|i| i.field)
            .collect();
        assert_eq!(focused, vec![Field::About]);
    }

    #[test]
    fn body_click_without_row_is_ignored() {
        let mut model = model();
        let cell = Some(Field::About);
        send(&mut model, Message::BodyClick { row: None, cell });
        assert_eq!(model.form().phase(), FormPhase::Hidden);
        assert_eq!(model.modus(), Modus::Table);
    }

    #[test]
    fn saving_rerenders_only_the_body() {
        let mut model = model();
        let id = open_first_row(&mut model, Some(Field::About));
        type_into(&mut model, "Edited in place");
        let before = model.target().counts;

        send(&mut model, Message::SaveForm);
        let after = model.target().counts;
        assert_eq!(after.body, before.body + 1);
        assert_eq!(after.header, before.header);
        assert_eq!(after.footer, before.footer);
        assert_eq!(after.pagination, before.pagination);

        let record = find_record(model.records(), &id);
        assert_eq!(record.about, "Edited in place");
        assert_eq!(model.form().phase(), FormPhase::Closing);
        settle(&mut model);
        assert_eq!(model.form().phase(), FormPhase::Hidden);
    }

    #[test]
    fn purple_eyes_raise_an_alert_and_keep_the_form_open() {
        let mut model = model();
        let id = open_first_row(&mut model, Some(Field::EyeColor));
        type_into(&mut model, "purple");
        let records = model.records().to_vec();

        send(&mut model, Message::SaveForm);
        let alert = model.target().alert.as_deref();
        assert_eq!(alert, Some("cannot add this eye color"));
        assert_eq!(model.modus(), Modus::Popup);
        assert_eq!(model.form().phase(), FormPhase::Visible);
        assert_eq!(model.records(), records.as_slice());
        let record = find_record(model.records(), &id);
        assert_eq!(record.eye_color, EyeColor::Brown);

        send(&mut model, Message::Exit);
        assert_eq!(model.modus(), Modus::Form);
    }

    #[test]
    fn empty_field_is_rejected_and_focused() {
        let mut model = model();
        open_first_row(&mut model, Some(Field::FirstName));
        send(&mut model, Message::NextInput);
        assert_eq!(model.form().focus(), Field::LastName);
        type_into(&mut model, "");
        send(&mut model, Message::PreviousInput);

        send(&mut model, Message::SaveForm);
        assert_eq!(model.popup_message(), "fields must not be empty");
        assert_eq!(model.form().focus(), Field::LastName);
    }

    #[test]
    fn changing_page_closes_the_form() {
        let mut model = model();
        open_first_row(&mut model, None);
        send(&mut model, Message::NextPage);
        assert_eq!(model.form().phase(), FormPhase::Closing);
        assert_eq!(model.modus(), Modus::Table);
        settle(&mut model);
        assert_eq!(model.form().values().first_name, "");
    }

    #[test]
    fn keyboard_edit_uses_the_cursor() {
        let mut model = model();
        send(&mut model, Message::MoveDown);
        send(&mut model, Message::MoveRight);
        send(&mut model, Message::MoveRight);
        send(&mut model, Message::MoveRight);
        send(&mut model, Message::MoveRight);
        assert_eq!(model.cursor(), (1, 3));

        send(&mut model, Message::EditCell);
        settle(&mut model);
        let second = model.records()[1].id.as_str();
        assert_eq!(model.form().bound_id(), Some(second));
        assert_eq!(model.form().focus(), Field::EyeColor);
        assert_eq!(model.input_cursor(), "blue".len());
    }

    #[test]
    fn sort_and_toggle_follow_the_cursor_column() {
        let mut model = model();
        send(&mut model, Message::MoveRight);
        send(&mut model, Message::SortColumn);
        assert_eq!(model.sort().field(), Some(Field::LastName));

        send(&mut model, Message::ToggleColumn);
        assert!(model.columns().is_hidden(Field::LastName));
        assert!(model.target().body[0].cells[1].hidden);
        let eye_color = &model.target().body[0].cells[3].content;
        assert!(matches!(eye_color, CellContent::Swatch(_)));
    }

    #[test]
    fn russian_locale_translates_alerts() {
        let cfg = TableConfig::default().with_locale(Locale::Ru);
        let mut model = Model::new(&cfg, people(), ViewBuffer::default());
        open_first_row(&mut model, Some(Field::EyeColor));
        type_into(&mut model, "purple");
        send(&mut model, Message::SaveForm);
        let message = "Невозможно добавить этот цвет глаз.";
        assert_eq!(model.popup_message(), message);
    }

    #[test]
    fn help_popup_returns_to_previous_modus() {
        let mut model = model();
        send(&mut model, Message::Help);
        assert_eq!(model.modus(), Modus::Popup);
        assert!(model.popup_message().contains("sort"));
        send(&mut model, Message::Exit);
        assert_eq!(model.modus(), Modus::Table);
        send(&mut model, Message::Quit);
        assert_eq!(model.status, Status::Quitting);
    }

    #[test]
    fn small_dataset_has_no_pagination() {
        let records = people().into_iter().take(4).collect();
        let model = Model::new(&TableConfig::default(), records, ViewBuffer::default());
        assert_eq!(model.target().pagination, None);
        assert_eq!(model.target().body.len(), 4);
        assert_eq!(model.number_of_pages(), 1);
    }
}
