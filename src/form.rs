use std::fmt;
use std::time::Duration;

use tracing::{debug, trace};

use crate::record::{EyeColor, Field, Name, Record, find_record_mut};
use crate::scheduler::Scheduler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Hidden,
    Opening,
    Visible,
    Closing,
}

/// Timer events of the form. The stamp identifies the transition that
/// scheduled them, stale ones are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormTimer {
    FadedIn(u64),
    FadedOut(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyField(Field),
    UnknownEyeColor(String),
}

impl ValidationError {
    pub fn field(&self) -> Field {
        match self {
            ValidationError::EmptyField(field) => *field,
            ValidationError::UnknownEyeColor(_) => Field::EyeColor,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ValidationError::EmptyField(_) => "fields must not be empty",
            ValidationError::UnknownEyeColor(_) => "cannot add this eye color",
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.field().id())
    }
}

impl std::error::Error for ValidationError {}

/// Raw input values of the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    pub first_name: String,
    pub last_name: String,
    pub eye_color: String,
    pub about: String,
}

impl FormValues {
    pub fn from_record(record: &Record) -> Self {
        Self {
            first_name: record.name.first_name.clone(),
            last_name: record.name.last_name.clone(),
            eye_color: record.eye_color.as_str().to_string(),
            about: record.about.clone(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::FirstName => &self.first_name,
            Field::LastName => &self.last_name,
            Field::About => &self.about,
            Field::EyeColor => &self.eye_color,
        }
    }

    fn get_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::FirstName => &mut self.first_name,
            Field::LastName => &mut self.last_name,
            Field::About => &mut self.about,
            Field::EyeColor => &mut self.eye_color,
        }
    }

    pub fn validate(&self) -> Result<ValidEdit, ValidationError> {
        if let Some(field) = Field::FORM_ORDER
            .into_iter()
            .find(|f| self.get(*f).is_empty())
        {
            return Err(ValidationError::EmptyField(field));
        }
        let eye_color = EyeColor::parse(&self.eye_color)
            .ok_or_else(|| ValidationError::UnknownEyeColor(self.eye_color.clone()))?;

        Ok(ValidEdit {
            name: Name {
                first_name: self.first_name.clone(),
                last_name: self.last_name.clone(),
            },
            about: self.about.clone(),
            eye_color,
        })
    }
}

/// Values that passed validation and can be written onto a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidEdit {
    name: Name,
    about: String,
    eye_color: EyeColor,
}

impl ValidEdit {
    pub fn apply(self, record: &mut Record) {
        record.name = self.name;
        record.about = self.about;
        record.eye_color = self.eye_color;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Ignored,
    Saved(String),
}

#[derive(Debug, Clone)]
struct PendingOpen {
    record_id: String,
    values: FormValues,
    focus: Field,
}

/// Overlay form editing one record.
///
/// Opening and closing are timed: the form fades in before its inputs are
/// filled and fades out before they are cleared. Reopening a visible form
/// always runs a full close first.
#[derive(Debug)]
pub struct EditForm {
    phase: FormPhase,
    generation: u64,
    bound_id: Option<String>,
    values: FormValues,
    focus: Field,
    pending: Option<PendingOpen>,
    fade_in: Duration,
    fade_out: Duration,
}

impl EditForm {
    pub fn new(fade_in: Duration, fade_out: Duration) -> Self {
        Self {
            phase: FormPhase::Hidden,
            generation: 0,
            bound_id: None,
            values: FormValues::default(),
            focus: Field::FirstName,
            pending: None,
            fade_in,
            fade_out,
        }
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn bound_id(&self) -> Option<&str> {
        self.bound_id.as_deref()
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn focus(&self) -> Field {
        self.focus
    }

    /// Shows the form for `record` with `focus` selected.
    ///
    /// A form that is still opening restarts with the new record. A visible
    /// form closes first; a closing one reopens once it is gone.
    pub fn open(&mut self, record: &Record, focus: Field, scheduler: &mut Scheduler<FormTimer>) {
        let request = PendingOpen {
            record_id: record.id.clone(),
            values: FormValues::from_record(record),
            focus,
        };
        debug!("Open {} in phase {:?}", request.record_id, self.phase);
        self.pending = Some(request);
        match self.phase {
            FormPhase::Hidden | FormPhase::Opening => self.start_opening(scheduler),
            FormPhase::Visible => self.start_closing(scheduler),
            FormPhase::Closing => {}
        }
    }

    /// Starts hiding the form. Returns false if it was already hidden or going away.
    pub fn close(&mut self, scheduler: &mut Scheduler<FormTimer>) -> bool {
        self.pending = None;
        match self.phase {
            FormPhase::Visible | FormPhase::Opening => {
                self.start_closing(scheduler);
                true
            }
            FormPhase::Hidden | FormPhase::Closing => false,
        }
    }

    /// Validates the inputs and writes them onto the bound record.
    ///
    /// Nothing is mutated unless every check passes. Saving anything but a
    /// visible form is ignored.
    pub fn save(
        &mut self,
        records: &mut [Record],
        scheduler: &mut Scheduler<FormTimer>,
    ) -> Result<SaveOutcome, ValidationError> {
        let visible = self.phase == FormPhase::Visible;
        let Some(id) = self.bound_id.clone().filter(|_| visible) else {
            trace!("Save ignored in phase {:?}", self.phase);
            return Ok(SaveOutcome::Ignored);
        };
        let edit = self.values.validate()?;
        edit.apply(find_record_mut(records, &id));
        debug!("Saved record {id}");
        self.start_closing(scheduler);
        Ok(SaveOutcome::Saved(id))
    }

    /// Applies a timer. Returns whether it changed the form.
    pub fn on_timer(&mut self, timer: FormTimer, scheduler: &mut Scheduler<FormTimer>) -> bool {
        match timer {
            FormTimer::FadedIn(g) if g == self.generation && self.phase == FormPhase::Opening => {
                if let Some(request) = self.pending.take() {
                    self.values = request.values;
                    self.bound_id = Some(request.record_id);
                    self.focus = request.focus;
                }
                self.phase = FormPhase::Visible;
                trace!("Form visible, bound to {:?}", self.bound_id);
                true
            }
            FormTimer::FadedOut(g) if g == self.generation && self.phase == FormPhase::Closing => {
                self.values = FormValues::default();
                self.bound_id = None;
                self.focus = Field::FirstName;
                self.phase = FormPhase::Hidden;
                trace!("Form hidden and cleared");
                if self.pending.is_some() {
                    self.start_opening(scheduler);
                }
                true
            }
            _ => {
                trace!("Stale {:?} (generation {})", timer, self.generation);
                false
            }
        }
    }

    /// Moves input focus forward or backward through the form order.
    pub fn cycle_focus(&mut self, forward: bool) -> Field {
        let order = Field::FORM_ORDER;
        let idx = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        let next = if forward {
            (idx + 1) % order.len()
        } else {
            (idx + order.len() - 1) % order.len()
        };
        self.focus = order[next];
        self.focus
    }

    /// Edits an input; only a visible form accepts input.
    pub fn set_value(&mut self, field: Field, value: impl Into<String>) -> bool {
        if self.phase != FormPhase::Visible {
            return false;
        }
        *self.values.get_mut(field) = value.into();
        true
    }

    fn start_opening(&mut self, scheduler: &mut Scheduler<FormTimer>) {
        self.generation += 1;
        self.phase = FormPhase::Opening;
        scheduler.schedule(self.fade_in, FormTimer::FadedIn(self.generation));
    }

    fn start_closing(&mut self, scheduler: &mut Scheduler<FormTimer>) {
        self.generation += 1;
        self.phase = FormPhase::Closing;
        scheduler.schedule(self.fade_out, FormTimer::FadedOut(self.generation));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::tests::people;

    const FADE_IN: Duration = Duration::from_millis(500);
    const FADE_OUT: Duration = Duration::from_millis(350);

    struct Harness {
        form: EditForm,
        scheduler: Scheduler<FormTimer>,
        records: Vec<Record>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                form: EditForm::new(FADE_IN, FADE_OUT),
                scheduler: Scheduler::new(),
                records: people(),
            }
        }

        fn open(&mut self, idx: usize, focus: Field) {
            let record = self.records[idx].clone();
            self.form.open(&record, focus, &mut self.scheduler);
        }

        fn run_for(&mut self, ms: u64) {
            let until = self.scheduler.now() + Duration::from_millis(ms);
            while let Some(timer) = self.scheduler.pop_due(until) {
                self.form.on_timer(timer, &mut self.scheduler);
            }
            self.scheduler.settle(until);
        }
    }

    #[test]
    fn fields_fill_only_after_fade_in() {
        let mut h = Harness::new();
        h.open(0, Field::About);
        assert_eq!(h.form.phase(), FormPhase::Opening);
        assert_eq!(h.form.values(), &FormValues::default());

        h.run_for(499);
        assert_eq!(h.form.phase(), FormPhase::Opening);
        h.run_for(1);
        assert_eq!(h.form.phase(), FormPhase::Visible);
        assert_eq!(h.form.values().first_name, "Lilly");
        assert_eq!(h.form.focus(), Field::About);
        assert_eq!(h.form.bound_id(), Some(h.records[0].id.as_str()));
    }

    #[test]
    fn close_clears_fields_only_after_fade_out() {
        let mut h = Harness::new();
        h.open(0, Field::FirstName);
        h.run_for(500);
        assert!(h.form.close(&mut h.scheduler));
        assert_eq!(h.form.phase(), FormPhase::Closing);
        assert_eq!(h.form.values().first_name, "Lilly");

        h.run_for(350);
        assert_eq!(h.form.phase(), FormPhase::Hidden);
        assert_eq!(h.form.values(), &FormValues::default());
        assert_eq!(h.form.bound_id(), None);
        assert!(!h.form.close(&mut h.scheduler));
    }

    #[test]
    fn reopening_a_visible_form_closes_it_first() {
        let mut h = Harness::new();
        h.open(0, Field::FirstName);
        h.run_for(500);

        h.open(1, Field::LastName);
        assert_eq!(h.form.phase(), FormPhase::Closing);
        assert_eq!(h.form.values().first_name, "Lilly");

        h.run_for(350);
        assert_eq!(h.form.phase(), FormPhase::Opening);
        assert_eq!(h.form.values(), &FormValues::default());

        h.run_for(500);
        assert_eq!(h.form.phase(), FormPhase::Visible);
        assert_eq!(h.form.values().first_name, "Bates");
        assert_eq!(h.form.focus(), Field::LastName);
    }

    #[test]
    fn reopening_while_opening_restarts_the_fade() {
        let mut h = Harness::new();
        h.open(0, Field::FirstName);
        h.run_for(300);
        h.open(2, Field::FirstName);
        h.run_for(300);
        assert_eq!(h.form.phase(), FormPhase::Opening);
        h.run_for(200);
        assert_eq!(h.form.phase(), FormPhase::Visible);
        assert_eq!(h.form.values().first_name, "Grace");
    }

    #[test]
    fn closing_while_opening_never_populates() {
        let mut h = Harness::new();
        h.open(0, Field::FirstName);
        h.run_for(100);
        assert!(h.form.close(&mut h.scheduler));
        h.run_for(1000);
        assert_eq!(h.form.phase(), FormPhase::Hidden);
        assert_eq!(h.form.values(), &FormValues::default());
    }

    #[test]
    fn purple_eyes_are_rejected_without_mutation() {
        let mut h = Harness::new();
        h.open(3, Field::EyeColor);
        h.run_for(500);
        let before = h.records.clone();

        assert!(h.form.set_value(Field::FirstName, "Changed"));
        assert!(h.form.set_value(Field::EyeColor, "purple"));
        let err = h.form.save(&mut h.records, &mut h.scheduler).unwrap_err();
        assert_eq!(err, ValidationError::UnknownEyeColor("purple".into()));
        assert_eq!(err.message(), "cannot add this eye color");
        assert_eq!(h.records, before);
        assert_eq!(h.form.phase(), FormPhase::Visible);
    }

    #[test]
    fn first_empty_field_in_form_order_is_reported() {
        let values = FormValues {
            first_name: "a".into(),
            last_name: "b".into(),
            eye_color: String::new(),
            about: String::new(),
        };
        let err = values.validate().unwrap_err();
        assert_eq!(err, ValidationError::EmptyField(Field::EyeColor));
        assert_eq!(err.message(), "fields must not be empty");
    }

    #[test]
    fn empty_check_runs_before_color_check() {
        let values = FormValues {
            first_name: "a".into(),
            last_name: String::new(),
            eye_color: "purple".into(),
            about: "c".into(),
        };
        assert_eq!(
            values.validate().unwrap_err(),
            ValidationError::EmptyField(Field::LastName)
        );
    }

    #[test]
    fn successful_save_commits_and_closes() {
        let mut h = Harness::new();
        h.open(4, Field::FirstName);
        h.run_for(500);
        h.form.set_value(Field::About, "Rewritten");
        h.form.set_value(Field::EyeColor, "red");

        let id = h.records[4].id.clone();
        let outcome = h.form.save(&mut h.records, &mut h.scheduler).unwrap();
        assert_eq!(outcome, SaveOutcome::Saved(id));
        assert_eq!(h.records[4].about, "Rewritten");
        assert_eq!(h.records[4].eye_color, EyeColor::Red);
        assert_eq!(h.form.phase(), FormPhase::Closing);
    }

    #[test]
    fn save_and_input_require_a_visible_form() {
        let mut h = Harness::new();
        assert_eq!(
            h.form.save(&mut h.records, &mut h.scheduler),
            Ok(SaveOutcome::Ignored)
        );
        h.open(0, Field::FirstName);
        assert!(!h.form.set_value(Field::FirstName, "x"));
        assert_eq!(
            h.form.save(&mut h.records, &mut h.scheduler),
            Ok(SaveOutcome::Ignored)
        );
    }

    #[test]
    fn focus_cycles_in_form_order() {
        let mut form = EditForm::new(FADE_IN, FADE_OUT);
        assert_eq!(form.cycle_focus(true), Field::LastName);
        assert_eq!(form.cycle_focus(true), Field::EyeColor);
        assert_eq!(form.cycle_focus(true), Field::About);
        assert_eq!(form.cycle_focus(true), Field::FirstName);
        assert_eq!(form.cycle_focus(false), Field::About);
    }
}
