use tracing::trace;

use crate::record::Field;

pub const COLUMN_COUNT: usize = Field::ALL.len();

/// Hide flags, index aligned with `Field::ALL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnVisibility {
    hidden: [bool; COLUMN_COUNT],
}

impl ColumnVisibility {
    pub fn is_hidden(&self, field: Field) -> bool {
        self.hidden[field.column()]
    }

    pub fn flags(&self) -> [bool; COLUMN_COUNT] {
        self.hidden
    }

    /// Flips a column and returns whether it is hidden now.
    pub fn toggle(&mut self, field: Field) -> bool {
        let flag = &mut self.hidden[field.column()];
        *flag = !*flag;
        trace!("Column {} hidden: {}", field.id(), *flag);
        *flag
    }

    /// Footer toggles number their columns from 1.
    pub fn toggle_column(&mut self, number: usize) -> Option<bool> {
        let field = number.checked_sub(1).and_then(Field::from_column)?;
        Some(self.toggle(field))
    }
}
