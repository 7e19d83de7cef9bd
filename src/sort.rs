use std::cmp::Ordering;

use tracing::trace;

use crate::record::{Field, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggle(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }

    fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }
}

/// Which column the table is sorted by. Unsorted tables have neither a field
/// nor a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    active: Option<(Field, SortDirection)>,
}

impl SortState {
    pub fn field(&self) -> Option<Field> {
        self.active.map(|(f, _)| f)
    }

    pub fn direction(&self) -> Option<SortDirection> {
        self.active.map(|(_, d)| d)
    }

    /// Direction indicator for a header cell, `None` unless `field` is the sort field.
    pub fn direction_for(&self, field: Field) -> Option<SortDirection> {
        self.active.filter(|(f, _)| *f == field).map(|(_, d)| d)
    }

    /// Header activation: the same field flips direction, another field
    /// starts ascending.
    pub fn activate(&mut self, field: Field) -> SortDirection {
        let direction = match self.active {
            Some((f, d)) if f == field => d.toggle(),
            _ => SortDirection::Ascending,
        };
        trace!("Sort {:?} -> {:?} {:?}", self.active, field, direction);
        self.active = Some((field, direction));
        direction
    }
}

/// Stable sort by the plain string value of `field`, compared by code point.
pub fn apply_sort(records: &mut [Record], field: Field, direction: SortDirection) {
    records.sort_by(|a, b| direction.apply(a.value(field).cmp(b.value(field))));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::EyeColor;
    use crate::record::tests::{people, person};
    use proptest::prelude::*;

    fn ids(records: &[Record]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn activation_cycles_and_resets_on_new_field() {
        let mut state = SortState::default();
        assert_eq!(state.field(), None);
        assert_eq!(state.direction(), None);

        assert_eq!(state.activate(Field::About), SortDirection::Ascending);
        assert_eq!(state.activate(Field::About), SortDirection::Descending);
        assert_eq!(state.activate(Field::About), SortDirection::Ascending);
        assert_eq!(state.activate(Field::LastName), SortDirection::Ascending);
        assert_eq!(state.field(), Some(Field::LastName));
        assert_eq!(state.direction_for(Field::About), None);
        assert_eq!(
            state.direction_for(Field::LastName),
            Some(SortDirection::Ascending)
        );
    }

    #[test]
    fn second_activation_reverses_tie_free_data() {
        let mut records = people();
        apply_sort(&mut records, Field::About, SortDirection::Ascending);
        let ascending: Vec<String> = records.iter().map(|r| r.id.clone()).collect();

        apply_sort(&mut records, Field::About, SortDirection::Descending);
        let mut descending: Vec<String> = records.iter().map(|r| r.id.clone()).collect();
        descending.reverse();
        assert_eq!(ascending, descending);
    }

    #[test]
    fn ties_keep_previous_order_in_both_directions() {
        let mut records = vec![
            person("a", "Ann", "X", "same", EyeColor::Blue),
            person("b", "Bob", "Y", "same", EyeColor::Red),
            person("c", "Cid", "Z", "other", EyeColor::Blue),
        ];
        apply_sort(&mut records, Field::About, SortDirection::Ascending);
        assert_eq!(ids(&records), vec!["c", "a", "b"]);

        apply_sort(&mut records, Field::EyeColor, SortDirection::Descending);
        assert_eq!(ids(&records), vec!["b", "c", "a"]);
    }

    #[test]
    fn comparison_is_by_code_point() {
        let mut records = vec![
            person("1", "émile", "", "", EyeColor::Blue),
            person("2", "Zoe", "", "", EyeColor::Blue),
            person("3", "adam", "", "", EyeColor::Blue),
        ];
        apply_sort(&mut records, Field::FirstName, SortDirection::Ascending);
        assert_eq!(ids(&records), vec!["2", "3", "1"]);
    }

    proptest! {
        #[test]
        fn resorting_in_the_same_direction_is_identity(
            abouts in prop::collection::vec("[a-c]{0,2}", 0..30),
            descending in any::<bool>(),
        ) {
            let direction = if descending {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
            let mut records: Vec<Record> = abouts
                .iter()
                .enumerate()
                .map(|(i, a)| person(&i.to_string(), "f", "l", a, EyeColor::Green))
                .collect();
            apply_sort(&mut records, Field::About, direction);
            let once = records.clone();
            apply_sort(&mut records, Field::About, direction);
            prop_assert_eq!(once, records);
        }
    }
}
