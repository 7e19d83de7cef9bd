use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::domain::PTError;

/// The four displayed attributes of a record, in column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    FirstName,
    LastName,
    About,
    EyeColor,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::FirstName,
        Field::LastName,
        Field::About,
        Field::EyeColor,
    ];

    /// Order of the inputs in the edit form. Validation reports the first
    /// offending field in this order.
    pub const FORM_ORDER: [Field; 4] = [
        Field::FirstName,
        Field::LastName,
        Field::EyeColor,
        Field::About,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::About => "about",
            Field::EyeColor => "eyeColor",
        }
    }

    pub fn column(self) -> usize {
        match self {
            Field::FirstName => 0,
            Field::LastName => 1,
            Field::About => 2,
            Field::EyeColor => 3,
        }
    }

    pub fn from_column(idx: usize) -> Option<Field> {
        Field::ALL.get(idx).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EyeColor {
    Blue,
    Red,
    Brown,
    Green,
}

impl EyeColor {
    pub const ALL: [EyeColor; 4] = [
        EyeColor::Blue,
        EyeColor::Red,
        EyeColor::Brown,
        EyeColor::Green,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EyeColor::Blue => "blue",
            EyeColor::Red => "red",
            EyeColor::Brown => "brown",
            EyeColor::Green => "green",
        }
    }

    /// Exact match only, "Blue" is not an eye color.
    pub fn parse(value: &str) -> Option<EyeColor> {
        EyeColor::ALL.into_iter().find(|c| c.as_str() == value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Name {
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: String,
    pub name: Name,
    pub about: String,
    pub eye_color: EyeColor,
}

impl Record {
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::FirstName => &self.name.first_name,
            Field::LastName => &self.name.last_name,
            Field::About => &self.about,
            Field::EyeColor => self.eye_color.as_str(),
        }
    }
}

/// Looks a record up by id. A missing id means the caller handed out an id
/// that never came from the dataset, so this panics.
pub fn find_record<'a>(records: &'a [Record], id: &str) -> &'a Record {
    records
        .iter()
        .find(|r| r.id == id)
        .unwrap_or_else(|| panic!("record {id} is not part of the dataset"))
}

pub fn find_record_mut<'a>(records: &'a mut [Record], id: &str) -> &'a mut Record {
    records
        .iter_mut()
        .find(|r| r.id == id)
        .unwrap_or_else(|| panic!("record {id} is not part of the dataset"))
}

/// Expands `~` and environment variables in a user supplied path.
pub fn expand_path(raw: &str) -> Result<PathBuf, PTError> {
    shellexpand::full(raw)
        .map(|p| PathBuf::from(p.as_ref()))
        .map_err(|e| PTError::LoadingFailed(e.to_string()))
}

pub fn load_records(path: &Path) -> Result<Vec<Record>, PTError> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => PTError::FileNotFound,
        ErrorKind::PermissionDenied => PTError::PermissionDenied,
        _ => PTError::IoError(e),
    })?;
    if !metadata.is_file() {
        return Err(PTError::LoadingFailed("Not a file!".into()));
    }

    let content = fs::read_to_string(path)?;
    let records = parse_records(&content)?;
    info!(
        "Loaded {} records ({} bytes) from {}",
        records.len(),
        metadata.len(),
        path.display()
    );
    Ok(records)
}

pub fn parse_records(content: &str) -> Result<Vec<Record>, PTError> {
    let records: Vec<Record> = serde_json::from_str(content)?;
    for r in records.iter() {
        debug!("Record {}: {}", r.id, r.name.last_name);
    }
    Ok(records)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const PEOPLE: &str = include_str!("../tests/fixtures/people.json");

    pub(crate) fn people() -> Vec<Record> {
        parse_records(PEOPLE).unwrap()
    }

    pub(crate) fn person(id: &str, first: &str, last: &str, about: &str, eye: EyeColor) -> Record {
        Record {
            id: id.to_string(),
            name: Name {
                first_name: first.to_string(),
                last_name: last.to_string(),
            },
            about: about.to_string(),
            eye_color: eye,
        }
    }

    #[test]
    fn fixture_parses_and_ignores_extra_keys() {
        let records = people();
        assert_eq!(records.len(), 23);
        assert_eq!(records[0].name.first_name, "Lilly");
        assert_eq!(records[0].eye_color, EyeColor::Brown);
    }

    #[test]
    fn unknown_eye_color_is_rejected_at_load() {
        let json = r#"[{"id":"1","name":{"firstName":"a","lastName":"b"},
                       "about":"c","eyeColor":"purple"}]"#;
        assert!(matches!(parse_records(json), Err(PTError::JsonError(_))));
    }

    #[test]
    fn fields_map_to_columns() {
        assert_eq!(Field::EyeColor.id(), "eyeColor");
        assert_eq!(Field::About.column(), 2);
        assert_eq!(Field::from_column(2), Some(Field::About));
        assert_eq!(Field::from_column(4), None);
    }

    #[test]
    fn eye_color_parse_is_exact() {
        assert_eq!(EyeColor::parse("green"), Some(EyeColor::Green));
        assert_eq!(EyeColor::parse("Green"), None);
        assert_eq!(EyeColor::parse("purple"), None);
    }

    #[test]
    fn missing_file_maps_to_not_found() {
        let path = Path::new("tests/fixtures/does-not-exist.json");
        let err = load_records(path).unwrap_err();
        assert!(matches!(err, PTError::FileNotFound));
    }

    #[test]
    #[should_panic(expected = "not part of the dataset")]
    fn looking_up_an_unknown_id_panics() {
        let records = people();
        find_record(&records, "nope");
    }
}
