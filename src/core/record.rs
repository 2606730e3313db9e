use serde::{Deserialize, Serialize};
use std::fmt;

use crate::parser::LineError;

/// Number of content fields every warning/suggestion carries.
pub const FIELD_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    Warning,
    Suggestion,
}

impl RecordType {
    pub const fn as_str(self) -> &'static str {
        match self {
            RecordType::Warning => "warning",
            RecordType::Suggestion => "suggestion",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub message: String,
    pub object: String,
    pub misc: String,
}

impl Warning {
    pub fn from_fields(fields: &[&str]) -> Result<Self, LineError> {
        let [message, object, misc] = exact_fields(RecordType::Warning, fields)?;
        Ok(Self {
            message,
            object,
            misc,
        })
    }

    pub fn fields(&self) -> [&str; FIELD_COUNT] {
        [&self.message, &self.object, &self.misc]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub message: String,
    pub misc1: String,
    pub misc2: String,
}

impl Suggestion {
    pub fn from_fields(fields: &[&str]) -> Result<Self, LineError> {
        let [message, misc1, misc2] = exact_fields(RecordType::Suggestion, fields)?;
        Ok(Self {
            message,
            misc1,
            misc2,
        })
    }

    pub fn fields(&self) -> [&str; FIELD_COUNT] {
        [&self.message, &self.misc1, &self.misc2]
    }
}

/// A parsed finding, ready to be attached to its test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Warning(Warning),
    Suggestion(Suggestion),
}

impl Record {
    pub fn from_fields(record_type: RecordType, fields: &[&str]) -> Result<Self, LineError> {
        match record_type {
            RecordType::Warning => Warning::from_fields(fields).map(Record::Warning),
            RecordType::Suggestion => Suggestion::from_fields(fields).map(Record::Suggestion),
        }
    }

    pub fn record_type(&self) -> RecordType {
        match self {
            Record::Warning(_) => RecordType::Warning,
            Record::Suggestion(_) => RecordType::Suggestion,
        }
    }

    pub fn fields(&self) -> [&str; FIELD_COUNT] {
        match self {
            Record::Warning(w) => w.fields(),
            Record::Suggestion(s) => s.fields(),
        }
    }
}

fn exact_fields(
    record_type: RecordType,
    fields: &[&str],
) -> Result<[String; FIELD_COUNT], LineError> {
    match fields {
        [a, b, c] => Ok([a.to_string(), b.to_string(), c.to_string()]),
        _ => Err(LineError::MissingFields {
            record_type,
            got: fields.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warning_takes_exactly_three_fields() {
        let w = Warning::from_fields(&["msg", "obj", "misc"]).expect("warning");
        assert_eq!(w.fields(), ["msg", "obj", "misc"]);
    }

    #[test]
    fn short_and_long_field_lists_are_rejected() {
        let err = Warning::from_fields(&["msg", "obj"]).unwrap_err();
        assert_eq!(
            err,
            LineError::MissingFields {
                record_type: RecordType::Warning,
                got: 2
            }
        );

        let err = Suggestion::from_fields(&["a", "b", "c", "d"]).unwrap_err();
        assert!(err.to_string().starts_with("suggestion is missing fields"));
    }

    #[test]
    fn record_dispatches_on_type() {
        let r = Record::from_fields(RecordType::Suggestion, &["m", "1", "2"]).expect("record");
        assert_eq!(r.record_type(), RecordType::Suggestion);
        assert_eq!(r.fields(), ["m", "1", "2"]);
    }
}
