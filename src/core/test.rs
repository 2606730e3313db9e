use serde::{Deserialize, Serialize};

use crate::core::{Record, Suggestion, Warning};

/// Findings reported by a single Lynis check, keyed by its test id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Test {
    #[serde(rename = "testname")]
    pub name: String,
    pub warnings: Vec<Warning>,
    pub suggestions: Vec<Suggestion>,
}

impl Test {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            warnings: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn push(&mut self, record: Record) {
        match record {
            Record::Warning(w) => self.warnings.push(w),
            Record::Suggestion(s) => self.suggestions.push(s),
        }
    }

    pub fn record_count(&self) -> usize {
        self.warnings.len() + self.suggestions.len()
    }
}
