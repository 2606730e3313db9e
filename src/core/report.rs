use std::collections::BTreeMap;
use std::io::BufRead;

use serde::{Deserialize, Serialize};

use crate::core::{FlattenedRecord, Test};
use crate::parser::{ParseError, ParseOptions, Parser};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    #[serde(rename = "lynisVersion")]
    pub version: String,
    #[serde(rename = "datetime_start")]
    pub time_start: String,
    #[serde(rename = "datetime_end")]
    pub time_end: String,
    pub tests: BTreeMap<String, Test>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a complete report with default options.
    pub fn from_reader<R: BufRead>(input: R) -> Result<Self, ParseError> {
        Parser::new(ParseOptions::default()).parse(input)
    }

    pub fn find_or_create(&mut self, name: &str) -> &mut Test {
        self.tests
            .entry(name.to_string())
            .or_insert_with(|| Test::new(name))
    }

    pub fn record_count(&self) -> usize {
        self.tests.values().map(Test::record_count).sum()
    }

    /// One self-describing record per warning/suggestion, warnings of each
    /// test before its suggestions.
    pub fn flatten(&self) -> Vec<FlattenedRecord<'_>> {
        let mut out = Vec::with_capacity(self.record_count());
        for test in self.tests.values() {
            out.extend(FlattenedRecord::for_test(self, test));
        }
        out
    }
}
