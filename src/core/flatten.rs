use serde::Serialize;

use crate::core::{Record, RecordType, Report, Test};

/// Denormalized view of one finding for document-store ingestion. Every
/// record repeats the report metadata so it can be indexed on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlattenedRecord<'a> {
    #[serde(rename = "name")]
    pub test_name: &'a str,
    #[serde(rename = "type")]
    pub record_type: RecordType,
    #[serde(rename = "lynisVersion")]
    pub lynis_version: &'a str,
    #[serde(rename = "datetime_start")]
    pub datetime_start: &'a str,
    #[serde(rename = "datetime_end")]
    pub datetime_end: &'a str,
    #[serde(rename = "message")]
    pub field1: &'a str,
    #[serde(rename = "details")]
    pub field2: &'a str,
    #[serde(rename = "solution")]
    pub field3: &'a str,
}

impl<'a> FlattenedRecord<'a> {
    pub fn new(
        report: &'a Report,
        test: &'a Test,
        record_type: RecordType,
        fields: [&'a str; 3],
    ) -> Self {
        let [field1, field2, field3] = fields;
        Self {
            test_name: &test.name,
            record_type,
            lynis_version: &report.version,
            datetime_start: &report.time_start,
            datetime_end: &report.time_end,
            field1,
            field2,
            field3,
        }
    }

    pub fn from_record(report: &'a Report, test: &'a Test, record: &'a Record) -> Self {
        Self::new(report, test, record.record_type(), record.fields())
    }

    pub fn for_test(report: &'a Report, test: &'a Test) -> impl Iterator<Item = Self> + 'a {
        let warnings = test
            .warnings
            .iter()
            .map(move |w| Self::new(report, test, RecordType::Warning, w.fields()));
        let suggestions = test
            .suggestions
            .iter()
            .map(move |s| Self::new(report, test, RecordType::Suggestion, s.fields()));
        warnings.chain(suggestions)
    }
}
