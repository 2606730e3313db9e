//! Line-oriented parser for `lynis-report.dat`.
//!
//! Each line is either skipped (comment, blank, no `=`), ignored (unknown
//! key) or dispatched to a handler that updates the [`Report`] under
//! construction. The first handler error aborts the whole parse and is
//! reported with its 1-based line number.

mod timestamp;
mod version;

use std::io::BufRead;

use time::UtcOffset;

use crate::core::{Record, RecordType, Report};

pub use timestamp::{normalize_timestamp, parse_utc_offset};
pub use version::{LynisVersion, MIN_LYNIS_VERSION, check_version};

pub const KEY_LYNIS_VERSION: &str = "lynis_version";
pub const KEY_WARNING: &str = "warning[]";
pub const KEY_SUGGESTION: &str = "suggestion[]";
pub const KEY_DATETIME_START: &str = "report_datetime_start";
pub const KEY_DATETIME_END: &str = "report_datetime_end";

/// Why a single line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LineError {
    #[error("lynis version string invalid format")]
    VersionFormat,
    #[error("lynis version string contains non-number")]
    VersionNotNumber,
    #[error("lynis version is not compatible")]
    VersionIncompatible,
    #[error("malformed line no test name or test is missing info")]
    MissingTestInfo,
    #[error("{record_type} is missing fields (expected 3, got {got})")]
    MissingFields { record_type: RecordType, got: usize },
    #[error("invalid report timestamp {value:?}: {reason}")]
    Timestamp { value: String, reason: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("line {line}: {cause}")]
    Line { line: usize, cause: LineError },
    #[error("failed to read report")]
    Read(#[from] std::io::Error),
}

impl ParseError {
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::Line { line, .. } => Some(*line),
            ParseError::Read(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// When set, report timestamps are rewritten to ISO-8601 at this offset.
    /// Otherwise they are kept exactly as written.
    pub timestamp_offset: Option<UtcOffset>,
}

type Handler = fn(&mut Parser, &str) -> Result<(), LineError>;

const HANDLERS: &[(&str, Handler)] = &[
    (KEY_LYNIS_VERSION, Parser::set_version),
    (KEY_WARNING, Parser::add_warning),
    (KEY_SUGGESTION, Parser::add_suggestion),
    (KEY_DATETIME_START, Parser::set_time_start),
    (KEY_DATETIME_END, Parser::set_time_end),
];

/// Accumulates a [`Report`] line by line.
#[derive(Debug, Default)]
pub struct Parser {
    options: ParseOptions,
    report: Report,
}

impl Parser {
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            report: Report::new(),
        }
    }

    /// Consumes `input` to the end and returns the finished report.
    pub fn parse<R: BufRead>(mut self, mut input: R) -> Result<Report, ParseError> {
        let mut buf = Vec::new();
        let mut line_no = 0usize;
        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_no += 1;
            let line = String::from_utf8_lossy(&buf);
            self.process_line(line_no, &line)
                .map_err(|cause| ParseError::Line {
                    line: line_no,
                    cause,
                })?;
        }

        tracing::debug!(
            lines = line_no,
            tests = self.report.tests.len(),
            records = self.report.record_count(),
            "parsed lynis report"
        );
        Ok(self.report)
    }

    pub fn process_line(&mut self, line_no: usize, line: &str) -> Result<(), LineError> {
        if is_skippable(line) {
            return Ok(());
        }

        let Some((key, value)) = split_key_value(line) else {
            tracing::warn!(line = line_no, "ignoring malformed line without '='");
            return Ok(());
        };

        self.add(key, value)
    }

    /// Applies one key/value pair. Unknown keys are accepted and ignored.
    pub fn add(&mut self, key: &str, value: &str) -> Result<(), LineError> {
        match HANDLERS.iter().find(|(k, _)| *k == key) {
            Some((_, handler)) => handler(self, value),
            None => {
                tracing::trace!(key, "ignoring unrecognized key");
                Ok(())
            }
        }
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    pub fn finish(self) -> Report {
        self.report
    }

    fn set_version(&mut self, value: &str) -> Result<(), LineError> {
        check_version(value, MIN_LYNIS_VERSION)?;
        self.report.version = value.to_string();
        Ok(())
    }

    fn add_warning(&mut self, value: &str) -> Result<(), LineError> {
        self.add_record(RecordType::Warning, value)
    }

    fn add_suggestion(&mut self, value: &str) -> Result<(), LineError> {
        self.add_record(RecordType::Suggestion, value)
    }

    fn add_record(&mut self, record_type: RecordType, value: &str) -> Result<(), LineError> {
        let (name, fields) = split_multi_value(value)?;
        let record = Record::from_fields(record_type, &fields)?;
        self.report.find_or_create(name).push(record);
        Ok(())
    }

    fn set_time_start(&mut self, value: &str) -> Result<(), LineError> {
        self.report.time_start = self.timestamp(value)?;
        Ok(())
    }

    fn set_time_end(&mut self, value: &str) -> Result<(), LineError> {
        self.report.time_end = self.timestamp(value)?;
        Ok(())
    }

    fn timestamp(&self, value: &str) -> Result<String, LineError> {
        match self.options.timestamp_offset {
            Some(offset) => normalize_timestamp(value, offset),
            None => Ok(value.to_string()),
        }
    }
}

fn is_skippable(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty() || trimmed.starts_with('#')
}

fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    Some((key.trim(), value.trim()))
}

/// Splits `name|f1|f2|f3|` into the test name and its content fields. The
/// segment after the trailing `|` is always dropped.
fn split_multi_value(value: &str) -> Result<(&str, Vec<&str>), LineError> {
    let mut segments: Vec<&str> = value.split('|').collect();
    segments.pop();
    match segments.split_first() {
        Some((name, fields)) if !fields.is_empty() => Ok((*name, fields.to_vec())),
        _ => Err(LineError::MissingTestInfo),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Report, ParseError> {
        Parser::new(ParseOptions::default()).parse(input.as_bytes())
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        assert!(is_skippable("# comment"));
        assert!(is_skippable("   # indented comment"));
        assert!(is_skippable(""));
        assert!(is_skippable(" \t\r\n"));
        assert!(!is_skippable("key=value"));
    }

    #[test]
    fn splits_on_first_equals_and_trims() {
        assert_eq!(split_key_value(" a = b=c \n"), Some(("a", "b=c")));
        assert_eq!(split_key_value("no delimiter"), None);
    }

    #[test]
    fn multi_value_drops_trailing_segment() {
        let (name, fields) = split_multi_value("NETW-1|msg|obj|misc|").expect("split");
        assert_eq!(name, "NETW-1");
        assert_eq!(fields, vec!["msg", "obj", "misc"]);
    }

    #[test]
    fn multi_value_needs_name_and_content() {
        assert_eq!(split_multi_value(""), Err(LineError::MissingTestInfo));
        assert_eq!(split_multi_value("NETW-1|"), Err(LineError::MissingTestInfo));
        assert_eq!(
            split_multi_value("NETW-1|msg"),
            Err(LineError::MissingTestInfo)
        );
    }

    #[test]
    fn line_without_equals_is_ignored() {
        let report = parse("lynis_version=3.0.7\nthis line is junk\nwarning[]=A|m|o|x|\n")
            .expect("parse");
        assert_eq!(report.tests.len(), 1);
    }

    #[test]
    fn wrong_field_count_is_fatal() {
        let err = parse("lynis_version=3.0.7\nwarning[]=A|m|o|\n").unwrap_err();
        assert_eq!(err.line(), Some(2));
        assert_eq!(
            err.to_string(),
            "line 2: warning is missing fields (expected 3, got 2)"
        );
    }

    #[test]
    fn timestamps_are_kept_verbatim_by_default() {
        let report = parse(
            "report_datetime_start=2022-04-05 13:36:19\nreport_datetime_end=not a date\n",
        )
        .expect("parse");
        assert_eq!(report.time_start, "2022-04-05 13:36:19");
        assert_eq!(report.time_end, "not a date");
    }

    #[test]
    fn timestamps_normalize_with_offset() {
        let options = ParseOptions {
            timestamp_offset: Some(time::macros::offset!(-6)),
        };
        let report = Parser::new(options)
            .parse("report_datetime_end=2022-04-05 13:36:19\n".as_bytes())
            .expect("parse");
        assert_eq!(report.time_end, "2022-04-05T13:36:19-0600");

        let err = Parser::new(options)
            .parse("\nreport_datetime_start=2022-04-05T13:36:19\n".as_bytes())
            .unwrap_err();
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn crlf_and_invalid_utf8_are_tolerated() {
        let mut input = b"lynis_version=3.0.7\r\n".to_vec();
        input.extend_from_slice(b"os=\xff\xfe\r\n");
        input.extend_from_slice(b"suggestion[]=B|m|1|2|\r\n");
        let report = Parser::new(ParseOptions::default())
            .parse(input.as_slice())
            .expect("parse");
        assert_eq!(report.version, "3.0.7");
        assert_eq!(report.tests["B"].suggestions[0].misc2, "2");
    }

    #[test]
    fn last_line_without_newline_is_processed() {
        let report = parse("lynis_version=3.0.7\nwarning[]=A|m|o|x|").expect("parse");
        assert_eq!(report.tests["A"].warnings.len(), 1);
    }
}
