pub mod cli;
pub mod config;
pub mod core;
pub mod exit;
pub mod format;
pub mod logs;
pub mod parser;
pub mod ui;

pub use crate::core::{FlattenedRecord, Record, RecordType, Report, Suggestion, Test, Warning};
pub use crate::format::{
    FormatError, Formatter, FormatterChain, OutputMode, OutputOptions, ProcessError, process,
};
pub use crate::parser::{LineError, ParseError, ParseOptions, Parser};
