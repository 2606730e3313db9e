//! Output formatter chain.
//!
//! A [`FormatterChain`] is an ordered list of [`Formatter`] stages. The driver
//! threads the payload through every stage in turn and stops at the first
//! error, so a failed chain never yields partial output.

use std::io::BufRead;

use serde::{Deserialize, Serialize};

use crate::core::Report;
use crate::parser::{ParseError, ParseOptions, Parser};

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("{stage} formatter failed to serialize report")]
    Serialize {
        stage: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Format(#[from] FormatError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Formatter {
    /// The whole report as one JSON document.
    Json,
    /// One flattened JSON document per warning/suggestion, newline separated.
    ElasticJson,
    /// Prepends the report end timestamp.
    Timestamp,
    /// Appends `\n`.
    NewLine,
}

impl Formatter {
    pub const fn name(self) -> &'static str {
        match self {
            Formatter::Json => "json",
            Formatter::ElasticJson => "elastic-json",
            Formatter::Timestamp => "timestamp",
            Formatter::NewLine => "newline",
        }
    }

    pub fn format(self, report: &Report, payload: Option<Vec<u8>>) -> Result<Vec<u8>, FormatError> {
        let serialize_err = |source| FormatError::Serialize {
            stage: self.name(),
            source,
        };

        let out = match self {
            Formatter::Json => {
                let doc = serde_json::to_vec(report).map_err(serialize_err)?;
                join_after(payload, doc)
            }
            Formatter::ElasticJson => {
                let doc = serialize_flattened(report).map_err(serialize_err)?;
                join_after(payload, doc)
            }
            Formatter::Timestamp => {
                let mut out = report.time_end.clone().into_bytes();
                if let Some(payload) = payload {
                    out.push(b' ');
                    out.extend_from_slice(&payload);
                }
                out
            }
            Formatter::NewLine => {
                let mut out = payload.unwrap_or_default();
                out.push(b'\n');
                out
            }
        };
        Ok(out)
    }
}

/// Appends `doc` to an existing payload with a single separating space, or
/// makes it the payload.
fn join_after(payload: Option<Vec<u8>>, doc: Vec<u8>) -> Vec<u8> {
    match payload {
        None => doc,
        Some(mut out) => {
            out.push(b' ');
            out.extend_from_slice(&doc);
            out
        }
    }
}

fn serialize_flattened(report: &Report) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::new();
    for (i, record) in report.flatten().iter().enumerate() {
        if i > 0 {
            out.push(b'\n');
        }
        serde_json::to_writer(&mut out, record)?;
    }
    Ok(out)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatterChain {
    stages: Vec<Formatter>,
}

impl FormatterChain {
    pub fn new(head: Formatter) -> Self {
        Self { stages: vec![head] }
    }

    /// Adds a stage at the tail of the chain.
    pub fn push(&mut self, stage: Formatter) {
        self.stages.push(stage);
    }

    pub fn then(mut self, stage: Formatter) -> Self {
        self.push(stage);
        self
    }

    pub fn stages(&self) -> &[Formatter] {
        &self.stages
    }

    pub fn from_options(opts: &OutputOptions) -> Self {
        let mut chain = Self::new(match opts.mode {
            OutputMode::Json => Formatter::Json,
            OutputMode::Elastic => Formatter::ElasticJson,
        });
        if opts.timestamp {
            chain.push(Formatter::Timestamp);
        }
        if opts.newline {
            chain.push(Formatter::NewLine);
        }
        chain
    }

    pub fn apply(&self, report: &Report) -> Result<Vec<u8>, FormatError> {
        let payload = self
            .stages
            .iter()
            .try_fold(None, |payload, stage| {
                tracing::debug!(stage = stage.name(), "applying formatter");
                stage.format(report, payload).map(Some)
            })?;
        Ok(payload.unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Json,
    Elastic,
}

impl std::str::FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputMode::Json),
            "elastic" => Ok(OutputMode::Elastic),
            other => Err(format!(
                "unknown output format: {other} (expected json|elastic)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputOptions {
    pub mode: OutputMode,
    pub timestamp: bool,
    pub newline: bool,
}

/// Parses the whole input, then runs the chain over the finished report.
pub fn process<R: BufRead>(
    input: R,
    chain: &FormatterChain,
    options: ParseOptions,
) -> Result<(Report, Vec<u8>), ProcessError> {
    let report = Parser::new(options).parse(input)?;
    let payload = chain.apply(&report)?;
    Ok((report, payload))
}
