use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    ReportFile,
    LogFile,
    ProcessFailed,
    WriteFailed,
    InvalidOption,
}

impl ExitCode {
    pub const fn as_i32(self) -> i32 {
        match self {
            ExitCode::Success => 0,
            ExitCode::ReportFile => 2,
            ExitCode::LogFile => 3,
            ExitCode::ProcessFailed => 4,
            ExitCode::WriteFailed => 5,
            ExitCode::InvalidOption => 6,
        }
    }
}

#[derive(Debug)]
pub struct ExitError {
    pub code: ExitCode,
    pub err: anyhow::Error,
}

impl ExitError {
    pub fn new(code: ExitCode, err: anyhow::Error) -> Self {
        Self { code, err }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.err.fmt(f)
    }
}

impl std::error::Error for ExitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.err.source()
    }
}

pub fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(exit) = err.downcast_ref::<ExitError>() {
        return exit.code.as_i32();
    }
    ExitCode::ProcessFailed.as_i32()
}

pub fn invalid_option(message: impl Into<String>) -> anyhow::Error {
    ExitError::new(ExitCode::InvalidOption, anyhow::anyhow!(message.into())).into()
}

pub fn invalid_option_err(err: anyhow::Error) -> anyhow::Error {
    ExitError::new(ExitCode::InvalidOption, err).into()
}

pub fn report_file_err(err: anyhow::Error) -> anyhow::Error {
    ExitError::new(ExitCode::ReportFile, err).into()
}

pub fn log_file_err(err: anyhow::Error) -> anyhow::Error {
    ExitError::new(ExitCode::LogFile, err).into()
}

pub fn process_err(err: anyhow::Error) -> anyhow::Error {
    ExitError::new(ExitCode::ProcessFailed, err).into()
}

pub fn write_err(err: anyhow::Error) -> anyhow::Error {
    ExitError::new(ExitCode::WriteFailed, err).into()
}
