use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

pub const LOG_FILTER_ENV: &str = "LYNISREPORT_LOG";

/// Installs the stderr diagnostics subscriber. `LYNISREPORT_LOG` wins over the
/// verbosity flags.
pub fn init_tracing(verbose: bool, quiet: bool) {
    let default_level = if verbose {
        "lynisreport=debug"
    } else if quiet {
        "lynisreport=error"
    } else {
        "lynisreport=warn"
    };
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Where formatted output goes: appended to a log file, or stdout.
pub enum Sink {
    Stdout,
    File(File),
}

impl Sink {
    /// `None` or an empty path selects stdout.
    pub fn open(log_file: Option<&Path>) -> Result<Self> {
        match log_file {
            Some(path) if !path.as_os_str().is_empty() => {
                let file = open_log_file(path)
                    .with_context(|| format!("failed to open log file {}", path.display()))?;
                Ok(Sink::File(file))
            }
            _ => Ok(Sink::Stdout),
        }
    }

    pub fn write_payload(&mut self, data: &[u8]) -> Result<()> {
        match self {
            Sink::Stdout => {
                let mut stdout = io::stdout().lock();
                match stdout.write_all(data).and_then(|()| stdout.flush()) {
                    Ok(()) => Ok(()),
                    Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
                    Err(err) => Err(err.into()),
                }
            }
            Sink::File(file) => {
                file.write_all(data).with_context(|| {
                    format!("failed writing report to log file, expected {} bytes", data.len())
                })?;
                file.flush()?;
                Ok(())
            }
        }
    }
}

fn open_log_file(path: &Path) -> io::Result<File> {
    let mut opts = OpenOptions::new();
    opts.append(true).create(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(0o640);
    }
    opts.open(path)
}
