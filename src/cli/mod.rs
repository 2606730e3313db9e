use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use crate::config::EffectiveConfig;
use crate::format::{FormatterChain, OutputMode, OutputOptions};
use crate::logs::Sink;
use crate::parser::{ParseOptions, parse_utc_offset};

#[derive(Debug, Parser)]
#[command(
    name = "lynisreport",
    version,
    about = "Convert a Lynis audit report into JSON for log shipping and indexing"
)]
pub struct Cli {
    /// Lynis report to read; an empty value reads stdin
    #[arg(short = 'r', long = "reportfile", value_name = "PATH")]
    pub report_file: Option<String>,
    /// Append output to this file instead of stdout
    #[arg(short = 'l', long = "logfile", value_name = "PATH")]
    pub log_file: Option<String>,
    /// Prepend the report end timestamp
    #[arg(short = 't', long)]
    pub timestamp: bool,
    /// Output the report as one JSON document (default)
    #[arg(short = 'j', long, conflicts_with = "elastic")]
    pub json: bool,
    /// Output one flattened JSON document per warning/suggestion
    #[arg(short = 'e', long)]
    pub elastic: bool,
    /// Output YAML (not yet implemented)
    #[arg(short = 'y', long)]
    pub yaml: bool,
    /// Append a newline to the output
    #[arg(short = 'n', long)]
    pub newline: bool,
    /// Rewrite report timestamps to ISO-8601 at this offset, e.g. -06:00
    #[arg(long, value_name = "OFFSET", allow_hyphen_values = true)]
    pub utc_offset: Option<String>,
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Print the effective configuration and exit
    #[arg(long)]
    pub show_config: bool,
    /// Print shell completions and exit
    #[arg(long, value_name = "SHELL")]
    pub completions: Option<String>,
    #[arg(long)]
    pub verbose: bool,
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Everything needed to run one conversion, after config and flags are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub report_file: String,
    pub log_file: String,
    pub output: OutputOptions,
    pub parse: ParseOptions,
}

pub fn run() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.print()?;
            return Ok(());
        }
        Err(err) => {
            let _ = err.print();
            return Err(crate::exit::invalid_option("invalid command line options"));
        }
    };

    crate::logs::init_tracing(cli.verbose, cli.quiet);

    if let Some(shell) = cli.completions.as_deref() {
        let shell = parse_shell(shell)?;
        let mut cmd = Cli::command();
        let mut out = io::stdout().lock();
        clap_complete::generate(shell, &mut cmd, "lynisreport", &mut out);
        return Ok(());
    }

    let home_dir = std::env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .map(PathBuf::from);
    let env_config_path = std::env::var_os("LYNISREPORT_CONFIG").map(PathBuf::from);
    let mut cfg = crate::config::load(
        cli.config.as_deref().or(env_config_path.as_deref()),
        home_dir.as_deref(),
    )
    .map_err(crate::exit::invalid_option_err)?;
    apply_cli_overrides(&mut cfg, &cli);

    if cli.show_config {
        if cli.json {
            serde_json::to_writer_pretty(io::stdout().lock(), &cfg)?;
            println!();
        } else {
            println!("{}", toml::to_string_pretty(&cfg)?);
        }
        return Ok(());
    }

    if cli.yaml {
        return Err(crate::exit::invalid_option(
            "yaml output is not yet implemented",
        ));
    }

    let plan = plan_from_config(&cfg).map_err(crate::exit::invalid_option_err)?;
    execute(&plan)
}

pub fn apply_cli_overrides(cfg: &mut EffectiveConfig, cli: &Cli) {
    if let Some(report_file) = &cli.report_file {
        cfg.input.report_file = report_file.clone();
    }
    if let Some(log_file) = &cli.log_file {
        cfg.output.log_file = log_file.clone();
    }
    if cli.elastic {
        cfg.output.format = OutputMode::Elastic;
    } else if cli.json {
        cfg.output.format = OutputMode::Json;
    }
    cfg.output.timestamp |= cli.timestamp;
    cfg.output.newline |= cli.newline;
    if let Some(offset) = &cli.utc_offset {
        cfg.report.utc_offset = Some(offset.clone());
    }
}

pub fn plan_from_config(cfg: &EffectiveConfig) -> Result<RunPlan> {
    let timestamp_offset = cfg
        .report
        .utc_offset
        .as_deref()
        .map(|s| parse_utc_offset(s).with_context(|| format!("invalid utc offset: {s}")))
        .transpose()?;

    Ok(RunPlan {
        report_file: cfg.input.report_file.clone(),
        log_file: cfg.output.log_file.clone(),
        output: OutputOptions {
            mode: cfg.output.format,
            timestamp: cfg.output.timestamp,
            newline: cfg.output.newline,
        },
        parse: ParseOptions { timestamp_offset },
    })
}

pub fn execute(plan: &RunPlan) -> Result<()> {
    let chain = FormatterChain::from_options(&plan.output);

    let input = open_input(&plan.report_file).map_err(crate::exit::report_file_err)?;
    let mut sink =
        Sink::open(Some(Path::new(&plan.log_file))).map_err(crate::exit::log_file_err)?;

    let (report, data) = crate::format::process(input, &chain, plan.parse)
        .context("failed to parse Lynis report")
        .map_err(crate::exit::process_err)?;
    tracing::debug!(
        tests = report.tests.len(),
        bytes = data.len(),
        "report formatted"
    );

    sink.write_payload(&data).map_err(crate::exit::write_err)
}

fn open_input(report_file: &str) -> Result<Box<dyn BufRead>> {
    if report_file.is_empty() {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(report_file)
        .with_context(|| format!("failed to open report file {report_file}"))?;
    Ok(Box::new(BufReader::new(file)))
}

fn parse_shell(s: &str) -> Result<clap_complete::Shell> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "bash" => Ok(clap_complete::Shell::Bash),
        "zsh" => Ok(clap_complete::Shell::Zsh),
        "fish" => Ok(clap_complete::Shell::Fish),
        other => Err(crate::exit::invalid_option(format!(
            "unsupported shell: {other} (expected bash|zsh|fish)"
        ))),
    }
}
