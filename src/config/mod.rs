use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::format::OutputMode;

pub const DEFAULT_REPORT_FILE: &str = "/var/log/lynis-report.dat";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EffectiveConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub report: ReportConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputConfig {
    /// Empty means stdin.
    pub report_file: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputConfig {
    /// Empty means stdout.
    pub log_file: String,
    pub format: OutputMode,
    pub timestamp: bool,
    pub newline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utc_offset: Option<String>,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            input: InputConfig {
                report_file: DEFAULT_REPORT_FILE.to_string(),
            },
            output: OutputConfig {
                log_file: String::new(),
                format: OutputMode::Json,
                timestamp: false,
                newline: false,
            },
            report: ReportConfig { utc_offset: None },
            config_path: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    input: Option<RawInputConfig>,
    output: Option<RawOutputConfig>,
    report: Option<RawReportConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawInputConfig {
    report_file: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawOutputConfig {
    log_file: Option<String>,
    format: Option<OutputMode>,
    timestamp: Option<bool>,
    newline: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawReportConfig {
    utc_offset: Option<String>,
}

pub fn default_config_path(home_dir: &Path) -> PathBuf {
    home_dir.join(".config/lynisreport/config.toml")
}

/// Defaults, then the config file (explicit path or `~/.config/...` when it
/// exists), then `LYNISREPORT_*` environment overrides.
pub fn load(config_path: Option<&Path>, home_dir: Option<&Path>) -> Result<EffectiveConfig> {
    let mut cfg = EffectiveConfig::default();

    let path = config_path
        .map(ToOwned::to_owned)
        .or_else(|| home_dir.map(default_config_path));

    if let Some(path) = path {
        if config_path.is_some() || path.exists() {
            let s = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config file: {}", path.display()))?;
            let raw: RawConfig = toml::from_str(&s)
                .with_context(|| format!("failed to parse config file: {}", path.display()))?;
            apply_raw_config(&mut cfg, raw);
            cfg.config_path = Some(path.display().to_string());
        }
    }

    apply_env_overrides(&mut cfg)?;

    Ok(cfg)
}

fn apply_raw_config(cfg: &mut EffectiveConfig, raw: RawConfig) {
    if let Some(input) = raw.input {
        if let Some(report_file) = input.report_file {
            cfg.input.report_file = report_file;
        }
    }

    if let Some(output) = raw.output {
        if let Some(log_file) = output.log_file {
            cfg.output.log_file = log_file;
        }
        if let Some(format) = output.format {
            cfg.output.format = format;
        }
        if let Some(timestamp) = output.timestamp {
            cfg.output.timestamp = timestamp;
        }
        if let Some(newline) = output.newline {
            cfg.output.newline = newline;
        }
    }

    if let Some(report) = raw.report {
        if let Some(utc_offset) = report.utc_offset {
            cfg.report.utc_offset = Some(utc_offset);
        }
    }
}

fn apply_env_overrides(cfg: &mut EffectiveConfig) -> Result<()> {
    if let Ok(v) = std::env::var("LYNISREPORT_REPORT_FILE") {
        cfg.input.report_file = v.trim().to_string();
    }
    if let Ok(v) = std::env::var("LYNISREPORT_LOG_FILE") {
        cfg.output.log_file = v.trim().to_string();
    }
    if let Ok(v) = std::env::var("LYNISREPORT_OUTPUT_FORMAT") {
        cfg.output.format = v
            .parse::<OutputMode>()
            .map_err(anyhow::Error::msg)
            .with_context(|| "LYNISREPORT_OUTPUT_FORMAT")?;
    }
    if let Ok(v) = std::env::var("LYNISREPORT_OUTPUT_TIMESTAMP") {
        cfg.output.timestamp = parse_bool(&v).with_context(|| "LYNISREPORT_OUTPUT_TIMESTAMP")?;
    }
    if let Ok(v) = std::env::var("LYNISREPORT_OUTPUT_NEWLINE") {
        cfg.output.newline = parse_bool(&v).with_context(|| "LYNISREPORT_OUTPUT_NEWLINE")?;
    }
    if let Ok(v) = std::env::var("LYNISREPORT_UTC_OFFSET") {
        let v = v.trim();
        cfg.report.utc_offset = if v.is_empty() {
            None
        } else {
            Some(v.to_string())
        };
    }

    Ok(())
}

fn parse_bool(s: &str) -> Result<bool> {
    let s = s.trim().to_ascii_lowercase();
    match s.as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow::anyhow!(
            "invalid boolean: {s} (expected true|false|1|0|yes|no|on|off)"
        )),
    }
}
