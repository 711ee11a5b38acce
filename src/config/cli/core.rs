//! Core CLI types - Cli, Command, and argument structs

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::registry::ModelStage;

/// Vigilar: model registry, drift detection and scheduled monitoring
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "vigilar")]
#[command(version)]
#[command(about = "Model registry, drift detection and scheduled monitoring for an ML model fleet")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Path to the YAML configuration file
    #[arg(short, long, global = true, default_value = "config/mlops_config.yaml")]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log line format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Log output format
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run monitoring once or on a schedule
    Monitor(MonitorArgs),

    /// Check data and model drift, exiting 1 when drift is found
    Drift(DriftArgs),

    /// Register a new model version
    Register(RegisterArgs),

    /// Move a model version into a stage
    Promote(PromoteArgs),

    /// Promote the newest unassigned version to Staging if it meets thresholds
    AutoPromote(AutoPromoteArgs),

    /// Show the latest version of a model in a stage
    Info(InfoArgs),

    /// Compare the metrics of two versions
    Compare(CompareArgs),

    /// List registered models
    List(ListArgs),

    /// Write a model registry report
    Report,
}

/// Monitoring run mode
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Run one monitoring cycle and exit
    #[default]
    Once,
    /// Run until interrupted
    Scheduled,
}

/// Arguments for the monitor command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct MonitorArgs {
    #[arg(long, value_enum, default_value_t = RunMode::Once)]
    pub mode: RunMode,
}

/// Arguments for the drift command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct DriftArgs {
    /// Model name to check
    #[arg(long, default_value = "intent_classifier")]
    pub model: String,

    /// Reference dataset (CSV)
    #[arg(long, requires = "current_data")]
    pub reference_data: Option<PathBuf>,

    /// Current dataset (CSV)
    #[arg(long, requires = "reference_data")]
    pub current_data: Option<PathBuf>,

    /// Feature columns to test
    #[arg(long, value_delimiter = ',', default_value = "email_length,word_count,sentiment_score")]
    pub features: Vec<String>,

    /// Window for model drift detection, overriding the configuration
    #[arg(long)]
    pub window_days: Option<u32>,
}

/// Arguments for the register command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct RegisterArgs {
    /// Model name
    #[arg(long)]
    pub model: String,

    /// Artifact path or URI (models:/, s3://, gs://, hf://)
    #[arg(long)]
    pub artifact: String,

    /// Metric as NAME=VALUE (repeatable)
    #[arg(long = "metric", value_parser = parse_metric, required = true)]
    pub metrics: Vec<(String, f64)>,

    /// Metadata as KEY=VALUE (repeatable)
    #[arg(long = "meta", value_parser = parse_key_value)]
    pub metadata: Vec<(String, String)>,
}

/// Arguments for the promote command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct PromoteArgs {
    #[arg(long)]
    pub model: String,

    #[arg(long)]
    pub version: u32,

    /// Target stage (Staging, Production, Archived)
    #[arg(long)]
    pub stage: ModelStage,

    /// Leave current holders of the stage in place
    #[arg(long)]
    pub keep_existing: bool,
}

/// Arguments for the auto-promote command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct AutoPromoteArgs {
    #[arg(long)]
    pub model: String,

    /// Minimum metric value as NAME=VALUE (repeatable)
    #[arg(long = "threshold", value_parser = parse_metric, required = true)]
    pub thresholds: Vec<(String, f64)>,
}

/// Arguments for the info command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct InfoArgs {
    #[arg(long)]
    pub model: String,

    #[arg(long, default_value = "Production")]
    pub stage: ModelStage,
}

/// Arguments for the compare command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct CompareArgs {
    #[arg(long)]
    pub model: String,

    #[arg(long)]
    pub version1: u32,

    #[arg(long)]
    pub version2: u32,
}

/// Arguments for the list command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ListArgs {
    /// Only show versions in this stage
    #[arg(long)]
    pub stage: Option<ModelStage>,
}

/// Parse `KEY=VALUE`
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s.split_once('=').ok_or_else(|| format!("expected KEY=VALUE, got {s:?}"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in {s:?}"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

/// Parse `NAME=NUMBER`
pub fn parse_metric(s: &str) -> Result<(String, f64), String> {
    let (name, value) = parse_key_value(s)?;
    let value: f64 = value.parse().map_err(|e| format!("invalid number in {s:?}: {e}"))?;
    if !value.is_finite() {
        return Err(format!("metric {name} must be finite"));
    }
    Ok((name, value))
}
