//! CLI argument parsing
//!
//! # Usage
//!
//! ```bash
//! vigilar monitor --mode once
//! vigilar monitor --mode scheduled --config config/mlops_config.yaml
//! vigilar drift --model intent_classifier --window-days 14
//! vigilar register --model intent_classifier --artifact s3://models/intent --metric accuracy=0.88
//! vigilar auto-promote --model intent_classifier --threshold accuracy=0.85
//! vigilar promote --model intent_classifier --version 3 --stage Production
//! ```

mod core;


pub use core::{
    AutoPromoteArgs, Cli, Command, CompareArgs, DriftArgs, InfoArgs, ListArgs, LogFormat,
    MonitorArgs, PromoteArgs, RegisterArgs, RunMode,
};
