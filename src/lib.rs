//! # Vigilar
//!
//! Model registry, drift detection and scheduled monitoring for a fleet of
//! versioned ML models.
//!
//! ## Architecture
//!
//! - `tracking`: persistence boundary for runs, model versions and stage
//!   transitions (in-memory and file-backed stores)
//! - `registry`: lifecycle state machine (`None -> Staging -> Production ->
//!   Archived`) with threshold-gated auto-promotion
//! - `predictions`: per-model, per-day prediction logs
//! - `drift`: Kolmogorov-Smirnov and chi-square data drift, and model
//!   performance drift over prediction logs
//! - `monitor`: health, performance, drift and data-quality checks, alert
//!   fan-out, and the task scheduler
//! - `report`: timestamped JSON report artifacts
//! - `config` / `cli`: YAML configuration and the `vigilar` command

pub mod cli;
pub mod config;
pub mod drift;
pub mod error;
pub mod monitor;
pub mod predictions;
pub mod registry;
pub mod report;
pub mod tracking;

pub use error::{Error, Result};
