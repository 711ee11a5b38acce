//! Registry command implementations

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use super::CommandOutcome;
use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{
    AutoPromoteArgs, CompareArgs, InfoArgs, ListArgs, MonitoringConfig, PromoteArgs, RegisterArgs,
};
use crate::registry::{ModelRegistry, PromotionPolicy, PromotionRequest};
use crate::report::ReportWriter;
use crate::tracking::JsonFileStore;
use crate::Error;

fn open_registry(config: &MonitoringConfig) -> crate::Result<ModelRegistry> {
    let store = JsonFileStore::open(&config.tracking.store_dir)?;
    Ok(ModelRegistry::new(Arc::new(store)))
}

fn print_json<T: Serialize>(value: &T) -> crate::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(crate::report::ReportError::from)?;
    println!("{json}");
    Ok(())
}

pub fn run_register(config: &MonitoringConfig, args: RegisterArgs, level: LogLevel) -> crate::Result<CommandOutcome> {
    let registry = open_registry(config)?;
    let metrics: HashMap<String, f64> = args.metrics.into_iter().collect();
    let metadata: HashMap<String, String> = args.metadata.into_iter().collect();
    let version = registry.register_model(&args.model, &args.artifact, &metrics, &metadata)?;
    log(level, LogLevel::Normal, &format!("Registered {} version {version}", args.model));
    Ok(CommandOutcome::Completed)
}

pub fn run_promote(config: &MonitoringConfig, args: PromoteArgs, level: LogLevel) -> crate::Result<CommandOutcome> {
    let registry = open_registry(config)?;
    let mut request = PromotionRequest::new(&args.model, args.version, args.stage).with_reason("manual promotion");
    if args.keep_existing {
        request = request.keep_existing();
    }
    let transitions = registry.try_promote(&request)?;
    for t in &transitions {
        log(
            level,
            LogLevel::Normal,
            &format!("{} v{}: {} -> {}", t.model_name, t.version, t.from_stage, t.to_stage),
        );
    }
    if transitions.is_empty() {
        log(level, LogLevel::Normal, &format!("{} v{} already in {}", args.model, args.version, args.stage));
    }
    Ok(CommandOutcome::Completed)
}

pub fn run_auto_promote(
    config: &MonitoringConfig,
    args: AutoPromoteArgs,
    level: LogLevel,
) -> crate::Result<CommandOutcome> {
    let registry = open_registry(config)?;
    let thresholds: HashMap<String, f64> = args.thresholds.into_iter().collect();
    let policy = PromotionPolicy::from_thresholds(&thresholds);
    if registry.auto_promote_model(&args.model, &policy) {
        log(level, LogLevel::Normal, &format!("{} promoted to Staging", args.model));
    } else {
        log(level, LogLevel::Normal, &format!("{} not promoted", args.model));
    }
    Ok(CommandOutcome::Completed)
}

pub fn run_info(config: &MonitoringConfig, args: InfoArgs, level: LogLevel) -> crate::Result<CommandOutcome> {
    let registry = open_registry(config)?;
    match registry.get_model_info(&args.model, args.stage)? {
        Some(info) => print_json(&info)?,
        None => log(level, LogLevel::Normal, &format!("No {} version of {}", args.stage, args.model)),
    }
    Ok(CommandOutcome::Completed)
}

pub fn run_compare(config: &MonitoringConfig, args: CompareArgs, _level: LogLevel) -> crate::Result<CommandOutcome> {
    let registry = open_registry(config)?;
    let comparison = registry.compare_models(&args.model, args.version1, args.version2)?.ok_or_else(|| {
        Error::InvalidArgument(format!(
            "cannot compare {} v{} and v{}: version not found",
            args.model, args.version1, args.version2
        ))
    })?;
    print_json(&comparison)?;
    Ok(CommandOutcome::Completed)
}

pub fn run_list(config: &MonitoringConfig, args: ListArgs, _level: LogLevel) -> crate::Result<CommandOutcome> {
    let registry = open_registry(config)?;
    print_json(&registry.list_models(args.stage)?)?;
    Ok(CommandOutcome::Completed)
}

pub fn run_report(config: &MonitoringConfig, level: LogLevel) -> crate::Result<CommandOutcome> {
    let registry = open_registry(config)?;
    let path = registry.generate_report(&ReportWriter::new(config.paths.reports_dir.clone()))?;
    log(level, LogLevel::Normal, &format!("Registry report saved to {}", path.display()));
    Ok(CommandOutcome::Completed)
}
