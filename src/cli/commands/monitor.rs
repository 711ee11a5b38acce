//! Monitor command implementation

use super::CommandOutcome;
use crate::cli::logging::log;
use crate::cli::LogLevel;
use crate::config::{MonitorArgs, MonitoringConfig, RunMode};
use crate::monitor::{shutdown_on_ctrl_c, MonitoringOrchestrator};

/// Run one monitoring cycle, or the scheduler until Ctrl-C.
///
/// Cycle status never affects the outcome; only setup failures are errors.
pub fn run_monitor(config: MonitoringConfig, args: MonitorArgs, level: LogLevel) -> crate::Result<CommandOutcome> {
    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(async move {
        let orchestrator = MonitoringOrchestrator::from_config(config)?;
        match args.mode {
            RunMode::Once => {
                let (report, path) = orchestrator.generate_monitoring_report().await?;
                log(level, LogLevel::Normal, &format!("Overall status: {}", report.overall_status));
                for recommendation in &report.summary.recommendations {
                    log(level, LogLevel::Normal, &format!("  - {recommendation}"));
                }
                log(level, LogLevel::Normal, &format!("Monitoring report saved to {}", path.display()));
            }
            RunMode::Scheduled => {
                let scheduler = orchestrator.scheduler()?;
                log(level, LogLevel::Normal, "Scheduled monitoring started, press Ctrl-C to stop");
                scheduler.run(shutdown_on_ctrl_c()).await;
            }
        }
        Ok::<_, crate::Error>(CommandOutcome::Completed)
    })
}
