//! Configuration validation logic

use chrono::NaiveTime;

use super::error::ValidationError;
use crate::config::schema::{ChannelKind, MonitoringConfig};

/// Parse a `HH:MM` wall-clock time
pub fn parse_time_of_day(s: &str) -> Result<NaiveTime, ValidationError> {
    let trimmed = s.trim();
    let well_formed = trimmed.len() == 5 && trimmed.as_bytes()[2] == b':';
    if !well_formed {
        return Err(ValidationError::InvalidTimeOfDay(s.to_string()));
    }
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .map_err(|_| ValidationError::InvalidTimeOfDay(s.to_string()))
}

fn check_threshold(name: &str, value: f64) -> Result<(), ValidationError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidThreshold { name: name.to_string(), value })
    }
}

/// Validate a monitoring configuration
///
/// Checks:
/// - Thresholds lie in (0, 1]
/// - Intervals, windows and timeouts are non-zero
/// - The daily check time is `HH:MM`
/// - Alert channels have a known type and a destination
pub fn validate_config(config: &MonitoringConfig) -> Result<(), ValidationError> {
    let drift = &config.drift_detection;
    check_threshold("data_drift_threshold", drift.data_drift_threshold)?;
    check_threshold("performance_drift_threshold", drift.performance_drift_threshold)?;
    if drift.monitoring_window_days == 0 {
        return Err(ValidationError::ZeroValue("monitoring_window_days"));
    }

    let monitoring = &config.monitoring;
    if monitoring.check_interval_hours == 0 {
        return Err(ValidationError::ZeroValue("check_interval_hours"));
    }
    if monitoring.poll_interval_secs == 0 {
        return Err(ValidationError::ZeroValue("poll_interval_secs"));
    }
    if monitoring.cycle_soft_deadline_secs == 0 {
        return Err(ValidationError::ZeroValue("cycle_soft_deadline_secs"));
    }
    if monitoring.performance_window_hours == 0 {
        return Err(ValidationError::ZeroValue("performance_window_hours"));
    }
    check_threshold("default_accuracy_drop", monitoring.default_accuracy_drop)?;
    for (model, value) in &monitoring.alert_thresholds {
        check_threshold(&format!("alert_thresholds.{model}"), *value)?;
    }
    parse_time_of_day(&monitoring.daily_drift_check_at)?;

    if config.models.is_empty() {
        return Err(ValidationError::NoModels);
    }

    if config.alerting.timeout_secs == 0 {
        return Err(ValidationError::ZeroValue("alerting.timeout_secs"));
    }
    for channel in &config.alerting.channels {
        let kind = ChannelKind::parse(&channel.channel_type)
            .ok_or_else(|| ValidationError::UnknownChannelType(channel.channel_type.clone()))?;
        if kind.needs_destination() && channel.destination.trim().is_empty() {
            return Err(ValidationError::EmptyDestination(channel.channel_type.clone()));
        }
    }

    let url = config.deployment.health_url();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ValidationError::InvalidHealthUrl(url));
    }
    if config.deployment.probe_timeout_secs == 0 {
        return Err(ValidationError::ZeroValue("probe_timeout_secs"));
    }
    if config.tracking.timeout_secs == 0 {
        return Err(ValidationError::ZeroValue("tracking.timeout_secs"));
    }

    Ok(())
}
