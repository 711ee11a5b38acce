//! Alert fan-out
//!
//! Each configured channel is an [`AlertSink`]. [`AlertDispatcher::send`]
//! delivers to all of them concurrently; every delivery has its own timeout
//! and retry budget and a failing channel only affects its own
//! [`DeliveryOutcome`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::task::JoinSet;

use crate::config::{AlertingConfig, ChannelConfig, ChannelKind};

const RETRY_BACKOFF: Duration = Duration::from_millis(200);

/// Alert delivery errors
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("Unknown alert channel type: {0}")]
    UnknownChannel(String),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("HTTP delivery to {destination} failed: {source}")]
    Http { destination: String, source: reqwest::Error },

    #[error("{destination} rejected alert with status {status}")]
    Rejected { destination: String, status: u16 },

    #[error("Failed to append alert to {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// An alert as delivered to channels
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub subject: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    pub fn new(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self { subject: subject.into(), message: message.into(), timestamp: Utc::now() }
    }
}

/// Result of delivering one alert to one channel
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeliveryOutcome {
    pub channel: String,
    pub delivered: bool,
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A destination for alerts
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Channel label used in logs and delivery outcomes
    fn describe(&self) -> String;

    async fn deliver(&self, alert: &Alert) -> Result<(), AlertError>;
}

/// POSTs the alert as JSON
pub struct WebhookSink {
    client: reqwest::Client,
    url: String,
}

impl WebhookSink {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self { client, url: url.into() }
    }
}

async fn post_json(
    client: &reqwest::Client,
    url: &str,
    body: &serde_json::Value,
) -> Result<(), AlertError> {
    let response = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|source| AlertError::Http { destination: url.to_string(), source })?;
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(AlertError::Rejected { destination: url.to_string(), status: status.as_u16() })
    }
}

#[async_trait]
impl AlertSink for WebhookSink {
    fn describe(&self) -> String {
        format!("webhook:{}", self.url)
    }

    async fn deliver(&self, alert: &Alert) -> Result<(), AlertError> {
        post_json(&self.client, &self.url, &serde_json::to_value(alert)?).await
    }
}

/// Posts `{"text": ...}` to a Slack incoming webhook
pub struct SlackSink {
    client: reqwest::Client,
    webhook_url: String,
}

impl SlackSink {
    pub fn new(client: reqwest::Client, webhook_url: impl Into<String>) -> Self {
        Self { client, webhook_url: webhook_url.into() }
    }
}

#[async_trait]
impl AlertSink for SlackSink {
    fn describe(&self) -> String {
        "slack".to_string()
    }

    async fn deliver(&self, alert: &Alert) -> Result<(), AlertError> {
        let text = format!("*{}*\n{}", alert.subject, alert.message);
        post_json(&self.client, &self.webhook_url, &serde_json::json!({ "text": text })).await
    }
}

/// Emits the alert as a warning log event
pub struct LogSink;

#[async_trait]
impl AlertSink for LogSink {
    fn describe(&self) -> String {
        "log".to_string()
    }

    async fn deliver(&self, alert: &Alert) -> Result<(), AlertError> {
        tracing::warn!(subject = %alert.subject, "ALERT: {}", alert.message);
        Ok(())
    }
}

/// Appends alerts to a file, one JSON document per line
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl AlertSink for FileSink {
    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }

    async fn deliver(&self, alert: &Alert) -> Result<(), AlertError> {
        let io_err = |source| AlertError::Io { path: self.path.clone(), source };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        let mut line = serde_json::to_vec(alert)?;
        line.push(b'\n');
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(io_err)?;
        file.write_all(&line).await.map_err(io_err)?;
        file.flush().await.map_err(io_err)
    }
}

/// Build the sink for one configured channel
pub fn sink_for(channel: &ChannelConfig, client: &reqwest::Client) -> Result<Arc<dyn AlertSink>, AlertError> {
    let kind = ChannelKind::parse(&channel.channel_type)
        .ok_or_else(|| AlertError::UnknownChannel(channel.channel_type.clone()))?;
    let sink: Arc<dyn AlertSink> = match kind {
        ChannelKind::Webhook => Arc::new(WebhookSink::new(client.clone(), &channel.destination)),
        ChannelKind::Slack => Arc::new(SlackSink::new(client.clone(), &channel.destination)),
        ChannelKind::Log => Arc::new(LogSink),
        ChannelKind::File => Arc::new(FileSink::new(&channel.destination)),
    };
    Ok(sink)
}

/// Sends alerts to every configured channel
#[derive(Clone)]
pub struct AlertDispatcher {
    enabled: bool,
    timeout: Duration,
    max_retries: u32,
    sinks: Vec<Arc<dyn AlertSink>>,
}

impl std::fmt::Debug for AlertDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let channels: Vec<String> = self.sinks.iter().map(|s| s.describe()).collect();
        f.debug_struct("AlertDispatcher")
            .field("enabled", &self.enabled)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("channels", &channels)
            .finish()
    }
}

impl AlertDispatcher {
    pub fn new(sinks: Vec<Arc<dyn AlertSink>>, timeout: Duration, max_retries: u32) -> Self {
        Self { enabled: true, timeout, max_retries, sinks }
    }

    /// A dispatcher that drops every alert
    pub fn disabled() -> Self {
        Self { enabled: false, timeout: Duration::from_secs(1), max_retries: 0, sinks: Vec::new() }
    }

    pub fn from_config(config: &AlertingConfig) -> Result<Self, AlertError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder().timeout(timeout).build().map_err(AlertError::Client)?;
        let sinks =
            config.channels.iter().map(|c| sink_for(c, &client)).collect::<Result<Vec<_>, _>>()?;
        Ok(Self { enabled: config.enabled, ..Self::new(sinks, timeout, config.max_retries) })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn channel_count(&self) -> usize {
        self.sinks.len()
    }

    /// Deliver `subject`/`message` to all channels; never fails
    ///
    /// Outcomes are returned in channel order.
    pub async fn send(&self, subject: &str, message: &str) -> Vec<DeliveryOutcome> {
        if !self.enabled {
            tracing::debug!(subject, "Alerting disabled, dropping alert");
            return Vec::new();
        }
        tracing::warn!(subject, "ALERT: {message}");
        let alert = Arc::new(Alert::new(subject, message));

        let mut tasks = JoinSet::new();
        for (idx, sink) in self.sinks.iter().enumerate() {
            let sink = Arc::clone(sink);
            let alert = Arc::clone(&alert);
            let (timeout, max_retries) = (self.timeout, self.max_retries);
            tasks.spawn(async move { (idx, deliver_with_retry(sink.as_ref(), &alert, timeout, max_retries).await) });
        }

        let mut outcomes: Vec<Option<DeliveryOutcome>> = vec![None; self.sinks.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, outcome)) => outcomes[idx] = Some(outcome),
                Err(e) => tracing::error!(error = %e, "Alert delivery task failed"),
            }
        }
        outcomes
            .into_iter()
            .zip(&self.sinks)
            .map(|(outcome, sink)| {
                outcome.unwrap_or_else(|| DeliveryOutcome {
                    channel: sink.describe(),
                    delivered: false,
                    attempts: 0,
                    error: Some("delivery task aborted".to_string()),
                })
            })
            .collect()
    }
}

async fn deliver_with_retry(
    sink: &dyn AlertSink,
    alert: &Alert,
    timeout: Duration,
    max_retries: u32,
) -> DeliveryOutcome {
    let channel = sink.describe();
    let mut last_error = String::new();
    for attempt in 1..=max_retries + 1 {
        match tokio::time::timeout(timeout, sink.deliver(alert)).await {
            Ok(Ok(())) => {
                tracing::info!(channel = %channel, attempt, "Alert delivered");
                return DeliveryOutcome { channel, delivered: true, attempts: attempt, error: None };
            }
            Ok(Err(e)) => last_error = e.to_string(),
            Err(_) => last_error = format!("timed out after {timeout:?}"),
        }
        tracing::warn!(channel = %channel, attempt, error = %last_error, "Alert delivery attempt failed");
        if attempt <= max_retries {
            tokio::time::sleep(RETRY_BACKOFF * attempt).await;
        }
    }
    tracing::error!(channel = %channel, error = %last_error, "Giving up on alert channel");
    DeliveryOutcome { channel, delivered: false, attempts: max_retries + 1, error: Some(last_error) }
}
