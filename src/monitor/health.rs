//! Serving endpoint probe

use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::report::{OverallStatus, ProbeOutcome};

/// Probes whether the serving layer is up
#[async_trait]
pub trait ServiceProbe: Send + Sync {
    async fn probe(&self) -> ProbeOutcome;
}

/// GETs a health route; anything but 200 within the timeout is unhealthy
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpProbe {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url: url.into(), timeout })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ServiceProbe for HttpProbe {
    async fn probe(&self) -> ProbeOutcome {
        let started = Instant::now();
        // The client timeout covers the request; this also bounds connection setup.
        let response = tokio::time::timeout(self.timeout, self.client.get(&self.url).send()).await;
        let elapsed = started.elapsed().as_secs_f64();

        match response {
            Ok(Ok(response)) => {
                let code = response.status().as_u16();
                let status =
                    if code == 200 { OverallStatus::Healthy } else { OverallStatus::Unhealthy };
                tracing::debug!(url = %self.url, code, elapsed, "Health probe answered");
                ProbeOutcome {
                    status,
                    status_code: Some(code),
                    response_time: Some(elapsed),
                    ..ProbeOutcome::healthy()
                }
            }
            Ok(Err(e)) => {
                tracing::warn!(url = %self.url, error = %e, "Health probe failed");
                ProbeOutcome::unhealthy(e.to_string())
            }
            Err(_) => {
                tracing::warn!(url = %self.url, timeout = ?self.timeout, "Health probe timed out");
                ProbeOutcome::unhealthy(format!("timed out after {:?}", self.timeout))
            }
        }
    }
}
