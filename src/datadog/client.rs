//! Datadog backend capabilities and the HTTP events client

use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use super::event::{AlertSeverity, OutboundEvent};
use crate::config::DatadogConfig;
use crate::error::BackendError;

/// Submit one event to the events API
pub trait EventPoster: Send + Sync {
    fn post_event(&self, event: &OutboundEvent) -> Result<(), BackendError>;
}

/// Submit one timing sample to the metrics pipeline
pub trait TimingEmitter: Send + Sync {
    fn emit_timing(
        &self,
        name: &str,
        duration_millis: i64,
        tags: &[String],
        sample_rate: f64,
    ) -> Result<(), BackendError>;
}

/// `POST /api/v1/events` body
#[derive(Debug, Serialize)]
struct EventRequest<'a> {
    title: &'a str,
    text: &'a str,
    tags: &'a [String],
    aggregation_key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    alert_type: Option<AlertSeverity>,
    source_type_name: &'static str,
}

impl<'a> From<&'a OutboundEvent> for EventRequest<'a> {
    fn from(event: &'a OutboundEvent) -> Self {
        Self {
            title: &event.title,
            text: &event.text,
            tags: &event.tags,
            aggregation_key: &event.aggregation_key,
            alert_type: event.alert_severity,
            source_type_name: "spinnaker",
        }
    }
}

/// Blocking client for the Datadog events API
pub struct DatadogClient {
    client: reqwest::blocking::Client,
    config: DatadogConfig,
}

impl DatadogClient {
    pub fn new(config: DatadogConfig) -> anyhow::Result<Self> {
        if config.api_key.is_empty() {
            anyhow::bail!("Datadog api_key is required (set DATADOG_API_KEY)");
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("Cannot create HTTP client: {}", e))?;

        Ok(Self { client, config })
    }

    pub fn events_url(&self) -> String {
        format!("{}/api/v1/events", self.config.host.trim_end_matches('/'))
    }
}

impl EventPoster for DatadogClient {
    fn post_event(&self, event: &OutboundEvent) -> Result<(), BackendError> {
        let url = self.events_url();
        debug!(url = %url, title = %event.title, tags = event.tags.len(), "Posting Datadog event");

        let mut request = self
            .client
            .post(&url)
            .header("DD-API-KEY", &self.config.api_key)
            .json(&EventRequest::from(event));
        if let Some(app_key) = &self.config.app_key {
            request = request.header("DD-APPLICATION-KEY", app_key);
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        debug!(status = status.as_u16(), "Datadog accepted event");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(alert: Option<AlertSeverity>) -> OutboundEvent {
        OutboundEvent {
            title: "someapp doing something".to_string(),
            text: "someid is the execution id".to_string(),
            tags: vec!["origin:spinnaker".to_string()],
            aggregation_key: "someid".to_string(),
            alert_severity: alert,
        }
    }

    #[test]
    fn test_client_requires_api_key() {
        let result = DatadogClient::new(DatadogConfig::default());
        assert!(result.is_err());
        assert!(result.err().unwrap().to_string().contains("api_key"));
    }

    #[test]
    fn test_events_url_trims_slash() {
        let client = DatadogClient::new(DatadogConfig {
            api_key: "k".to_string(),
            host: "http://localhost:8080/".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(client.events_url(), "http://localhost:8080/api/v1/events");
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(EventRequest::from(&event(Some(AlertSeverity::Error)))).unwrap();
        assert_eq!(body["alert_type"], "error");
        assert_eq!(body["aggregation_key"], "someid");
        assert_eq!(body["source_type_name"], "spinnaker");
        assert_eq!(body["tags"][0], "origin:spinnaker");

        let body = serde_json::to_value(EventRequest::from(&event(None))).unwrap();
        assert!(body.get("alert_type").is_none());
    }
}
