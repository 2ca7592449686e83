//! Outbound Datadog event and its fixed tags

use serde::{Deserialize, Serialize};

use crate::spinnaker::{ClassifiedEvent, IncomingWebhook};

/// Provenance tag carried by every event and metric
pub const ORIGIN_TAG: &str = "origin:spinnaker";

/// Datadog `alert_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Info,
    Error,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Info => "info",
            AlertSeverity::Error => "error",
        }
    }

    /// `Error` for failed events; otherwise unset so Datadog applies its default
    pub fn for_event(classified: &ClassifiedEvent) -> Option<Self> {
        classified.is_failed().then_some(AlertSeverity::Error)
    }
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A fully rendered event ready for submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundEvent {
    pub title: String,
    pub text: String,
    pub tags: Vec<String>,
    pub aggregation_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_severity: Option<AlertSeverity>,
}

/// Tags every event starts with, in this order:
/// origin, app, status, type (domain), raw event type
pub fn base_tags(incoming: &IncomingWebhook, classified: &ClassifiedEvent) -> Vec<String> {
    vec![
        ORIGIN_TAG.to_string(),
        format!("app:{}", incoming.details.application),
        format!("status:{}", classified.status),
        format!("type:{}", classified.domain),
        incoming.details.event_type.clone(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spinnaker::classify;

    #[test]
    fn test_base_tags_order() {
        let mut incoming = IncomingWebhook::default();
        incoming.details.application = "someapp".to_string();
        incoming.details.event_type = "orca:stage:failed".to_string();
        let classified = classify(&incoming.details.event_type).unwrap();

        assert_eq!(
            base_tags(&incoming, &classified),
            vec![
                "origin:spinnaker",
                "app:someapp",
                "status:failed",
                "type:stage",
                "orca:stage:failed"
            ]
        );
    }

    #[test]
    fn test_severity_only_for_failed() {
        assert_eq!(
            AlertSeverity::for_event(&classify("orca:stage:failed").unwrap()),
            Some(AlertSeverity::Error)
        );
        for status in ["starting", "complete", "FAILED", "failed_over"] {
            let classified = classify(&format!("orca:pipeline:{}", status)).unwrap();
            assert_eq!(AlertSeverity::for_event(&classified), None, "status {}", status);
        }
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&AlertSeverity::Error).unwrap(), "\"error\"");
        assert_eq!(AlertSeverity::Info.to_string(), "info");
    }
}
