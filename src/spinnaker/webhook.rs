//! Spinnaker echo webhook payload
//!
//! Mirrors the JSON Spinnaker's echo service posts for pipeline and stage
//! lifecycle notifications. Every field is optional on the wire; absent values
//! deserialize to their zero value so templates still render.

use serde::{Deserialize, Deserializer, Serialize};

/// Epoch timestamp in milliseconds, `0` when unset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn millis(&self) -> i64 {
        self.0
    }

    pub fn is_unset(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // echo sends numbers, but some relays stringify them
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Float(f64),
            Text(String),
            Null(()),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(n) => Ok(Timestamp(n)),
            Raw::Float(f) => Ok(Timestamp(f as i64)),
            Raw::Text(s) if s.trim().is_empty() => Ok(Timestamp(0)),
            Raw::Text(s) => s
                .trim()
                .parse::<i64>()
                .map(Timestamp)
                .map_err(|_| serde::de::Error::custom(format!("invalid timestamp: {}", s))),
            Raw::Null(()) => Ok(Timestamp(0)),
        }
    }
}

/// Webhook as received from Spinnaker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncomingWebhook {
    pub details: Details,
    pub content: Content,
}

/// Event envelope: who sent it and what kind of event it is
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Details {
    pub source: String,
    /// `<source>:<domain>:<status>`, e.g. `orca:pipeline:complete`
    #[serde(rename = "type")]
    pub event_type: String,
    pub application: String,
    pub created: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Content {
    pub execution_id: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution: Option<Execution>,
}

/// Execution context of the pipeline or stage the event belongs to
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Execution {
    #[serde(rename = "type")]
    pub execution_type: String,
    pub id: String,
    pub application: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub name: String,
    pub cancelled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancelled_by: Option<String>,
    pub pipeline_config_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger: Option<Trigger>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Authentication>,
    /// Stage payloads are passed through untouched
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stages: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Trigger {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub trigger_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Authentication {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed_accounts: Vec<String>,
}

impl IncomingWebhook {
    /// Parse a webhook from its JSON body
    pub fn from_json(body: &str) -> serde_json::Result<Self> {
        serde_json::from_str(body)
    }

    /// User that triggered the execution, empty when unknown
    pub fn triggered_by(&self) -> &str {
        self.content
            .execution
            .as_ref()
            .and_then(|e| e.trigger.as_ref())
            .and_then(|t| t.user.as_deref())
            .unwrap_or("")
    }

    /// Execution (pipeline) name, empty when the payload carries no execution
    pub fn pipeline_name(&self) -> &str {
        self.content
            .execution
            .as_ref()
            .map(|e| e.name.as_str())
            .unwrap_or("")
    }

    /// `endTime - startTime` of the execution in milliseconds.
    ///
    /// Unset timestamps count as zero; the result is not clamped and wraps
    /// on overflow.
    pub fn execution_duration_millis(&self) -> i64 {
        let (start, end) = match &self.content.execution {
            Some(e) => (e.start_time, e.end_time),
            None => (Timestamp::default(), Timestamp::default()),
        };
        end.millis().wrapping_sub(start.millis())
    }
}
