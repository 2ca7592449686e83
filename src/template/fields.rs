//! Field accessors exposed to templates
//!
//! Every renderable webhook attribute is listed here explicitly. Paths are
//! lowercased segments; a path may be rooted at `details` or `content`, or
//! omit the root, in which case `details` is searched before `content`.
//!
//! A known field whose parent is absent (no `execution`, no `trigger`)
//! renders as an empty string. An unknown path resolves to `None`.

use crate::spinnaker::{Content, Details, Execution, IncomingWebhook};

/// Resolve a lowercased field path to its rendered value
pub fn resolve(incoming: &IncomingWebhook, path: &[String]) -> Option<String> {
    match path {
        [root, rest @ ..] if root == "details" => details_field(&incoming.details, rest),
        [root, rest @ ..] if root == "content" => content_field(&incoming.content, rest),
        _ => details_field(&incoming.details, path)
            .or_else(|| content_field(&incoming.content, path)),
    }
}

fn details_field(details: &Details, path: &[String]) -> Option<String> {
    let [field] = path else {
        return None;
    };
    let value = match field.as_str() {
        "source" => &details.source,
        "type" => &details.event_type,
        "application" => &details.application,
        "created" => &details.created,
        _ => return None,
    };
    Some(value.clone())
}

fn content_field(content: &Content, path: &[String]) -> Option<String> {
    match path {
        [field] => match field.as_str() {
            "executionid" => Some(content.execution_id.clone()),
            "starttime" => Some(content.start_time.to_string()),
            "endtime" => Some(content.end_time.to_string()),
            _ => None,
        },
        [head, rest @ ..] if head == "execution" => {
            let fallback = Execution::default();
            execution_field(content.execution.as_ref().unwrap_or(&fallback), rest)
        }
        _ => None,
    }
}

fn execution_field(execution: &Execution, path: &[String]) -> Option<String> {
    match path {
        [field] => match field.as_str() {
            "type" => Some(execution.execution_type.clone()),
            "id" => Some(execution.id.clone()),
            "application" => Some(execution.application.clone()),
            "starttime" => Some(execution.start_time.to_string()),
            "endtime" => Some(execution.end_time.to_string()),
            "name" => Some(execution.name.clone()),
            "cancelled" | "canceled" => Some(execution.cancelled.to_string()),
            "cancelledby" => Some(execution.cancelled_by.clone().unwrap_or_default()),
            "pipelineconfigid" => Some(execution.pipeline_config_id.clone()),
            "status" => Some(execution.status.clone()),
            _ => None,
        },
        [group, field] if group == "trigger" => {
            let trigger = execution.trigger.as_ref();
            match field.as_str() {
                "user" => Some(trigger.and_then(|t| t.user.clone()).unwrap_or_default()),
                "type" => Some(trigger.and_then(|t| t.trigger_type.clone()).unwrap_or_default()),
                _ => None,
            }
        }
        [group, field] if group == "authentication" => {
            let auth = execution.authentication.as_ref();
            match field.as_str() {
                "user" => Some(auth.and_then(|a| a.user.clone()).unwrap_or_default()),
                "allowedaccounts" => Some(
                    auth.map(|a| a.allowed_accounts.join(","))
                        .unwrap_or_default(),
                ),
                _ => None,
            }
        }
        _ => None,
    }
}
