//! Minimal `{{ field }}` template language
//!
//! A template is literal text with `{{ path }}` actions. `path` is a
//! dot-separated field reference resolved against the webhook, e.g.
//! `{{ application }}`, `{{ content.execution.status }}` or the Go-style
//! `{{ .Details.Application }}`. Segment matching is ASCII case-insensitive.
//!
//! Parsing only checks syntax. Whether a path names a real webhook field is
//! decided at render time.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

use super::fields;
use crate::spinnaker::IncomingWebhook;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("syntax error at byte {offset}: {reason}")]
    Syntax { offset: usize, reason: String },
    #[error("unknown field {path:?}")]
    UnknownField { path: String },
    #[error("no tag template at index {0}")]
    MissingTag(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(FieldRef),
}

/// A parsed `{{ path }}` action
#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldRef {
    /// Path as written, for error messages
    raw: String,
    /// Lowercased segments without the optional leading dot
    path: Vec<String>,
}

/// A parsed template ready to render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

fn field_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\.?[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*$").unwrap()
    })
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut pos = 0;

        while let Some(found) = source[pos..].find(OPEN) {
            let open = pos + found;
            if open > pos {
                segments.push(Segment::Literal(source[pos..open].to_string()));
            }

            let body_start = open + OPEN.len();
            let close = source[body_start..]
                .find(CLOSE)
                .map(|i| body_start + i)
                .ok_or_else(|| TemplateError::Syntax {
                    offset: open,
                    reason: "unclosed action".to_string(),
                })?;

            let body = source[body_start..close].trim();
            if body.is_empty() {
                return Err(TemplateError::Syntax {
                    offset: open,
                    reason: "empty action".to_string(),
                });
            }
            if !field_pattern().is_match(body) {
                return Err(TemplateError::Syntax {
                    offset: open,
                    reason: format!("invalid field reference {:?}", body),
                });
            }

            segments.push(Segment::Field(FieldRef {
                raw: body.to_string(),
                path: body
                    .trim_start_matches('.')
                    .split('.')
                    .map(|s| s.to_ascii_lowercase())
                    .collect(),
            }));
            pos = close + CLOSE.len();
        }

        if pos < source.len() {
            segments.push(Segment::Literal(source[pos..].to_string()));
        }

        Ok(Self { segments })
    }

    /// Render against a webhook; the first unknown field aborts rendering
    pub fn render(&self, incoming: &IncomingWebhook) -> Result<String, TemplateError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(field) => {
                    let value = fields::resolve(incoming, &field.path).ok_or_else(|| {
                        TemplateError::UnknownField {
                            path: field.raw.clone(),
                        }
                    })?;
                    out.push_str(&value);
                }
            }
        }
        Ok(out)
    }

    /// Field references in declaration order, as written
    pub fn field_refs(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Field(f) => Some(f.raw.as_str()),
                Segment::Literal(_) => None,
            })
            .collect()
    }
}
