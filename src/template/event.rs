//! User-authored Datadog event templates and their compiled form

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::parser::{Template, TemplateError};
use crate::spinnaker::IncomingWebhook;

/// Which part of an event template an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateField {
    Title,
    Text,
    Tag(usize),
}

impl std::fmt::Display for TemplateField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateField::Title => write!(f, "title"),
            TemplateField::Text => write!(f, "text"),
            TemplateField::Tag(i) => write!(f, "tags[{}]", i),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not compile {field} template: {source}")]
pub struct CompileError {
    pub field: TemplateField,
    #[source]
    pub source: TemplateError,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not render {field} from webhook: {source}")]
pub struct RenderError {
    pub field: TemplateField,
    #[source]
    pub source: TemplateError,
}

/// Shape of one outbound Datadog event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTemplate {
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl EventTemplate {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Parse title, text and tags in that order, stopping at the first error
    pub fn compile(&self) -> Result<CompiledEventTemplate, CompileError> {
        let compile = |field: TemplateField, source: &str| {
            Template::parse(source).map_err(|source| CompileError { field, source })
        };

        let title = compile(TemplateField::Title, &self.title)?;
        let text = compile(TemplateField::Text, &self.text)?;
        let tags = self
            .tags
            .iter()
            .enumerate()
            .map(|(i, tag)| compile(TemplateField::Tag(i), tag))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CompiledEventTemplate { title, text, tags })
    }
}

/// Parsed event template, reusable across webhooks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledEventTemplate {
    title: Template,
    text: Template,
    tags: Vec<Template>,
}

impl CompiledEventTemplate {
    /// Render a single field against the webhook
    pub fn execute(&self, field: TemplateField, incoming: &IncomingWebhook) -> Result<String, RenderError> {
        let template = match field {
            TemplateField::Title => &self.title,
            TemplateField::Text => &self.text,
            TemplateField::Tag(i) => self.tags.get(i).ok_or(RenderError {
                field,
                source: TemplateError::MissingTag(i),
            })?,
        };
        template
            .render(incoming)
            .map_err(|source| RenderError { field, source })
    }

    /// Render every tag in declaration order, stopping at the first failure
    pub fn render_tags(&self, incoming: &IncomingWebhook) -> Result<Vec<String>, RenderError> {
        (0..self.tags.len())
            .map(|i| self.execute(TemplateField::Tag(i), incoming))
            .collect()
    }

    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }
}
