//! Spout - the set of event templates and the handlers built from them
//!
//! Template files are YAML (`.yml`/`.yaml`) or JSON (anything else):
//! ```yaml
//! templates:
//!   - name: pipeline-events
//!     title: "{{ application }} pipeline {{ execution.name }}"
//!     text: "Execution {{ executionId }} is {{ execution.status }}"
//!     tags:
//!       - "pipeline_config_id:{{ execution.pipelineConfigId }}"
//! ```
//!
//! ```json
//! {
//!   "templates": [
//!     {
//!       "name": "pipeline-events",
//!       "title": "{{ application }} pipeline {{ execution.name }}",
//!       "text": "Execution {{ executionId }} is {{ execution.status }}",
//!       "tags": ["pipeline_config_id:{{ execution.pipelineConfigId }}"]
//!     }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use super::client::{EventPoster, TimingEmitter};
use super::handler::DatadogEventHandler;
use crate::spinnaker::Dispatcher;
use crate::template::{CompileError, EventTemplate};

#[derive(Debug, Error)]
pub enum TemplateFileError {
    #[error("cannot read template file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid template file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: TemplateFormatError,
    },
}

#[derive(Debug, Error)]
pub enum TemplateFormatError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// A named template as stored in the template file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRecord {
    pub name: String,
    #[serde(flatten)]
    pub template: EventTemplate,
}

#[derive(Debug, Default, Deserialize)]
struct TemplateFile {
    #[serde(default)]
    templates: Vec<TemplateRecord>,
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml"))
        .unwrap_or(false)
}

fn parse_template_file(path: &Path, content: &str) -> Result<TemplateFile, TemplateFormatError> {
    if is_yaml(path) {
        // an empty YAML document has no templates
        if content.trim().is_empty() {
            return Ok(TemplateFile::default());
        }
        Ok(serde_yaml::from_str(content)?)
    } else {
        Ok(serde_json::from_str(content)?)
    }
}

/// Read all template records from a YAML or JSON template file
pub fn load_templates(path: &Path) -> Result<Vec<TemplateRecord>, TemplateFileError> {
    let content = fs::read_to_string(path).map_err(|source| TemplateFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file = parse_template_file(path, &content).map_err(|source| TemplateFileError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(file.templates)
}

pub struct Spout {
    poster: Arc<dyn EventPoster>,
    emitter: Arc<dyn TimingEmitter>,
    templates: Vec<TemplateRecord>,
}

impl Spout {
    /// Spout without templates
    pub fn new(poster: Arc<dyn EventPoster>, emitter: Arc<dyn TimingEmitter>) -> Self {
        Self {
            poster,
            emitter,
            templates: Vec::new(),
        }
    }

    pub fn from_template_file(
        poster: Arc<dyn EventPoster>,
        emitter: Arc<dyn TimingEmitter>,
        path: &Path,
    ) -> Result<Self, TemplateFileError> {
        let templates = load_templates(path)?;
        info!(path = %path.display(), templates = templates.len(), "Loaded event templates");
        Ok(Self {
            poster,
            emitter,
            templates,
        })
    }

    pub fn with_template(mut self, name: impl Into<String>, template: EventTemplate) -> Self {
        self.templates.push(TemplateRecord {
            name: name.into(),
            template,
        });
        self
    }

    pub fn total_templates(&self) -> usize {
        self.templates.len()
    }

    pub fn templates(&self) -> &[TemplateRecord] {
        &self.templates
    }

    /// One handler per template, sharing this spout's backends
    pub fn handlers(&self) -> Vec<Arc<DatadogEventHandler>> {
        self.templates
            .iter()
            .map(|record| {
                Arc::new(DatadogEventHandler::new(
                    format!("datadog:{}", record.name),
                    record.template.clone(),
                    Arc::clone(&self.poster),
                    Arc::clone(&self.emitter),
                ))
            })
            .collect()
    }

    /// Register every template handler with the dispatcher
    pub fn attach_to_dispatcher(&self, dispatcher: &mut Dispatcher) {
        for handler in self.handlers() {
            dispatcher.register_handler(handler);
        }
    }

    /// Compile every template; returns the failures by template name
    pub fn validate(&self) -> Vec<(String, CompileError)> {
        self.templates
            .iter()
            .filter_map(|record| match record.template.compile() {
                Ok(_) => None,
                Err(e) => {
                    warn!(template = %record.name, error = %e, "Template does not compile");
                    Some((record.name.clone(), e))
                }
            })
            .collect()
    }
}
