//! Template engine for Datadog event title, text and tags
//!
//! Two phases: [`EventTemplate::compile`] checks syntax and yields a
//! [`CompiledEventTemplate`]; [`CompiledEventTemplate::execute`] renders one
//! field against a webhook and fails on references to unknown fields.

pub mod event;
pub mod fields;
pub mod parser;

pub use event::{CompileError, CompiledEventTemplate, EventTemplate, RenderError, TemplateField};
pub use parser::{Template, TemplateError};
