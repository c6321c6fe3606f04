//! Error types for code generation

use interlace_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Code generation error: {0}")]
    Generation(String),

    /// A synthesized member needs an interface the filter already removed
    #[error("Interface '{name}' not found ({context})")]
    MissingInterface { name: String, context: String },

    #[error("Target '{target}' failed: {source}")]
    Target {
        target: String,
        #[source]
        source: Box<CodegenError>,
    },

    #[error("Unknown backend: {0}")]
    UnknownBackend(String),

    #[error("Template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("Render error: {0}")]
    Render(#[from] handlebars::RenderError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Fmt(#[from] std::fmt::Error),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl CodegenError {
    pub fn missing_interface(name: impl Into<String>, context: impl Into<String>) -> Self {
        Self::MissingInterface {
            name: name.into(),
            context: context.into(),
        }
    }
}
