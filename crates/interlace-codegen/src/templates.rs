//! Compilation-unit templates
//!
//! Every backend renders its units through a named Handlebars template.
//! Built-in templates are compiled into the crate; a file of the same name
//! under one of the backend's search subdirectories of the configured
//! template directory replaces the built-in one.

use crate::CodegenError;
use handlebars::Handlebars;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const INTERFACE_TEMPLATE: &str = "interface.java.hbs";
pub const JSO_TEMPLATE: &str = "jso.java.hbs";
pub const CALLBACK_TEMPLATE: &str = "callback.java.hbs";

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (INTERFACE_TEMPLATE, include_str!("../templates/interface.java.hbs")),
    (JSO_TEMPLATE, include_str!("../templates/jso.java.hbs")),
    (CALLBACK_TEMPLATE, include_str!("../templates/callback.java.hbs")),
];

/// Values substituted into a unit template
#[derive(Debug, Clone, Default, Serialize)]
pub struct UnitFrame {
    pub package: String,
    pub imports: Vec<String>,
    /// Emitted type name
    pub name: String,
    /// Full type header up to (not including) the opening brace
    pub declaration: String,
    /// Rendered members without a trailing newline
    pub body: String,
}

pub struct TemplateLoader {
    registry: Handlebars<'static>,
}

impl std::fmt::Debug for TemplateLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateLoader").finish_non_exhaustive()
    }
}

impl TemplateLoader {
    /// Register the built-in templates, letting files found under
    /// `template_dir/<search path>/` override them. Earlier search paths win.
    pub fn new(template_dir: Option<&Path>, search_paths: &[&str]) -> Result<Self, CodegenError> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        registry.set_strict_mode(true);

        for (name, builtin) in BUILTIN_TEMPLATES {
            match find_override(template_dir, search_paths, name) {
                Some(path) => {
                    debug!("using template override {}", path.display());
                    let source = std::fs::read_to_string(&path)?;
                    registry.register_template_string(name, source)?;
                }
                None => registry.register_template_string(name, *builtin)?,
            }
        }

        Ok(Self { registry })
    }

    pub fn render<T: Serialize>(&self, name: &str, data: &T) -> Result<String, CodegenError> {
        Ok(self.registry.render(name, data)?)
    }
}

fn find_override(template_dir: Option<&Path>, search_paths: &[&str], name: &str) -> Option<PathBuf> {
    let root = template_dir?;
    search_paths
        .iter()
        .map(|sub| root.join(sub).join(name))
        .find(|candidate| candidate.is_file())
}
