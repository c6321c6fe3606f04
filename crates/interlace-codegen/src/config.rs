//! Run configuration
//!
//! Loaded from TOML. Every field has a default, so an empty file describes a
//! single `interfaces` + `jso` target that keeps everything.

use crate::backend::BackendKind;
use crate::synthesis::FactoryNaming;
use crate::CodegenError;
use interlace_core::idl::Annotations;
use interlace_core::mixin::DEFAULT_MANUAL_MIXINS;
use interlace_core::{AnnotationFilter, RenamePass};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Root Java package of both hierarchies
    pub base_package: String,
    /// Subpackage for interfaces without an IDL module
    pub default_module: String,
    /// Synthetic top of the overlay hierarchy
    pub mixin_base: String,
    /// Always treated as mixins
    pub manual_mixins: Vec<String>,
    /// Parent added to every `EventTarget`-marked interface
    pub event_target: String,
    /// Emit only interfaces carrying one of these annotations (empty = all)
    pub source_filter: Vec<String>,
    pub factory_root: String,
    pub factory_naming: FactoryNaming,
    pub global_root: String,
    /// Hand-written sources; interfaces with a matching file stem are skipped
    pub auxiliary_dir: Option<PathBuf>,
    pub template_dir: Option<PathBuf>,
    pub targets: Vec<TargetConfig>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_package: "elemental".to_string(),
            default_module: "dom".to_string(),
            mixin_base: "ElementalMixinBase".to_string(),
            manual_mixins: DEFAULT_MANUAL_MIXINS.iter().map(|s| s.to_string()).collect(),
            event_target: "EventTarget".to_string(),
            source_filter: Vec::new(),
            factory_root: "Document".to_string(),
            factory_naming: FactoryNaming::default(),
            global_root: "Window".to_string(),
            auxiliary_dir: None,
            template_dir: None,
            targets: vec![TargetConfig::default()],
        }
    }
}

/// One output tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    pub name: String,
    pub output_dir: PathBuf,
    pub systems: Vec<BackendKind>,
    /// Annotation filter; without one only unidentified members are removed
    pub filter: Option<AnnotationFilter>,
    /// Applied in order after filtering
    pub renames: Vec<RenamePass>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            output_dir: PathBuf::from("generated"),
            systems: vec![BackendKind::Interfaces, BackendKind::Jso],
            filter: None,
            renames: Vec::new(),
        }
    }
}

impl GeneratorConfig {
    pub fn load(path: &Path) -> Result<Self, CodegenError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, CodegenError> {
        Ok(toml::from_str(content)?)
    }

    /// Target by name, or the first one when `name` is `None`
    pub fn target(&self, name: Option<&str>) -> Result<&TargetConfig, CodegenError> {
        match name {
            Some(name) => self
                .targets
                .iter()
                .find(|t| t.name == name)
                .ok_or_else(|| CodegenError::Generation(format!("no target named '{}'", name))),
            None => self
                .targets
                .first()
                .ok_or_else(|| CodegenError::Generation("no targets configured".to_string())),
        }
    }

    /// Whether an interface passes the source filter
    pub fn matches_source_filter(&self, annotations: &Annotations) -> bool {
        self.source_filter.is_empty()
            || self
                .source_filter
                .iter()
                .any(|name| annotations.contains_key(name))
    }
}
